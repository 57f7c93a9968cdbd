// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use fsa_chat::{
    api::{start_server, AppState},
    config::ServiceConfig,
    speech::{SpeechClient, SpeechSynthesizer, SpeechTranscriber},
    version,
    vision::VisionModelManager,
};
use std::{env, path::PathBuf, sync::Arc};
use tokio::signal;
use tracing::{info, warn};

/// FSA diagram question-answering service
#[derive(Parser, Debug)]
#[command(name = "fsa-chat")]
#[command(version)]
#[command(about = "Upload an FSA diagram, then ask questions about it", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(long, short, env = "FSA_CONFIG")]
    config: Option<PathBuf>,

    /// Listen host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Listen port (overrides config)
    #[arg(long)]
    port: Option<u16>,

    /// PaddleOCR model directory; "none" disables text recognition
    #[arg(long)]
    ocr_model_dir: Option<String>,

    /// Speech sidecar URL; "none" disables voice input and output
    #[arg(long)]
    speech_endpoint: Option<String>,
}

impl Args {
    fn apply(&self, config: &mut ServiceConfig) {
        config.apply_overrides(|key| match key {
            "FSA_HOST" => self.host.clone(),
            "FSA_PORT" => self.port.map(|p| p.to_string()),
            "OCR_MODEL_DIR" => self.ocr_model_dir.clone(),
            "SPEECH_ENDPOINT" => self.speech_endpoint.clone(),
            _ => None,
        });
    }
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    println!("\n⏹️  Shutting down...");
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    println!("🚀 Starting {}...\n", version::get_version_string());
    println!("📦 BUILD VERSION: {}", version::VERSION);
    println!("📅 Build Date: {}", version::BUILD_DATE);
    println!();

    let mut config = ServiceConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    println!("🧠 Loading vision models...");
    let vision = VisionModelManager::new(&config.vision);
    if vision.has_ocr() {
        println!("✅ Text recognition enabled");
    } else {
        println!("⚠️  Text recognition disabled, states will get positional names");
    }

    let mut state = AppState::new(vision.extractor(), &config.server, config.vision.builder.clone())
        .with_vision_models(vision.list_models());

    match config.speech.endpoint.as_deref() {
        Some(endpoint) => {
            let client = Arc::new(
                SpeechClient::new(endpoint, &config.speech)
                    .context("Failed to create speech client")?,
            );
            if client.health_check().await {
                println!("✅ Speech sidecar reachable at {}", client.endpoint());
            } else {
                warn!("Speech sidecar at {} is not responding yet", client.endpoint());
            }
            state = state
                .with_transcriber(client.clone() as Arc<dyn SpeechTranscriber>)
                .with_synthesizer(client as Arc<dyn SpeechSynthesizer>);
        }
        None => info!("No speech endpoint configured, voice input and output disabled"),
    }

    println!("🌐 Listening on {}", config.listen_addr());
    start_server(&config.server, state, shutdown_signal()).await?;

    println!("👋 Goodbye!");
    Ok(())
}
