// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::{DefaultBodyLimit, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::ask::ask_handler;
use super::session_store::SessionStore;
use super::speak::speak_handler;
use super::upload::process_image_handler;
use crate::config::ServerConfig;
use crate::fsa::BuilderParams;
use crate::speech::{SpeechSynthesizer, SpeechTranscriber};
use crate::vision::{DiagramExtractor, ImageExtractor, VisionModelInfo};
use crate::version;

/// Room for multipart framing and base64 inflation on top of the raw upload limit
fn body_limit(max_upload_bytes: usize) -> usize {
    max_upload_bytes / 3 * 4 + 64 * 1024
}

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<dyn ImageExtractor>,
    pub sessions: Arc<SessionStore>,
    pub transcriber: Option<Arc<dyn SpeechTranscriber>>,
    pub synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    pub builder_params: BuilderParams,
    pub vision_models: Arc<Vec<VisionModelInfo>>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        extractor: Arc<dyn ImageExtractor>,
        config: &ServerConfig,
        builder_params: BuilderParams,
    ) -> Self {
        Self {
            extractor,
            sessions: Arc::new(SessionStore::new(config.session_capacity)),
            transcriber: None,
            synthesizer: None,
            builder_params,
            vision_models: Arc::new(Vec::new()),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// Shape-only extractor, no speech, default limits
    pub fn new_for_test() -> Self {
        Self::new(
            Arc::new(DiagramExtractor::default()),
            &ServerConfig::default(),
            BuilderParams::default(),
        )
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn ImageExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_transcriber(mut self, transcriber: Arc<dyn SpeechTranscriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    pub fn with_vision_models(mut self, models: Vec<VisionModelInfo>) -> Self {
        self.vision_models = Arc::new(models);
        self
    }
}

pub fn create_router(state: AppState) -> Router {
    let limit = body_limit(state.max_upload_bytes);

    Router::new()
        .route("/", get(info_handler))
        .route("/health", get(health_handler))
        .route("/process_image", post(process_image_handler))
        .route("/ask", post(ask_handler))
        .route("/speak", post(speak_handler))
        .layer(DefaultBodyLimit::max(limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn start_server(
    config: &ServerConfig,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("FSA chat server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("FSA chat server stopped");
    Ok(())
}

async fn info_handler() -> Json<serde_json::Value> {
    Json(json!({
        "service": "fsa-chat",
        "version": version::get_version_info(),
        "endpoints": [
            "POST /process_image",
            "POST /ask",
            "POST /speak",
            "GET /health",
        ],
    }))
}

async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let sessions = state.sessions.len().await;
    Json(json!({
        "status": "ok",
        "version": version::VERSION_NUMBER,
        "textRecognition": state.extractor.has_text_recognition(),
        "visionModels": state.vision_models.as_slice(),
        "speech": {
            "transcription": state.transcriber.is_some(),
            "synthesis": state.synthesizer.is_some(),
        },
        "sessions": sessions,
    }))
}
