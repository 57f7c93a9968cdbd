// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Question endpoint handler

use axum::{extract::State, Json};
use tracing::{debug, info, warn};

use super::request::AskRequest;
use super::response::{AskResponse, AudioPayload};
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::chatbot::answer_question;
use crate::fsa::TransitionTable;

/// Answer for a voice question that transcribed to nothing
pub const NO_VOICE_QUESTION: &str = "No question detected. Please try again.";

/// Inline `fsaData` wins over the session's stored table
async fn resolve_table(
    state: &AppState,
    request: &AskRequest,
) -> Result<TransitionTable, ApiError> {
    if let Some(ref table) = request.fsa_data {
        return Ok(table.clone());
    }
    match request.session_uuid()? {
        Some(id) => state.sessions.get(&id).await.ok_or_else(|| {
            debug!("No table stored for session {}", id);
            ApiError::NoTable
        }),
        None => Err(ApiError::NoTable),
    }
}

async fn transcribe_question(state: &AppState, request: &AskRequest) -> Result<String, ApiError> {
    let transcriber = state.transcriber.as_ref().ok_or_else(|| {
        warn!("Voice input requested but no transcriber is configured");
        ApiError::SpeechUnavailable("voice input is not configured".to_string())
    })?;
    let audio = request.audio_bytes()?;

    let transcript = transcriber
        .transcribe(&audio, &request.audio_format)
        .await
        .map_err(|e| {
            warn!("Transcription failed: {}", e);
            ApiError::from(e)
        })?;
    debug!("Transcribed question: {:?}", transcript);
    Ok(transcript)
}

/// POST /ask - Answer a question about the uploaded diagram
///
/// # Request
/// - `question`: typed question
/// - `sessionId`: session from /process_image
/// - `fsaData`: inline table, used instead of the session's
/// - `voiceInput` + `audio` (base64) + `audioFormat`: spoken question
/// - `speak`: also return the answer as audio
///
/// # Response
/// - `response`: answer text
/// - `question`: the question that was answered
/// - `audio`: `{data, contentType}` when `speak` was set
///
/// # Errors
/// - 400: no table for the request, malformed audio or sessionId
/// - 502/503: speech sidecar failed or is not configured
pub async fn ask_handler(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let table = resolve_table(&state, &request).await?;

    let question = if request.voice_input {
        transcribe_question(&state, &request).await?
    } else {
        request.question.clone().unwrap_or_default()
    };

    let response = if request.voice_input && question.trim().is_empty() {
        NO_VOICE_QUESTION.to_string()
    } else {
        answer_question(&table, &question)
    };
    info!("Q: {:?} -> A: {:?}", question, response);

    let audio = if request.speak {
        let synthesizer = state.synthesizer.as_ref().ok_or_else(|| {
            warn!("Spoken answer requested but no synthesizer is configured");
            ApiError::SpeechUnavailable("speech output is not configured".to_string())
        })?;
        let audio = synthesizer.synthesize(&response).await.map_err(|e| {
            warn!("Speech synthesis failed: {}", e);
            ApiError::from(e)
        })?;
        Some(AudioPayload::from(audio))
    } else {
        None
    };

    Ok(Json(AskResponse {
        response,
        question,
        audio,
    }))
}
