// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /speak: text → audio bytes

use axum::http::StatusCode;
use fsa_chat::api::{create_router, AppState};
use fsa_chat::speech::{SpeechError, SynthesizedAudio};
use std::sync::Arc;
use tower::util::ServiceExt;

use crate::common::{body_bytes, body_json, json_request, MockSynthesizer};

#[tokio::test]
async fn test_speak_returns_audio() {
    let mut synthesizer = MockSynthesizer::new();
    synthesizer
        .expect_synthesize()
        .withf(|text| text.to_string() == "The states in the FSA are: q0, q1.")
        .returning(|_| {
            Ok(SynthesizedAudio {
                bytes: vec![0xFF, 0xFB],
                content_type: "audio/mpeg".to_string(),
            })
        });
    let app = create_router(AppState::new_for_test().with_synthesizer(Arc::new(synthesizer)));

    let response = app
        .oneshot(json_request(
            "/speak",
            serde_json::json!({ "text": " The states in the FSA are: q0, q1. " }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "audio/mpeg");
    assert_eq!(body_bytes(response).await, vec![0xFF, 0xFB]);
}

#[tokio::test]
async fn test_speak_without_synthesizer() {
    let app = create_router(AppState::new_for_test());
    let response = app
        .oneshot(json_request("/speak", serde_json::json!({ "text": "hello" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_speak_empty_text() {
    let app = create_router(AppState::new_for_test());
    let response = app
        .oneshot(json_request("/speak", serde_json::json!({ "text": "  " })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["errorType"], "invalid_request");
}

#[tokio::test]
async fn test_speak_sidecar_error() {
    let mut synthesizer = MockSynthesizer::new();
    synthesizer.expect_synthesize().returning(|_| {
        Err(SpeechError::Service {
            status: 500,
            message: "model not loaded".to_string(),
        })
    });
    let app = create_router(AppState::new_for_test().with_synthesizer(Arc::new(synthesizer)));

    let response = app
        .oneshot(json_request("/speak", serde_json::json!({ "text": "hello" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
