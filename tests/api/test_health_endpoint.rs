// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! GET /health and GET /

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use fsa_chat::api::{create_router, AppState};
use fsa_chat::config::VisionConfig;
use fsa_chat::vision::VisionModelManager;
use tower::util::ServiceExt;

use crate::common::body_json;

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_health_reports_components() {
    let manager = VisionModelManager::new(&VisionConfig {
        ocr_model_dir: None,
        ..Default::default()
    });
    let state = AppState::new_for_test()
        .with_extractor(manager.extractor())
        .with_vision_models(manager.list_models());

    let response = create_router(state).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["textRecognition"], false);
    assert_eq!(body["speech"]["transcription"], false);
    assert_eq!(body["sessions"], 0);
    let models = body["visionModels"].as_array().unwrap();
    assert_eq!(models.len(), 2);
    assert_eq!(models[1]["name"], "paddleocr");
    assert_eq!(models[1]["available"], false);
}

#[tokio::test]
async fn test_service_info() {
    let response = create_router(AppState::new_for_test())
        .oneshot(get("/"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["service"], "fsa-chat");
    assert_eq!(body["version"]["version"], fsa_chat::version::VERSION_NUMBER);
}

#[tokio::test]
async fn test_unknown_route() {
    let response = create_router(AppState::new_for_test())
        .oneshot(get("/v1/models"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
