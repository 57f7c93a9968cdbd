// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /process_image: multipart upload → transition table stored per session

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use fsa_chat::api::{create_router, AppState};
use fsa_chat::config::ServerConfig;
use fsa_chat::fsa::BuilderParams;
use fsa_chat::vision::{DiagramExtractor, ExtractionError};
use std::sync::Arc;
use tower::util::ServiceExt;

use crate::common::{
    blank_diagram, body_json, json_request, multipart_body, png_bytes, two_state_diagram,
    two_state_extraction, two_state_table, two_state_tokens, upload_request, FixedTokens, FormPart,
    MockExtractor, BOUNDARY,
};

fn state_with_ocr() -> AppState {
    let extractor =
        DiagramExtractor::default().with_recognizer(Arc::new(FixedTokens(two_state_tokens())));
    AppState::new_for_test().with_extractor(Arc::new(extractor))
}

#[tokio::test]
async fn test_upload_builds_table_from_rendered_diagram() {
    let app = create_router(state_with_ocr());
    let png = png_bytes(&two_state_diagram());

    let response = app
        .oneshot(upload_request(&[FormPart::File {
            filename: "fsa.png",
            bytes: &png,
        }]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["fsaData"], serde_json::to_value(two_state_table()).unwrap());
    assert_eq!(body["stats"]["circles"], 2);
    assert_eq!(body["stats"]["transitions"], 1);
    assert!(body["sessionId"].as_str().unwrap().len() == 36);
}

#[tokio::test]
async fn test_uploaded_table_answers_questions_in_same_session() {
    let state = AppState::new_for_test().with_extractor(Arc::new({
        let mut mock = MockExtractor::new();
        mock.expect_extract_bytes()
            .times(1)
            .returning(|_| Ok(two_state_extraction()));
        mock
    }));
    let app = create_router(state);

    let response = app
        .clone()
        .oneshot(upload_request(&[FormPart::File {
            filename: "diagram.JPG",
            bytes: b"bytes are the mock's concern",
        }]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let session_id = body_json(response).await["sessionId"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .oneshot(json_request(
            "/ask",
            serde_json::json!({
                "sessionId": session_id,
                "question": "What is the input symbol for the transition from q0 to q1?"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["response"],
        "The input symbol for the transition from q0 to q1 is 'a'."
    );
}

#[tokio::test]
async fn test_missing_file() {
    let app = create_router(AppState::new_for_test());
    let response = app
        .oneshot(upload_request(&[FormPart::Text {
            name: "note",
            value: "forgot the file",
        }]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No file uploaded");
}

#[tokio::test]
async fn test_empty_filename() {
    let app = create_router(AppState::new_for_test());
    let response = app
        .oneshot(upload_request(&[FormPart::File {
            filename: "",
            bytes: b"",
        }]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No file selected");
}

#[tokio::test]
async fn test_disallowed_extension_never_reaches_extractor() {
    let mut mock = MockExtractor::new();
    mock.expect_extract_bytes().never();
    let app = create_router(AppState::new_for_test().with_extractor(Arc::new(mock)));

    let response = app
        .oneshot(upload_request(&[FormPart::File {
            filename: "fsa.gif",
            bytes: b"GIF89a",
        }]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid file type. Only PNG and JPG are allowed.");
    assert_eq!(body["errorType"], "invalid_file_type");
}

#[tokio::test]
async fn test_failed_upload_discards_previous_table() {
    let state = state_with_ocr();
    let app = create_router(state.clone());
    let session_id = uuid::Uuid::new_v4().to_string();

    let good = png_bytes(&two_state_diagram());
    let response = app
        .clone()
        .oneshot(upload_request(&[
            FormPart::Text {
                name: "sessionId",
                value: &session_id,
            },
            FormPart::File {
                filename: "fsa.png",
                bytes: &good,
            },
        ]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["sessionId"], session_id.as_str());
    assert_eq!(state.sessions.len().await, 1);

    let blank = png_bytes(&blank_diagram());
    let response = app
        .clone()
        .oneshot(upload_request(&[
            FormPart::File {
                filename: "fsa.png",
                bytes: &blank,
            },
            FormPart::Text {
                name: "sessionId",
                value: &session_id,
            },
        ]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await["error"],
        "No states detected in the image. Please upload a clearer FSA diagram."
    );
    assert_eq!(state.sessions.len().await, 0);

    let response = app
        .oneshot(json_request(
            "/ask",
            serde_json::json!({ "sessionId": session_id, "question": "What are the states?" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Please upload an FSA image first.");
}

#[tokio::test]
async fn test_recognition_failure_is_internal_error() {
    let mut mock = MockExtractor::new();
    mock.expect_extract_bytes()
        .returning(|_| Err(ExtractionError::Recognition("model crashed".to_string())));
    let app = create_router(AppState::new_for_test().with_extractor(Arc::new(mock)));

    let response = app
        .oneshot(upload_request(&[FormPart::File {
            filename: "fsa.png",
            bytes: b"\x89PNG",
        }]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_invalid_session_id() {
    let app = create_router(AppState::new_for_test());
    let png = png_bytes(&two_state_diagram());
    let response = app
        .oneshot(upload_request(&[
            FormPart::Text {
                name: "sessionId",
                value: "session-1",
            },
            FormPart::File {
                filename: "fsa.png",
                bytes: &png,
            },
        ]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// 1 KiB upload limit with an extractor that must not be called
fn small_limit_state() -> AppState {
    let config = ServerConfig {
        max_upload_bytes: 1024,
        ..ServerConfig::default()
    };
    let mut mock = MockExtractor::new();
    mock.expect_extract_bytes().never();
    AppState::new(Arc::new(mock), &config, BuilderParams::default())
}

#[tokio::test]
async fn test_file_over_upload_limit() {
    let app = create_router(small_limit_state());
    let bytes = vec![0x89; 4096];

    let response = app
        .oneshot(upload_request(&[FormPart::File {
            filename: "fsa.png",
            bytes: &bytes,
        }]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let body = body_json(response).await;
    assert_eq!(body["errorType"], "payload_too_large");
    assert_eq!(body["details"]["size"], 4096);
    assert_eq!(body["details"]["max"], 1024);
}

#[tokio::test]
async fn test_body_over_router_limit_is_payload_too_large() {
    let app = create_router(small_limit_state());
    let bytes = vec![0x89; 512 * 1024];
    let body = multipart_body(&[FormPart::File {
        filename: "fsa.png",
        bytes: &bytes,
    }]);
    let declared = body.len();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/process_image")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header(header::CONTENT_LENGTH, declared)
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let body = body_json(response).await;
    assert_eq!(body["errorType"], "payload_too_large");
    assert_eq!(body["details"]["size"], declared);
    assert_eq!(body["details"]["max"], 1024);
}
