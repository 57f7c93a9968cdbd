// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// tests/common/mod.rs - Shared fixtures: synthetic diagrams, extractions, multipart bodies
#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use fsa_chat::fsa::{Transition, TransitionTable};
use fsa_chat::speech::{SpeechError, SpeechSynthesizer, SpeechTranscriber, SynthesizedAudio};
use fsa_chat::vision::{
    BoundingBox, Circle, Extraction, ExtractionError, ImageExtractor, Point, Segment, SegmentEnd,
    TextRecognizer, TextToken,
};
use image::DynamicImage;
use mockall::mock;
use std::io::Cursor;

#[path = "../../src/vision/shapes/test_support.rs"]
mod drawing;

pub use drawing::*;

pub const BOUNDARY: &str = "fsa-chat-test-boundary";

pub fn blank_diagram() -> DynamicImage {
    DynamicImage::ImageLuma8(canvas(200, 120))
}

pub fn png_bytes(image: &DynamicImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

pub fn token(text: &str, cx: u32, cy: u32) -> TextToken {
    TextToken {
        text: text.to_string(),
        confidence: 0.95,
        bounding_box: BoundingBox {
            x: cx - 5,
            y: cy - 6,
            width: 10,
            height: 12,
        },
    }
}

/// Tokens an OCR model would read from `two_state_diagram`
pub fn two_state_tokens() -> Vec<TextToken> {
    vec![token("q0", 120, 120), token("q1", 300, 120), token("a", 210, 104)]
}

/// Geometry of `two_state_diagram` as the extractor reports it
pub fn two_state_extraction() -> Extraction {
    let segment = |from: (f32, f32), to: (f32, f32)| Segment {
        start: Point::new(from.0, from.1),
        end: Point::new(to.0, to.1),
        head: Some(SegmentEnd::End),
        pixel_count: 150,
    };
    Extraction {
        width: 420,
        height: 240,
        tokens: two_state_tokens(),
        circles: vec![
            Circle {
                center: Point::new(120.0, 120.0),
                radius: 40.0,
                double: false,
            },
            Circle {
                center: Point::new(300.0, 120.0),
                radius: 40.0,
                double: true,
            },
        ],
        segments: vec![
            segment((20.0, 120.0), (78.0, 120.0)),
            segment((162.0, 120.0), (258.0, 120.0)),
        ],
    }
}

/// {q0, q1; initial q0; final q1; (q0, a, q1)}
pub fn two_state_table() -> TransitionTable {
    TransitionTable::new(
        vec!["q0".into(), "q1".into()],
        Some("q0".into()),
        vec!["q1".into()],
        vec![Transition::new("q0", "a", "q1")],
    )
    .unwrap()
}

/// Recognizer that always reads the same tokens
pub struct FixedTokens(pub Vec<TextToken>);

impl TextRecognizer for FixedTokens {
    fn recognize(&self, _image: &DynamicImage) -> Result<Vec<TextToken>, ExtractionError> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

mock! {
    pub Extractor {}
    impl ImageExtractor for Extractor {
        fn extract(&self, image: &DynamicImage) -> Result<Extraction, ExtractionError>;
        fn extract_bytes(&self, bytes: &[u8]) -> Result<Extraction, ExtractionError>;
        fn has_text_recognition(&self) -> bool;
    }
}

mock! {
    pub Transcriber {}
    #[async_trait]
    impl SpeechTranscriber for Transcriber {
        async fn transcribe(&self, audio: &[u8], format: &str) -> Result<String, SpeechError>;
    }
}

mock! {
    pub Synthesizer {}
    #[async_trait]
    impl SpeechSynthesizer for Synthesizer {
        async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, SpeechError>;
    }
}

/// One part of a multipart form
pub enum FormPart<'a> {
    File { filename: &'a str, bytes: &'a [u8] },
    Text { name: &'a str, value: &'a str },
}

pub fn multipart_body(parts: &[FormPart]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            FormPart::File { filename, bytes } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
            FormPart::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}", name, value)
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn upload_request(parts: &[FormPart]) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/process_image")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
