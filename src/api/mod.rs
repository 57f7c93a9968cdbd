// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP front end

pub mod ask;
pub mod errors;
pub mod http_server;
pub mod session_store;
pub mod speak;
pub mod upload;

pub use ask::{AskRequest, AskResponse, AudioPayload};
pub use errors::{ApiError, ErrorResponse, UPLOAD_FIRST};
pub use http_server::{create_router, start_server, AppState};
pub use session_store::SessionStore;
pub use speak::SpeakRequest;
pub use upload::{ExtractionStats, ProcessImageResponse};
