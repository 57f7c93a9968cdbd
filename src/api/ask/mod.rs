// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Question endpoint
//!
//! Provides POST /ask: a typed or spoken question about the session's table.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::ask_handler;
pub use request::AskRequest;
pub use response::{AskResponse, AudioPayload};
