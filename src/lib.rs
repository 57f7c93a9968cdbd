// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod chatbot;
pub mod config;
pub mod fsa;
pub mod speech;
pub mod version;
pub mod vision;

pub use chatbot::{answer_question, Intent};
pub use config::ServiceConfig;
pub use fsa::{build_table, BuildReport, Transition, TransitionTable};
pub use vision::{DiagramExtractor, Extraction, ExtractionError, ImageExtractor};
