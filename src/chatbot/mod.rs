// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Template question answering over an extracted transition table
//!
//! Answers are a pure function of the table and the question text.

pub mod answer;
pub mod intent;

pub use answer::{answer_intent, answer_question, resolve_state, FALLBACK_ANSWER, NO_QUESTION};
pub use intent::{classify, normalize, FsaConcept, Intent};
