// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload response types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fsa::TransitionTable;
use crate::vision::Extraction;

/// Counts of what was found in the image and what made it into the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub states: usize,
    pub transitions: usize,
    pub circles: usize,
    pub segments: usize,
    pub tokens: usize,
}

impl ExtractionStats {
    pub fn new(extraction: &Extraction, table: &TransitionTable) -> Self {
        Self {
            states: table.states().len(),
            transitions: table.transitions().len(),
            circles: extraction.circles.len(),
            segments: extraction.segments.len(),
            tokens: extraction.tokens.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessImageResponse {
    pub success: bool,
    /// Pass back to /ask (or the next upload) to address this table
    pub session_id: Uuid,
    pub fsa_data: TransitionTable,
    pub warnings: Vec<String>,
    pub stats: ExtractionStats,
    pub processing_time_ms: u64,
}
