// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Transition table extracted from an FSA diagram

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Violations of the transition table invariants
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("State name must not be empty")]
    EmptyStateName,

    #[error("Duplicate state '{0}'")]
    DuplicateState(String),

    #[error("Initial state '{0}' is not a known state")]
    UnknownInitialState(String),

    #[error("Final state '{0}' is not a known state")]
    UnknownFinalState(String),

    #[error("Transition {transition} references unknown state '{missing}'")]
    UnknownEndpoint {
        transition: Transition,
        missing: String,
    },

    #[error("Duplicate transition {0}")]
    DuplicateTransition(Transition),
}

/// A single labelled edge of the automaton
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    pub source: String,
    pub symbol: String,
    pub destination: String,
}

impl Transition {
    pub fn new(
        source: impl Into<String>,
        symbol: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            symbol: symbol.into(),
            destination: destination.into(),
        }
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.source, self.symbol, self.destination)
    }
}

/// Wire shape of a table, validated into [`TransitionTable`] on deserialization
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTable {
    states: Vec<String>,
    #[serde(default)]
    initial_state: Option<String>,
    #[serde(default)]
    final_states: Vec<String>,
    #[serde(default)]
    transitions: Vec<Transition>,
}

impl TryFrom<RawTable> for TransitionTable {
    type Error = TableError;

    fn try_from(raw: RawTable) -> Result<Self, Self::Error> {
        TransitionTable::new(
            raw.states,
            raw.initial_state,
            raw.final_states,
            raw.transitions,
        )
    }
}

/// States, initial state, final states and transitions of one diagram
///
/// Only constructible through [`TransitionTable::new`] (or deserialization,
/// which goes through it), so every value upholds:
/// - state names are unique and non-empty
/// - the initial state, final states and all transition endpoints are states
/// - no transition appears twice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawTable")]
pub struct TransitionTable {
    states: Vec<String>,
    initial_state: Option<String>,
    final_states: Vec<String>,
    transitions: Vec<Transition>,
}

impl TransitionTable {
    pub fn new(
        states: Vec<String>,
        initial_state: Option<String>,
        final_states: Vec<String>,
        transitions: Vec<Transition>,
    ) -> Result<Self, TableError> {
        let mut known = HashSet::new();
        for state in &states {
            if state.trim().is_empty() {
                return Err(TableError::EmptyStateName);
            }
            if !known.insert(state.as_str()) {
                return Err(TableError::DuplicateState(state.clone()));
            }
        }

        if let Some(ref initial) = initial_state {
            if !known.contains(initial.as_str()) {
                return Err(TableError::UnknownInitialState(initial.clone()));
            }
        }

        let mut finals = Vec::with_capacity(final_states.len());
        for state in final_states {
            if !known.contains(state.as_str()) {
                return Err(TableError::UnknownFinalState(state));
            }
            // Listing a final state twice is harmless, keep the first
            if !finals.contains(&state) {
                finals.push(state);
            }
        }

        let mut seen = HashSet::new();
        for transition in &transitions {
            for endpoint in [&transition.source, &transition.destination] {
                if !known.contains(endpoint.as_str()) {
                    return Err(TableError::UnknownEndpoint {
                        transition: transition.clone(),
                        missing: endpoint.clone(),
                    });
                }
            }
            if !seen.insert(transition) {
                return Err(TableError::DuplicateTransition(transition.clone()));
            }
        }

        Ok(Self {
            states,
            initial_state,
            final_states: finals,
            transitions,
        })
    }

    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn initial_state(&self) -> Option<&str> {
        self.initial_state.as_deref()
    }

    pub fn final_states(&self) -> &[String] {
        &self.final_states
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn has_state(&self, name: &str) -> bool {
        self.states.iter().any(|s| s == name)
    }

    pub fn is_final(&self, name: &str) -> bool {
        self.final_states.iter().any(|s| s == name)
    }

    /// Symbols on every transition from `source` to `destination`, in table order
    pub fn symbols_between(&self, source: &str, destination: &str) -> Vec<&str> {
        self.transitions
            .iter()
            .filter(|t| t.source == source && t.destination == destination)
            .map(|t| t.symbol.as_str())
            .collect()
    }

    /// Distinct input symbols in order of first appearance
    pub fn alphabet(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = Vec::new();
        for transition in &self.transitions {
            if !symbols.contains(&transition.symbol.as_str()) {
                symbols.push(&transition.symbol);
            }
        }
        symbols
    }
}
