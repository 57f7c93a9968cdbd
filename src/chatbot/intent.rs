// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Question normalization and keyword-based intent classification

use regex::Regex;
use std::sync::OnceLock;

/// Conceptual questions with fixed explanations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsaConcept {
    Automaton,
    State,
    Transition,
    InputSymbol,
}

/// What a question asks about the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Empty,
    Concept(FsaConcept),
    /// State references exactly as typed (normalized)
    SymbolBetween {
        from: String,
        to: String,
    },
    /// Asked for a transition symbol without naming both states
    IncompleteSymbolQuery,
    InitialState,
    FinalStates,
    ListTransitions,
    Alphabet,
    ListStates,
    Unrecognized,
}

const CONCEPT_PHRASES: &[(&str, FsaConcept)] = &[
    ("what is a finite state automat", FsaConcept::Automaton),
    ("what is the finite state automat", FsaConcept::Automaton),
    ("what is a finite automat", FsaConcept::Automaton),
    ("what is an fsa", FsaConcept::Automaton),
    ("what is a fsa", FsaConcept::Automaton),
    ("what is an input symbol", FsaConcept::InputSymbol),
    ("what are input symbols", FsaConcept::InputSymbol),
    ("what is a transition", FsaConcept::Transition),
    ("what is a state", FsaConcept::State),
];

const SYMBOL_WORDS: &[&str] = &[
    "symbol",
    "symbols",
    "input",
    "inputs",
    "label",
    "labels",
    "letter",
    "character",
    "transition",
    "transitions",
];

/// Lowercase, punctuation to spaces, whitespace collapsed
///
/// Underscores survive so suffixed state names like `s_2` stay intact.
pub fn normalize(question: &str) -> String {
    question
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn from_to_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\bfrom (?:state )?(\S+) (?:to|into) (?:state )?(\S+)")
            .expect("from/to pattern is valid")
    })
}

fn between_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\bbetween (?:state )?(\S+) and (?:state )?(\S+)")
            .expect("between pattern is valid")
    })
}

struct Words<'a> {
    padded: String,
    normalized: &'a str,
}

impl<'a> Words<'a> {
    fn new(normalized: &'a str) -> Self {
        Self {
            padded: format!(" {} ", normalized),
            normalized,
        }
    }

    fn has(&self, word: &str) -> bool {
        self.padded.contains(&format!(" {} ", word))
    }

    fn has_any(&self, words: &[&str]) -> bool {
        words.iter().any(|w| self.has(w))
    }

    fn has_phrase(&self, phrase: &str) -> bool {
        self.normalized.contains(phrase)
    }
}

fn state_pair(normalized: &str) -> Option<(String, String)> {
    from_to_pattern()
        .captures(normalized)
        .or_else(|| between_pattern().captures(normalized))
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
}

/// Classify a raw question
///
/// Checks run in a fixed order; the first match wins.
pub fn classify(question: &str) -> Intent {
    let normalized = normalize(question);
    if normalized.is_empty() {
        return Intent::Empty;
    }
    let words = Words::new(&normalized);
    let directional = words.has_any(&["from", "between"])
        || words.has_phrase("symbol for")
        || words.has_phrase("label for")
        || words.has_phrase("input for");

    if !directional {
        if let Some((_, concept)) = CONCEPT_PHRASES
            .iter()
            .find(|(phrase, _)| words.has_phrase(phrase))
        {
            return Intent::Concept(*concept);
        }
    }

    if directional && words.has_any(SYMBOL_WORDS) {
        return match state_pair(&normalized) {
            Some((from, to)) => Intent::SymbolBetween { from, to },
            None => Intent::IncompleteSymbolQuery,
        };
    }

    if words.has_any(&["initial", "start", "starting"]) {
        Intent::InitialState
    } else if words.has_any(&["final", "accepting", "accept"]) {
        Intent::FinalStates
    } else if words.has_any(&["transition", "transitions"]) {
        Intent::ListTransitions
    } else if words.has("alphabet") || words.has_any(&["symbols", "inputs"]) {
        Intent::Alphabet
    } else if words.has("states") {
        Intent::ListStates
    } else {
        Intent::Unrecognized
    }
}
