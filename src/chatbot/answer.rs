// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Answer rendering against a transition table

use super::intent::{classify, normalize, FsaConcept, Intent};
use crate::fsa::TransitionTable;

pub const NO_QUESTION: &str = "No question detected.";

pub const FALLBACK_ANSWER: &str = "Sorry, I don't understand that question. \
     Please ask about the FSA states, transitions, or basic concepts.";

pub const INCOMPLETE_SYMBOL_QUERY: &str =
    "Please specify both the source and destination states in your question.";

fn concept_text(concept: FsaConcept) -> &'static str {
    match concept {
        FsaConcept::Automaton => {
            "A Finite State Automaton (FSA) is a mathematical model of computation used to \
             design both computer programs and sequential logic circuits. It consists of a \
             finite number of states, transitions between these states, and actions."
        }
        FsaConcept::State => {
            "A state is a condition or situation of the FSA at a given time. It represents \
             a specific configuration of the system."
        }
        FsaConcept::Transition => {
            "A transition is a change from one state to another in response to an input symbol."
        }
        FsaConcept::InputSymbol => {
            "An input symbol is a character or token that triggers a transition between states \
             in an FSA."
        }
    }
}

/// Find the state a question refers to
///
/// Names match after normalization. A bare number `n` also matches the one
/// state named `<letters>n` (e.g. `1` → `q1`) when exactly one such state
/// exists.
pub fn resolve_state<'a>(table: &'a TransitionTable, reference: &str) -> Option<&'a str> {
    let reference = normalize(reference);
    if reference.is_empty() {
        return None;
    }

    if let Some(state) = table.states().iter().find(|s| normalize(s) == reference) {
        return Some(state.as_str());
    }

    if !reference.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let mut candidates = table.states().iter().filter(|state| {
        let name = normalize(state);
        match name.strip_suffix(reference.as_str()) {
            Some(prefix) => {
                !prefix.is_empty() && !prefix.chars().any(|c| c.is_ascii_digit())
            }
            None => false,
        }
    });
    match (candidates.next(), candidates.next()) {
        (Some(state), None) => Some(state.as_str()),
        _ => None,
    }
}

fn join_quoted(items: &[&str]) -> String {
    items
        .iter()
        .map(|s| format!("'{}'", s))
        .collect::<Vec<_>>()
        .join(", ")
}

fn symbol_answer(table: &TransitionTable, from: &str, to: &str) -> String {
    let Some(source) = resolve_state(table, from) else {
        return format!("There is no state named '{}' in the FSA.", from);
    };
    let Some(destination) = resolve_state(table, to) else {
        return format!("There is no state named '{}' in the FSA.", to);
    };

    let symbols = table.symbols_between(source, destination);
    match symbols.as_slice() {
        [] => format!("No transition found from {} to {}.", source, destination),
        [symbol] => format!(
            "The input symbol for the transition from {} to {} is '{}'.",
            source, destination, symbol
        ),
        many => format!(
            "The input symbols for the transitions from {} to {} are: {}.",
            source,
            destination,
            join_quoted(many)
        ),
    }
}

/// Render the answer for an already classified intent
pub fn answer_intent(table: &TransitionTable, intent: &Intent) -> String {
    match intent {
        Intent::Empty => NO_QUESTION.to_string(),
        Intent::Concept(concept) => concept_text(*concept).to_string(),
        Intent::SymbolBetween { from, to } => symbol_answer(table, from, to),
        Intent::IncompleteSymbolQuery => INCOMPLETE_SYMBOL_QUERY.to_string(),
        Intent::InitialState => match table.initial_state() {
            Some(state) => format!("The initial state is {}.", state),
            None => "No initial state detected.".to_string(),
        },
        Intent::FinalStates => match table.final_states() {
            [] => "No final state detected.".to_string(),
            [state] => format!("The final state is {}.", state),
            many => format!("The final states are: {}.", many.join(", ")),
        },
        Intent::ListTransitions => {
            if table.transitions().is_empty() {
                "The FSA has no transitions.".to_string()
            } else {
                let rendered: Vec<String> =
                    table.transitions().iter().map(|t| t.to_string()).collect();
                format!("The transitions in the FSA are: {}.", rendered.join(", "))
            }
        }
        Intent::Alphabet => {
            let alphabet = table.alphabet();
            if alphabet.is_empty() {
                "The FSA has no input symbols.".to_string()
            } else {
                format!("The input symbols are: {}.", alphabet.join(", "))
            }
        }
        Intent::ListStates => {
            if table.states().is_empty() {
                "The FSA has no states.".to_string()
            } else {
                format!("The states in the FSA are: {}.", table.states().join(", "))
            }
        }
        Intent::Unrecognized => FALLBACK_ANSWER.to_string(),
    }
}

/// Answer a free-text question about `table`
pub fn answer_question(table: &TransitionTable, question: &str) -> String {
    answer_intent(table, &classify(question))
}
