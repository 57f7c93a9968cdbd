// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Question answering over transition tables

use fsa_chat::chatbot::{answer_question, classify, Intent, FALLBACK_ANSWER, NO_QUESTION};
use fsa_chat::fsa::{Transition, TransitionTable};

use crate::common::two_state_table;

fn chain_table() -> TransitionTable {
    TransitionTable::new(
        vec!["q0".into(), "q1".into(), "q2".into()],
        Some("q0".into()),
        vec!["q2".into()],
        vec![
            Transition::new("q0", "a", "q1"),
            Transition::new("q1", "b", "q2"),
            Transition::new("q2", "a", "q2"),
        ],
    )
    .unwrap()
}

#[test]
fn test_two_state_round_trip() {
    let table = two_state_table();

    let json = serde_json::to_value(&table).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "states": ["q0", "q1"],
            "initialState": "q0",
            "finalStates": ["q1"],
            "transitions": [{ "source": "q0", "symbol": "a", "destination": "q1" }]
        })
    );
    let back: TransitionTable = serde_json::from_value(json).unwrap();
    assert_eq!(back, table);

    assert_eq!(
        answer_question(&back, "What are the states?"),
        "The states in the FSA are: q0, q1."
    );
    assert_eq!(answer_question(&back, "What is the initial state?"), "The initial state is q0.");
    assert_eq!(answer_question(&back, "Which is the final state?"), "The final state is q1.");
    assert_eq!(
        answer_question(&back, "What are the transitions?"),
        "The transitions in the FSA are: (q0, a, q1)."
    );
    assert_eq!(
        answer_question(&back, "What is the input symbol for the transition from q0 to q1?"),
        "The input symbol for the transition from q0 to q1 is 'a'."
    );
}

#[test]
fn test_state_listing_phrasings_agree() {
    let table = chain_table();
    let expected = "The states in the FSA are: q0, q1, q2.";
    for question in [
        "What are the states?",
        "what are the states",
        "WHAT ARE THE STATES???",
        "List the states.",
        "Which states does the FSA have?",
        "states",
        "  show   me all states ",
    ] {
        assert_eq!(classify(question), Intent::ListStates, "{}", question);
        assert_eq!(answer_question(&table, question), expected, "{}", question);
    }
}

#[test]
fn test_no_direct_transition() {
    let table = chain_table();
    assert_eq!(
        answer_question(&table, "What is the input symbol from q0 to q2?"),
        "No transition found from q0 to q2."
    );
    assert_eq!(
        answer_question(&table, "what symbol is on the transition between q1 and q0"),
        "No transition found from q1 to q0."
    );
}

#[test]
fn test_self_loop_symbol() {
    let table = chain_table();
    assert_eq!(
        answer_question(&table, "input symbol from q2 to q2"),
        "The input symbol for the transition from q2 to q2 is 'a'."
    );
}

#[test]
fn test_alphabet_is_distinct() {
    assert_eq!(
        answer_question(&chain_table(), "What is the alphabet?"),
        "The input symbols are: a, b."
    );
}

#[test]
fn test_empty_and_unknown_questions() {
    let table = chain_table();
    assert_eq!(answer_question(&table, "   "), NO_QUESTION);
    assert_eq!(answer_question(&table, "?!"), NO_QUESTION);
    assert_eq!(answer_question(&table, "how tall is mount everest"), FALLBACK_ANSWER);
}
