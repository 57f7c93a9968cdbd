// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Diagram → extraction → transition table

use fsa_chat::fsa::{build_table, BuilderParams, TransitionTable, UNLABELED_SYMBOL};
use fsa_chat::vision::{
    Circle, DiagramExtractor, Extraction, ExtractionError, ImageExtractor, Point, Segment,
    SegmentEnd,
};
use std::sync::Arc;

use crate::common::{
    blank_diagram, png_bytes, token, two_state_diagram, two_state_extraction, two_state_table,
    two_state_tokens, FixedTokens,
};

fn assert_endpoints_are_states(table: &TransitionTable) {
    for t in table.transitions() {
        assert!(table.has_state(&t.source), "unknown source in {}", t);
        assert!(table.has_state(&t.destination), "unknown destination in {}", t);
    }
    if let Some(initial) = table.initial_state() {
        assert!(table.has_state(initial));
    }
    for f in table.final_states() {
        assert!(table.has_state(f));
    }
}

fn circle(x: f32, y: f32, double: bool) -> Circle {
    Circle {
        center: Point::new(x, y),
        radius: 40.0,
        double,
    }
}

fn stroke(from: (f32, f32), to: (f32, f32), head: Option<SegmentEnd>) -> Segment {
    Segment {
        start: Point::new(from.0, from.1),
        end: Point::new(to.0, to.1),
        head,
        pixel_count: 120,
    }
}

#[test]
fn test_rendered_diagram_round_trip() {
    let extractor =
        DiagramExtractor::default().with_recognizer(Arc::new(FixedTokens(two_state_tokens())));
    let extraction = extractor
        .extract_bytes(&png_bytes(&two_state_diagram()))
        .unwrap();

    let report = build_table(&extraction, &BuilderParams::default()).unwrap();
    assert_eq!(report.table, two_state_table());
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
}

#[test]
fn test_rendered_diagram_without_ocr_uses_positional_names() {
    let extraction = DiagramExtractor::default()
        .extract(&two_state_diagram())
        .unwrap();
    let report = build_table(&extraction, &BuilderParams::default()).unwrap();

    assert_eq!(report.table.states(), ["q0", "q1"]);
    assert_eq!(report.table.initial_state(), Some("q0"));
    assert_eq!(report.table.final_states(), ["q1"]);
    assert_eq!(report.table.symbols_between("q0", "q1"), vec![UNLABELED_SYMBOL]);
    assert!(report
        .warnings
        .iter()
        .any(|w| w.contains("No label found for the transition from q0 to q1")));
}

#[test]
fn test_blank_image_has_no_states() {
    let err = DiagramExtractor::default()
        .extract(&blank_diagram())
        .and_then(|e| build_table(&e, &BuilderParams::default()))
        .unwrap_err();
    assert!(matches!(err, ExtractionError::NoStatesDetected));
}

#[test]
fn test_geometric_extraction_matches_rendered_one() {
    let report = build_table(&two_state_extraction(), &BuilderParams::default()).unwrap();
    assert_eq!(report.table, two_state_table());
}

#[test]
fn test_three_state_chain_with_back_edge() {
    // start -> (A) -a-> (B) -b-> ((C)), and C -c-> B drawn with the head at the left end
    let extraction = Extraction {
        width: 600,
        height: 300,
        tokens: vec![
            token("A", 100, 150),
            token("B", 260, 150),
            token("C", 420, 150),
            token("a", 180, 135),
            token("b", 340, 135),
            token("c", 340, 200),
        ],
        circles: vec![
            circle(100.0, 150.0, false),
            circle(260.0, 150.0, false),
            circle(420.0, 150.0, true),
        ],
        segments: vec![
            stroke((10.0, 150.0), (58.0, 150.0), Some(SegmentEnd::End)),
            stroke((142.0, 150.0), (218.0, 150.0), Some(SegmentEnd::End)),
            stroke((302.0, 150.0), (378.0, 150.0), Some(SegmentEnd::End)),
            stroke((290.0, 180.0), (390.0, 180.0), Some(SegmentEnd::Start)),
        ],
    };

    let report = build_table(&extraction, &BuilderParams::default()).unwrap();
    let table = &report.table;
    assert_endpoints_are_states(table);
    assert_eq!(table.states(), ["A", "B", "C"]);
    assert_eq!(table.initial_state(), Some("A"));
    assert_eq!(table.final_states(), ["C"]);
    assert_eq!(table.symbols_between("A", "B"), vec!["a"]);
    assert_eq!(table.symbols_between("B", "C"), vec!["b"]);
    assert_eq!(table.symbols_between("C", "B"), vec!["c"]);
    // Ordered by source position, then destination
    let rendered: Vec<String> = table.transitions().iter().map(|t| t.to_string()).collect();
    assert_eq!(rendered, ["(A, a, B)", "(B, b, C)", "(C, c, B)"]);
}

#[test]
fn test_endpoints_always_states_under_noise() {
    // Strokes touching nothing, strokes touching one state twice, stray tokens
    let mut extraction = two_state_extraction();
    extraction.segments.push(stroke((150.0, 20.0), (260.0, 20.0), None));
    extraction
        .segments
        .push(stroke((90.0, 92.0), (150.0, 92.0), None));
    extraction.tokens.push(token("zz", 400, 220));

    let report = build_table(&extraction, &BuilderParams::default()).unwrap();
    assert_endpoints_are_states(&report.table);
    assert_eq!(report.table.transitions().len(), 1);
}
