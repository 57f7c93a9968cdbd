// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Table builder: groups extracted tokens and shapes into a transition table
//!
//! Geometry rules:
//! - every circle is a state, a double circle is final
//! - a stroke with exactly one end on a state outline is the start arrow
//! - a stroke joining two different states is a transition, directed by
//!   its arrow head or left-to-right when no head was seen
//! - text inside a circle names the state, text near a transition's
//!   midpoint labels it

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

use super::table::{Transition, TransitionTable};
use crate::vision::extractor::ExtractionError;
use crate::vision::primitives::{Circle, Extraction, Point, Segment, SegmentEnd, TextToken};

/// Symbol used when no label could be matched to a transition
pub const UNLABELED_SYMBOL: &str = "?";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderParams {
    /// Max distance (px) between a stroke end and a state outline
    pub attach_tolerance: f32,
    /// Max distance (px) between a label and its transition's midpoint
    pub label_search_radius: f32,
}

impl Default for BuilderParams {
    fn default() -> Self {
        Self {
            attach_tolerance: 20.0,
            label_search_radius: 40.0,
        }
    }
}

/// A built table plus everything that looked doubtful on the way
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub table: TransitionTable,
    pub warnings: Vec<String>,
}

/// A transition between circle indices, before naming
#[derive(Debug, Clone, Copy)]
struct Edge {
    from: usize,
    to: usize,
    midpoint: Point,
}

fn attached_circle(circles: &[Circle], point: Point, tolerance: f32) -> Option<usize> {
    circles
        .iter()
        .enumerate()
        .map(|(i, c)| (i, c.boundary_distance(point)))
        .filter(|(_, d)| *d < tolerance)
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
}

fn edge_for(segment: &Segment, a: usize, b: usize) -> Edge {
    // `a` is attached at segment.start, `b` at segment.end
    let (from, to) = match segment.head {
        Some(SegmentEnd::Start) => (b, a),
        Some(SegmentEnd::End) | None => (a, b),
    };
    Edge {
        from,
        to,
        midpoint: segment.midpoint(),
    }
}

/// Reading order: top-to-bottom, then left-to-right
fn reading_order(a: &&TextToken, b: &&TextToken) -> std::cmp::Ordering {
    let (pa, pb) = (a.center(), b.center());
    pa.y.partial_cmp(&pb.y)
        .unwrap_or(std::cmp::Ordering::Equal)
        .then(pa.x.partial_cmp(&pb.x).unwrap_or(std::cmp::Ordering::Equal))
}

/// Build a transition table from one extraction
///
/// Fails only when no state was detected; everything else degrades into a
/// partial table with warnings.
pub fn build_table(
    extraction: &Extraction,
    params: &BuilderParams,
) -> Result<BuildReport, ExtractionError> {
    let circles = &extraction.circles;
    if circles.is_empty() {
        return Err(ExtractionError::NoStatesDetected);
    }
    let mut warnings = Vec::new();

    // Classify strokes
    let mut start_targets = Vec::new();
    let mut edges = Vec::new();
    for segment in &extraction.segments {
        let a = attached_circle(circles, segment.start, params.attach_tolerance);
        let b = attached_circle(circles, segment.end, params.attach_tolerance);
        match (a, b) {
            (Some(i), Some(j)) if i == j => {
                warnings
                    .push("Ignored a stroke that starts and ends on the same state".to_string());
            }
            (Some(i), Some(j)) => edges.push(edge_for(segment, i, j)),
            (Some(i), None) | (None, Some(i)) => start_targets.push(i),
            (None, None) => debug!("Stroke at {:?} touches no state", segment.midpoint()),
        }
    }

    let initial = start_targets.iter().copied().min_by(|&a, &b| {
        circles[a]
            .center
            .x
            .partial_cmp(&circles[b].center.x)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    if start_targets.len() > 1 {
        warnings.push(format!(
            "Found {} start arrows; using the leftmost",
            start_targets.len()
        ));
    }
    if initial.is_none() {
        warnings.push("No initial state arrow detected".to_string());
    }

    // State order: initial first, then left-to-right, finals last
    let mut order: Vec<usize> = (0..circles.len()).collect();
    order.sort_by(|&a, &b| {
        let rank = |i: usize| -> u8 {
            if Some(i) == initial {
                0
            } else if circles[i].double {
                2
            } else {
                1
            }
        };
        rank(a).cmp(&rank(b)).then(
            circles[a]
                .center
                .x
                .partial_cmp(&circles[b].center.x)
                .unwrap_or(std::cmp::Ordering::Equal),
        )
    });

    // Split tokens into state names and labels
    let mut name_tokens: Vec<Vec<&TextToken>> = vec![Vec::new(); circles.len()];
    let mut labels: Vec<&TextToken> = Vec::new();
    for token in &extraction.tokens {
        if token.text.trim().is_empty() {
            continue;
        }
        let center = token.center();
        match circles.iter().position(|c| c.contains(center)) {
            Some(i) => name_tokens[i].push(token),
            None => labels.push(token),
        }
    }

    let mut names = vec![String::new(); circles.len()];
    let mut used = HashSet::new();
    for (position, &i) in order.iter().enumerate() {
        name_tokens[i].sort_by(reading_order);
        let recognized: String = name_tokens[i]
            .iter()
            .map(|t| t.text.trim())
            .collect::<Vec<_>>()
            .join("");
        let base = if recognized.is_empty() {
            format!("q{}", position)
        } else {
            recognized
        };
        let mut name = base.clone();
        let mut suffix = 2;
        while used.contains(&name) {
            name = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        if name != base {
            warnings.push(format!("Renamed duplicate state '{}' to '{}'", base, name));
        }
        used.insert(name.clone());
        names[i] = name;
    }

    // Greedy label assignment, closest pairs first
    let mut pairs: Vec<(f32, usize, usize)> = Vec::new();
    for (e, edge) in edges.iter().enumerate() {
        for (l, label) in labels.iter().enumerate() {
            let distance = edge.midpoint.distance(label.center());
            if distance <= params.label_search_radius {
                pairs.push((distance, e, l));
            }
        }
    }
    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    let mut edge_label: Vec<Option<usize>> = vec![None; edges.len()];
    let mut label_used = vec![false; labels.len()];
    for (_, e, l) in pairs {
        if edge_label[e].is_none() && !label_used[l] {
            edge_label[e] = Some(l);
            label_used[l] = true;
        }
    }

    let position_of = |circle: usize| order.iter().position(|&i| i == circle).unwrap_or(usize::MAX);
    let mut keyed: Vec<(usize, usize, Transition)> = Vec::new();
    for (e, edge) in edges.iter().enumerate() {
        let (source, destination) = (&names[edge.from], &names[edge.to]);
        let symbols: Vec<String> = match edge_label[e] {
            Some(l) => labels[l]
                .text
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => Vec::new(),
        };
        let symbols = if symbols.is_empty() {
            warnings.push(format!(
                "No label found for the transition from {} to {}",
                source, destination
            ));
            vec![UNLABELED_SYMBOL.to_string()]
        } else {
            symbols
        };
        for symbol in symbols {
            keyed.push((
                position_of(edge.from),
                position_of(edge.to),
                Transition::new(source.as_str(), symbol, destination.as_str()),
            ));
        }
    }
    keyed.sort_by_key(|(from, to, _)| (*from, *to));

    let mut seen = HashSet::new();
    let transitions: Vec<Transition> = keyed
        .into_iter()
        .map(|(_, _, t)| t)
        .filter(|t| seen.insert(t.clone()))
        .collect();

    let unused = label_used.iter().filter(|u| !**u).count();
    if unused > 0 {
        debug!("{} text tokens were not matched to any transition", unused);
    }

    let states: Vec<String> = order.iter().map(|&i| names[i].clone()).collect();
    let initial_state = initial.map(|i| names[i].clone());
    let final_states: Vec<String> = order
        .iter()
        .filter(|&&i| circles[i].double)
        .map(|&i| names[i].clone())
        .collect();
    if final_states.is_empty() {
        warnings.push("No final state detected".to_string());
    }

    for warning in &warnings {
        warn!("Table builder: {}", warning);
    }

    let table = TransitionTable::new(states, initial_state, final_states, transitions)?;
    Ok(BuildReport { table, warnings })
}
