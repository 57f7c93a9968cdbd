// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Finite state automaton model and its construction from diagram extractions

pub mod builder;
pub mod table;

pub use builder::{build_table, BuildReport, BuilderParams, UNLABELED_SYMBOL};
pub use table::{TableError, Transition, TransitionTable};
