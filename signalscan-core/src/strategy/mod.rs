//! Strategies: named conjunctions of pattern predicates.
//!
//! A `StrategySpec` is immutable configuration. It is built once (usually by
//! the registry at startup) and evaluated against many indicator frames.

pub mod catalog;
pub mod registry;
pub mod shortcuts;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::components::indicator::{IndicatorFrame, MaColumn};
use crate::components::predicate::{PatternPredicate, Predicate, Truth};
use crate::domain::Granularity;

pub use catalog::{builtin_defs, StrategyDef, Term};
pub use registry::{RegistryError, StrategyRegistry};
pub use shortcuts::{shortcut, shortcut_chain, SHORTCUTS};

/// A strategy: every predicate must hold at the evaluated row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySpec {
    pub id: String,
    pub granularity: Granularity,
    predicates: Vec<Predicate>,
}

impl StrategySpec {
    pub fn new(id: impl Into<String>, granularity: Granularity, predicates: Vec<Predicate>) -> Self {
        Self {
            id: id.into(),
            granularity,
            predicates,
        }
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Deepest slot read by any predicate.
    pub fn depth(&self) -> usize {
        self.predicates.iter().map(|p| p.depth()).max().unwrap_or(0)
    }

    pub fn columns(&self) -> BTreeSet<MaColumn> {
        self.predicates.iter().flat_map(|p| p.columns()).collect()
    }

    /// Bars needed before every operand of every predicate can be defined.
    ///
    /// A conservative bound: the first signal may come earlier when the
    /// widest column is not also the deepest read.
    pub fn warmup_bars(&self) -> usize {
        let widest = self.columns().iter().map(|c| c.window()).max().unwrap_or(1);
        widest + self.depth()
    }

    pub fn describe(&self) -> String {
        self.predicates
            .iter()
            .map(|p| p.describe())
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// Conjunction of all predicates at `row`.
    pub fn evaluate_at(&self, frame: &IndicatorFrame, row: usize) -> Truth {
        let mut acc = Truth::True;
        for predicate in &self.predicates {
            acc = acc.and(predicate.evaluate_at(frame, row));
            if acc == Truth::False {
                break;
            }
        }
        acc
    }

    /// Boolean signal series aligned to the frame's rows.
    pub fn evaluate(&self, frame: &IndicatorFrame) -> Vec<bool> {
        (0..frame.len())
            .map(|row| self.evaluate_at(frame, row).is_true())
            .collect()
    }

    /// Rows where the strategy signals, ascending.
    pub fn signal_rows(&self, frame: &IndicatorFrame) -> Vec<usize> {
        (0..frame.len())
            .filter(|&row| self.evaluate_at(frame, row).is_true())
            .collect()
    }
}
