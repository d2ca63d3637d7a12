//! Pattern predicates: boolean conditions over indicator values at fixed
//! temporal offsets.
//!
//! Every predicate reads an `IndicatorFrame` by integer row position. A
//! "slot" is an offset back from the evaluated row: slot 0 is the row itself,
//! slot k is k rows earlier in the same (daily or weekly) series. Dates are
//! never used for offsets.
//!
//! # Undefined operands
//! Evaluation is three-valued (`Truth`). A warm-up NaN, a slot reaching
//! before the first row, or a zero divisor yields `Truth::Unknown`. Strategy
//! evaluation combines predicates with Kleene AND and then collapses
//! `Unknown` to false, so an undefined operand can never produce a signal.

pub mod comparison;
pub mod crossover;
pub mod equality;
pub mod flatness;
pub mod ordering;
pub mod rank;
pub mod rising;

use serde::{Deserialize, Serialize};

use crate::components::indicator::{IndicatorFrame, MaColumn};

pub use comparison::{CmpOp, ColumnComparison, ExprError};
pub use crossover::Crossover;
pub use equality::EqualityPair;
pub use flatness::FlatnessPair;
pub use ordering::OrderingChain;
pub use rank::{max_ranks, RankConstraint};
pub use rising::Rising;

/// Three-valued predicate outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truth {
    True,
    False,
    Unknown,
}

impl Truth {
    pub fn from_bool(value: bool) -> Self {
        if value {
            Truth::True
        } else {
            Truth::False
        }
    }

    /// Apply `cmp` to two operands, `Unknown` if either is undefined.
    pub fn compare(a: Option<f64>, b: Option<f64>, cmp: impl Fn(f64, f64) -> bool) -> Self {
        match (a, b) {
            (Some(a), Some(b)) => Truth::from_bool(cmp(a, b)),
            _ => Truth::Unknown,
        }
    }

    /// Kleene conjunction: `False` dominates, then `Unknown`.
    pub fn and(self, other: Truth) -> Truth {
        match (self, other) {
            (Truth::False, _) | (_, Truth::False) => Truth::False,
            (Truth::Unknown, _) | (_, Truth::Unknown) => Truth::Unknown,
            _ => Truth::True,
        }
    }

    pub fn all(items: impl IntoIterator<Item = Truth>) -> Truth {
        items.into_iter().fold(Truth::True, Truth::and)
    }

    /// Collapse to a plain boolean; `Unknown` is false.
    pub fn is_true(self) -> bool {
        self == Truth::True
    }
}

/// Trait for pattern predicates.
///
/// Predicates are stateless: the same frame and row always give the same
/// answer, and no row reads data after itself.
pub trait PatternPredicate: Send + Sync {
    /// Human-readable form, e.g. `MA60 > MA20 > MA10 > MA5 @1`.
    fn describe(&self) -> String;

    /// Number of rows before the evaluated row that this predicate reads.
    fn depth(&self) -> usize;

    /// Indicator columns this predicate reads.
    fn columns(&self) -> Vec<MaColumn>;

    /// Evaluate at a single row.
    fn evaluate_at(&self, frame: &IndicatorFrame, row: usize) -> Truth;

    /// Boolean series aligned to the frame's rows.
    fn evaluate(&self, frame: &IndicatorFrame) -> Vec<bool> {
        (0..frame.len())
            .map(|row| self.evaluate_at(frame, row).is_true())
            .collect()
    }
}

/// Closed set of predicate kinds a strategy can be built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    Ordering(OrderingChain),
    Flatness(FlatnessPair),
    Equality(EqualityPair),
    Crossover(Crossover),
    Comparison(ColumnComparison),
    Rising(Rising),
    Rank(RankConstraint),
}

impl Predicate {
    fn inner(&self) -> &dyn PatternPredicate {
        match self {
            Predicate::Ordering(p) => p,
            Predicate::Flatness(p) => p,
            Predicate::Equality(p) => p,
            Predicate::Crossover(p) => p,
            Predicate::Comparison(p) => p,
            Predicate::Rising(p) => p,
            Predicate::Rank(p) => p,
        }
    }
}

impl PatternPredicate for Predicate {
    fn describe(&self) -> String {
        self.inner().describe()
    }

    fn depth(&self) -> usize {
        self.inner().depth()
    }

    fn columns(&self) -> Vec<MaColumn> {
        self.inner().columns()
    }

    fn evaluate_at(&self, frame: &IndicatorFrame, row: usize) -> Truth {
        self.inner().evaluate_at(frame, row)
    }
}

macro_rules! impl_from_predicate {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Predicate {
                fn from(p: $ty) -> Self {
                    Predicate::$variant(p)
                }
            }
        )*
    };
}

impl_from_predicate!(
    Ordering => OrderingChain,
    Flatness => FlatnessPair,
    Equality => EqualityPair,
    Crossover => Crossover,
    Comparison => ColumnComparison,
    Rising => Rising,
    Rank => RankConstraint,
);

/// Build a frame straight from column values for predicate tests.
///
/// Bars carry close = row index; only the columns matter.
#[cfg(test)]
pub(crate) fn frame_from(columns: &[(MaColumn, Vec<f64>)]) -> IndicatorFrame {
    use crate::domain::Granularity;
    use std::collections::BTreeMap;

    let len = columns.iter().map(|(_, v)| v.len()).max().unwrap_or(0);
    let closes: Vec<f64> = (0..len).map(|i| i as f64 + 1.0).collect();
    let bars = crate::indicators::make_bars(&closes);
    let map: BTreeMap<MaColumn, Vec<f64>> = columns.iter().cloned().collect();
    IndicatorFrame::from_columns("TEST", "Test Co", Granularity::Daily, bars, map)
}
