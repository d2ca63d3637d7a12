//! Strict descending ordering of a chain of columns at one slot.

use serde::{Deserialize, Serialize};

use super::{PatternPredicate, Truth};
use crate::components::indicator::{IndicatorFrame, MaColumn};

/// `c1 > c2 > ... > cn`, every adjacent pair strictly, read at `slot`.
///
/// Any pair that is equal fails the chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderingChain {
    pub slot: usize,
    pub columns: Vec<MaColumn>,
}

impl OrderingChain {
    /// Chain listed largest first.
    pub fn descending(slot: usize, columns: Vec<MaColumn>) -> Self {
        assert!(columns.len() >= 2, "ordering chain needs at least two columns");
        Self { slot, columns }
    }

    /// Chain listed smallest first; stored reversed so evaluation is shared.
    pub fn ascending(slot: usize, mut columns: Vec<MaColumn>) -> Self {
        columns.reverse();
        Self::descending(slot, columns)
    }
}

impl PatternPredicate for OrderingChain {
    fn describe(&self) -> String {
        let chain = self
            .columns
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" > ");
        if self.slot == 0 {
            chain
        } else {
            format!("{chain} @{}", self.slot)
        }
    }

    fn depth(&self) -> usize {
        self.slot
    }

    fn columns(&self) -> Vec<MaColumn> {
        self.columns.clone()
    }

    fn evaluate_at(&self, frame: &IndicatorFrame, row: usize) -> Truth {
        Truth::all(self.columns.windows(2).map(|pair| {
            Truth::compare(
                frame.value_at(pair[0], row, self.slot),
                frame.value_at(pair[1], row, self.slot),
                |a, b| a > b,
            )
        }))
    }
}
