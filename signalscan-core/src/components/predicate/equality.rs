//! Zero relative difference between two columns.

use serde::{Deserialize, Serialize};

use super::{PatternPredicate, Truth};
use crate::components::indicator::{IndicatorFrame, MaColumn};

/// `|first - second| / second == 0` at `slot`. Exact, no tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EqualityPair {
    pub first: MaColumn,
    pub second: MaColumn,
    pub slot: usize,
}

impl EqualityPair {
    pub fn new(first: MaColumn, second: MaColumn, slot: usize) -> Self {
        Self { first, second, slot }
    }
}

impl PatternPredicate for EqualityPair {
    fn describe(&self) -> String {
        format!("{} ~= {} @{}", self.first, self.second, self.slot)
    }

    fn depth(&self) -> usize {
        self.slot
    }

    fn columns(&self) -> Vec<MaColumn> {
        vec![self.first, self.second]
    }

    fn evaluate_at(&self, frame: &IndicatorFrame, row: usize) -> Truth {
        let a = frame.value_at(self.first, row, self.slot);
        let b = frame.value_at(self.second, row, self.slot);
        match (a, b) {
            (Some(a), Some(b)) if b != 0.0 => Truth::from_bool((a - b).abs() / b == 0.0),
            _ => Truth::Unknown,
        }
    }
}
