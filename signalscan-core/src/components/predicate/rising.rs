//! Strict increase of one column between consecutive rows.

use serde::{Deserialize, Serialize};

use super::{PatternPredicate, Truth};
use crate::components::indicator::{IndicatorFrame, MaColumn};

/// Column at `slot` strictly above the same column at `slot + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rising {
    pub column: MaColumn,
    pub slot: usize,
}

impl Rising {
    pub fn new(column: MaColumn, slot: usize) -> Self {
        Self { column, slot }
    }
}

impl PatternPredicate for Rising {
    fn describe(&self) -> String {
        format!("{} rising @{}", self.column, self.slot)
    }

    fn depth(&self) -> usize {
        self.slot + 1
    }

    fn columns(&self) -> Vec<MaColumn> {
        vec![self.column]
    }

    fn evaluate_at(&self, frame: &IndicatorFrame, row: usize) -> Truth {
        Truth::compare(
            frame.value_at(self.column, row, self.slot),
            frame.value_at(self.column, row, self.slot + 1),
            |cur, prev| cur > prev,
        )
    }
}
