//! Upward crossover of a short column through a long column.

use serde::{Deserialize, Serialize};

use super::{PatternPredicate, Truth};
use crate::components::indicator::{IndicatorFrame, MaColumn};

/// Short above long now, at or below long one row earlier.
///
/// Fires only on the row the cross happens; staying above does not re-fire,
/// and touching without crossing does not fire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crossover {
    pub short: MaColumn,
    pub long: MaColumn,
}

impl Crossover {
    pub fn new(short: MaColumn, long: MaColumn) -> Self {
        assert!(short != long, "crossover columns must differ");
        Self { short, long }
    }
}

impl PatternPredicate for Crossover {
    fn describe(&self) -> String {
        format!("{} crosses above {}", self.short, self.long)
    }

    fn depth(&self) -> usize {
        1
    }

    fn columns(&self) -> Vec<MaColumn> {
        vec![self.short, self.long]
    }

    fn evaluate_at(&self, frame: &IndicatorFrame, row: usize) -> Truth {
        let above_now = Truth::compare(
            frame.value_at(self.short, row, 0),
            frame.value_at(self.long, row, 0),
            |s, l| s > l,
        );
        let below_before = Truth::compare(
            frame.value_at(self.short, row, 1),
            frame.value_at(self.long, row, 1),
            |s, l| s <= l,
        );
        above_now.and(below_before)
    }
}
