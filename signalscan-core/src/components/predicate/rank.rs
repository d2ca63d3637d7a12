//! Cross-time rank constraint on a single column.

use serde::{Deserialize, Serialize};

use super::{PatternPredicate, Truth};
use crate::components::indicator::{IndicatorFrame, MaColumn};

/// Rank of each value among the group using the "max" method.
///
/// Rank counts how many values are at or below it, so the smallest value is
/// rank 1 and ties share the higher rank.
pub fn max_ranks(values: &[f64]) -> Vec<usize> {
    values
        .iter()
        .map(|v| values.iter().filter(|other| *other <= v).count())
        .collect()
}

/// The column's values at slots `0..targets.len()` must rank exactly as
/// `targets[slot]`.
///
/// `targets = [3, 2, 1]` means three consecutive strict increases: the
/// current value is the largest, the value two rows back the smallest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankConstraint {
    pub column: MaColumn,
    pub targets: Vec<usize>,
}

impl RankConstraint {
    pub fn new(column: MaColumn, targets: Vec<usize>) -> Self {
        assert!(!targets.is_empty(), "rank constraint needs at least one slot");
        Self { column, targets }
    }
}

impl PatternPredicate for RankConstraint {
    fn describe(&self) -> String {
        let targets = self
            .targets
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!("rank({}) = [{}]", self.column, targets)
    }

    fn depth(&self) -> usize {
        self.targets.len().saturating_sub(1)
    }

    fn columns(&self) -> Vec<MaColumn> {
        vec![self.column]
    }

    fn evaluate_at(&self, frame: &IndicatorFrame, row: usize) -> Truth {
        let values: Option<Vec<f64>> = (0..self.targets.len())
            .map(|slot| frame.value_at(self.column, row, slot))
            .collect();
        match values {
            Some(values) => Truth::from_bool(max_ranks(&values) == self.targets),
            None => Truth::Unknown,
        }
    }
}
