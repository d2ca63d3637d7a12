//! Zero period-over-period change for two columns at once.

use serde::{Deserialize, Serialize};

use super::{PatternPredicate, Truth};
use crate::components::indicator::{IndicatorFrame, MaColumn};

/// Both columns unchanged from slot+1 to slot.
///
/// Change is the relative percentage `(cur - prev) / prev`; a zero previous
/// value makes the change undefined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatnessPair {
    pub first: MaColumn,
    pub second: MaColumn,
    pub slot: usize,
}

impl FlatnessPair {
    pub fn new(first: MaColumn, second: MaColumn, slot: usize) -> Self {
        Self { first, second, slot }
    }

    fn is_flat(&self, frame: &IndicatorFrame, column: MaColumn, row: usize) -> Truth {
        let cur = frame.value_at(column, row, self.slot);
        let prev = frame.value_at(column, row, self.slot + 1);
        match (cur, prev) {
            (Some(cur), Some(prev)) if prev != 0.0 => Truth::from_bool((cur - prev) / prev == 0.0),
            _ => Truth::Unknown,
        }
    }
}

impl PatternPredicate for FlatnessPair {
    fn describe(&self) -> String {
        format!("{} and {} flat @{}", self.first, self.second, self.slot)
    }

    fn depth(&self) -> usize {
        self.slot + 1
    }

    fn columns(&self) -> Vec<MaColumn> {
        vec![self.first, self.second]
    }

    fn evaluate_at(&self, frame: &IndicatorFrame, row: usize) -> Truth {
        self.is_flat(frame, self.first, row)
            .and(self.is_flat(frame, self.second, row))
    }
}

#[cfg(test)]
mod tests {
    use super::super::frame_from;
    use super::*;

    #[test]
    fn both_unchanged() {
        let frame = frame_from(&[
            (MaColumn::MA5, vec![10.0, 10.0, 11.0]),
            (MaColumn::MA10, vec![20.0, 20.0, 20.0]),
        ]);
        let p = FlatnessPair::new(MaColumn::MA5, MaColumn::MA10, 0);
        assert_eq!(p.evaluate_at(&frame, 1), Truth::True);
        assert_eq!(p.evaluate_at(&frame, 2), Truth::False);
    }

    #[test]
    fn first_row_has_no_previous() {
        let frame = frame_from(&[
            (MaColumn::MA5, vec![10.0, 10.0]),
            (MaColumn::MA10, vec![20.0, 20.0]),
        ]);
        let p = FlatnessPair::new(MaColumn::MA5, MaColumn::MA10, 0);
        assert_eq!(p.evaluate_at(&frame, 0), Truth::Unknown);
        assert_eq!(p.depth(), 1);
    }

    #[test]
    fn zero_previous_is_undefined() {
        let frame = frame_from(&[
            (MaColumn::MA5, vec![0.0, 0.0]),
            (MaColumn::MA10, vec![20.0, 20.0]),
        ]);
        let p = FlatnessPair::new(MaColumn::MA5, MaColumn::MA10, 0);
        assert_eq!(p.evaluate_at(&frame, 1), Truth::Unknown);
    }

    #[test]
    fn slot_shifts_both_reads() {
        let frame = frame_from(&[
            (MaColumn::MA5, vec![5.0, 5.0, 6.0, 7.0]),
            (MaColumn::MA20, vec![9.0, 9.0, 9.5, 9.9]),
        ]);
        let p = FlatnessPair::new(MaColumn::MA5, MaColumn::MA20, 2);
        assert_eq!(p.evaluate_at(&frame, 3), Truth::True);
        assert_eq!(p.depth(), 3);
    }
}
