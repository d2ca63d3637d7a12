//! Named orderings of the four standard moving averages.
//!
//! Each shortcut lists windows greatest first: `"2"` = MA60 > MA20 > MA5 > MA10.

use crate::components::indicator::MaColumn;
use crate::components::predicate::OrderingChain;

pub const SHORTCUTS: &[(&str, [usize; 4])] = &[
    ("1", [60, 20, 10, 5]),
    ("1-1", [10, 5, 20, 60]),
    ("2", [60, 20, 5, 10]),
    ("2-1", [20, 10, 5, 60]),
    ("2-2", [20, 60, 5, 10]),
    ("3", [60, 5, 20, 10]),
    ("3-1", [60, 10, 5, 20]),
    ("7-1", [20, 5, 10, 60]),
    ("7-3", [5, 60, 20, 10]),
    ("7-5", [60, 10, 20, 5]),
    ("7-7", [60, 5, 10, 20]),
    ("7-8", [5, 60, 10, 20]),
    ("9", [5, 10, 60, 20]),
    ("10", [5, 10, 20, 60]),
    ("A+1", [10, 20, 5, 60]),
];

/// Columns of a shortcut, greatest first.
pub fn shortcut(name: &str) -> Option<Vec<MaColumn>> {
    SHORTCUTS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, windows)| windows.iter().map(|&w| MaColumn(w)).collect())
}

/// Ordering chain for a shortcut anchored at `slot`.
pub fn shortcut_chain(name: &str, slot: usize) -> Option<OrderingChain> {
    shortcut(name).map(|columns| OrderingChain::descending(slot, columns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_shortcut_is_a_permutation() {
        for (name, windows) in SHORTCUTS {
            let set: HashSet<usize> = windows.iter().copied().collect();
            assert_eq!(set, HashSet::from([5, 10, 20, 60]), "shortcut {name}");
        }
    }

    #[test]
    fn names_are_unique() {
        let names: HashSet<&str> = SHORTCUTS.iter().map(|(n, _)| *n).collect();
        assert_eq!(names.len(), SHORTCUTS.len());
    }

    #[test]
    fn lookup() {
        assert_eq!(
            shortcut("A+1").unwrap(),
            vec![MaColumn::MA10, MaColumn::MA20, MaColumn::MA5, MaColumn::MA60]
        );
        assert!(shortcut("4").is_none());
        assert_eq!(shortcut_chain("7-7", 1).unwrap().slot, 1);
    }
}
