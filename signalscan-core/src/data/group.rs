//! Split flat store rows into per-security series.

use std::collections::BTreeMap;

use crate::domain::SecuritySeries;

use super::store::PriceRow;

/// One `SecuritySeries` per security id, ascending by id.
///
/// Each series is sorted by date; duplicate dates keep the row read last.
pub fn group_by_security(rows: Vec<PriceRow>) -> Vec<SecuritySeries> {
    let mut groups: BTreeMap<String, Vec<PriceRow>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.security_id.clone()).or_default().push(row);
    }
    groups
        .into_iter()
        .map(|(id, bars)| SecuritySeries::from_unsorted(id, bars))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(id: &str, day: u32, close: f64) -> PriceRow {
        PriceRow {
            security_id: id.into(),
            name: format!("{id} name"),
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
        }
    }

    #[test]
    fn groups_in_id_order() {
        let series = group_by_security(vec![
            row("9", 2, 1.0),
            row("10", 1, 2.0),
            row("9", 1, 3.0),
        ]);
        let ids: Vec<&str> = series.iter().map(|s| s.security_id.as_str()).collect();
        assert_eq!(ids, vec!["10", "9"]);
        assert_eq!(series[1].bars()[0].close, 3.0);
        assert_eq!(series[1].name, "9 name");
    }

    #[test]
    fn duplicate_dates_keep_last() {
        let series = group_by_security(vec![row("1", 1, 1.0), row("1", 1, 5.0)]);
        assert_eq!(series[0].len(), 1);
        assert_eq!(series[0].bars()[0].close, 5.0);
    }

    #[test]
    fn empty_input() {
        assert!(group_by_security(Vec::new()).is_empty());
    }
}
