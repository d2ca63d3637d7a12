//! SecuritySeries: the ordered bar history of one security.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::bar::PriceBar;

/// Bar spacing of a series and of the strategies that read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Daily,
    Weekly,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bars of one security sorted ascending by date.
///
/// Missing trading days are simply absent; nothing is forward-filled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecuritySeries {
    pub security_id: String,
    pub name: String,
    pub granularity: Granularity,
    bars: Vec<PriceBar>,
}

impl SecuritySeries {
    /// Wrap bars that are already sorted ascending by date.
    ///
    /// The caller owns ordering; see [`SecuritySeries::from_unsorted`] when
    /// rows may arrive out of order.
    pub fn new(security_id: impl Into<String>, name: impl Into<String>, bars: Vec<PriceBar>) -> Self {
        Self {
            security_id: security_id.into(),
            name: name.into(),
            granularity: Granularity::Daily,
            bars,
        }
    }

    /// Sort by date and collapse duplicate dates, keeping the last bar read.
    pub fn from_unsorted(security_id: impl Into<String>, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }
        let name = deduped.first().map(|b| b.name.clone()).unwrap_or_default();
        Self::new(security_id, name, deduped)
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Aggregate daily bars into weekly bars labelled by the Friday that ends
    /// each week.
    ///
    /// open = first, high = max, low = min, close = last, name = first.
    /// Saturday and Sunday bars belong to the following Friday. Weeks without
    /// any bar produce no row.
    pub fn resample_weekly(&self) -> SecuritySeries {
        let mut weekly: Vec<PriceBar> = Vec::new();

        for bar in &self.bars {
            let label = week_ending_friday(bar.date);
            match weekly.last_mut() {
                Some(week) if week.date == label => {
                    week.high = week.high.max(bar.high);
                    week.low = week.low.min(bar.low);
                    week.close = bar.close;
                }
                _ => weekly.push(PriceBar {
                    security_id: bar.security_id.clone(),
                    name: bar.name.clone(),
                    date: label,
                    open: bar.open,
                    high: bar.high,
                    low: bar.low,
                    close: bar.close,
                }),
            }
        }

        SecuritySeries {
            security_id: self.security_id.clone(),
            name: self.name.clone(),
            granularity: Granularity::Weekly,
            bars: weekly,
        }
    }
}

/// The Friday on or after `date`.
pub fn week_ending_friday(date: NaiveDate) -> NaiveDate {
    let from_monday = date.weekday().num_days_from_monday() as i64;
    let until_friday = (4 - from_monday).rem_euclid(7);
    date + Duration::days(until_friday)
}
