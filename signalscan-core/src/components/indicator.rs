//! Indicator trait and the precomputed indicator frame.
//!
//! Indicators are pure functions: bar history in, numeric series out.
//! They are computed once per security before any predicate runs. No
//! recomputation per row.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Granularity, PriceBar, SecuritySeries};
use crate::indicators::Sma;

/// Trait for indicators.
///
/// Indicators take a full bar series and produce a numeric output series of
/// the same length. The first `lookback()` values are `f64::NAN` (warmup).
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "MA20").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[PriceBar]) -> Vec<f64>;
}

/// Window lengths computed for every security during a scan.
pub const DEFAULT_WINDOWS: [usize; 4] = [5, 10, 20, 60];

/// A simple-moving-average column, identified by its window length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MaColumn(pub usize);

impl MaColumn {
    pub const MA5: MaColumn = MaColumn(5);
    pub const MA10: MaColumn = MaColumn(10);
    pub const MA20: MaColumn = MaColumn(20);
    pub const MA60: MaColumn = MaColumn(60);

    pub fn window(&self) -> usize {
        self.0
    }
}

impl fmt::Display for MaColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MA{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid moving-average column '{0}' (expected MA<window>, e.g. MA20)")]
pub struct ParseColumnError(pub String);

impl FromStr for MaColumn {
    type Err = ParseColumnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("MA")
            .or_else(|| trimmed.strip_prefix("ma"))
            .ok_or_else(|| ParseColumnError(s.to_string()))?;
        match digits.parse::<usize>() {
            Ok(window) if window >= 1 => Ok(MaColumn(window)),
            _ => Err(ParseColumnError(s.to_string())),
        }
    }
}

/// A security series plus one rolling-mean column per configured window.
///
/// Built once per security, then read by position. Values are `f64::NAN`
/// until a window has enough observations; accessors turn that into `None`.
#[derive(Debug, Clone)]
pub struct IndicatorFrame {
    pub security_id: String,
    pub name: String,
    pub granularity: Granularity,
    bars: Vec<PriceBar>,
    columns: BTreeMap<MaColumn, Vec<f64>>,
}

impl IndicatorFrame {
    /// Assemble a frame from precomputed columns.
    ///
    /// Columns shorter than `bars` read as undefined past their end.
    pub fn from_columns(
        security_id: impl Into<String>,
        name: impl Into<String>,
        granularity: Granularity,
        bars: Vec<PriceBar>,
        columns: BTreeMap<MaColumn, Vec<f64>>,
    ) -> Self {
        Self {
            security_id: security_id.into(),
            name: name.into(),
            granularity,
            bars,
            columns,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn bar(&self, row: usize) -> Option<&PriceBar> {
        self.bars.get(row)
    }

    /// Full column series, `None` if the window was not computed.
    pub fn series(&self, column: MaColumn) -> Option<&[f64]> {
        self.columns.get(&column).map(|v| v.as_slice())
    }

    pub fn columns(&self) -> impl Iterator<Item = MaColumn> + '_ {
        self.columns.keys().copied()
    }

    /// Defined value of `column` at `row`.
    pub fn value(&self, column: MaColumn, row: usize) -> Option<f64> {
        self.columns
            .get(&column)
            .and_then(|v| v.get(row).copied())
            .filter(|v| !v.is_nan())
    }

    /// Value of `column` read `slot` rows before `row`.
    pub fn value_at(&self, column: MaColumn, row: usize, slot: usize) -> Option<f64> {
        row.checked_sub(slot).and_then(|r| self.value(column, r))
    }
}

/// Compute rolling simple moving averages of close for every window.
///
/// The input series must already be sorted ascending by date. When
/// `resample_weekly` is set, daily bars are first aggregated into
/// Friday-ending weeks.
pub fn compute_indicators(
    series: &SecuritySeries,
    windows: &[usize],
    resample_weekly: bool,
) -> IndicatorFrame {
    let resampled;
    let source = if resample_weekly && series.granularity == Granularity::Daily {
        resampled = series.resample_weekly();
        &resampled
    } else {
        series
    };

    let mut columns = BTreeMap::new();
    for &window in windows.iter().filter(|w| **w >= 1) {
        columns.insert(MaColumn(window), Sma::new(window).compute(source.bars()));
    }

    IndicatorFrame {
        security_id: source.security_id.clone(),
        name: source.name.clone(),
        granularity: source.granularity,
        bars: source.bars().to_vec(),
        columns,
    }
}
