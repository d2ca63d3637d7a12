//! Forward returns from a signal's entry bar.
//!
//! Entry rule:
//! - daily strategies enter at the open of the bar after the signal bar
//! - weekly strategies enter at the close of the signal bar itself
//!
//! A horizon that runs past the end of the series yields the explicit
//! `InsufficientData` marker, never a zero.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use signalscan_core::{Granularity, IndicatorFrame};

pub const INSUFFICIENT_DATA: &str = "N/A";
pub const NOT_APPLICABLE: &str = "-";

/// Return at one horizon, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ForwardReturn {
    Value(f64),
    /// The horizon runs past the last available bar.
    InsufficientData,
    /// No return is computed (latest-only scans).
    NotApplicable,
}

impl ForwardReturn {
    /// Numeric value, `None` for either marker.
    pub fn value(self) -> Option<f64> {
        match self {
            ForwardReturn::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ForwardReturn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForwardReturn::Value(v) => write!(f, "{v:.2}"),
            ForwardReturn::InsufficientData => f.write_str(INSUFFICIENT_DATA),
            ForwardReturn::NotApplicable => f.write_str(NOT_APPLICABLE),
        }
    }
}

impl Serialize for ForwardReturn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ForwardReturn::Value(v) => serializer.serialize_f64(*v),
            ForwardReturn::InsufficientData => serializer.serialize_str(INSUFFICIENT_DATA),
            ForwardReturn::NotApplicable => serializer.serialize_str(NOT_APPLICABLE),
        }
    }
}

impl<'de> Deserialize<'de> for ForwardReturn {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Marker(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(v) => Ok(ForwardReturn::Value(v)),
            Raw::Marker(s) if s == INSUFFICIENT_DATA => Ok(ForwardReturn::InsufficientData),
            Raw::Marker(s) if s == NOT_APPLICABLE => Ok(ForwardReturn::NotApplicable),
            Raw::Marker(s) => Err(serde::de::Error::custom(format!(
                "unknown return marker '{s}'"
            ))),
        }
    }
}

/// Round to two decimals, ties to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Percentage return from `entry_price` to the close `horizon` bars after
/// `entry_index`.
pub fn compute_return(
    frame: &IndicatorFrame,
    entry_index: usize,
    horizon: usize,
    entry_price: f64,
) -> ForwardReturn {
    if !(entry_price.is_finite() && entry_price > 0.0) {
        return ForwardReturn::InsufficientData;
    }
    let Some(exit) = entry_index.checked_add(horizon).and_then(|i| frame.bar(i)) else {
        return ForwardReturn::InsufficientData;
    };
    if exit.close.is_nan() {
        return ForwardReturn::InsufficientData;
    }
    ForwardReturn::Value(round2((exit.close - entry_price) / entry_price * 100.0))
}

/// Where a position opened by a signal would start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    pub index: usize,
    pub date: NaiveDate,
    pub price: f64,
}

/// Entry bar for a signal at `signal_row`, `None` when a daily signal sits
/// on the last bar.
pub fn entry_for(frame: &IndicatorFrame, signal_row: usize) -> Option<Entry> {
    let (index, use_open) = match frame.granularity {
        Granularity::Daily => (signal_row + 1, true),
        Granularity::Weekly => (signal_row, false),
    };
    frame.bar(index).map(|bar| Entry {
        index,
        date: bar.date,
        price: if use_open { bar.open } else { bar.close },
    })
}
