//! Performance statistics: pure functions over forward returns.
//!
//! Every metric takes valid returns (percent) in ascending signal-date order.
//! Markers are filtered out before any statistic; an empty valid set yields
//! no statistics at all rather than zeros.

use serde::{Deserialize, Serialize};

use crate::result::SignalRow;

/// Statistics over the valid returns at one horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStats {
    pub avg_return: f64,
    pub win_rate: f64,
    #[serde(with = "infinite_f64")]
    pub profit_factor: f64,
    pub expectancy: f64,
    pub max_drawdown: f64,
    pub max_consecutive_losses: usize,
}

impl ReturnStats {
    /// `None` for an empty slice.
    pub fn compute(returns: &[f64]) -> Option<Self> {
        if returns.is_empty() {
            return None;
        }
        Some(Self {
            avg_return: mean(returns),
            win_rate: win_rate(returns),
            profit_factor: profit_factor(returns),
            expectancy: expectancy(returns),
            max_drawdown: max_drawdown(returns),
            max_consecutive_losses: max_consecutive_losses(returns),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonStats {
    pub horizon: usize,
    pub valid_count: usize,
    pub stats: Option<ReturnStats>,
}

/// Summary of one strategy's signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub strategy_id: String,
    /// All rows, including those with no valid return.
    pub signal_count: usize,
    pub horizons: Vec<HorizonStats>,
}

impl PerformanceSummary {
    pub fn horizon(&self, horizon: usize) -> Option<&HorizonStats> {
        self.horizons.iter().find(|h| h.horizon == horizon)
    }
}

// ─── Aggregation ────────────────────────────────────────────────────

/// Valid returns at `horizon`, stably ordered by signal date.
pub fn valid_returns<'a, I>(rows: I, horizon: usize) -> Vec<f64>
where
    I: IntoIterator<Item = &'a SignalRow>,
{
    let mut dated: Vec<_> = rows
        .into_iter()
        .filter_map(|r| r.valid_return(horizon).map(|v| (r.signal_date, v)))
        .collect();
    dated.sort_by_key(|(date, _)| *date);
    dated.into_iter().map(|(_, v)| v).collect()
}

pub fn horizon_stats(rows: &[&SignalRow], horizon: usize) -> HorizonStats {
    let returns = valid_returns(rows.iter().copied(), horizon);
    HorizonStats {
        horizon,
        valid_count: returns.len(),
        stats: ReturnStats::compute(&returns),
    }
}

/// Summary over `rows`, which should all belong to `strategy_id`.
pub fn summarize(strategy_id: &str, rows: &[&SignalRow], horizons: &[usize]) -> PerformanceSummary {
    PerformanceSummary {
        strategy_id: strategy_id.to_string(),
        signal_count: rows.len(),
        horizons: horizons.iter().map(|&h| horizon_stats(rows, h)).collect(),
    }
}

/// One summary per strategy id, in first-seen order.
pub fn summarize_by_strategy(rows: &[SignalRow], horizons: &[usize]) -> Vec<PerformanceSummary> {
    let mut groups: Vec<(&str, Vec<&SignalRow>)> = Vec::new();
    for row in rows {
        match groups.iter_mut().find(|(id, _)| *id == row.strategy_id) {
            Some((_, members)) => members.push(row),
            None => groups.push((row.strategy_id.as_str(), vec![row])),
        }
    }
    groups
        .into_iter()
        .map(|(id, members)| summarize(id, &members, horizons))
        .collect()
}

// ─── Individual metric functions ────────────────────────────────────

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Percentage of returns strictly above zero.
pub fn win_rate(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let wins = returns.iter().filter(|&&r| r > 0.0).count();
    wins as f64 / returns.len() as f64 * 100.0
}

/// Sum of positive returns over the absolute sum of non-positive returns.
///
/// With nothing lost: +∞ if anything was won, else 0.
pub fn profit_factor(returns: &[f64]) -> f64 {
    let gains: f64 = returns.iter().filter(|&&r| r > 0.0).sum();
    let losses: f64 = returns.iter().filter(|&&r| r <= 0.0).sum::<f64>().abs();
    if losses == 0.0 {
        return if gains > 0.0 { f64::INFINITY } else { 0.0 };
    }
    gains / losses
}

/// win_fraction × mean win − loss_fraction × mean |loss|.
pub fn expectancy(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let (wins, losses): (Vec<f64>, Vec<f64>) = returns.iter().partition(|&&r| r > 0.0);
    let n = returns.len() as f64;
    let abs_losses: Vec<f64> = losses.iter().map(|r| r.abs()).collect();
    wins.len() as f64 / n * mean(&wins) - losses.len() as f64 / n * mean(&abs_losses)
}

/// Deepest drawdown of the simple-interest curve `100 + cumsum(returns)`,
/// in percent (negative, or 0 with no drawdown).
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut equity = 100.0;
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;

    for r in returns {
        equity += r;
        if equity > peak {
            peak = equity;
        }
        if peak > 0.0 {
            max_dd = max_dd.min((equity - peak) / peak);
        }
    }
    max_dd * 100.0
}

/// Longest run of returns at or below zero.
pub fn max_consecutive_losses(returns: &[f64]) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for &r in returns {
        if r <= 0.0 {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

// ─── Display ────────────────────────────────────────────────────────

pub fn format_pf(pf: f64) -> String {
    if pf.is_infinite() {
        "∞".to_string()
    } else {
        format!("{pf:.2}")
    }
}

/// Signed percentage with two decimals, e.g. `+3.50%`.
pub fn format_pct(value: f64) -> String {
    format!("{value:+.2}%")
}

/// JSON has no infinity; write it as the string "inf".
mod infinite_f64 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_infinite() && value.is_sign_positive() {
            serializer.serialize_str("inf")
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(v) => Ok(v),
            Raw::Text(s) if s == "inf" => Ok(f64::INFINITY),
            Raw::Text(s) => Err(serde::de::Error::custom(format!("expected number or \"inf\", got '{s}'"))),
        }
    }
}
