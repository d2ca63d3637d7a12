//! Scan orchestration: load once, group by security, evaluate every
//! requested strategy on each security's indicator frame, attach forward
//! returns.
//!
//! Securities share nothing, so they are evaluated on the rayon pool when
//! `scan.parallel` is set. Results are collected in security order, so the
//! parallel and sequential paths produce identical output.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{Duration, NaiveDate};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use signalscan_core::components::indicator::{compute_indicators, DEFAULT_WINDOWS};
use signalscan_core::data::in_range;
use signalscan_core::{
    group_by_security, Granularity, IndicatorFrame, PriceStore, SecuritySeries, StoreError,
    StrategyRegistry, StrategySpec,
};

use crate::config::{ConfigError, ScanConfig, WarmupConfig};
use crate::result::{HorizonReturn, SignalRow};
use crate::returns::{compute_return, entry_for, ForwardReturn};

/// Fatal scan failures. Unknown strategy ids are not errors; they are
/// reported in [`ScanOutput::skipped`].
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("price store: {0}")]
    Store(#[from] StoreError),
    #[error("config: {0}")]
    Config(#[from] ConfigError),
}

/// What to scan for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRequest {
    pub strategy_ids: Vec<String>,
    /// Keep only signals on each security's most recent bar, without returns.
    pub latest_only: bool,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Reference date for fetch buffers. Defaults to today.
    pub as_of: NaiveDate,
}

impl ScanRequest {
    pub fn new<I, S>(strategy_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            strategy_ids: strategy_ids.into_iter().map(Into::into).collect(),
            latest_only: false,
            start: None,
            end: None,
            as_of: chrono::Local::now().date_naive(),
        }
    }

    pub fn latest(mut self, latest_only: bool) -> Self {
        self.latest_only = latest_only;
        self
    }

    pub fn between(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = as_of;
        self
    }
}

/// Everything one scan produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOutput {
    /// Requested ids that resolved, in request order.
    pub strategy_ids: Vec<String>,
    /// Requested ids missing from the registry.
    pub skipped: Vec<String>,
    pub horizons: Vec<usize>,
    pub latest_only: bool,
    /// Lower bound handed to the store, `None` for full history.
    pub fetch_start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub securities: usize,
    pub rows_loaded: usize,
    pub rows: Vec<SignalRow>,
    /// blake3 over the signal rows.
    pub fingerprint: String,
}

impl ScanOutput {
    pub fn rows_for<'a>(&'a self, strategy_id: &'a str) -> impl Iterator<Item = &'a SignalRow> + 'a {
        self.rows.iter().filter(move |r| r.strategy_id == strategy_id)
    }
}

/// Lower fetch bound for one granularity, `None` meaning no bound.
fn granularity_fetch_start(
    granularity: Granularity,
    request: &ScanRequest,
    warmup: &WarmupConfig,
) -> Option<NaiveDate> {
    let (buffer, extra) = match granularity {
        Granularity::Daily => (warmup.daily_buffer_days, warmup.latest_daily_extra_days),
        Granularity::Weekly => (warmup.weekly_buffer_days, warmup.latest_weekly_extra_days),
    };
    let days = |n: u32| Duration::days(i64::from(n));

    if request.latest_only {
        return Some(request.as_of - days(buffer + extra));
    }
    match (request.start, granularity) {
        (Some(start), _) => Some(start - days(buffer)),
        (None, Granularity::Daily) => None,
        (None, Granularity::Weekly) => Some(request.as_of - days(buffer + extra)),
    }
}

/// Lower fetch bound covering every granularity in `needed`.
///
/// An unbounded granularity makes the whole load unbounded.
pub fn fetch_start(
    needed: &BTreeSet<Granularity>,
    request: &ScanRequest,
    warmup: &WarmupConfig,
) -> Option<NaiveDate> {
    let mut earliest: Option<NaiveDate> = None;
    for &granularity in needed {
        let bound = granularity_fetch_start(granularity, request, warmup)?;
        earliest = Some(earliest.map_or(bound, |e| e.min(bound)));
    }
    earliest
}

/// Hash of the output rows, stable across runs over identical input.
pub fn fingerprint(rows: &[SignalRow]) -> String {
    let mut hasher = blake3::Hasher::new();
    for row in rows {
        row.hash_into(&mut hasher);
    }
    hasher.finalize().to_hex().to_string()
}

/// Runs scans against one store and one registry.
pub struct Scanner<'a> {
    store: &'a dyn PriceStore,
    registry: &'a StrategyRegistry,
    config: ScanConfig,
}

impl<'a> Scanner<'a> {
    pub fn new(store: &'a dyn PriceStore, registry: &'a StrategyRegistry, config: ScanConfig) -> Self {
        Self {
            store,
            registry,
            config,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn scan(&self, request: &ScanRequest) -> Result<ScanOutput, ScanError> {
        self.scan_with_progress(request, |_, _| {})
    }

    /// Run a scan, calling `progress(done, total)` after each security.
    pub fn scan_with_progress<F>(&self, request: &ScanRequest, progress: F) -> Result<ScanOutput, ScanError>
    where
        F: Fn(usize, usize) + Send + Sync,
    {
        self.config.validate()?;
        let horizons = self.config.scan.horizons.clone();

        let (specs, skipped) = self.resolve(&request.strategy_ids);
        let strategy_ids: Vec<String> = specs.iter().map(|s| s.id.clone()).collect();

        let mut output = ScanOutput {
            strategy_ids,
            skipped,
            horizons,
            latest_only: request.latest_only,
            fetch_start: None,
            end: request.end,
            securities: 0,
            rows_loaded: 0,
            rows: Vec::new(),
            fingerprint: fingerprint(&[]),
        };
        if specs.is_empty() {
            warn!("no requested strategy resolved; nothing to scan");
            return Ok(output);
        }

        let needed: BTreeSet<Granularity> = specs.iter().map(|s| s.granularity).collect();
        output.fetch_start = fetch_start(&needed, request, &self.config.warmup);
        info!(
            strategies = ?output.strategy_ids,
            latest_only = request.latest_only,
            fetch_start = ?output.fetch_start,
            end = ?request.end,
            store = %self.store.describe(),
            "scan started"
        );

        let rows = self.store.load_prices(output.fetch_start, request.end)?;
        output.rows_loaded = rows.len();
        let universe = group_by_security(rows);
        output.securities = universe.len();

        let windows = frame_windows(&specs);
        let total = universe.len();
        let done = AtomicUsize::new(0);
        let job = ScanJob {
            specs: &specs,
            request,
            horizons: &output.horizons,
            windows: &windows,
        };
        let per_security = |series: &SecuritySeries| {
            let rows = job.scan_security(series);
            progress(done.fetch_add(1, Ordering::Relaxed) + 1, total);
            rows
        };

        let batches: Vec<Vec<SignalRow>> = if self.config.scan.parallel {
            universe.par_iter().map(per_security).collect()
        } else {
            universe.iter().map(per_security).collect()
        };
        output.rows = batches.into_iter().flatten().collect();
        output.fingerprint = fingerprint(&output.rows);

        info!(
            securities = output.securities,
            rows_loaded = output.rows_loaded,
            signals = output.rows.len(),
            "scan finished"
        );
        Ok(output)
    }

    /// Look up each id once, in request order.
    fn resolve(&self, ids: &[String]) -> (Vec<&'a StrategySpec>, Vec<String>) {
        let mut seen = BTreeSet::new();
        let mut specs = Vec::new();
        let mut skipped = Vec::new();
        for id in ids {
            if !seen.insert(id.as_str()) {
                continue;
            }
            match self.registry.get(id) {
                Some(spec) => specs.push(spec),
                None => {
                    warn!(strategy = %id, "unknown strategy id, skipped");
                    skipped.push(id.clone());
                }
            }
        }
        (specs, skipped)
    }
}

/// Standard windows plus any extra window a spec reads.
fn frame_windows(specs: &[&StrategySpec]) -> Vec<usize> {
    let mut windows: BTreeSet<usize> = DEFAULT_WINDOWS.into_iter().collect();
    for spec in specs {
        windows.extend(spec.columns().iter().map(|c| c.window()));
    }
    windows.into_iter().collect()
}

struct ScanJob<'s> {
    specs: &'s [&'s StrategySpec],
    request: &'s ScanRequest,
    horizons: &'s [usize],
    windows: &'s [usize],
}

impl ScanJob<'_> {
    fn scan_security(&self, series: &SecuritySeries) -> Vec<SignalRow> {
        if series.is_empty() {
            return Vec::new();
        }
        let needs = |g: Granularity| self.specs.iter().any(|s| s.granularity == g);
        let daily = needs(Granularity::Daily).then(|| compute_indicators(series, self.windows, false));
        let weekly = needs(Granularity::Weekly).then(|| compute_indicators(series, self.windows, true));

        let mut out = Vec::new();
        for spec in self.specs {
            let frame = match spec.granularity {
                Granularity::Daily => daily.as_ref(),
                Granularity::Weekly => weekly.as_ref(),
            };
            if let Some(frame) = frame {
                self.collect_signals(spec, frame, &mut out);
            }
        }
        debug!(
            security = %series.security_id,
            bars = series.len(),
            signals = out.len(),
            "security scanned"
        );
        out
    }

    fn collect_signals(&self, spec: &StrategySpec, frame: &IndicatorFrame, out: &mut Vec<SignalRow>) {
        let last = frame.len().saturating_sub(1);
        for row in spec.signal_rows(frame) {
            let Some(bar) = frame.bar(row) else { continue };
            let keep = if self.request.latest_only {
                row == last
            } else {
                in_range(bar.date, self.request.start, self.request.end)
            };
            if !keep {
                continue;
            }

            let (entry_date, entry_price, returns) = if self.request.latest_only {
                (None, None, self.markers(ForwardReturn::NotApplicable))
            } else {
                match entry_for(frame, row) {
                    Some(entry) => {
                        let returns = self
                            .horizons
                            .iter()
                            .map(|&horizon| HorizonReturn {
                                horizon,
                                value: compute_return(frame, entry.index, horizon, entry.price),
                            })
                            .collect();
                        (Some(entry.date), Some(entry.price), returns)
                    }
                    None => (None, None, self.markers(ForwardReturn::InsufficientData)),
                }
            };

            out.push(SignalRow {
                strategy_id: spec.id.clone(),
                granularity: spec.granularity,
                security_id: frame.security_id.clone(),
                name: frame.name.clone(),
                signal_date: bar.date,
                close: bar.close,
                entry_date,
                entry_price,
                returns,
            });
        }
    }

    fn markers(&self, marker: ForwardReturn) -> Vec<HorizonReturn> {
        self.horizons
            .iter()
            .map(|&horizon| HorizonReturn { horizon, value: marker })
            .collect()
    }
}
