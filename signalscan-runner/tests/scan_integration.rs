//! Integration tests for the scanner: store → frames → signals → returns →
//! summaries → export.

use std::sync::Mutex;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use signalscan_core::components::predicate::{OrderingChain, Rising};
use signalscan_core::data::{CsvStore, MemoryStore, SyntheticStore};
use signalscan_core::{Granularity, MaColumn, PriceBar, StoreError, StrategyRegistry, StrategySpec};
use signalscan_runner::export::import_json;
use signalscan_runner::{
    export_json, summarize_by_strategy, ForwardReturn, ScanConfig, ScanError, ScanRequest, Scanner,
};

// ── Fixtures ─────────────────────────────────────────────────────────

fn weekdays(first: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(n);
    let mut d = first;
    while out.len() < n {
        if !matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
            out.push(d);
        }
        d += Duration::days(1);
    }
    out
}

fn bars(security_id: &str, closes: &[f64]) -> Vec<PriceBar> {
    let first = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    weekdays(first, closes.len())
        .into_iter()
        .zip(closes)
        .map(|(date, &close)| PriceBar {
            security_id: security_id.into(),
            name: format!("{security_id} Corp"),
            date,
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
        })
        .collect()
}

/// 77 flat bars, then three rising ones: only the last three rows have
/// MA5 > MA10 > MA20 > MA60.
fn breakout_closes() -> Vec<f64> {
    let mut closes = vec![100.0; 77];
    closes.extend([110.0, 120.0, 130.0]);
    closes
}

fn registry() -> StrategyRegistry {
    StrategyRegistry::from_specs(vec![
        StrategySpec::new(
            "stacked",
            Granularity::Daily,
            vec![OrderingChain::descending(
                0,
                vec![MaColumn::MA5, MaColumn::MA10, MaColumn::MA20, MaColumn::MA60],
            )
            .into()],
        ),
        StrategySpec::new("weekly_rising", Granularity::Weekly, vec![Rising::new(MaColumn::MA5, 0).into()]),
    ])
    .unwrap()
}

fn config(horizons: Vec<usize>, parallel: bool) -> ScanConfig {
    let mut config = ScanConfig::default();
    config.scan.horizons = horizons;
    config.scan.parallel = parallel;
    config
}

fn last_date(store: &MemoryStore) -> NaiveDate {
    store.rows().iter().map(|r| r.date).max().unwrap()
}

// ── Signals ──────────────────────────────────────────────────────────

#[test]
fn breakout_yields_three_rows() {
    let store = MemoryStore::new(bars("A", &breakout_closes()));
    let registry = registry();
    let scanner = Scanner::new(&store, &registry, config(vec![1, 2], true));

    let output = scanner
        .scan(&ScanRequest::new(["stacked"]).as_of(last_date(&store)))
        .unwrap();

    assert_eq!(output.rows.len(), 3);
    assert_eq!(output.securities, 1);
    assert_eq!(output.rows_loaded, 80);
    assert_eq!(output.fetch_start, None);
    let dates: Vec<_> = output.rows.iter().map(|r| r.signal_date).collect();
    assert!(dates.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn latest_only_keeps_most_recent_bar() {
    let store = MemoryStore::new(bars("A", &breakout_closes()));
    let registry = registry();
    let scanner = Scanner::new(&store, &registry, config(vec![1, 2], false));
    let as_of = last_date(&store);

    let output = scanner
        .scan(&ScanRequest::new(["stacked"]).latest(true).as_of(as_of))
        .unwrap();

    assert_eq!(output.rows.len(), 1);
    let row = &output.rows[0];
    assert_eq!(row.signal_date, as_of);
    assert_eq!(row.entry_date, None);
    assert!(row.returns.iter().all(|r| r.value == ForwardReturn::NotApplicable));
    assert_eq!(output.fetch_start, Some(as_of - Duration::days(280)));
}

#[test]
fn latest_only_without_signal_on_last_bar_is_empty() {
    let mut closes = breakout_closes();
    closes.push(10.0);
    let store = MemoryStore::new(bars("A", &closes));
    let registry = registry();
    let scanner = Scanner::new(&store, &registry, config(vec![1], true));

    let output = scanner
        .scan(&ScanRequest::new(["stacked"]).latest(true).as_of(last_date(&store)))
        .unwrap();
    assert!(output.rows.is_empty());
}

#[test]
fn daily_entry_is_next_open_and_final_bar_has_no_entry() {
    let store = MemoryStore::new(bars("A", &breakout_closes()));
    let registry = registry();
    let scanner = Scanner::new(&store, &registry, config(vec![1, 2], true));
    let output = scanner
        .scan(&ScanRequest::new(["stacked"]).as_of(last_date(&store)))
        .unwrap();

    // Signal on the 110 bar, entry at the 120 bar's open (119).
    let first = &output.rows[0];
    assert_eq!(first.close, 110.0);
    assert_eq!(first.entry_price, Some(119.0));
    assert_eq!(first.return_at(1), Some(ForwardReturn::Value(9.24)));
    assert_eq!(first.return_at(2), Some(ForwardReturn::InsufficientData));

    let last = &output.rows[2];
    assert_eq!(last.entry_date, None);
    assert_eq!(last.entry_price, None);
    assert!(last.returns.iter().all(|r| r.value == ForwardReturn::InsufficientData));
}

#[test]
fn date_window_filters_signals() {
    let store = MemoryStore::new(bars("A", &breakout_closes()));
    let registry = registry();
    let scanner = Scanner::new(&store, &registry, config(vec![1], true));
    let dates = weekdays(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 80);

    let output = scanner
        .scan(&ScanRequest::new(["stacked"]).between(Some(dates[78]), Some(dates[78])))
        .unwrap();
    assert_eq!(output.rows.len(), 1);
    assert_eq!(output.rows[0].signal_date, dates[78]);
    assert_eq!(output.fetch_start, Some(dates[78] - Duration::days(250)));
}

#[test]
fn weekly_entry_is_signal_close_on_friday() {
    let closes: Vec<f64> = (0..40).map(|i| 50.0 + i as f64).collect();
    let store = MemoryStore::new(bars("W", &closes));
    let registry = registry();
    let scanner = Scanner::new(&store, &registry, config(vec![1], true));

    let output = scanner
        .scan(&ScanRequest::new(["weekly_rising"]).as_of(last_date(&store)))
        .unwrap();

    // Eight weeks; MA5 is defined from week five and rising from week six.
    assert_eq!(output.rows.len(), 3);
    for row in &output.rows {
        assert_eq!(row.granularity, Granularity::Weekly);
        assert_eq!(row.signal_date.weekday(), Weekday::Fri);
        assert_eq!(row.entry_date, Some(row.signal_date));
        assert_eq!(row.entry_price, Some(row.close));
    }
    assert_eq!(output.rows[0].return_at(1), Some(ForwardReturn::Value(6.33)));
    assert_eq!(output.rows[2].return_at(1), Some(ForwardReturn::InsufficientData));
}

// ── Soft and hard failures ───────────────────────────────────────────

#[test]
fn unknown_id_is_skipped_not_fatal() {
    let store = MemoryStore::new(bars("A", &breakout_closes()));
    let registry = registry();
    let scanner = Scanner::new(&store, &registry, config(vec![1], true));

    let output = scanner
        .scan(&ScanRequest::new(["nope", "stacked", "stacked"]))
        .unwrap();
    assert_eq!(output.strategy_ids, vec!["stacked".to_string()]);
    assert_eq!(output.skipped, vec!["nope".to_string()]);
    assert_eq!(output.rows.len(), 3);
}

#[test]
fn nothing_resolved_does_not_touch_store() {
    let store = CsvStore::new("/nonexistent/prices.csv");
    let registry = registry();
    let scanner = Scanner::new(&store, &registry, ScanConfig::default());

    let output = scanner.scan(&ScanRequest::new(["nope"])).unwrap();
    assert!(output.rows.is_empty());
    assert_eq!(output.rows_loaded, 0);
}

#[test]
fn missing_store_is_fatal() {
    let store = CsvStore::new("/nonexistent/prices.csv");
    let registry = registry();
    let scanner = Scanner::new(&store, &registry, ScanConfig::default());

    let err = scanner.scan(&ScanRequest::new(["stacked"])).unwrap_err();
    assert!(matches!(err, ScanError::Store(StoreError::NotFound(_))));
}

#[test]
fn invalid_config_is_fatal() {
    let store = MemoryStore::default();
    let registry = registry();
    let scanner = Scanner::new(&store, &registry, config(vec![], true));
    assert!(matches!(
        scanner.scan(&ScanRequest::new(["stacked"])),
        Err(ScanError::Config(_))
    ));
}

// ── Determinism ──────────────────────────────────────────────────────

fn synthetic() -> SyntheticStore {
    SyntheticStore::new(
        (1..=6).map(|i| (format!("{i:04}"), format!("Synthetic {i}"))).collect(),
        NaiveDate::from_ymd_opt(2021, 1, 4).unwrap(),
        NaiveDate::from_ymd_opt(2023, 12, 29).unwrap(),
    )
}

fn all_builtin_ids() -> Vec<String> {
    StrategyRegistry::builtin()
        .specs()
        .iter()
        .map(|s| s.id.clone())
        .collect()
}

#[test]
fn parallel_matches_sequential() {
    let store = synthetic();
    let registry = StrategyRegistry::builtin();
    let request = ScanRequest::new(all_builtin_ids()).as_of(NaiveDate::from_ymd_opt(2023, 12, 29).unwrap());

    let parallel = Scanner::new(&store, registry, config(vec![5, 10, 20, 60], true))
        .scan(&request)
        .unwrap();
    let sequential = Scanner::new(&store, registry, config(vec![5, 10, 20, 60], false))
        .scan(&request)
        .unwrap();

    assert_eq!(parallel, sequential);
    assert_eq!(parallel.securities, 6);
}

#[test]
fn rescan_is_identical() {
    let store = synthetic();
    let registry = StrategyRegistry::builtin();
    let scanner = Scanner::new(&store, registry, ScanConfig::default());
    let request = ScanRequest::new(all_builtin_ids()).as_of(NaiveDate::from_ymd_opt(2023, 12, 29).unwrap());

    let a = scanner.scan(&request).unwrap();
    let b = scanner.scan(&request).unwrap();
    assert_eq!(a.fingerprint, b.fingerprint);
    assert_eq!(export_json(&a).unwrap(), export_json(&b).unwrap());
}

#[test]
fn output_is_grouped_by_security_then_request_order() {
    let store = synthetic();
    let registry = StrategyRegistry::builtin();
    let scanner = Scanner::new(&store, registry, ScanConfig::default());
    let mut ids = all_builtin_ids();
    ids.reverse();
    let request = ScanRequest::new(ids.clone()).as_of(NaiveDate::from_ymd_opt(2023, 12, 29).unwrap());
    let output = scanner.scan(&request).unwrap();

    let position = |id: &str| ids.iter().position(|x| x == id).unwrap();
    for pair in output.rows.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let key_a = (&a.security_id, position(&a.strategy_id), a.signal_date);
        let key_b = (&b.security_id, position(&b.strategy_id), b.signal_date);
        assert!(key_a < key_b, "{key_a:?} !< {key_b:?}");
    }
}

#[test]
fn progress_reaches_total() {
    let store = synthetic();
    let registry = StrategyRegistry::builtin();
    let scanner = Scanner::new(&store, registry, ScanConfig::default());
    let seen = Mutex::new(Vec::new());

    scanner
        .scan_with_progress(&ScanRequest::new(["MA5_cross_MA10"]), |done, total| {
            seen.lock().unwrap().push((done, total));
        })
        .unwrap();

    let mut seen = seen.into_inner().unwrap();
    seen.sort();
    assert_eq!(seen.len(), 6);
    assert_eq!(seen.last(), Some(&(6, 6)));
}

// ── Summaries and export ─────────────────────────────────────────────

#[test]
fn summaries_and_json_export() {
    let store = MemoryStore::new(bars("A", &breakout_closes()));
    let registry = registry();
    let scanner = Scanner::new(&store, &registry, config(vec![1, 2], true));
    let output = scanner.scan(&ScanRequest::new(["stacked"])).unwrap();

    let summaries = summarize_by_strategy(&output.rows, &output.horizons);
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].signal_count, 3);
    let h1 = summaries[0].horizon(1).unwrap();
    assert_eq!(h1.valid_count, 1);
    assert!(summaries[0].horizon(2).unwrap().stats.is_none());

    let json = export_json(&output).unwrap();
    assert_eq!(import_json(&json).unwrap(), output);
}
