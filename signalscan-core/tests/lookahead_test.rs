//! Look-ahead contamination tests for indicators and every built-in strategy.
//!
//! Invariant: no indicator value or signal at row t may depend on price data
//! from row t+1 or later.
//!
//! Method: compute on a truncated series (first 150 bars) and the full series
//! (300 bars). Everything computed for the shared prefix must be identical.

use chrono::NaiveDate;
use signalscan_core::components::indicator::{compute_indicators, DEFAULT_WINDOWS};
use signalscan_core::{PriceBar, SecuritySeries, StrategyRegistry};

/// Deterministic walk with frequent flat stretches so flat/equality
/// strategies get a chance to fire.
fn make_test_bars(n: usize) -> Vec<PriceBar> {
    let base_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut price = 100.0_f64;
    (0..n)
        .map(|i| {
            let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let step = match seed % 7 {
                0 | 1 => 0.0,
                2 | 3 => 1.0,
                4 => -1.0,
                5 => 2.0,
                _ => -2.0,
            };
            price = (price + step).max(10.0);
            PriceBar {
                security_id: "LA".into(),
                name: "Lookahead".into(),
                date: base_date + chrono::Duration::days(i as i64),
                open: price,
                high: price + 1.0,
                low: price - 1.0,
                close: price,
            }
        })
        .collect()
}

#[test]
fn daily_indicators_do_not_look_ahead() {
    let bars = make_test_bars(300);
    let full = compute_indicators(&SecuritySeries::new("LA", "Lookahead", bars.clone()), &DEFAULT_WINDOWS, false);
    let short = compute_indicators(
        &SecuritySeries::new("LA", "Lookahead", bars[..150].to_vec()),
        &DEFAULT_WINDOWS,
        false,
    );
    for column in short.columns().collect::<Vec<_>>() {
        for row in 0..short.len() {
            assert_eq!(
                short.value(column, row),
                full.value(column, row),
                "{column} differs at row {row}"
            );
        }
    }
}

#[test]
fn strategies_do_not_look_ahead() {
    let bars = make_test_bars(300);
    let registry = StrategyRegistry::builtin();

    for resample in [false, true] {
        let full = compute_indicators(&SecuritySeries::new("LA", "Lookahead", bars.clone()), &DEFAULT_WINDOWS, resample);
        let short = compute_indicators(
            &SecuritySeries::new("LA", "Lookahead", bars[..150].to_vec()),
            &DEFAULT_WINDOWS,
            resample,
        );
        // The last truncated week may be partial; compare completed weeks only.
        let shared = if resample { short.len() - 1 } else { short.len() };

        for spec in registry.specs() {
            let a = spec.evaluate(&short);
            let b = spec.evaluate(&full);
            assert_eq!(a[..shared], b[..shared], "{} leaks future data", spec.id);
        }
    }
}
