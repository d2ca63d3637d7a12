//! SignalScan Runner: scan orchestration, forward returns, performance
//! summaries, export.
//!
//! This crate builds on `signalscan-core` to provide:
//! - TOML scan configuration (store, warm-up buffers, horizons)
//! - The scanner: one store load, per-security evaluation on the rayon pool
//! - Forward-return evaluation with explicit insufficient-data markers
//! - Per-strategy performance summaries
//! - CSV and JSON export

pub mod config;
pub mod export;
pub mod metrics;
pub mod result;
pub mod returns;
pub mod scan;

pub use config::{ConfigError, ScanConfig, StoreConfig, StoreKind, WarmupConfig};
pub use export::{export_json, export_report_csv, export_signals_csv, ReportMeta};
pub use metrics::{summarize, summarize_by_strategy, HorizonStats, PerformanceSummary, ReturnStats};
pub use result::{HorizonReturn, SignalRow};
pub use returns::{compute_return, ForwardReturn};
pub use scan::{ScanError, ScanOutput, ScanRequest, Scanner};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn result_types_are_send_sync() {
        assert_send::<SignalRow>();
        assert_sync::<SignalRow>();
        assert_send::<ScanOutput>();
        assert_sync::<ScanOutput>();
        assert_send::<PerformanceSummary>();
        assert_sync::<PerformanceSummary>();
    }

    #[test]
    fn scanner_is_sync() {
        assert_sync::<Scanner<'static>>();
        assert_send::<ScanRequest>();
        assert_sync::<ScanConfig>();
    }

    #[test]
    fn scan_error_is_send_sync() {
        assert_send::<ScanError>();
        assert_sync::<ScanError>();
    }
}
