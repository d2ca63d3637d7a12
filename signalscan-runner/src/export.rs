//! Export: signal tables and summary reports as CSV, full scan output as JSON.
//!
//! Return markers are written the way they display: `N/A` for insufficient
//! data, `-` for not applicable.

use anyhow::{Context, Result};

use crate::metrics::{format_pf, PerformanceSummary};
use crate::result::SignalRow;
use crate::returns::ForwardReturn;
use crate::scan::ScanOutput;

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a full `ScanOutput` to pretty JSON.
pub fn export_json(output: &ScanOutput) -> Result<String> {
    serde_json::to_string_pretty(output).context("failed to serialize ScanOutput to JSON")
}

pub fn import_json(json: &str) -> Result<ScanOutput> {
    serde_json::from_str(json).context("failed to deserialize ScanOutput from JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

fn signal_header(horizons: &[usize]) -> Vec<String> {
    let mut header: Vec<String> = [
        "strategy",
        "security_id",
        "name",
        "signal_date",
        "close",
        "entry_date",
        "entry_price",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    header.extend(horizons.iter().map(|h| format!("return_{h}")));
    header
}

fn signal_record(row: &SignalRow, horizons: &[usize]) -> Vec<String> {
    let mut record = vec![
        row.strategy_id.clone(),
        row.security_id.clone(),
        row.name.clone(),
        row.signal_date.to_string(),
        format!("{:.2}", row.close),
        row.entry_date.map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
        row.entry_price.map(|p| format!("{p:.2}")).unwrap_or_else(|| "-".into()),
    ];
    record.extend(horizons.iter().map(|&h| {
        row.return_at(h)
            .unwrap_or(ForwardReturn::NotApplicable)
            .to_string()
    }));
    record
}

/// One line per signal row, one `return_<h>` column per horizon.
pub fn export_signals_csv(rows: &[SignalRow], horizons: &[usize]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(signal_header(horizons))?;
    for row in rows {
        wtr.write_record(signal_record(row, horizons))?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Scan parameters printed at the top of a report.
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub strategy_ids: Vec<String>,
    pub latest_only: bool,
    pub fetch_start: String,
    pub end: String,
    pub securities: usize,
    pub fingerprint: String,
}

impl ReportMeta {
    pub fn from_output(output: &ScanOutput) -> Self {
        let or_open = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "-".into());
        Self {
            strategy_ids: output.strategy_ids.clone(),
            latest_only: output.latest_only,
            fetch_start: or_open(output.fetch_start),
            end: or_open(output.end),
            securities: output.securities,
            fingerprint: output.fingerprint.clone(),
        }
    }
}

/// Parameters block, then the per-horizon summary table, then every row.
///
/// Sections are separated by a single-cell `# <name>` line.
pub fn export_report_csv(
    meta: &ReportMeta,
    summaries: &[PerformanceSummary],
    rows: &[SignalRow],
    horizons: &[usize],
) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(vec![]);

    wtr.write_record(["# parameters"])?;
    wtr.write_record(["strategies", meta.strategy_ids.join(";").as_str()])?;
    wtr.write_record(["latest_only", meta.latest_only.to_string().as_str()])?;
    wtr.write_record(["fetch_start", meta.fetch_start.as_str()])?;
    wtr.write_record(["end", meta.end.as_str()])?;
    wtr.write_record(["securities", meta.securities.to_string().as_str()])?;
    wtr.write_record(["fingerprint", meta.fingerprint.as_str()])?;

    wtr.write_record(["# summary"])?;
    wtr.write_record([
        "strategy",
        "period",
        "signals",
        "valid",
        "avg_return",
        "win_rate",
        "profit_factor",
        "expectancy",
        "max_drawdown",
        "max_consecutive_losses",
    ])?;
    for summary in summaries {
        for h in &summary.horizons {
            let mut record = vec![
                summary.strategy_id.clone(),
                h.horizon.to_string(),
                summary.signal_count.to_string(),
                h.valid_count.to_string(),
            ];
            match &h.stats {
                Some(s) => record.extend([
                    format!("{:.2}", s.avg_return),
                    format!("{:.2}", s.win_rate),
                    format_pf(s.profit_factor),
                    format!("{:.2}", s.expectancy),
                    format!("{:.2}", s.max_drawdown),
                    s.max_consecutive_losses.to_string(),
                ]),
                None => record.extend(std::iter::repeat("-".to_string()).take(6)),
            }
            wtr.write_record(record)?;
        }
    }

    wtr.write_record(["# signals"])?;
    wtr.write_record(signal_header(horizons))?;
    for row in rows {
        wtr.write_record(signal_record(row, horizons))?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}
