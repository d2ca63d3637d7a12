//! SignalScan CLI: list strategies, run scans, convert stores.
//!
//! Commands:
//! - `strategies`: list built-in strategy ids with their warm-up and rule
//! - `scan`: scan a price store for one or more strategies and summarise
//! - `convert`: materialise a CSV price store as Parquet

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use signalscan_core::data::{write_parquet, CsvStore, SyntheticStore};
use signalscan_core::{Granularity, PriceStore, StrategyRegistry};
use signalscan_runner::metrics::{format_pct, format_pf};
use signalscan_runner::{
    export_json, export_report_csv, summarize_by_strategy, PerformanceSummary, ReportMeta,
    ScanConfig, ScanOutput, ScanRequest, Scanner, StoreKind,
};

#[derive(Parser)]
#[command(name = "signalscan", about = "SignalScan: moving-average pattern scanner")]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum StoreFormat {
    Csv,
    Parquet,
}

impl From<StoreFormat> for StoreKind {
    fn from(format: StoreFormat) -> Self {
        match format {
            StoreFormat::Csv => StoreKind::Csv,
            StoreFormat::Parquet => StoreKind::Parquet,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List built-in strategy ids.
    Strategies {
        /// Daily strategies only.
        #[arg(long, default_value_t = false, conflicts_with = "weekly")]
        daily: bool,

        /// Weekly strategies only.
        #[arg(long, default_value_t = false)]
        weekly: bool,
    },
    /// Scan the price store for signals and summarise forward returns.
    Scan {
        /// Strategy ids (see `signalscan strategies`).
        #[arg(required = true)]
        ids: Vec<String>,

        /// Only signals on each security's most recent bar, no returns.
        #[arg(long, default_value_t = false)]
        latest: bool,

        /// First signal date (YYYY-MM-DD).
        #[arg(long)]
        start: Option<String>,

        /// Last signal date (YYYY-MM-DD).
        #[arg(long)]
        end: Option<String>,

        /// Reference date for warm-up buffers (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        as_of: Option<String>,

        /// Path to a TOML scan config.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Price store file; overrides the config.
        #[arg(long)]
        store: Option<PathBuf>,

        /// Store format. Inferred from the file extension when omitted.
        #[arg(long, value_enum)]
        format: Option<StoreFormat>,

        /// Scan deterministic synthetic prices instead of a store.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Write the CSV report (parameters, summary, signals) here.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write the full scan output as JSON here.
        #[arg(long)]
        json: Option<PathBuf>,

        /// Evaluate securities on one thread.
        #[arg(long, default_value_t = false)]
        sequential: bool,
    },
    /// Convert a CSV price store to Parquet.
    Convert {
        csv: PathBuf,
        parquet: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    match cli.command {
        Commands::Strategies { daily, weekly } => run_strategies(daily, weekly),
        Commands::Scan {
            ids,
            latest,
            start,
            end,
            as_of,
            config,
            store,
            format,
            synthetic,
            output,
            json,
            sequential,
        } => {
            let request = ScanRequest::new(ids)
                .latest(latest)
                .between(parse_date(start.as_deref())?, parse_date(end.as_deref())?)
                .as_of(parse_date(as_of.as_deref())?.unwrap_or_else(|| chrono::Local::now().date_naive()));
            let mut scan_config = match config {
                Some(path) => ScanConfig::from_file(&path)?,
                None => ScanConfig::default(),
            };
            apply_overrides(&mut scan_config, store, format, sequential);
            run_scan(&request, scan_config, synthetic, output.as_deref(), json.as_deref())
        }
        Commands::Convert { csv, parquet } => run_convert(&csv, &parquet),
    }
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    value
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'")))
        .transpose()
}

fn apply_overrides(
    config: &mut ScanConfig,
    store: Option<PathBuf>,
    format: Option<StoreFormat>,
    sequential: bool,
) {
    if let Some(path) = store {
        let inferred = match path.extension().and_then(|e| e.to_str()) {
            Some("parquet") => StoreKind::Parquet,
            _ => StoreKind::Csv,
        };
        config.store.kind = inferred;
        config.store.path = path;
    }
    if let Some(format) = format {
        config.store.kind = format.into();
    }
    if sequential {
        config.scan.parallel = false;
    }
}

fn run_strategies(daily: bool, weekly: bool) -> Result<()> {
    let registry = StrategyRegistry::builtin();
    let wanted = |g: Granularity| match (daily, weekly) {
        (true, _) => g == Granularity::Daily,
        (_, true) => g == Granularity::Weekly,
        _ => true,
    };

    for spec in registry.specs().iter().filter(|s| wanted(s.granularity)) {
        println!(
            "{:<22} {:<7} warmup {:>3}  {}",
            spec.id,
            spec.granularity,
            spec.warmup_bars(),
            spec.describe()
        );
    }
    Ok(())
}

fn synthetic_store(as_of: NaiveDate) -> SyntheticStore {
    let securities = ["0050", "1101", "2330", "2454", "2881"]
        .iter()
        .map(|id| (id.to_string(), format!("Synthetic {id}")))
        .collect();
    SyntheticStore::new(securities, as_of - chrono::Duration::days(365 * 3), as_of)
}

fn run_scan(
    request: &ScanRequest,
    config: ScanConfig,
    synthetic: bool,
    output: Option<&Path>,
    json: Option<&Path>,
) -> Result<()> {
    let store: Box<dyn PriceStore> = if synthetic {
        Box::new(synthetic_store(request.as_of))
    } else {
        config.store.open()
    };
    let registry = StrategyRegistry::builtin();
    let scanner = Scanner::new(store.as_ref(), registry, config);

    let result = scanner
        .scan_with_progress(request, |done, total| {
            if done == total || done % 100 == 0 {
                eprintln!("scanned {done}/{total} securities");
            }
        })
        .with_context(|| format!("scan failed ({})", store.describe()))?;

    let summaries = summarize_by_strategy(&result.rows, &result.horizons);
    print_summary(&result, &summaries);
    if synthetic {
        println!("WARNING: Results based on SYNTHETIC data");
        println!();
    }

    if let Some(path) = output {
        let report = export_report_csv(
            &ReportMeta::from_output(&result),
            &summaries,
            &result.rows,
            &result.horizons,
        )?;
        std::fs::write(path, report).with_context(|| format!("writing {}", path.display()))?;
        println!("Report saved to: {}", path.display());
    }
    if let Some(path) = json {
        std::fs::write(path, export_json(&result)?).with_context(|| format!("writing {}", path.display()))?;
        println!("JSON saved to: {}", path.display());
    }
    Ok(())
}

fn run_convert(csv: &Path, parquet: &Path) -> Result<()> {
    let rows = CsvStore::new(csv)
        .load_prices(None, None)
        .with_context(|| format!("reading {}", csv.display()))?;
    write_parquet(parquet, &rows).with_context(|| format!("writing {}", parquet.display()))?;
    println!("Converted {} rows to {}", rows.len(), parquet.display());
    Ok(())
}

fn print_summary(output: &ScanOutput, summaries: &[PerformanceSummary]) {
    println!();
    println!("=== Scan Result ===");
    println!("Strategies:     {}", output.strategy_ids.join(", "));
    if !output.skipped.is_empty() {
        println!("Skipped:        {} (unknown)", output.skipped.join(", "));
    }
    println!("Securities:     {}", output.securities);
    println!("Rows loaded:    {}", output.rows_loaded);
    println!("Signals:        {}", output.rows.len());
    println!("Fingerprint:    {}", output.fingerprint);

    if output.latest_only {
        println!();
        for row in &output.rows {
            println!(
                "{:<22} {:<8} {:<16} {} close {:.2}",
                row.strategy_id, row.security_id, row.name, row.signal_date, row.close
            );
        }
        println!();
        return;
    }

    for summary in summaries {
        println!();
        println!("--- {} ({} signals) ---", summary.strategy_id, summary.signal_count);
        println!(
            "{:>6} {:>6} {:>9} {:>8} {:>7} {:>10} {:>9} {:>7}",
            "period", "valid", "avg", "win", "pf", "expect", "mdd", "streak"
        );
        for h in &summary.horizons {
            match &h.stats {
                Some(s) => println!(
                    "{:>6} {:>6} {:>9} {:>7.1}% {:>7} {:>10} {:>9} {:>7}",
                    h.horizon,
                    h.valid_count,
                    format_pct(s.avg_return),
                    s.win_rate,
                    format_pf(s.profit_factor),
                    format_pct(s.expectancy),
                    format_pct(s.max_drawdown),
                    s.max_consecutive_losses
                ),
                None => println!("{:>6} {:>6}   (no valid returns)", h.horizon, h.valid_count),
            }
        }
    }
    println!();
}
