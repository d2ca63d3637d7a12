//! CSV-backed price store.
//!
//! Expected header: `date,security_id,name,open,high,low,close`. Dates are
//! ISO `YYYY-MM-DD`. Empty price cells read as NaN; those bars are void and
//! simply leave undefined indicator values behind them.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use super::store::{in_range, sort_rows, PriceRow, PriceStore, StoreError};

#[derive(Debug, Deserialize)]
struct CsvRecord {
    date: NaiveDate,
    security_id: String,
    #[serde(default)]
    name: String,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
}

impl From<CsvRecord> for PriceRow {
    fn from(r: CsvRecord) -> Self {
        PriceRow {
            security_id: r.security_id,
            name: r.name,
            date: r.date,
            open: r.open.unwrap_or(f64::NAN),
            high: r.high.unwrap_or(f64::NAN),
            low: r.low.unwrap_or(f64::NAN),
            close: r.close.unwrap_or(f64::NAN),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PriceStore for CsvStore {
    fn load_prices(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<PriceRow>, StoreError> {
        if !self.path.exists() {
            return Err(StoreError::NotFound(self.path.clone()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)?;

        let mut rows = Vec::new();
        let mut void = 0usize;
        for record in reader.deserialize::<CsvRecord>() {
            let row = PriceRow::from(record?);
            if !in_range(row.date, start, end) {
                continue;
            }
            if row.is_void() {
                void += 1;
            }
            rows.push(row);
        }
        sort_rows(&mut rows);

        debug!(path = %self.path.display(), rows = rows.len(), void, "loaded CSV prices");
        Ok(rows)
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }
}

/// Write rows as a CSV store file.
pub fn write_csv(path: &Path, rows: &[PriceRow]) -> Result<(), StoreError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["date", "security_id", "name", "open", "high", "low", "close"])?;
    let cell = |v: f64| if v.is_nan() { String::new() } else { v.to_string() };
    for row in rows {
        writer.write_record([
            row.date.format("%Y-%m-%d").to_string(),
            row.security_id.clone(),
            row.name.clone(),
            cell(row.open),
            cell(row.high),
            cell(row.low),
            cell(row.close),
        ])?;
    }
    writer.flush().map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
