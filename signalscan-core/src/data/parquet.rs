//! Parquet-backed price store and Parquet writer.
//!
//! Columns: `date` (Date), `security_id`, `name` (String), `open`, `high`,
//! `low`, `close` (Float64). Null prices read as NaN.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate};
use polars::prelude::*;
use tracing::debug;

use super::store::{in_range, sort_rows, PriceRow, PriceStore, StoreError};

const COLUMNS: [&str; 7] = ["date", "security_id", "name", "open", "high", "low", "close"];

#[derive(Debug, Clone)]
pub struct ParquetStore {
    path: PathBuf,
}

impl ParquetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PriceStore for ParquetStore {
    fn load_prices(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<PriceRow>, StoreError> {
        if !self.path.exists() {
            return Err(StoreError::NotFound(self.path.clone()));
        }
        let file = fs::File::open(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        let df = ParquetReader::new(file)
            .finish()
            .map_err(|e| StoreError::Parquet(format!("read: {e}")))?;

        let mut rows: Vec<PriceRow> = dataframe_to_rows(&df)?
            .into_iter()
            .filter(|r| in_range(r.date, start, end))
            .collect();
        sort_rows(&mut rows);

        debug!(path = %self.path.display(), rows = rows.len(), "loaded Parquet prices");
        Ok(rows)
    }

    fn describe(&self) -> String {
        format!("parquet:{}", self.path.display())
    }
}

/// Write rows to a Parquet file, replacing any existing file.
pub fn write_parquet(path: &Path, rows: &[PriceRow]) -> Result<(), StoreError> {
    let mut df = rows_to_dataframe(rows)?;
    let file = fs::File::create(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ParquetWriter::new(file)
        .finish(&mut df)
        .map_err(|e| StoreError::Parquet(format!("write: {e}")))?;
    Ok(())
}

fn epoch() -> NaiveDate {
    NaiveDate::default()
}

fn rows_to_dataframe(rows: &[PriceRow]) -> Result<DataFrame, StoreError> {
    let days: Vec<i32> = rows
        .iter()
        .map(|r| (r.date - epoch()).num_days() as i32)
        .collect();
    let ids: Vec<&str> = rows.iter().map(|r| r.security_id.as_str()).collect();
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    let price = |f: fn(&PriceRow) -> f64| -> Vec<Option<f64>> {
        rows.iter()
            .map(|r| Some(f(r)).filter(|v| !v.is_nan()))
            .collect()
    };

    DataFrame::new(vec![
        Column::new("date".into(), days)
            .cast(&DataType::Date)
            .map_err(|e| StoreError::Parquet(format!("date cast: {e}")))?,
        Column::new("security_id".into(), ids),
        Column::new("name".into(), names),
        Column::new("open".into(), price(|r| r.open)),
        Column::new("high".into(), price(|r| r.high)),
        Column::new("low".into(), price(|r| r.low)),
        Column::new("close".into(), price(|r| r.close)),
    ])
    .map_err(|e| StoreError::Parquet(format!("dataframe: {e}")))
}

fn dataframe_to_rows(df: &DataFrame) -> Result<Vec<PriceRow>, StoreError> {
    for name in COLUMNS {
        if df.column(name).is_err() {
            return Err(StoreError::MissingColumn(name.to_string()));
        }
    }
    let typed = |name: &str, e: PolarsError| StoreError::Parquet(format!("{name} column: {e}"));
    let col = |name: &str| {
        df.column(name)
            .map_err(|_| StoreError::MissingColumn(name.to_string()))
    };

    let dates = col("date")?.date().map_err(|e| typed("date", e))?;
    let ids = col("security_id")?.str().map_err(|e| typed("security_id", e))?;
    let names = col("name")?.str().map_err(|e| typed("name", e))?;
    let opens = col("open")?.f64().map_err(|e| typed("open", e))?;
    let highs = col("high")?.f64().map_err(|e| typed("high", e))?;
    let lows = col("low")?.f64().map_err(|e| typed("low", e))?;
    let closes = col("close")?.f64().map_err(|e| typed("close", e))?;

    let mut rows = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let days = dates
            .get(i)
            .ok_or_else(|| StoreError::Parquet(format!("null date at row {i}")))?;
        let security_id = ids
            .get(i)
            .ok_or_else(|| StoreError::Parquet(format!("null security_id at row {i}")))?;
        rows.push(PriceRow {
            security_id: security_id.to_string(),
            name: names.get(i).unwrap_or_default().to_string(),
            date: epoch() + Duration::days(days as i64),
            open: opens.get(i).unwrap_or(f64::NAN),
            high: highs.get(i).unwrap_or(f64::NAN),
            low: lows.get(i).unwrap_or(f64::NAN),
            close: closes.get(i).unwrap_or(f64::NAN),
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, day: u32, close: f64) -> PriceRow {
        PriceRow {
            security_id: id.into(),
            name: format!("{id} Co"),
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
        }
    }

    #[test]
    fn write_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.parquet");
        let rows = vec![row("2330", 5, 600.0), row("1101", 4, 40.0), row("1101", 5, 41.0)];
        write_parquet(&path, &rows).unwrap();

        let loaded = ParquetStore::new(&path).load_prices(None, None).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0], rows[1]);
        assert_eq!(loaded[2].security_id, "2330");
        assert_eq!(loaded[2].name, "2330 Co");
    }

    #[test]
    fn nan_prices_survive_as_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("void.parquet");
        let mut void = row("1101", 6, 40.0);
        void.close = f64::NAN;
        write_parquet(&path, &[void]).unwrap();

        let loaded = ParquetStore::new(&path).load_prices(None, None).unwrap();
        assert!(loaded[0].close.is_nan());
        assert!(loaded[0].is_void());
    }

    #[test]
    fn range_filter_applies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.parquet");
        write_parquet(&path, &[row("1101", 4, 40.0), row("1101", 5, 41.0)]).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 4);
        let loaded = ParquetStore::new(&path).load_prices(None, end).unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = ParquetStore::new("/nonexistent/prices.parquet")
            .load_prices(None, None)
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
