//! The read-only price store seam.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::domain::PriceBar;

/// One stored row. Same shape as a daily bar.
pub type PriceRow = PriceBar;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("price store not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet error: {0}")]
    Parquet(String),

    #[error("missing column '{0}'")]
    MissingColumn(String),
}

/// Source of daily price rows.
///
/// Implementations return rows with `start <= date <= end` (either bound may
/// be open), ordered by `(security_id, date)`.
pub trait PriceStore: Send + Sync {
    fn load_prices(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<PriceRow>, StoreError>;

    /// Short label for logs.
    fn describe(&self) -> String;
}

/// Inclusive optional-bound date filter.
pub fn in_range(date: NaiveDate, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    start.map_or(true, |s| date >= s) && end.map_or(true, |e| date <= e)
}

/// Stable sort by `(security_id, date)`.
pub fn sort_rows(rows: &mut [PriceRow]) {
    rows.sort_by(|a, b| {
        a.security_id
            .cmp(&b.security_id)
            .then_with(|| a.date.cmp(&b.date))
    });
}
