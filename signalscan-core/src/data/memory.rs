use chrono::NaiveDate;

use super::store::{in_range, sort_rows, PriceRow, PriceStore, StoreError};

/// In-memory price store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rows: Vec<PriceRow>,
}

impl MemoryStore {
    pub fn new(mut rows: Vec<PriceRow>) -> Self {
        sort_rows(&mut rows);
        Self { rows }
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }
}

impl PriceStore for MemoryStore {
    fn load_prices(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<PriceRow>, StoreError> {
        Ok(self
            .rows
            .iter()
            .filter(|r| in_range(r.date, start, end))
            .cloned()
            .collect())
    }

    fn describe(&self) -> String {
        format!("memory:{} rows", self.rows.len())
    }
}
