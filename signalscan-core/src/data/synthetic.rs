//! Deterministic synthetic price store.
//!
//! Generates a weekday-only random walk per security, seeded from the
//! security id with BLAKE3. The same id and date always give the same bar,
//! whatever window is requested. Never used unless asked for explicitly.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

use super::store::{in_range, PriceRow, PriceStore, StoreError};

#[derive(Debug, Clone)]
pub struct SyntheticStore {
    securities: Vec<(String, String)>,
    first_date: NaiveDate,
    last_date: NaiveDate,
}

impl SyntheticStore {
    /// `securities` is a list of `(security_id, name)`; bars exist on
    /// weekdays from `first_date` through `last_date`.
    pub fn new(securities: Vec<(String, String)>, first_date: NaiveDate, last_date: NaiveDate) -> Self {
        let mut securities = securities;
        securities.sort();
        securities.dedup_by(|a, b| a.0 == b.0);
        Self {
            securities,
            first_date,
            last_date,
        }
    }

    /// Full walk for one security.
    fn generate(&self, security_id: &str, name: &str) -> Vec<PriceRow> {
        let seed: [u8; 32] = *blake3::hash(security_id.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        let mut bars = Vec::new();
        let mut price = rng.gen_range(20.0..200.0_f64);
        let mut current = self.first_date;
        while current <= self.last_date {
            if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                current += Duration::days(1);
                continue;
            }
            let change: f64 = rng.gen_range(-0.03..0.03);
            let open = price;
            let close = ((price * (1.0 + change)) * 100.0).round() / 100.0;
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            bars.push(PriceRow {
                security_id: security_id.to_string(),
                name: name.to_string(),
                date: current,
                open,
                high,
                low,
                close,
            });
            price = close;
            current += Duration::days(1);
        }
        bars
    }
}

impl PriceStore for SyntheticStore {
    fn load_prices(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<PriceRow>, StoreError> {
        warn!(
            securities = self.securities.len(),
            "generating synthetic prices; results are not market data"
        );
        let mut rows = Vec::new();
        for (id, name) in &self.securities {
            rows.extend(
                self.generate(id, name)
                    .into_iter()
                    .filter(|r| in_range(r.date, start, end)),
            );
        }
        Ok(rows)
    }

    fn describe(&self) -> String {
        format!("synthetic:{} securities", self.securities.len())
    }
}
