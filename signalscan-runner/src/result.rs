//! Signal rows produced by a scan.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use signalscan_core::Granularity;

use crate::returns::ForwardReturn;

/// Forward return at one horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizonReturn {
    pub horizon: usize,
    pub value: ForwardReturn,
}

/// One strategy match on one bar of one security.
///
/// `entry_date` and `entry_price` are absent for latest-only scans and for
/// daily signals on the final bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRow {
    pub strategy_id: String,
    pub granularity: Granularity,
    pub security_id: String,
    pub name: String,
    pub signal_date: NaiveDate,
    pub close: f64,
    pub entry_date: Option<NaiveDate>,
    pub entry_price: Option<f64>,
    pub returns: Vec<HorizonReturn>,
}

impl SignalRow {
    pub fn return_at(&self, horizon: usize) -> Option<ForwardReturn> {
        self.returns
            .iter()
            .find(|r| r.horizon == horizon)
            .map(|r| r.value)
    }

    /// Numeric return at `horizon`, `None` for markers or an unknown horizon.
    pub fn valid_return(&self, horizon: usize) -> Option<f64> {
        self.return_at(horizon).and_then(ForwardReturn::value)
    }

    pub(crate) fn hash_into(&self, hasher: &mut blake3::Hasher) {
        hasher.update(self.strategy_id.as_bytes());
        hasher.update(self.security_id.as_bytes());
        hasher.update(self.signal_date.to_string().as_bytes());
        hasher.update(&self.close.to_le_bytes());
        if let Some(date) = self.entry_date {
            hasher.update(date.to_string().as_bytes());
        }
        if let Some(price) = self.entry_price {
            hasher.update(&price.to_le_bytes());
        }
        for r in &self.returns {
            hasher.update(&(r.horizon as u64).to_le_bytes());
            hasher.update(r.value.to_string().as_bytes());
        }
    }
}
