//! Domain types for SignalScan

pub mod bar;
pub mod series;

pub use bar::PriceBar;
pub use series::{week_ending_friday, Granularity, SecuritySeries};
