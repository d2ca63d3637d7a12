//! Component traits and their implementations.
//!
//! - Indicator: bar history in, numeric series out, computed once per security
//! - Pattern predicate: three-valued condition over indicator values at a row

pub mod indicator;
pub mod predicate;

pub use indicator::{compute_indicators, Indicator, IndicatorFrame, MaColumn, DEFAULT_WINDOWS};
pub use predicate::{PatternPredicate, Predicate, Truth};
