//! SignalScan Core: domain types, indicators, pattern predicates, strategies
//! and price stores.
//!
//! This crate holds everything that does not orchestrate a scan:
//! - Domain types (price bars, per-security series, weekly resampling)
//! - Moving-average indicator frames
//! - Three-valued pattern predicates over indicator values
//! - Strategy specs, ordering shortcuts and the built-in registry
//! - Read-only price stores (CSV, Parquet, memory, synthetic)

pub mod components;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod strategy;

pub use components::{compute_indicators, IndicatorFrame, MaColumn, PatternPredicate, Predicate, Truth};
pub use data::{group_by_security, PriceRow, PriceStore, StoreError};
pub use domain::{Granularity, PriceBar, SecuritySeries};
pub use strategy::{RegistryError, StrategyRegistry, StrategySpec};
