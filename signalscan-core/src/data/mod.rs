//! Price stores and row grouping.
//!
//! The scan reads daily rows through the `PriceStore` trait and never writes
//! back. CSV and Parquet files, in-memory rows and a synthetic generator all
//! sit behind the same seam.

pub mod csv_store;
pub mod group;
pub mod memory;
pub mod parquet;
pub mod store;
pub mod synthetic;

pub use csv_store::{write_csv, CsvStore};
pub use group::group_by_security;
pub use memory::MemoryStore;
pub use parquet::{write_parquet, ParquetStore};
pub use store::{in_range, sort_rows, PriceRow, PriceStore, StoreError};
pub use synthetic::SyntheticStore;
