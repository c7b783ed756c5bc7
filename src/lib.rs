//! monday.com Asset Sync
//!
//! Replaces a SQL Server table with the items of a monday.com board

pub mod client;
pub mod config;
pub mod error;
pub mod etl;
pub mod monday;
pub mod storage;
pub mod sync;

// Re-exports for convenience
pub use client::{GraphQl, GraphQlRequest, MondayClient};
pub use config::SyncConfig;
pub use error::{FetchError, LoadError, SkipReason};
pub use etl::{Extractor, Loader, Pipeline, RunReport, Transformer};
pub use monday::{BoardExtractor, ItemFlattener, Row};
pub use storage::{AssetTable, DestinationRow, SqlServerTable, TableLoader};
