//! Destination storage for transformed rows
//!
//! - [`TableLoader`]: Replaces a table's contents with a batch of rows
//! - [`SqlServerTable`]: The SQL Server table behind it

mod assets;
mod sqlserver;

pub use assets::{AssetTable, COLUMN_MAP, DestinationRow, TableLoader};
pub use sqlserver::{SqlServerTable, connection_string, tds_config};
