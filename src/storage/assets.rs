//! Undeclared assets table loader
//!
//! Replaces the destination table with the current batch of rows inside one
//! transaction: truncate, insert every row, commit. Any failure rolls the
//! whole transaction back.

use crate::error::{BoxError, LoadError};
use crate::etl::Loader;
use crate::monday::{ITEM_NAME, Row};

use chrono::NaiveDateTime;
use eyre::Result;
use std::future::Future;
use tokio::sync::Mutex;

/// Destination columns in insert order, paired with the row key feeding each
pub const COLUMN_MAP: [(&str, &str); 7] = [
    ("Site_ID", ITEM_NAME),
    ("Approver", "person"),
    ("Status", "status"),
    ("Start_Date", "date4"),
    ("End_Date", "date__1"),
    ("Untracked_Asset_Values", "numbers__1"),
    ("Purpose", "text3__1"),
];

/// One row of the destination table, minus the load date
///
/// Values stay text; the server converts them to the column types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationRow {
    pub site_id: Option<String>,
    pub approver: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub untracked_asset_values: Option<String>,
    pub purpose: Option<String>,
}

impl DestinationRow {
    /// Pick the known columns out of a row
    ///
    /// Keys outside [`COLUMN_MAP`] are dropped and empty strings become null.
    pub fn from_row(row: &Row) -> Self {
        let field = |key: &str| {
            row.get(key)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        let [site_id, approver, status, start_date, end_date, untracked_asset_values, purpose] =
            COLUMN_MAP.map(|(_, key)| field(key));
        Self {
            site_id,
            approver,
            status,
            start_date,
            end_date,
            untracked_asset_values,
            purpose,
        }
    }

    /// Values in [`COLUMN_MAP`] order
    pub fn values(&self) -> [&Option<String>; 7] {
        [
            &self.site_id,
            &self.approver,
            &self.status,
            &self.start_date,
            &self.end_date,
            &self.untracked_asset_values,
            &self.purpose,
        ]
    }
}

/// Transactional access to the destination table
///
/// [`TableLoader`] drives these calls in order: `begin`, `truncate`, one
/// `insert` per row, then `commit`, or `rollback` after the first failure.
pub trait AssetTable: Send {
    fn begin(&mut self) -> impl Future<Output = Result<(), BoxError>> + Send;

    fn truncate(&mut self) -> impl Future<Output = Result<(), BoxError>> + Send;

    fn insert(
        &mut self,
        row: &DestinationRow,
        load_date: NaiveDateTime,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;

    fn commit(&mut self) -> impl Future<Output = Result<(), BoxError>> + Send;

    fn rollback(&mut self) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Loader that replaces an [`AssetTable`]'s contents with a batch of rows
///
/// Every row of a load shares one `Load_Date`, taken when the load starts.
pub struct TableLoader<T> {
    table: Mutex<T>,
}

impl<T: AssetTable> TableLoader<T> {
    pub fn new(table: T) -> Self {
        Self {
            table: Mutex::new(table),
        }
    }

    /// Give back the table, e.g. to inspect it after a load
    pub fn into_inner(self) -> T {
        self.table.into_inner()
    }

    async fn replace(
        table: &mut T,
        rows: &[DestinationRow],
        load_date: NaiveDateTime,
    ) -> Result<usize, LoadError> {
        table.truncate().await.map_err(LoadError::Truncate)?;
        log::info!("Destination table truncated");

        for (row, values) in rows.iter().enumerate() {
            table
                .insert(values, load_date)
                .await
                .map_err(|source| LoadError::Insert { row, source })?;
        }
        Ok(rows.len())
    }
}

impl<T: AssetTable> Loader for TableLoader<T> {
    type Item = Row;

    async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
        let rows: Vec<DestinationRow> = items.iter().map(DestinationRow::from_row).collect();
        let load_date = chrono::Local::now().naive_local();
        log::debug!("Loading {} rows with Load_Date {}", rows.len(), load_date);

        let mut table = self.table.lock().await;
        table.begin().await.map_err(LoadError::Begin)?;

        let outcome = match Self::replace(&mut table, &rows, load_date).await {
            Ok(count) => table.commit().await.map(|_| count).map_err(LoadError::Commit),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(count) => {
                log::info!("Inserted {} rows", count);
                Ok(count)
            }
            Err(e) => {
                log::error!("{}; rolling back", e);
                if let Err(rollback) = table.rollback().await {
                    log::error!("Rollback failed: {}", rollback);
                }
                Err(e.into())
            }
        }
    }
}
