//! Board to table sync
//!
//! Pipeline: BoardExtractor → ItemFlattener → TableLoader

use crate::{
    client::{GraphQl, MondayClient},
    config::SyncConfig,
    etl::{Pipeline, RunReport},
    monday::{BoardExtractor, ItemFlattener},
    storage::{AssetTable, SqlServerTable, TableLoader},
};
use eyre::{Context, Result};
use owo_colors::OwoColorize;

/// Replace the configured table with the configured board's items
///
/// Opens the SQL Server connection first, then runs the pipeline over it.
pub async fn sync_board(config: &SyncConfig) -> Result<RunReport> {
    let client =
        MondayClient::from_config(&config.api).context("Failed to create monday.com client")?;
    let table = SqlServerTable::connect(&config.sql).await?;

    log::info!(
        "Syncing board {} into {}",
        config.api.board_id.cyan(),
        config.sql.table.cyan()
    );
    run_sync(client, &config.api.board_id, table).await
}

/// Run the pipeline for `board_id` against any API client and table
pub async fn run_sync<C, T>(client: C, board_id: &str, table: T) -> Result<RunReport>
where
    C: GraphQl,
    T: AssetTable,
{
    let pipeline = Pipeline::new(
        BoardExtractor::new(client, board_id),
        ItemFlattener,
        TableLoader::new(table),
    );
    pipeline.run().await
}
