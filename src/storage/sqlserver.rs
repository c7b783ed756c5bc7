//! SQL Server destination
//!
//! [`SqlServerTable`] implements [`AssetTable`] over a single tiberius
//! connection. Transactions are plain `BEGIN TRANSACTION` / `COMMIT` /
//! `ROLLBACK` statements on that connection, with `XACT_ABORT` on so a failed
//! statement dooms the whole transaction.

use super::assets::{AssetTable, COLUMN_MAP, DestinationRow};
use crate::config::{SqlAuth, SqlConfig};
use crate::error::{BoxError, ConfigError};

use chrono::NaiveDateTime;
use eyre::{Context, Result};
use owo_colors::OwoColorize;
use tiberius::{Client, Config, ToSql};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

/// Destination table on a SQL Server instance
pub struct SqlServerTable {
    client: Client<Compat<TcpStream>>,
    truncate_sql: String,
    insert_sql: String,
}

impl SqlServerTable {
    /// Open a connection described by `config`
    ///
    /// # Errors
    /// Returns an error if the settings cannot be expressed as a tiberius
    /// config, the server cannot be reached, or login fails
    pub async fn connect(config: &SqlConfig) -> Result<Self> {
        let tds = tds_config(config)?;

        log::info!(
            "Connecting to {} / {} ({})",
            config.server.bright_black(),
            config.database.bright_black(),
            config.auth
        );
        let tcp = TcpStream::connect(tds.get_addr())
            .await
            .with_context(|| format!("Failed to reach SQL Server at {}", config.server))?;
        tcp.set_nodelay(true)?;

        let client = Client::connect(tds, tcp.compat_write())
            .await
            .with_context(|| format!("Failed to log in to {}", config.server))?;

        Ok(Self {
            client,
            truncate_sql: truncate_statement(&config.table),
            insert_sql: insert_statement(&config.table),
        })
    }

    /// Send `sql` as a plain batch, outside sp_executesql
    async fn run(&mut self, sql: &str) -> Result<(), BoxError> {
        self.client.simple_query(sql).await?.into_results().await?;
        Ok(())
    }
}

impl AssetTable for SqlServerTable {
    async fn begin(&mut self) -> Result<(), BoxError> {
        self.run("SET XACT_ABORT ON; BEGIN TRANSACTION").await
    }

    async fn truncate(&mut self) -> Result<(), BoxError> {
        let sql = self.truncate_sql.clone();
        self.run(&sql).await
    }

    async fn insert(
        &mut self,
        row: &DestinationRow,
        load_date: NaiveDateTime,
    ) -> Result<(), BoxError> {
        let [p1, p2, p3, p4, p5, p6, p7] = row.values();
        let params: [&dyn ToSql; 8] = [p1, p2, p3, p4, p5, p6, p7, &load_date];
        self.client.execute(self.insert_sql.as_str(), &params).await?;
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), BoxError> {
        self.run("COMMIT TRANSACTION").await
    }

    async fn rollback(&mut self) -> Result<(), BoxError> {
        self.run("IF @@TRANCOUNT > 0 ROLLBACK TRANSACTION").await
    }
}

/// Parsed tiberius config for `config`
///
/// Trusted connections need Windows authentication. Elsewhere tiberius would
/// silently fall back to a SQL login with an empty user, so this is refused
/// before any connection attempt.
pub fn tds_config(config: &SqlConfig) -> Result<Config> {
    if config.auth == SqlAuth::Integrated && !cfg!(windows) {
        return Err(ConfigError::IntegratedAuthUnavailable.into());
    }
    Config::from_ado_string(&connection_string(config))
        .context("Invalid SQL Server connection settings")
}

/// ADO.NET style connection string for tiberius
pub fn connection_string(config: &SqlConfig) -> String {
    let mut ado = format!(
        "server=tcp:{};database={};",
        escape(&config.server),
        escape(&config.database)
    );
    match &config.auth {
        SqlAuth::Integrated => ado.push_str("IntegratedSecurity=true;"),
        SqlAuth::Login { username, password } => {
            ado.push_str(&format!(
                "user id={};password={};",
                escape(username),
                escape(password)
            ));
        }
    }
    if config.trust_server_certificate {
        ado.push_str("TrustServerCertificate=true;");
    }
    ado
}

/// Quote a connection string value when it contains separators
fn escape(value: &str) -> String {
    match value.contains([';', '=', '{', '}']) || value.trim() != value {
        true => format!("{{{}}}", value.replace('}', "}}")),
        false => value.to_string(),
    }
}

fn truncate_statement(table: &str) -> String {
    format!("TRUNCATE TABLE {}", table)
}

fn insert_statement(table: &str) -> String {
    let columns: Vec<&str> = COLUMN_MAP.iter().map(|(column, _)| *column).collect();
    let params: Vec<String> = (1..=COLUMN_MAP.len() + 1).map(|i| format!("@P{}", i)).collect();
    format!(
        "INSERT INTO {} ({}, Load_Date) VALUES ({})",
        table,
        columns.join(", "),
        params.join(", ")
    )
}
