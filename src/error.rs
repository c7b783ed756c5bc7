//! Typed failures for each pipeline stage
//!
//! Stage code returns `eyre::Result`; these types ride inside the report so
//! callers can tell a fetch failure from a load failure with `downcast_ref`.

use thiserror::Error;

/// Boxed cause carried by [`LoadError`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure while pulling items from the monday.com API
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("monday.com API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response structure: {0}")]
    UnexpectedShape(String),

    #[error("monday.com API reported errors: {0}")]
    Api(String),

    #[error("failed to send request to monday.com: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("failed to decode monday.com response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Why an item was left out of the transformed batch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("item is not a mapping: {0}")]
    NotAMapping(String),

    #[error("column_values is not a sequence: {0}")]
    ColumnValuesNotASequence(String),
}

/// Failure while replacing the destination table. The transaction has been
/// rolled back by the time this is returned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open transaction")]
    Begin(#[source] BoxError),

    #[error("failed to truncate destination table")]
    Truncate(#[source] BoxError),

    #[error("failed to insert row {row}")]
    Insert {
        row: usize,
        #[source]
        source: BoxError,
    },

    #[error("failed to commit transaction")]
    Commit(#[source] BoxError),
}

/// Missing or malformed configuration value
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },

    #[error(
        "trusted SQL Server connections are only available on Windows; \
         set SQL_TRUSTED=No with SQL_USERNAME and SQL_PASSWORD"
    )]
    IntegratedAuthUnavailable,
}
