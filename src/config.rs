//! Run configuration
//!
//! Everything the sync needs is read once at startup into a [`SyncConfig`]
//! and handed to the extractor and loader explicitly.

use crate::error::ConfigError;
use eyre::{Context, Result};
use std::str::FromStr;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.monday.com/v2";
pub const DEFAULT_TABLE: &str = "dbo.Undelcared_Assets_Monday_API";

/// `table` or `schema.table`, each part a plain or bracketed identifier
const TABLE_PATTERN: &str = r"^(?:(?:[A-Za-z_][A-Za-z0-9_]*|\[[A-Za-z_][A-Za-z0-9_ ]*\])\.)?(?:[A-Za-z_][A-Za-z0-9_]*|\[[A-Za-z_][A-Za-z0-9_ ]*\])$";

#[derive(Clone, Debug)]
pub struct SyncConfig {
    pub api: ApiConfig,
    pub sql: SqlConfig,
}

/// monday.com connection settings
#[derive(Clone)]
pub struct ApiConfig {
    pub url: Url,
    pub api_key: String,
    /// Sent as the `API-Version` header when set
    pub api_version: Option<String>,
    pub board_id: String,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("url", &self.url.as_str())
            .field("api_version", &self.api_version)
            .field("board_id", &self.board_id)
            .finish_non_exhaustive()
    }
}

/// SQL Server connection settings
#[derive(Clone, Debug)]
pub struct SqlConfig {
    pub server: String,
    pub database: String,
    pub auth: SqlAuth,
    pub table: String,
    pub trust_server_certificate: bool,
}

#[derive(Clone, PartialEq, Eq)]
pub enum SqlAuth {
    /// Trusted connection using the identity of the running process
    Integrated,
    /// SQL Server login
    Login { username: String, password: String },
}

impl std::fmt::Debug for SqlAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integrated => write!(f, "Integrated"),
            Self::Login { username, .. } => write!(f, "Login({username})"),
        }
    }
}

impl std::fmt::Display for SqlAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integrated => write!(f, "Integrated"),
            Self::Login { .. } => write!(f, "Login"),
        }
    }
}

/// Yes/no switch as written in `.env` files
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Flag(pub bool);

impl FromStr for Flag {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yes" | "true" | "1" => Ok(Self(true)),
            "no" | "false" | "0" => Ok(Self(false)),
            _ => Err(()),
        }
    }
}

impl SyncConfig {
    /// Load configuration from the process environment
    ///
    /// Expected environment variables:
    /// - MONDAY_API_KEY: API token (required)
    /// - MONDAY_API_VERSION: value of the API-Version header (optional)
    /// - MONDAY_BOARD_ID: board to read (required)
    /// - MONDAY_API_URL: API endpoint (optional, defaults to the public endpoint)
    /// - SQL_SERVER, SQL_DATABASE: destination (required)
    /// - SQL_TRUSTED: use a trusted connection, Windows only (optional, defaults to "Yes")
    /// - SQL_USERNAME, SQL_PASSWORD: login when SQL_TRUSTED is "No"
    /// - SQL_TABLE: destination table as `schema.table` (optional)
    /// - SQL_TRUST_SERVER_CERTIFICATE: skip TLS certificate validation (optional, defaults to "No")
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let url_str = get("MONDAY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let url = Url::parse(&url_str)
            .with_context(|| format!("Invalid MONDAY_API_URL: {}", url_str))?;

        let api = ApiConfig {
            url,
            api_key: require("MONDAY_API_KEY")?,
            api_version: get("MONDAY_API_VERSION"),
            board_id: require("MONDAY_BOARD_ID")?,
        };

        let trusted = parse_flag(&get, "SQL_TRUSTED", true)?;
        let auth = match trusted {
            true => SqlAuth::Integrated,
            false => SqlAuth::Login {
                username: require("SQL_USERNAME")?,
                password: require("SQL_PASSWORD")?,
            },
        };

        let table = get("SQL_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string());
        let table_pattern =
            regex::Regex::new(TABLE_PATTERN).context("Invalid table name pattern")?;
        if !table_pattern.is_match(table.trim()) {
            return Err(ConfigError::Invalid {
                key: "SQL_TABLE",
                value: table,
            }
            .into());
        }

        let sql = SqlConfig {
            server: require("SQL_SERVER")?,
            database: require("SQL_DATABASE")?,
            auth,
            table: table.trim().to_string(),
            trust_server_certificate: parse_flag(&get, "SQL_TRUST_SERVER_CERTIFICATE", false)?,
        };

        Ok(Self { api, sql })
    }
}

fn parse_flag<G>(get: &G, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    G: Fn(&'static str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(value) => value
            .parse::<Flag>()
            .map(|flag| flag.0)
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const BASE: &[(&str, &str)] = &[
        ("MONDAY_API_KEY", "secret"),
        ("MONDAY_BOARD_ID", "123456"),
        ("SQL_SERVER", "sql01"),
        ("SQL_DATABASE", "EDW"),
    ];

    #[test]
    fn test_defaults() {
        let config = SyncConfig::from_lookup(lookup(BASE)).unwrap();
        assert_eq!(config.api.url.as_str(), "https://api.monday.com/v2");
        assert_eq!(config.api.api_version, None);
        assert_eq!(config.sql.auth, SqlAuth::Integrated);
        assert_eq!(config.sql.table, DEFAULT_TABLE);
        assert!(!config.sql.trust_server_certificate);
    }

    #[test]
    fn test_missing_required() {
        let err = SyncConfig::from_lookup(lookup(&BASE[1..])).unwrap_err();
        match err.downcast_ref::<ConfigError>() {
            Some(ConfigError::Missing(key)) => assert_eq!(*key, "MONDAY_API_KEY"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_blank_counts_as_missing() {
        let pairs: Vec<_> = BASE
            .iter()
            .map(|&(k, v)| if k == "MONDAY_BOARD_ID" { (k, "  ") } else { (k, v) })
            .collect();
        let err = SyncConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Missing("MONDAY_BOARD_ID"))
        ));
    }

    #[test]
    fn test_untrusted_requires_login() {
        let mut pairs = BASE.to_vec();
        pairs.push(("SQL_TRUSTED", "No"));
        assert!(SyncConfig::from_lookup(lookup(&pairs)).is_err());

        pairs.push(("SQL_USERNAME", "loader"));
        pairs.push(("SQL_PASSWORD", "hunter2"));
        let config = SyncConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(
            config.sql.auth,
            SqlAuth::Login {
                username: "loader".to_string(),
                password: "hunter2".to_string()
            }
        );
        assert!(!format!("{:?}", config).contains("hunter2"));
        assert!(!format!("{:?}", config).contains("secret"));
    }

    #[test]
    fn test_invalid_flag() {
        let mut pairs = BASE.to_vec();
        pairs.push(("SQL_TRUSTED", "maybe"));
        let err = SyncConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Invalid { key: "SQL_TRUSTED", .. })
        ));
    }

    #[test]
    fn test_table_names() {
        for table in ["Assets", "dbo.Assets", "[dbo].[Undeclared Assets]", "stage.Assets_2024"] {
            let mut pairs = BASE.to_vec();
            pairs.push(("SQL_TABLE", table));
            let config = SyncConfig::from_lookup(lookup(&pairs)).unwrap();
            assert_eq!(config.sql.table, table);
        }

        for table in ["dbo.Assets; DROP TABLE dbo.Users", "EDW.dbo.Assets", "dbo.", "1Assets"] {
            let mut pairs = BASE.to_vec();
            pairs.push(("SQL_TABLE", table));
            let err = SyncConfig::from_lookup(lookup(&pairs)).unwrap_err();
            assert!(
                matches!(
                    err.downcast_ref::<ConfigError>(),
                    Some(ConfigError::Invalid { key: "SQL_TABLE", .. })
                ),
                "{} was accepted",
                table
            );
        }
    }

    #[test]
    fn test_flag_parsing() {
        assert_eq!("YES".parse::<Flag>(), Ok(Flag(true)));
        assert_eq!("true".parse::<Flag>(), Ok(Flag(true)));
        assert_eq!(" 0 ".parse::<Flag>(), Ok(Flag(false)));
        assert!("y".parse::<Flag>().is_err());
    }

    #[test]
    fn test_from_dotenv_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "MONDAY_API_KEY=abc\nMONDAY_API_VERSION=2024-10\nMONDAY_BOARD_ID=42\nSQL_SERVER=db\nSQL_DATABASE=EDW\nSQL_TABLE=dbo.Assets"
        )
        .unwrap();

        let vars: HashMap<String, String> = dotenvy::from_path_iter(file.path())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        let config = SyncConfig::from_lookup(|key| vars.get(key).cloned()).unwrap();
        assert_eq!(config.api.api_version.as_deref(), Some("2024-10"));
        assert_eq!(config.api.board_id, "42");
        assert_eq!(config.sql.table, "dbo.Assets");
    }
}
