use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::error::DataAccessError;
#[cfg(feature = "mssql")]
use crate::mssql::MssqlOptions;
#[cfg(feature = "sqlite")]
use crate::sqlite::SqliteOptions;
use crate::types::DatabaseType;

/// Engine selection plus the options for that engine.
///
/// ```rust
/// use record_store::prelude::*;
///
/// let config = DatabaseConfig::from_json(
///     r#"{ "engine": "sqlite", "revision": 3, "sqlite": { "db_path": ":memory:" } }"#,
/// )?;
/// assert_eq!(config.engine, DatabaseType::Sqlite);
/// assert_eq!(config.revision, 3);
/// # Ok::<(), DataAccessError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub engine: DatabaseType,
    /// Schema revision recorded by the application. Not interpreted here.
    #[serde(default)]
    pub revision: u32,
    #[cfg(feature = "sqlite")]
    #[serde(default)]
    pub sqlite: Option<SqliteOptions>,
    #[cfg(feature = "mssql")]
    #[serde(default)]
    pub mssql: Option<MssqlOptions>,
}

impl DatabaseConfig {
    /// Parse a config from JSON.
    ///
    /// # Errors
    /// Returns `DataAccessError::ConfigError` if the JSON is malformed or names an unknown engine.
    pub fn from_json(json: &str) -> Result<Self, DataAccessError> {
        serde_json::from_str(json)
            .map_err(|e| DataAccessError::ConfigError(format!("invalid database config: {e}")))
    }
}

fn missing_options(engine: DatabaseType) -> DataAccessError {
    DataAccessError::ConfigError(format!("engine {engine:?} selected but no options given"))
}

impl Database {
    /// Open the engine a [`DatabaseConfig`] selects.
    ///
    /// # Errors
    /// Returns `DataAccessError::ConfigError` if the selected engine has no options or is not
    /// compiled in, or the engine's own error if opening fails.
    pub async fn connect(config: DatabaseConfig) -> Result<Self, DataAccessError> {
        let db = match config.engine {
            #[cfg(feature = "sqlite")]
            DatabaseType::Sqlite => {
                let opts = config
                    .sqlite
                    .ok_or_else(|| missing_options(config.engine))?;
                Database::open_sqlite(opts).await?
            }
            #[cfg(feature = "mssql")]
            DatabaseType::Mssql => {
                let opts = config
                    .mssql
                    .ok_or_else(|| missing_options(config.engine))?;
                Database::open_mssql(opts).await?
            }
            #[allow(unreachable_patterns)]
            other => {
                return Err(DataAccessError::ConfigError(format!(
                    "engine {other:?} is not enabled in this build"
                )));
            }
        };
        Ok(db.with_revision(config.revision))
    }
}
