use serde::{Deserialize, Serialize};
use tiberius::{AuthMethod, Config as TiberiusConfig};

use crate::database::Database;
use crate::error::DataAccessError;

/// Options for connecting to SQL Server.
///
/// Either fill in the individual fields or supply an ADO-style `connection_string`, which
/// takes precedence when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MssqlOptions {
    #[serde(default)]
    pub server: String,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub instance_name: Option<String>,
    #[serde(default)]
    pub connection_string: Option<String>,
}

impl MssqlOptions {
    #[must_use]
    pub fn new(server: String, database: String, user: String, password: String) -> Self {
        Self {
            server,
            database,
            user,
            password,
            port: None,
            instance_name: None,
            connection_string: None,
        }
    }

    /// Options taken entirely from an ADO connection string
    /// (`server=tcp:host,1433;database=app;user=sa;password=...`).
    #[must_use]
    pub fn from_connection_string(connection_string: impl Into<String>) -> Self {
        Self {
            server: String::new(),
            database: String::new(),
            user: String::new(),
            password: String::new(),
            port: None,
            instance_name: None,
            connection_string: Some(connection_string.into()),
        }
    }

    #[must_use]
    pub fn with_port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_instance_name(mut self, instance_name: Option<String>) -> Self {
        self.instance_name = instance_name;
        self
    }
}

/// Fluent builder for MSSQL options.
#[derive(Debug, Clone)]
pub struct MssqlOptionsBuilder {
    opts: MssqlOptions,
}

impl MssqlOptionsBuilder {
    #[must_use]
    pub fn new(server: String, database: String, user: String, password: String) -> Self {
        Self {
            opts: MssqlOptions::new(server, database, user, password),
        }
    }

    #[must_use]
    pub fn port(mut self, port: Option<u16>) -> Self {
        self.opts.port = port;
        self
    }

    #[must_use]
    pub fn instance_name(mut self, instance_name: Option<String>) -> Self {
        self.opts.instance_name = instance_name;
        self
    }

    #[must_use]
    pub fn connection_string(mut self, connection_string: Option<String>) -> Self {
        self.opts.connection_string = connection_string;
        self
    }

    #[must_use]
    pub fn finish(self) -> MssqlOptions {
        self.opts
    }

    /// Connect and open a [`Database`] over these options.
    ///
    /// # Errors
    ///
    /// Returns `DataAccessError` if the server cannot be reached or rejects the login.
    pub async fn build(self) -> Result<Database, DataAccessError> {
        Database::open_mssql(self.finish()).await
    }
}

impl Database {
    #[must_use]
    pub fn mssql_builder(
        server: String,
        database: String,
        user: String,
        password: String,
    ) -> MssqlOptionsBuilder {
        MssqlOptionsBuilder::new(server, database, user, password)
    }
}

/// Translate options into a tiberius `Config`.
///
/// # Errors
/// Returns `DataAccessError::ConfigError` if the connection string does not parse.
pub(crate) fn build_tiberius_config(opts: &MssqlOptions) -> Result<TiberiusConfig, DataAccessError> {
    if let Some(connection_string) = &opts.connection_string {
        return TiberiusConfig::from_ado_string(connection_string).map_err(|e| {
            DataAccessError::ConfigError(format!("invalid SQL Server connection string: {e}"))
        });
    }
    let mut config = TiberiusConfig::new();
    config.host(&opts.server);
    config.database(&opts.database);
    config.port(opts.port.unwrap_or(1433));
    config.authentication(AuthMethod::sql_server(&opts.user, &opts.password));
    if let Some(instance) = &opts.instance_name {
        config.instance_name(instance);
    }
    config.trust_cert();
    Ok(config)
}
