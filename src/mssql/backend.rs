use async_trait::async_trait;
use tiberius::Query;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::client::{MssqlClient, create_mssql_client};
use super::config::MssqlOptions;
use super::params::bind_query_params;
use super::query::{build_result_set, execute_query};
use crate::backend::{Backend, quote_identifier};
use crate::binder::{Binding, BoundParams};
use crate::error::DataAccessError;
use crate::results::ResultSet;
use crate::types::{DatabaseType, RowValues};

/// Backend over a single tiberius client.
pub struct MssqlBackend {
    client: Mutex<Option<MssqlClient>>,
    opts: MssqlOptions,
}

impl std::fmt::Debug for MssqlBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MssqlBackend")
            .field("server", &self.opts.server)
            .field("database", &self.opts.database)
            .finish_non_exhaustive()
    }
}

/// Escape a value for an `N'...'` literal.
fn string_literal(value: &str) -> String {
    format!("N'{}'", value.replace('\'', "''"))
}

impl MssqlBackend {
    /// Connect to the server named by `opts`.
    ///
    /// # Errors
    /// Returns `DataAccessError` if the connection or login fails.
    pub async fn connect(opts: MssqlOptions) -> Result<Self, DataAccessError> {
        let client = create_mssql_client(&opts).await?;
        info!(server = %opts.server, database = %opts.database, "connected to SQL Server");
        Ok(Self {
            client: Mutex::new(Some(client)),
            opts,
        })
    }

    async fn run_batch(&self, sql: String) -> Result<usize, DataAccessError> {
        let mut guard = self.client.lock().await;
        let client = guard.as_mut().ok_or_else(DataAccessError::closed)?;
        execute_query(client, Query::new(sql)).await
    }
}

#[async_trait]
impl Backend for MssqlBackend {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Mssql
    }

    async fn query(
        &self,
        sql: &str,
        params: &BoundParams,
    ) -> Result<ResultSet, DataAccessError> {
        let query = bind_query_params(sql, params)?;
        let mut guard = self.client.lock().await;
        let client = guard.as_mut().ok_or_else(DataAccessError::closed)?;
        build_result_set(client, query).await
    }

    async fn execute(&self, sql: &str, params: &BoundParams) -> Result<usize, DataAccessError> {
        let query = bind_query_params(sql, params)?;
        let mut guard = self.client.lock().await;
        let client = guard.as_mut().ok_or_else(DataAccessError::closed)?;
        execute_query(client, query).await
    }

    async fn execute_batch(&self, sql: &str) -> Result<(), DataAccessError> {
        self.run_batch(sql.to_owned()).await.map(|_| ())
    }

    async fn begin(&self) -> Result<(), DataAccessError> {
        self.run_batch("BEGIN TRANSACTION".into()).await.map(|_| ())
    }

    async fn commit(&self) -> Result<(), DataAccessError> {
        self.run_batch("COMMIT TRANSACTION".into()).await.map(|_| ())
    }

    async fn rollback(&self) -> Result<(), DataAccessError> {
        self.run_batch("ROLLBACK TRANSACTION".into()).await.map(|_| ())
    }

    async fn create_database(&self, name: &str) -> Result<bool, DataAccessError> {
        self.run_batch(format!("CREATE DATABASE {}", quote_identifier(name)))
            .await?;
        debug!(name, "database created");
        Ok(true)
    }

    // A database cannot be dropped while this connection is using it.
    async fn drop_database(&self, name: &str) -> Result<bool, DataAccessError> {
        let sql = format!(
            "IF DB_NAME() = {} USE [master]; DROP DATABASE {};",
            string_literal(name),
            quote_identifier(name)
        );
        self.run_batch(sql).await?;
        debug!(name, "database dropped");
        Ok(true)
    }

    async fn database_exists(&self, name: &str) -> Result<bool, DataAccessError> {
        let params = BoundParams::from_bindings(vec![Binding::text("name", name)]);
        let rs = self
            .query("SELECT COUNT(*) FROM sys.databases WHERE name = @name", &params)
            .await?;
        Ok(matches!(rs.scalar(), Some(RowValues::Int(n)) if *n > 0))
    }

    async fn close(&self) -> Result<bool, DataAccessError> {
        let Some(client) = self.client.lock().await.take() else {
            return Ok(false);
        };
        client.close().await.map_err(|e| {
            DataAccessError::ConnectionError(format!("SQL Server close error: {e}"))
        })?;
        info!(server = %self.opts.server, "closed SQL Server connection");
        Ok(true)
    }
}
