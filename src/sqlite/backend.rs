use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::config::SqliteOptions;
use super::connection::{self, SharedSqliteConnection, run_blocking};
use super::params::bind_params;
use super::query::build_result_set;
use crate::backend::Backend;
use crate::binder::BoundParams;
use crate::error::DataAccessError;
use crate::results::ResultSet;
use crate::types::DatabaseType;

/// Backend over a single `rusqlite` connection.
pub struct SqliteBackend {
    conn: SharedSqliteConnection,
    opts: SqliteOptions,
}

impl std::fmt::Debug for SqliteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBackend")
            .field("db_path", &self.opts.db_path)
            .finish_non_exhaustive()
    }
}

impl SqliteBackend {
    /// Open the database named by `opts`.
    ///
    /// # Errors
    /// Returns `DataAccessError` if `SQLite` cannot open the path.
    pub async fn open(opts: SqliteOptions) -> Result<Self, DataAccessError> {
        let conn = connection::open(opts.db_path.clone()).await?;
        info!(db_path = %opts.db_path, "opened sqlite database");
        Ok(Self { conn, opts })
    }

    fn handle(&self) -> SharedSqliteConnection {
        Arc::clone(&self.conn)
    }

    async fn run_control(&self, sql: &'static str) -> Result<(), DataAccessError> {
        run_blocking(self.handle(), move |conn| {
            conn.execute_batch(sql).map_err(DataAccessError::SqliteError)
        })
        .await
    }
}

#[async_trait]
impl Backend for SqliteBackend {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Sqlite
    }

    async fn query(
        &self,
        sql: &str,
        params: &BoundParams,
    ) -> Result<ResultSet, DataAccessError> {
        let sql_owned = sql.to_owned();
        let params_owned = params.clone();
        run_blocking(self.handle(), move |conn| {
            let mut stmt = conn.prepare(&sql_owned)?;
            bind_params(&mut stmt, &params_owned)?;
            build_result_set(&mut stmt)
        })
        .await
    }

    async fn execute(&self, sql: &str, params: &BoundParams) -> Result<usize, DataAccessError> {
        let sql_owned = sql.to_owned();
        let params_owned = params.clone();
        run_blocking(self.handle(), move |conn| {
            let mut stmt = conn.prepare(&sql_owned)?;
            bind_params(&mut stmt, &params_owned)?;
            Ok(stmt.raw_execute()?)
        })
        .await
    }

    async fn execute_batch(&self, sql: &str) -> Result<(), DataAccessError> {
        let sql_owned = sql.to_owned();
        run_blocking(self.handle(), move |conn| {
            conn.execute_batch(&sql_owned)
                .map_err(DataAccessError::SqliteError)
        })
        .await
    }

    async fn begin(&self) -> Result<(), DataAccessError> {
        self.run_control("BEGIN").await
    }

    async fn commit(&self) -> Result<(), DataAccessError> {
        self.run_control("COMMIT").await
    }

    async fn rollback(&self) -> Result<(), DataAccessError> {
        self.run_control("ROLLBACK").await
    }

    // The file is the database; it already exists once the backend is open.
    async fn create_database(&self, _name: &str) -> Result<bool, DataAccessError> {
        Ok(false)
    }

    async fn drop_database(&self, _name: &str) -> Result<bool, DataAccessError> {
        Ok(false)
    }

    async fn database_exists(&self, _name: &str) -> Result<bool, DataAccessError> {
        Ok(true)
    }

    fn database_directory(&self) -> Option<PathBuf> {
        if self.opts.is_in_memory() {
            return None;
        }
        let path = self
            .opts
            .db_path
            .strip_prefix("file:")
            .unwrap_or(&self.opts.db_path);
        let path = path.split('?').next().unwrap_or(path);
        match Path::new(path).parent() {
            Some(parent) if !parent.as_os_str().is_empty() => Some(parent.to_path_buf()),
            _ => Some(PathBuf::from(".")),
        }
    }

    async fn close(&self) -> Result<bool, DataAccessError> {
        let closed = connection::close(self.handle()).await?;
        if closed {
            info!(db_path = %self.opts.db_path, "closed sqlite database");
        }
        Ok(closed)
    }
}
