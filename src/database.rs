//! The `Database` handle: one backend connection, one transaction coordinator.
//!
//! Read paths (`execute*`) return `Result` and surface the engine's error unchanged.
//! Convenience mutations, transaction steps and lifecycle calls return an [`Outcome`].

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::binder::BoundParams;
use crate::document::{DocumentRow, INSERT_DOCUMENT_SQL};
use crate::error::DataAccessError;
use crate::outcome::Outcome;
use crate::record::Record;
use crate::results::ResultSet;
use crate::statement::{Statement, build_clear, build_delete, build_insert, build_update};
use crate::transaction::TransactionCoordinator;
use crate::types::{DatabaseType, RowValues};

pub struct Database {
    backend: Arc<dyn Backend>,
    coordinator: TransactionCoordinator,
    revision: u32,
    closed: AtomicBool,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("engine", &self.backend.database_type())
            .field("revision", &self.revision)
            .field("coordinator", &self.coordinator)
            .field("closed", &self.closed.load(Ordering::Acquire))
            .finish()
    }
}

impl Database {
    /// Wrap an already-open backend.
    #[must_use]
    pub fn with_backend(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            coordinator: TransactionCoordinator::new(),
            revision: 0,
            closed: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn with_revision(mut self, revision: u32) -> Self {
        self.revision = revision;
        self
    }

    /// Open a `SQLite` database file (or `:memory:`).
    ///
    /// # Errors
    /// Returns `DataAccessError` if the file cannot be opened.
    #[cfg(feature = "sqlite")]
    pub async fn open_sqlite(opts: crate::sqlite::SqliteOptions) -> Result<Self, DataAccessError> {
        let backend = crate::sqlite::SqliteBackend::open(opts).await?;
        Ok(Self::with_backend(Arc::new(backend)))
    }

    /// Connect to SQL Server.
    ///
    /// # Errors
    /// Returns `DataAccessError` if the connection or login fails.
    #[cfg(feature = "mssql")]
    pub async fn open_mssql(opts: crate::mssql::MssqlOptions) -> Result<Self, DataAccessError> {
        let backend = crate::mssql::MssqlBackend::connect(opts).await?;
        Ok(Self::with_backend(Arc::new(backend)))
    }

    #[must_use]
    pub fn database_type(&self) -> DatabaseType {
        self.backend.database_type()
    }

    #[must_use]
    pub fn revision(&self) -> u32 {
        self.revision
    }

    /// Directory holding the database file; `None` for in-memory and server engines.
    #[must_use]
    pub fn database_directory(&self) -> Option<PathBuf> {
        self.backend.database_directory()
    }

    fn ensure_open(&self) -> Result<(), DataAccessError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(DataAccessError::closed());
        }
        Ok(())
    }

    async fn run_query(&self, sql: &str, params: &BoundParams) -> Result<ResultSet, DataAccessError> {
        self.ensure_open()?;
        debug!(
            in_transaction = self.coordinator.is_active(),
            bindings = params.len(),
            sql,
            "query"
        );
        self.backend.query(sql, params).await
    }

    async fn run_execute(&self, sql: &str, params: &BoundParams) -> Result<usize, DataAccessError> {
        self.ensure_open()?;
        debug!(
            in_transaction = self.coordinator.is_active(),
            bindings = params.len(),
            sql,
            "execute"
        );
        self.backend.execute(sql, params).await
    }

    /// Run arbitrary SQL and return its rows.
    ///
    /// # Errors
    /// Returns the engine's error if the statement fails to prepare or run.
    pub async fn execute(&self, sql: &str) -> Result<ResultSet, DataAccessError> {
        self.run_query(sql, &BoundParams::new()).await
    }

    /// Run SQL and return the number of rows it changed.
    ///
    /// # Errors
    /// Returns the engine's error if the statement fails to prepare or run.
    pub async fn execute_non_query(&self, sql: &str) -> Result<usize, DataAccessError> {
        self.run_execute(sql, &BoundParams::new()).await
    }

    /// First column of the first row, or `None` when the query returns no rows.
    ///
    /// # Errors
    /// Returns the engine's error if the statement fails to prepare or run.
    pub async fn execute_scalar(&self, sql: &str) -> Result<Option<RowValues>, DataAccessError> {
        let rs = self.run_query(sql, &BoundParams::new()).await?;
        Ok(rs.scalar().cloned())
    }

    /// Like [`execute_scalar`](Self::execute_scalar) with the record bound as parameters.
    ///
    /// # Errors
    /// Returns the engine's error, or `ParameterError` if the SQL names an unbound placeholder.
    pub async fn execute_scalar_with_record(
        &self,
        sql: &str,
        record: &Record,
    ) -> Result<Option<RowValues>, DataAccessError> {
        let rs = self.run_query(sql, &BoundParams::from_record(record)).await?;
        Ok(rs.scalar().cloned())
    }

    /// Run a parameterized query with the record bound as parameters.
    ///
    /// # Errors
    /// Returns the engine's error, or `ParameterError` if the SQL names an unbound placeholder.
    pub async fn execute_dynamic(
        &self,
        sql: &str,
        record: &Record,
    ) -> Result<ResultSet, DataAccessError> {
        self.run_query(sql, &BoundParams::from_record(record)).await
    }

    /// [`execute_dynamic`](Self::execute_dynamic) plus one binary payload bound under
    /// `field`, after the record's own bindings.
    ///
    /// # Errors
    /// Returns the engine's error, or `ParameterError` if the SQL names an unbound placeholder.
    pub async fn execute_dynamic_with_blob(
        &self,
        sql: &str,
        record: &Record,
        field: &str,
        bytes: Vec<u8>,
    ) -> Result<ResultSet, DataAccessError> {
        let params = BoundParams::from_record(record).with_blob(field, bytes);
        self.run_query(sql, &params).await
    }

    async fn run_statement(&self, op: &'static str, table: &str, stmt: &Statement) -> Outcome {
        match self.run_execute(&stmt.sql, &stmt.bindings).await {
            Ok(rows) => {
                debug!(op, table, rows, "statement applied");
                Outcome::Succeeded
            }
            Err(err) => {
                warn!(op, table, error = %err, "statement failed");
                Outcome::Failed(err)
            }
        }
    }

    fn reject_unquotable(op: &'static str, table: &str, record: &Record) -> Option<Outcome> {
        let key = record.unquotable_column()?;
        let err = DataAccessError::ParameterError(format!("column name {key} cannot be quoted"));
        warn!(op, table, error = %err, "statement failed");
        Some(Outcome::Failed(err))
    }

    /// Insert the record's columns as one row of `table`.
    ///
    /// Fails with `ParameterError` when a column key contains `]`.
    pub async fn insert_record(&self, table: &str, record: &Record) -> Outcome {
        if let Some(rejected) = Self::reject_unquotable("insert", table, record) {
            return rejected;
        }
        let stmt = build_insert(table, record);
        self.run_statement("insert", table, &stmt).await
    }

    /// Update rows of `table` matching `where_clause`; an empty clause updates every row.
    pub async fn update_record(&self, table: &str, record: &Record, where_clause: &str) -> Outcome {
        if let Some(rejected) = Self::reject_unquotable("update", table, record) {
            return rejected;
        }
        let stmt = build_update(table, record, where_clause);
        if stmt.column_count == 0 {
            let err =
                DataAccessError::ExecutionError(format!("update of {table} has no columns to set"));
            warn!(op = "update", table, error = %err, "statement failed");
            return Outcome::Failed(err);
        }
        self.run_statement("update", table, &stmt).await
    }

    /// Delete rows of `table` matching `where_clause`; an empty clause deletes every row.
    pub async fn delete_record(&self, table: &str, record: &Record, where_clause: &str) -> Outcome {
        let stmt = build_delete(table, record, where_clause);
        self.run_statement("delete", table, &stmt).await
    }

    pub async fn clear_table(&self, table: &str) -> Outcome {
        let stmt = build_clear(table);
        self.run_statement("clear", table, &stmt).await
    }

    /// Insert one row into the `[documents]` table.
    pub async fn insert_document(&self, row: &DocumentRow) -> Outcome {
        let params = row.bindings();
        match self.run_execute(INSERT_DOCUMENT_SQL, &params).await {
            Ok(_) => Outcome::Succeeded,
            Err(err) => {
                warn!(op = "insert_document", id = row.id, error = %err, "statement failed");
                Outcome::Failed(err)
            }
        }
    }

    /// Wait for the transaction lock and BEGIN. Concurrent callers queue; nested calls
    /// from the holder block.
    pub async fn begin_transaction(&self) -> Outcome {
        if let Err(err) = self.ensure_open() {
            return Outcome::Failed(err);
        }
        self.coordinator.begin(self.backend.as_ref()).await
    }

    pub async fn commit(&self) -> Outcome {
        self.coordinator.commit(self.backend.as_ref()).await
    }

    pub async fn rollback(&self) -> Outcome {
        self.coordinator.rollback(self.backend.as_ref()).await
    }

    /// Whether a transaction holds (or is acquiring) the lock.
    #[must_use]
    pub fn transaction_lock_status(&self) -> bool {
        self.coordinator.is_locked()
    }

    /// Roll back any open transaction and release the connection.
    ///
    /// Closing an already closed database is a `NoOp`.
    pub async fn close(&self) -> Outcome {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Outcome::NoOp;
        }
        if let Outcome::Failed(err) = self.coordinator.rollback(self.backend.as_ref()).await {
            warn!(error = %err, "rollback during close failed");
        }
        match self.backend.close().await {
            Ok(_) => {
                info!(engine = ?self.backend.database_type(), "database closed");
                Outcome::Succeeded
            }
            Err(err) => {
                self.closed.store(false, Ordering::Release);
                warn!(error = %err, "close failed");
                Outcome::Failed(err)
            }
        }
    }

    /// Create a database on a server engine. `NoOp` for single-file engines.
    pub async fn create_database(&self, name: &str) -> Outcome {
        if let Err(err) = self.ensure_open() {
            return Outcome::Failed(err);
        }
        match self.backend.create_database(name).await {
            Ok(true) => Outcome::Succeeded,
            Ok(false) => Outcome::NoOp,
            Err(err) => Outcome::Failed(err),
        }
    }

    /// Drop a database on a server engine. `NoOp` for single-file engines.
    pub async fn drop_database(&self, name: &str) -> Outcome {
        if let Err(err) = self.ensure_open() {
            return Outcome::Failed(err);
        }
        match self.backend.drop_database(name).await {
            Ok(true) => Outcome::Succeeded,
            Ok(false) => Outcome::NoOp,
            Err(err) => Outcome::Failed(err),
        }
    }

    /// Whether `name` exists. Always true for single-file engines.
    ///
    /// # Errors
    /// Returns the engine's error if the lookup fails.
    pub async fn check_database_exists(&self, name: &str) -> Result<bool, DataAccessError> {
        self.ensure_open()?;
        self.backend.database_exists(name).await
    }
}
