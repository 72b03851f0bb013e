use std::path::PathBuf;

use async_trait::async_trait;

use crate::binder::BoundParams;
use crate::error::DataAccessError;
use crate::results::ResultSet;
use crate::types::DatabaseType;

/// A single connection that can run parameterized statements.
///
/// Implementations serialize access to their connection internally, so one backend can be
/// shared by every caller of a [`Database`](crate::Database).
#[async_trait]
pub trait Backend: Send + Sync {
    fn database_type(&self) -> DatabaseType;

    /// Run a statement and materialize its rows.
    async fn query(&self, sql: &str, params: &BoundParams)
    -> Result<ResultSet, DataAccessError>;

    /// Run a statement and return the number of rows it changed.
    async fn execute(&self, sql: &str, params: &BoundParams) -> Result<usize, DataAccessError>;

    /// Run one or more statements without parameters.
    async fn execute_batch(&self, sql: &str) -> Result<(), DataAccessError>;

    async fn begin(&self) -> Result<(), DataAccessError>;

    async fn commit(&self) -> Result<(), DataAccessError>;

    async fn rollback(&self) -> Result<(), DataAccessError>;

    /// Create a database. Returns `false` when the engine has nothing to create.
    async fn create_database(&self, name: &str) -> Result<bool, DataAccessError>;

    /// Drop a database. Returns `false` when the engine has nothing to drop.
    async fn drop_database(&self, name: &str) -> Result<bool, DataAccessError>;

    async fn database_exists(&self, name: &str) -> Result<bool, DataAccessError>;

    /// Directory holding the database file, for file-backed engines.
    fn database_directory(&self) -> Option<PathBuf> {
        None
    }

    /// Release the connection. Closing twice returns `Ok(false)` the second time.
    async fn close(&self) -> Result<bool, DataAccessError>;
}

/// Quote an identifier for `[bracket]` syntax, doubling any closing bracket.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}
