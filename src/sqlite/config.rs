use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::error::DataAccessError;

/// Options for opening a `SQLite` database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteOptions {
    /// File path, `:memory:`, or a `file:` URI.
    pub db_path: String,
}

impl SqliteOptions {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Whether the path names an in-memory database rather than a file.
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        let path = self.db_path.trim();
        path.is_empty()
            || path == ":memory:"
            || path.starts_with("file::memory:")
            || path.contains("mode=memory")
    }
}

/// Fluent builder for `SQLite` options.
#[derive(Debug, Clone)]
pub struct SqliteOptionsBuilder {
    opts: SqliteOptions,
}

impl SqliteOptionsBuilder {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            opts: SqliteOptions::new(db_path),
        }
    }

    #[must_use]
    pub fn db_path(mut self, db_path: impl Into<String>) -> Self {
        self.opts.db_path = db_path.into();
        self
    }

    #[must_use]
    pub fn finish(self) -> SqliteOptions {
        self.opts
    }

    /// Open a [`Database`] over these options.
    ///
    /// # Errors
    ///
    /// Returns `DataAccessError` if the database file cannot be opened.
    pub async fn build(self) -> Result<Database, DataAccessError> {
        Database::open_sqlite(self.finish()).await
    }
}

impl Database {
    #[must_use]
    pub fn sqlite_builder(db_path: impl Into<String>) -> SqliteOptionsBuilder {
        SqliteOptionsBuilder::new(db_path)
    }
}
