//! Convenient imports for common functionality.
//!
//! Re-exports the types most callers need to open a database, build records and run
//! statements.

pub use crate::backend::{Backend, quote_identifier};
pub use crate::binder::{Binding, BoundParams};
pub use crate::config::DatabaseConfig;
pub use crate::database::Database;
pub use crate::document::DocumentRow;
pub use crate::error::DataAccessError;
pub use crate::outcome::Outcome;
pub use crate::record::{CastType, Record, RecordEntry};
pub use crate::results::{ResultRow, ResultSet};
pub use crate::statement::{Statement, build_clear, build_delete, build_insert, build_update};
pub use crate::transaction::TransactionCoordinator;
pub use crate::translation::{PositionalSql, translate_named_placeholders};
pub use crate::types::{DatabaseType, RowValues};

#[cfg(feature = "sqlite")]
pub use crate::exports::{SqliteBackend, SqliteOptions, SqliteOptionsBuilder};

#[cfg(feature = "mssql")]
pub use crate::exports::{MssqlBackend, MssqlOptions, MssqlOptionsBuilder};
