//! Engine-specific exports.
//!
//! Conditional re-exports for each backend, kept in one place.

// SQLite exports
#[cfg(feature = "sqlite")]
pub use crate::sqlite::SqliteBackend;
#[cfg(feature = "sqlite")]
pub use crate::sqlite::build_result_set as sqlite_build_result_set;
#[cfg(feature = "sqlite")]
pub use crate::sqlite::params::bind_params as sqlite_bind_params;
#[cfg(feature = "sqlite")]
pub use crate::sqlite::{SqliteOptions, SqliteOptionsBuilder};

// SQL Server exports
#[cfg(feature = "mssql")]
pub use crate::mssql::MssqlBackend;
#[cfg(feature = "mssql")]
pub use crate::mssql::client::{MssqlClient, create_mssql_client};
#[cfg(feature = "mssql")]
pub use crate::mssql::params::bind_query_params as mssql_bind_query_params;
#[cfg(feature = "mssql")]
pub use crate::mssql::query::build_result_set as mssql_build_result_set;
#[cfg(feature = "mssql")]
pub use crate::mssql::{MssqlOptions, MssqlOptionsBuilder};
