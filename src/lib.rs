//! Record-oriented async data access.
//!
//! Describe a row as a [`Record`], let the statement builder turn it into parameterized
//! INSERT/UPDATE/DELETE SQL, and run it through a [`Database`] that owns one connection and
//! a single-writer [`TransactionCoordinator`].
//!
//! ```rust,no_run
//! use record_store::prelude::*;
//!
//! # async fn demo() -> Result<(), DataAccessError> {
//! let db = Database::sqlite_builder(":memory:").build().await?;
//! db.execute_non_query("CREATE TABLE people (Name TEXT, Age INTEGER)").await?;
//!
//! let mut person = Record::new();
//! person.insert("Name", "Alice").insert("_Age", "integer").insert("Age", "30");
//! db.insert_record("people", &person).await.into_result()?;
//!
//! let rows = db.execute("SELECT Name, Age FROM people").await?;
//! assert_eq!(rows.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod binder;
pub mod config;
pub mod database;
pub mod document;
pub mod error;
pub mod exports;
pub mod outcome;
pub mod prelude;
pub mod record;
pub mod results;
pub mod statement;
pub mod transaction;
pub mod translation;
pub mod types;

#[cfg(feature = "mssql")]
pub mod mssql;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use backend::Backend;
pub use binder::{Binding, BoundParams};
pub use config::DatabaseConfig;
pub use database::Database;
pub use document::DocumentRow;
pub use error::DataAccessError;
pub use outcome::Outcome;
pub use record::{CastType, Record, RecordEntry};
pub use results::{ResultRow, ResultSet};
pub use statement::Statement;
pub use transaction::TransactionCoordinator;
pub use types::{DatabaseType, RowValues};
