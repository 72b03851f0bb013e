// SQLite module - the single-file engine.
//
// - config: open options and builder
// - connection: the shared connection and blocking-pool plumbing
// - params: named parameter binding
// - query: result extraction
// - backend: the `Backend` implementation

pub mod backend;
pub mod config;
mod connection;
pub mod params;
pub mod query;

pub use backend::SqliteBackend;
pub use config::{SqliteOptions, SqliteOptionsBuilder};
pub use query::build_result_set;
