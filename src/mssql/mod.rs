// SQL Server module - client-server engine over tiberius.
//
// - config: connection options and builder
// - client: TCP connect and login
// - params: positional placeholder rewrite and binding
// - query: result extraction
// - backend: the `Backend` implementation

pub mod backend;
pub mod client;
pub mod config;
pub mod params;
pub mod query;

pub use backend::MssqlBackend;
pub use config::{MssqlOptions, MssqlOptionsBuilder};
