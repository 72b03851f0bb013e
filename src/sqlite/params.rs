use rusqlite::Statement;
use rusqlite::types::Value;

use crate::binder::BoundParams;
use crate::error::DataAccessError;
use crate::types::RowValues;

/// Convert a single `RowValues` to a rusqlite `Value`.
#[must_use]
pub fn row_value_to_sqlite_value(value: &RowValues) -> Value {
    match value {
        RowValues::Int(i) => Value::Integer(*i),
        RowValues::Float(f) => Value::Real(*f),
        RowValues::Text(s) => Value::Text(s.clone()),
        RowValues::Null => Value::Null,
        RowValues::Blob(bytes) => Value::Blob(bytes.clone()),
    }
}

/// Attach bindings to a prepared statement by placeholder name.
///
/// Each placeholder takes the binding [`BoundParams::find`] resolves for it, so an exact
/// sigiled name beats a bare one. Bindings the statement never mentions are skipped. A
/// placeholder left without a value fails instead of silently binding NULL.
///
/// # Errors
/// Returns `DataAccessError::ParameterError` naming the first unbound placeholder, or the
/// underlying `SQLite` error if a bind call fails.
pub fn bind_params(stmt: &mut Statement<'_>, params: &BoundParams) -> Result<(), DataAccessError> {
    for idx in 1..=stmt.parameter_count() {
        let binding = match stmt.parameter_name(idx) {
            Some(name) => params.find(name).ok_or_else(|| {
                DataAccessError::ParameterError(format!("no value bound for placeholder {name}"))
            })?,
            None => {
                return Err(DataAccessError::ParameterError(format!(
                    "no value bound for placeholder ?{idx}"
                )));
            }
        };
        stmt.raw_bind_parameter(idx, row_value_to_sqlite_value(&binding.value))?;
    }
    Ok(())
}
