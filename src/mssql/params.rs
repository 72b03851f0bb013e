use tiberius::Query;

use crate::binder::BoundParams;
use crate::error::DataAccessError;
use crate::translation::translate_named_placeholders;
use crate::types::RowValues;

/// Bind one value positionally. Values are cloned because the query owns its parameters.
fn bind_value(query: &mut Query<'_>, value: &RowValues) {
    match value {
        RowValues::Int(i) => query.bind(*i),
        RowValues::Float(f) => query.bind(*f),
        RowValues::Text(s) => query.bind(s.clone()),
        RowValues::Null => query.bind(Option::<String>::None),
        RowValues::Blob(bytes) => query.bind(bytes.clone()),
    }
}

/// Rewrite named placeholders to `@P1..@Pn` and bind the matching values in slot order.
///
/// # Errors
/// Returns `DataAccessError::ParameterError` if the SQL names a placeholder with no binding.
pub fn bind_query_params(sql: &str, params: &BoundParams) -> Result<Query<'static>, DataAccessError> {
    let positional = translate_named_placeholders(sql, params)?;
    let mut query = Query::new(positional.sql.into_owned());
    for &idx in &positional.order {
        if let Some(binding) = params.as_slice().get(idx) {
            bind_value(&mut query, &binding.value);
        }
    }
    Ok(query)
}
