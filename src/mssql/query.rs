use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use futures_util::TryStreamExt;
use tiberius::{ColumnData, FromSql, Query};

use super::client::MssqlClient;
use crate::error::DataAccessError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Run `query` and collect the first result set.
///
/// Statements that return no columns produce an empty result set.
///
/// # Errors
/// Returns `DataAccessError::ExecutionError` if the query or a row fetch fails.
pub async fn build_result_set(
    client: &mut MssqlClient,
    query: Query<'_>,
) -> Result<ResultSet, DataAccessError> {
    let mut stream = query.query(client).await.map_err(|e| {
        DataAccessError::ExecutionError(format!("SQL Server query error: {e}"))
    })?;

    let column_names: Vec<String> = stream
        .columns()
        .await
        .map_err(|e| {
            DataAccessError::ExecutionError(format!("SQL Server column fetch error: {e}"))
        })?
        .map(|columns| columns.iter().map(|col| col.name().to_string()).collect())
        .unwrap_or_default();
    let col_count = column_names.len();
    let mut result_set = ResultSet::with_columns(column_names, 10);

    let mut rows = stream.into_row_stream();
    while let Some(row) = rows.try_next().await.map_err(|e| {
        DataAccessError::ExecutionError(format!("SQL Server row fetch error: {e}"))
    })? {
        let mut values = Vec::with_capacity(col_count);
        values.extend(row.into_iter().map(|data| extract_value(&data)));
        values.resize(col_count, RowValues::Null);
        result_set.add_row_values(values);
    }

    Ok(result_set)
}

/// Map one cell onto `RowValues`. Dates and times come back as ISO-8601 text.
pub fn extract_value(data: &ColumnData<'static>) -> RowValues {
    match data {
        ColumnData::U8(Some(v)) => RowValues::Int(i64::from(*v)),
        ColumnData::I16(Some(v)) => RowValues::Int(i64::from(*v)),
        ColumnData::I32(Some(v)) => RowValues::Int(i64::from(*v)),
        ColumnData::I64(Some(v)) => RowValues::Int(*v),
        ColumnData::F32(Some(v)) => RowValues::Float(f64::from(*v)),
        ColumnData::F64(Some(v)) => RowValues::Float(*v),
        ColumnData::Bit(Some(b)) => RowValues::Int(i64::from(*b)),
        ColumnData::String(Some(s)) => RowValues::Text(s.to_string()),
        ColumnData::Guid(Some(g)) => RowValues::Text(g.to_string()),
        ColumnData::Binary(Some(b)) => RowValues::Blob(b.to_vec()),
        ColumnData::Numeric(Some(n)) => RowValues::Float(f64::from(*n)),
        other => temporal_text(other).map_or(RowValues::Null, RowValues::Text),
    }
}

fn temporal_text(data: &ColumnData<'static>) -> Option<String> {
    if let Ok(Some(dt)) = NaiveDateTime::from_sql(data) {
        return Some(dt.format("%Y-%m-%d %H:%M:%S%.f").to_string());
    }
    if let Ok(Some(dt)) = DateTime::<FixedOffset>::from_sql(data) {
        return Some(dt.to_rfc3339());
    }
    if let Ok(Some(d)) = NaiveDate::from_sql(data) {
        return Some(d.format("%Y-%m-%d").to_string());
    }
    if let Ok(Some(t)) = NaiveTime::from_sql(data) {
        return Some(t.format("%H:%M:%S%.f").to_string());
    }
    None
}

/// Run `query` and sum the affected-row counts of every statement in it.
///
/// # Errors
/// Returns `DataAccessError::ExecutionError` if the statement fails.
pub async fn execute_query(
    client: &mut MssqlClient,
    query: Query<'_>,
) -> Result<usize, DataAccessError> {
    let result = query.execute(client).await.map_err(|e| {
        DataAccessError::ExecutionError(format!("SQL Server execution error: {e}"))
    })?;
    let total: u64 = result.rows_affected().iter().sum();
    usize::try_from(total).map_err(|e| {
        DataAccessError::ExecutionError(format!("affected row count out of range: {e}"))
    })
}
