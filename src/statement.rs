//! Turns a [`Record`] into parameterized INSERT/UPDATE/DELETE text plus ordered bindings.
//!
//! Nothing here touches a connection; a [`Statement`] can be inspected before it is run.

use tracing::debug;

use crate::binder::{Binding, BoundParams};
use crate::record::{CastType, Record, RecordEntry};

/// Fixed token in front of every synthesized placeholder. The suffix counts column entries
/// in record order, so names never collide with one another.
pub const PLACEHOLDER_PREFIX: &str = "@value";

/// Generated SQL text and the bindings it expects.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub bindings: BoundParams,
    /// Number of column assignments the statement writes.
    pub column_count: usize,
}

fn placeholder(index: usize) -> String {
    format!("{PLACEHOLDER_PREFIX}{index}")
}

fn cast_expression(placeholder: &str, cast: Option<&CastType>) -> String {
    match cast.and_then(CastType::sql_type) {
        Some(sql_type) => format!("CAST({placeholder} AS {sql_type})"),
        None => placeholder.to_string(),
    }
}

struct Walked {
    /// (column key, value expression)
    columns: Vec<(String, String)>,
    bindings: BoundParams,
}

/// Walk the record in order: skip hints, bind raw parameters without a column, and bind
/// every column under its synthesized placeholder.
fn walk(record: &Record) -> Walked {
    let mut columns = Vec::new();
    let mut bindings = BoundParams::new();

    for entry in record.entries() {
        match entry {
            RecordEntry::CastHint { .. } => {}
            RecordEntry::RawParameter { key, value } => {
                bindings.push(Binding::text(key.clone(), value.clone()));
            }
            RecordEntry::Column { key, value } => {
                let name = placeholder(columns.len());
                let expr = cast_expression(&name, record.cast_for(key));
                columns.push((key.clone(), expr));
                bindings.push(Binding::text(name, value.clone()));
            }
        }
    }

    Walked { columns, bindings }
}

/// `INSERT INTO <table>([c1],[c2]) VALUES(<e1>, <e2>);`
///
/// A record with no column entries inserts a row of defaults. Column keys are written
/// verbatim inside `[...]`, so they must be trusted identifiers without `]`;
/// [`Record::unquotable_column`] finds the ones that are not.
#[must_use]
pub fn build_insert(table: &str, record: &Record) -> Statement {
    let Walked { columns, bindings } = walk(record);
    let sql = if columns.is_empty() {
        format!("INSERT INTO {table} DEFAULT VALUES;")
    } else {
        let names = columns
            .iter()
            .map(|(key, _)| format!("[{key}]"))
            .collect::<Vec<_>>()
            .join(",");
        let values = columns
            .iter()
            .map(|(_, expr)| expr.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        format!("INSERT INTO {table}({names}) VALUES({values});")
    };
    debug!(table, bindings = bindings.len(), %sql, "built insert");
    Statement {
        sql,
        column_count: columns.len(),
        bindings,
    }
}

/// `UPDATE <table> SET [c1]=<e1>, [c2]=<e2> WHERE <clause>;`
///
/// An empty `where_clause` leaves the WHERE off and updates every row. Column keys are
/// quoted the same way as in [`build_insert`].
#[must_use]
pub fn build_update(table: &str, record: &Record, where_clause: &str) -> Statement {
    let Walked { columns, bindings } = walk(record);
    let assignments = columns
        .iter()
        .map(|(key, expr)| format!("[{key}]={expr}"))
        .collect::<Vec<_>>()
        .join(", ");
    let where_clause = where_clause.trim();
    let sql = if where_clause.is_empty() {
        format!("UPDATE {table} SET {assignments};")
    } else {
        format!("UPDATE {table} SET {assignments} WHERE {where_clause};")
    };
    debug!(table, bindings = bindings.len(), %sql, "built update");
    Statement {
        sql,
        column_count: columns.len(),
        bindings,
    }
}

/// `DELETE FROM <table> WHERE <clause>;` with the record bound as passthrough parameters.
///
/// An empty clause deletes every row; that is the caller's explicit choice.
#[must_use]
pub fn build_delete(table: &str, record: &Record, where_clause: &str) -> Statement {
    let where_clause = where_clause.trim();
    let sql = if where_clause.is_empty() {
        format!("DELETE FROM {table};")
    } else {
        format!("DELETE FROM {table} WHERE {where_clause};")
    };
    let bindings = BoundParams::from_record(record);
    debug!(table, bindings = bindings.len(), %sql, "built delete");
    Statement {
        sql,
        column_count: 0,
        bindings,
    }
}

/// `DELETE FROM <table>;`
#[must_use]
pub fn build_clear(table: &str) -> Statement {
    Statement {
        sql: format!("DELETE FROM {table};"),
        column_count: 0,
        bindings: BoundParams::new(),
    }
}
