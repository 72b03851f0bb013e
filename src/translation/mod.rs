use std::borrow::Cow;

mod parsers;
mod scanner;

use parsers::{
    is_block_comment_end, is_block_comment_start, is_line_comment_start, is_system_variable,
};
use scanner::{State, scan_identifier};

use crate::binder::BoundParams;
use crate::error::DataAccessError;

/// SQL with named placeholders rewritten to positional `@P1..@Pn`.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionalSql<'a> {
    pub sql: Cow<'a, str>,
    /// `order[k]` is the index into the original bindings for `@P{k + 1}`.
    pub order: Vec<usize>,
}

/// Rewrite `@name` placeholders into the positional form tiberius binds.
///
/// Each distinct name gets one slot; repeated uses share it. Quoted strings, `[bracketed]`
/// identifiers, comments and `@@system_variables` are left untouched. Bindings the SQL
/// never mentions are dropped; a placeholder with no binding is an error.
///
/// ```rust
/// use record_store::prelude::*;
///
/// let mut params = BoundParams::new();
/// params.push(Binding::text("id", "7"));
/// params.push(Binding::text("@value0", "Bob"));
/// let out = translate_named_placeholders(
///     "UPDATE people SET [Name]=@value0 WHERE id=@id;",
///     &params,
/// )?;
/// assert_eq!(out.sql, "UPDATE people SET [Name]=@P1 WHERE id=@P2;");
/// assert_eq!(out.order, vec![1, 0]);
/// # Ok::<(), DataAccessError>(())
/// ```
///
/// # Errors
/// Returns `DataAccessError::ParameterError` if the SQL names a placeholder with no binding.
pub fn translate_named_placeholders<'a>(
    sql: &'a str,
    params: &BoundParams,
) -> Result<PositionalSql<'a>, DataAccessError> {
    let mut out: Option<String> = None;
    let mut copied_to = 0;
    let mut order: Vec<usize> = Vec::new();
    let mut state = State::Normal;
    let mut idx = 0;
    let bytes = sql.as_bytes();

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                b'[' => state = State::Bracketed,
                _ if is_line_comment_start(bytes, idx) => state = State::LineComment,
                _ if is_block_comment_start(bytes, idx) => {
                    state = State::BlockComment(1);
                    idx += 1;
                }
                _ if is_system_variable(bytes, idx) => {
                    idx += 1;
                    while idx + 1 < bytes.len() && bytes[idx + 1].is_ascii_alphanumeric() {
                        idx += 1;
                    }
                }
                b'@' => {
                    if let Some((end, name)) = scan_identifier(bytes, idx + 1) {
                        let placeholder = &sql[idx..end];
                        let binding_idx = params.position(placeholder).ok_or_else(|| {
                            DataAccessError::ParameterError(format!(
                                "no value bound for placeholder @{name}"
                            ))
                        })?;
                        let slot = match order.iter().position(|&seen| seen == binding_idx) {
                            Some(slot) => slot,
                            None => {
                                order.push(binding_idx);
                                order.len() - 1
                            }
                        };
                        let buf = out.get_or_insert_with(|| String::with_capacity(sql.len()));
                        buf.push_str(&sql[copied_to..idx]);
                        buf.push_str("@P");
                        buf.push_str(&(slot + 1).to_string());
                        copied_to = end;
                        idx = end;
                        continue;
                    }
                }
                _ => {}
            },
            State::SingleQuoted => {
                if b == b'\'' {
                    if bytes.get(idx + 1) == Some(&b'\'') {
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::DoubleQuoted => {
                if b == b'"' {
                    if bytes.get(idx + 1) == Some(&b'"') {
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::Bracketed => {
                if b == b']' {
                    if bytes.get(idx + 1) == Some(&b']') {
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if is_block_comment_start(bytes, idx) {
                    state = State::BlockComment(depth + 1);
                    idx += 1;
                } else if is_block_comment_end(bytes, idx) {
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    idx += 1;
                }
            }
        }
        idx += 1;
    }

    let sql = match out {
        Some(mut buf) => {
            buf.push_str(&sql[copied_to..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(sql),
    };
    Ok(PositionalSql { sql, order })
}
