//! Ordered key/value records that describe a row to persist or parameters to bind.
//!
//! Callers that speak the string convention can keep doing so: a key starting with `_`
//! is a cast hint for the column named by the rest of the key, and a key starting with
//! `*` is a parameter that is bound but never written as a column. The convention is
//! resolved once in [`Record::insert`]; everything downstream works on [`RecordEntry`].

use std::fmt;

use crate::binder::Binding;

pub(crate) const CAST_HINT_PREFIX: char = '_';
pub(crate) const RAW_PARAMETER_PREFIX: char = '*';

/// SQL type a column value should be cast to before it reaches the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CastType {
    BigInt,
    Integer,
    SmallInt,
    Float,
    Real,
    /// Any other type name; the value is bound without a cast.
    Other(String),
}

impl CastType {
    /// Parse a type name case-insensitively. Unknown names become [`CastType::Other`].
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "bigint" => CastType::BigInt,
            "integer" => CastType::Integer,
            "smallint" => CastType::SmallInt,
            "float" => CastType::Float,
            "real" => CastType::Real,
            _ => CastType::Other(name.to_string()),
        }
    }

    /// The SQL type the placeholder is wrapped in, if any.
    #[must_use]
    pub fn sql_type(&self) -> Option<&'static str> {
        match self {
            CastType::BigInt | CastType::Integer | CastType::SmallInt => Some("INTEGER"),
            CastType::Float | CastType::Real => Some("REAL"),
            CastType::Other(_) => None,
        }
    }
}

impl fmt::Display for CastType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CastType::BigInt => f.write_str("bigint"),
            CastType::Integer => f.write_str("integer"),
            CastType::SmallInt => f.write_str("smallint"),
            CastType::Float => f.write_str("float"),
            CastType::Real => f.write_str("real"),
            CastType::Other(name) => f.write_str(name),
        }
    }
}

/// One entry of a [`Record`], classified when it was inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordEntry {
    /// A column to persist.
    Column { key: String, value: String },
    /// Cast instruction for the column named `key`; never persisted itself.
    CastHint { key: String, cast: CastType },
    /// Bound under `key` but kept out of generated column lists.
    RawParameter { key: String, value: String },
}

impl RecordEntry {
    /// Classify a key/value pair by the `_` / `*` prefix convention.
    #[must_use]
    pub fn classify(key: &str, value: &str) -> Self {
        if let Some(target) = key.strip_prefix(CAST_HINT_PREFIX) {
            RecordEntry::CastHint {
                key: target.to_string(),
                cast: CastType::parse(value),
            }
        } else if let Some(name) = key.strip_prefix(RAW_PARAMETER_PREFIX) {
            RecordEntry::RawParameter {
                key: name.to_string(),
                value: value.to_string(),
            }
        } else {
            RecordEntry::Column {
                key: key.to_string(),
                value: value.to_string(),
            }
        }
    }

    /// The key as the string convention spells it (`_Age`, `*id`, `Name`).
    #[must_use]
    pub fn prefixed_key(&self) -> String {
        match self {
            RecordEntry::Column { key, .. } => key.clone(),
            RecordEntry::CastHint { key, .. } => format!("{CAST_HINT_PREFIX}{key}"),
            RecordEntry::RawParameter { key, .. } => format!("{RAW_PARAMETER_PREFIX}{key}"),
        }
    }
}

/// Ordered record of uniquely keyed entries.
///
/// ```rust
/// use record_store::prelude::*;
///
/// let mut person = Record::new();
/// person.insert("Name", "Alice");
/// person.insert("_Age", "integer");
/// person.insert("Age", "30");
/// assert_eq!(person.len(), 3);
/// assert_eq!(person.cast_for("Age"), Some(&CastType::Integer));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    entries: Vec<RecordEntry>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert using the string prefix convention.
    ///
    /// Re-inserting an existing key replaces its value and keeps its position.
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> &mut Self {
        self.push_entry(RecordEntry::classify(key.as_ref(), value.as_ref()))
    }

    /// Insert a column entry regardless of how its name is spelled.
    pub fn column(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.push_entry(RecordEntry::Column {
            key: key.into(),
            value: value.into(),
        })
    }

    /// Attach a cast hint to the column named `key`.
    pub fn cast_hint(&mut self, key: impl Into<String>, cast: CastType) -> &mut Self {
        self.push_entry(RecordEntry::CastHint {
            key: key.into(),
            cast,
        })
    }

    /// Add a parameter that is bound but never written as a column.
    pub fn raw_parameter(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.push_entry(RecordEntry::RawParameter {
            key: key.into(),
            value: value.into(),
        })
    }

    fn push_entry(&mut self, entry: RecordEntry) -> &mut Self {
        let prefixed = entry.prefixed_key();
        match self
            .entries
            .iter_mut()
            .find(|existing| existing.prefixed_key() == prefixed)
        {
            Some(slot) => *slot = entry,
            None => self.entries.push(entry),
        }
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &RecordEntry> {
        self.entries.iter()
    }

    /// Look up a value by its prefixed key (`Name`, `*id`). Cast hints yield their type name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|entry| entry.prefixed_key() == key)
            .map(|entry| match entry {
                RecordEntry::Column { value, .. } | RecordEntry::RawParameter { value, .. } => {
                    value.clone()
                }
                RecordEntry::CastHint { cast, .. } => cast.to_string(),
            })
    }

    /// The cast hint attached to column `key`, if any.
    #[must_use]
    pub fn cast_for(&self, key: &str) -> Option<&CastType> {
        self.entries.iter().find_map(|entry| match entry {
            RecordEntry::CastHint { key: target, cast } if target == key => Some(cast),
            _ => None,
        })
    }

    /// First column key that cannot be written inside `[...]`, i.e. one containing `]`.
    #[must_use]
    pub fn unquotable_column(&self) -> Option<&str> {
        self.entries.iter().find_map(|entry| match entry {
            RecordEntry::Column { key, .. } if key.contains(']') => Some(key.as_str()),
            _ => None,
        })
    }

    /// The record as passthrough bindings for hand-written SQL.
    ///
    /// Columns bind under their own key, raw parameters under the stripped key, and cast
    /// hints are skipped.
    #[must_use]
    pub fn parameters(&self) -> Vec<Binding> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                RecordEntry::Column { key, value } | RecordEntry::RawParameter { key, value } => {
                    Some(Binding::text(key.clone(), value.clone()))
                }
                RecordEntry::CastHint { .. } => None,
            })
            .collect()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_prefixes_once() {
        let record: Record = [("Name", "Bob"), ("_Age", "SmallInt"), ("*id", "7")]
            .into_iter()
            .collect();
        let entries: Vec<_> = record.entries().cloned().collect();
        assert_eq!(
            entries,
            vec![
                RecordEntry::Column {
                    key: "Name".into(),
                    value: "Bob".into()
                },
                RecordEntry::CastHint {
                    key: "Age".into(),
                    cast: CastType::SmallInt
                },
                RecordEntry::RawParameter {
                    key: "id".into(),
                    value: "7".into()
                },
            ]
        );
    }

    #[test]
    fn reinserting_replaces_in_place() {
        let mut record = Record::new();
        record.insert("a", "1").insert("b", "2").insert("a", "3");
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("a").as_deref(), Some("3"));
        assert_eq!(
            record.entries().next().map(RecordEntry::prefixed_key),
            Some("a".to_string())
        );
    }

    #[test]
    fn column_and_hint_with_same_name_coexist() {
        let mut record = Record::new();
        record.insert("Age", "30").insert("_Age", "real");
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("_Age").as_deref(), Some("real"));
        assert_eq!(record.cast_for("Age"), Some(&CastType::Real));
    }

    #[test]
    fn typed_constructors_skip_prefix_parsing() {
        let mut record = Record::new();
        record.column("_literal", "x");
        assert!(matches!(
            record.entries().next(),
            Some(RecordEntry::Column { key, .. }) if key == "_literal"
        ));
    }

    #[test]
    fn cast_type_parsing_and_mapping() {
        assert_eq!(CastType::parse("BIGINT").sql_type(), Some("INTEGER"));
        assert_eq!(CastType::parse("float").sql_type(), Some("REAL"));
        assert_eq!(CastType::parse("text"), CastType::Other("text".into()));
        assert_eq!(CastType::parse("text").sql_type(), None);
    }

    #[test]
    fn parameters_skip_hints_and_strip_raw_prefix() {
        let record: Record = [("Name", "Bob"), ("_Name", "text"), ("*id", "7")]
            .into_iter()
            .collect();
        let names: Vec<_> = record.parameters().into_iter().map(|b| b.name).collect();
        assert_eq!(names, vec!["Name".to_string(), "id".to_string()]);
    }

    #[test]
    fn closing_bracket_makes_a_column_unquotable() {
        let mut record = Record::new();
        record.insert("Name", "a").insert("*odd]param", "b");
        assert_eq!(record.unquotable_column(), None);

        record.insert("odd]name", "c");
        assert_eq!(record.unquotable_column(), Some("odd]name"));
    }
}
