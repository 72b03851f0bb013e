//! Ordered parameter bindings handed to a backend alongside SQL text.

use crate::record::Record;
use crate::types::RowValues;

const SIGILS: [char; 3] = ['@', ':', '$'];

/// A resolved (parameter name, value) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    pub value: RowValues,
}

impl Binding {
    #[must_use]
    pub fn new(name: impl Into<String>, value: RowValues) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, RowValues::Text(value.into()))
    }

    /// Whether the name already carries a sigil (`@id`, `:id`, `$id`).
    #[must_use]
    pub fn is_sigiled(&self) -> bool {
        self.name.starts_with(SIGILS)
    }

    /// Whether this binding answers to the placeholder spelled `placeholder` in SQL.
    ///
    /// A name that already carries a sigil matches only itself; a bare name matches the
    /// same name behind any sigil.
    #[must_use]
    pub fn matches_placeholder(&self, placeholder: &str) -> bool {
        if self.is_sigiled() {
            self.name == placeholder
        } else {
            placeholder.len() == self.name.len() + 1
                && placeholder.starts_with(SIGILS)
                && placeholder[1..] == self.name
        }
    }
}

/// Bindings in the order they should be attached to a prepared statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundParams {
    bindings: Vec<Binding>,
}

impl BoundParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_bindings(bindings: Vec<Binding>) -> Self {
        Self { bindings }
    }

    /// Passthrough bindings for a caller's record.
    #[must_use]
    pub fn from_record(record: &Record) -> Self {
        Self::from_bindings(record.parameters())
    }

    /// Append one binary payload after everything already bound.
    #[must_use]
    pub fn with_blob(mut self, field: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.bindings.push(Binding::new(field, RowValues::Blob(bytes)));
        self
    }

    pub fn push(&mut self, binding: Binding) {
        self.bindings.push(binding);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Binding] {
        &self.bindings
    }

    /// Index of the binding for a placeholder as written in SQL (`@value0`, `:id`).
    ///
    /// A binding spelled exactly like the placeholder wins over a bare name, so a raw
    /// parameter `value0` never shadows the generated `@value0`. Among bare names the
    /// first one wins.
    #[must_use]
    pub fn position(&self, placeholder: &str) -> Option<usize> {
        self.bindings
            .iter()
            .position(|binding| binding.is_sigiled() && binding.name == placeholder)
            .or_else(|| {
                self.bindings
                    .iter()
                    .position(|binding| binding.matches_placeholder(placeholder))
            })
    }

    #[must_use]
    pub fn find(&self, placeholder: &str) -> Option<&Binding> {
        self.position(placeholder).map(|idx| &self.bindings[idx])
    }
}
