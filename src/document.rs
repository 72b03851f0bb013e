use crate::binder::{Binding, BoundParams};
use crate::types::RowValues;

/// Fixed insert for the `[documents]` table.
pub const INSERT_DOCUMENT_SQL: &str = "INSERT INTO [documents]([Received], [Label], [Category], [Metadata], [ID], [Document]) VALUES (@Received, @Label, @Category, @Metadata, @ID, @Document);";

/// One row of the `[documents]` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRow {
    /// Receipt time as an integer timestamp.
    pub received: i64,
    pub label: String,
    pub category: String,
    pub metadata: String,
    pub id: i64,
    pub document: String,
}

impl DocumentRow {
    /// Bindings for [`INSERT_DOCUMENT_SQL`], integers typed as integers.
    #[must_use]
    pub fn bindings(&self) -> BoundParams {
        BoundParams::from_bindings(vec![
            Binding::new("Received", RowValues::Int(self.received)),
            Binding::text("Label", self.label.clone()),
            Binding::text("Category", self.category.clone()),
            Binding::text("Metadata", self.metadata.clone()),
            Binding::new("ID", RowValues::Int(self.id)),
            Binding::text("Document", self.document.clone()),
        ])
    }
}
