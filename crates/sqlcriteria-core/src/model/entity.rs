use crate::model::field::FieldModel;

///
/// EntityModel
/// Minimal, statically declared runtime model for one entity.
///

#[derive(Debug)]
pub struct EntityModel {
    /// Fully-qualified Rust type path (for diagnostics).
    pub path: &'static str,
    /// Stable external name used in resolver lookups and error messages.
    pub entity_name: &'static str,
    /// Backing table name.
    pub table: &'static str,
    /// Ordered field list.
    pub fields: &'static [FieldModel],
}

impl EntityModel {
    /// Look up a field by its property name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldModel> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Look up a field by its column name (case-insensitive, as SQL is).
    #[must_use]
    pub fn field_by_column(&self, column: &str) -> Option<&'static FieldModel> {
        self.fields
            .iter()
            .find(|field| field.column.eq_ignore_ascii_case(column))
    }

    /// First field flagged as primary key, if any.
    #[must_use]
    pub fn primary_key(&self) -> Option<&'static FieldModel> {
        self.fields.iter().find(|field| field.primary_key)
    }
}
