//! Module: schema
//! Responsibility: the resolver seam between criteria builders and entity metadata.
//! Does not own: metadata storage, reflection, or caching.
//! Boundary: builders call `SchemaResolver` once per target at `build()` time.

mod model;

pub use model::ModelResolver;

use derive_more::Display;

///
/// ReferenceKind
/// Which resolution path a builder target took.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ReferenceKind {
    #[display("property")]
    Property,
    #[display("column")]
    Column,
}

///
/// ColumnHandle
///
/// Resolved column descriptor returned by a `SchemaResolver`.
/// Opaque to builders apart from the rendered name and primary-key flag.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColumnHandle {
    column: String,
    primary_key: bool,
}

impl ColumnHandle {
    #[must_use]
    pub fn new(column: impl Into<String>, primary_key: bool) -> Self {
        Self {
            column: column.into(),
            primary_key,
        }
    }

    /// Column name as rendered into SQL.
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    #[must_use]
    pub const fn is_primary_key(&self) -> bool {
        self.primary_key
    }
}

///
/// SchemaResolver
///
/// Read-only, uncached lookup from entity + identifier to a column.
/// `None` means "not found"; the caller decides between error and warning.
///

pub trait SchemaResolver: Send + Sync {
    /// Resolve a property name declared on the entity.
    fn resolve(&self, entity: &str, property: &str) -> Option<ColumnHandle>;

    /// Resolve a raw column name against the entity's table.
    fn resolve_raw(&self, entity: &str, column: &str) -> Option<ColumnHandle>;
}

/// True when `name` is one or more `[A-Za-z_][A-Za-z0-9_]*` segments joined by `.`.
#[must_use]
pub fn is_sql_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|segment| {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}
