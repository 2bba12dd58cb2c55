///
/// FieldModel
/// Runtime field metadata used by schema resolution.
///

#[derive(Debug)]
pub struct FieldModel {
    /// Property name as used in predicates.
    pub name: &'static str,
    /// Backing column name.
    pub column: &'static str,
    /// Whether this field is (part of) the primary key.
    pub primary_key: bool,
}

impl FieldModel {
    #[must_use]
    pub const fn new(name: &'static str, column: &'static str) -> Self {
        Self {
            name,
            column,
            primary_key: false,
        }
    }

    #[must_use]
    pub const fn primary(name: &'static str, column: &'static str) -> Self {
        Self {
            name,
            column,
            primary_key: true,
        }
    }
}
