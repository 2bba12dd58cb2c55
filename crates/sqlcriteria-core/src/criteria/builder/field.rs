use crate::schema::ReferenceKind;
use std::fmt;

///
/// FieldRef
///
/// Zero-cost wrapper around a static property name.
/// Entities expose these as associated constants so predicates can name
/// properties without string literals scattered through call sites.
///

#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct FieldRef(&'static str);

impl FieldRef {
    /// Create a new field reference.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Return the underlying property name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl AsRef<str> for FieldRef {
    fn as_ref(&self) -> &str {
        self.0
    }
}

impl std::ops::Deref for FieldRef {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0
    }
}

impl fmt::Debug for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldRef({})", self.0)
    }
}

///
/// TargetSpec
///
/// Unresolved left-hand side handed to a builder. The three cases are
/// mutually exclusive resolution paths.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TargetSpec {
    Property(FieldRef),
    PropertyName(String),
    Column(String),
}

impl TargetSpec {
    #[must_use]
    pub fn identifier(&self) -> &str {
        match self {
            Self::Property(field) => field.as_str(),
            Self::PropertyName(name) | Self::Column(name) => name,
        }
    }

    #[must_use]
    pub const fn reference_kind(&self) -> ReferenceKind {
        match self {
            Self::Property(_) | Self::PropertyName(_) => ReferenceKind::Property,
            Self::Column(_) => ReferenceKind::Column,
        }
    }
}

impl From<FieldRef> for TargetSpec {
    fn from(field: FieldRef) -> Self {
        Self::Property(field)
    }
}

impl From<&str> for TargetSpec {
    fn from(name: &str) -> Self {
        Self::PropertyName(name.to_string())
    }
}

impl From<String> for TargetSpec {
    fn from(name: String) -> Self {
        Self::PropertyName(name)
    }
}

impl From<&String> for TargetSpec {
    fn from(name: &String) -> Self {
        Self::PropertyName(name.clone())
    }
}

/// Raw column target: resolved through `SchemaResolver::resolve_raw`.
#[must_use]
pub fn col(name: impl Into<String>) -> TargetSpec {
    TargetSpec::Column(name.into())
}

/// Property target by name. Equivalent to passing the `&str` directly.
#[must_use]
pub fn prop(name: impl Into<String>) -> TargetSpec {
    TargetSpec::PropertyName(name.into())
}
