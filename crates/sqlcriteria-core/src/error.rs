use crate::{config::ConfigError, criteria::builder::BuilderStateError, schema::ReferenceKind};
use std::fmt;
use thiserror::Error as ThisError;

///
/// CriteriaError
///
/// Every failure a criteria context can surface to its caller.
/// Raised at `build()` time; rendering never fails.
///

#[derive(Debug, ThisError)]
pub enum CriteriaError {
    #[error("cannot resolve {kind} '{identifier}' on entity '{entity}'")]
    ResolutionFailure {
        entity: String,
        identifier: String,
        kind: ReferenceKind,
    },

    #[error("'{identifier}' is not a valid sql identifier")]
    InvalidIdentifier { identifier: String },

    #[error("invalid builder state: {0}")]
    InvalidStateTransition(#[from] BuilderStateError),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl CriteriaError {
    pub(crate) fn resolution(
        entity: impl Into<String>,
        identifier: impl Into<String>,
        kind: ReferenceKind,
    ) -> Self {
        Self::ResolutionFailure {
            entity: entity.into(),
            identifier: identifier.into(),
            kind,
        }
    }

    pub(crate) fn invalid_value(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::ResolutionFailure { .. } => ErrorClass::NotFound,
            Self::InvalidIdentifier { .. } | Self::InvalidValue { .. } => ErrorClass::InvalidInput,
            Self::InvalidStateTransition(_) => ErrorClass::InvariantViolation,
            Self::Config(_) => ErrorClass::Unsupported,
        }
    }

    #[must_use]
    pub const fn origin(&self) -> ErrorOrigin {
        match self {
            Self::ResolutionFailure { .. } | Self::InvalidIdentifier { .. } => ErrorOrigin::Schema,
            Self::InvalidStateTransition(_) => ErrorOrigin::Builder,
            Self::InvalidValue { .. } => ErrorOrigin::Binder,
            Self::Config(_) => ErrorOrigin::Config,
        }
    }

    #[must_use]
    pub const fn is_resolution_failure(&self) -> bool {
        matches!(self, Self::ResolutionFailure { .. })
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {self}", self.origin(), self.class())
    }
}

///
/// ErrorClass
/// Error taxonomy for caller-side classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    NotFound,
    InvalidInput,
    InvariantViolation,
    Unsupported,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "not_found",
            Self::InvalidInput => "invalid_input",
            Self::InvariantViolation => "invariant_violation",
            Self::Unsupported => "unsupported",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Subsystem that raised the error.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Builder,
    Binder,
    Schema,
    Config,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Builder => "builder",
            Self::Binder => "binder",
            Self::Schema => "schema",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///
