//! Module: criteria::builder
//! Responsibility: single-use predicate builders with target resolution and validation.
//! Does not own: rendering or attach ordering.
//! Boundary: user-facing construction layer; every parameter is allocated here.
//!
//! Builder lifecycle: `Empty → TargetSet → (kind fields)* → Built`.
//! `build(self)` consumes the builder, so a built builder cannot be reused.
//! Out-of-order calls are recorded and surface as
//! `CriteriaError::InvalidStateTransition` from `build()`.
//!
//! `build()` checks state, validates values, resolves the target, and only
//! then allocates parameters. A failed build never allocates.

mod between;
mod comparison;
pub(crate) mod field;
mod fuzzy;
mod nullability;
mod range;
mod template;


pub use between::BetweenBuilder;
pub use comparison::ComparisonBuilder;
pub use field::{FieldRef, TargetSpec, col, prop};
pub use fuzzy::FuzzyBuilder;
pub use nullability::NullabilityBuilder;
pub use range::RangeBuilder;
pub use template::TemplateBuilder;

use crate::{
    criteria::{Criteria, node::Slot},
    error::CriteriaError,
    value::Value,
};
use thiserror::Error as ThisError;

///
/// BuilderStateError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum BuilderStateError {
    #[error("no target was set before build")]
    MissingTarget,

    #[error("target already set to '{existing}'")]
    TargetAlreadySet { existing: String },

    #[error("no owning criteria was set before build")]
    MissingCriteria,

    #[error("owning criteria was set more than once")]
    CriteriaAlreadySet,

    #[error("required field '{field}' was not set")]
    MissingField { field: &'static str },

    #[error("field '{field}' was set more than once")]
    FieldAlreadySet { field: &'static str },

    #[error("criterion belongs to a different criteria scope")]
    ForeignCriterion,
}

///
/// BuilderCore
///
/// State shared by every predicate builder: owning criteria, target, slot,
/// and the first state fault observed.
///

#[derive(Debug, Default)]
pub(crate) struct BuilderCore<'c> {
    criteria: Option<&'c Criteria>,
    target: Option<TargetSpec>,
    slot: Slot,
    fault: Option<BuilderStateError>,
}

impl<'c> BuilderCore<'c> {
    pub(crate) fn set_criteria(&mut self, criteria: &'c Criteria) {
        if self.criteria.is_some() {
            self.fault(BuilderStateError::CriteriaAlreadySet);
        } else {
            self.criteria = Some(criteria);
        }
    }

    pub(crate) fn set_target(&mut self, target: TargetSpec) {
        if let Some(existing) = &self.target {
            let existing = existing.identifier().to_string();
            self.fault(BuilderStateError::TargetAlreadySet { existing });
        } else {
            self.target = Some(target);
        }
    }

    pub(crate) const fn set_slot(&mut self, slot: Slot) {
        self.slot = slot;
    }

    pub(crate) fn fault(&mut self, fault: BuilderStateError) {
        self.fault.get_or_insert(fault);
    }

    /// Set a kind-specific field once; a second set is a state fault.
    pub(crate) fn set_once<T>(&mut self, slot: &mut Option<T>, value: T, field: &'static str) {
        if slot.is_some() {
            self.fault(BuilderStateError::FieldAlreadySet { field });
        } else {
            *slot = Some(value);
        }
    }

    /// Surface any recorded fault, then require criteria and target.
    pub(crate) fn check(self) -> Result<Checked<'c>, CriteriaError> {
        if let Some(fault) = self.fault {
            return Err(fault.into());
        }
        let criteria = self.criteria.ok_or(BuilderStateError::MissingCriteria)?;
        let target = self.target.ok_or(BuilderStateError::MissingTarget)?;

        Ok(Checked {
            criteria,
            target,
            slot: self.slot,
        })
    }
}

///
/// Checked
/// Builder state after structural checks, before resolution.
///

pub(crate) struct Checked<'c> {
    pub(crate) criteria: &'c Criteria,
    pub(crate) target: TargetSpec,
    pub(crate) slot: Slot,
}

/// Require a kind-specific field.
pub(crate) fn required<T>(value: Option<T>, field: &'static str) -> Result<T, CriteriaError> {
    value.ok_or_else(|| BuilderStateError::MissingField { field }.into())
}

/// Reject list values where a single bound scalar is expected.
pub(crate) fn scalar(value: &Value, field: &'static str) -> Result<(), CriteriaError> {
    if value.is_scalar() {
        Ok(())
    } else {
        Err(CriteriaError::invalid_value(
            field,
            "expected a scalar, found a list",
        ))
    }
}

// impl_target_setters
// Shared builder surface: owning criteria, target (three paths), slot.
macro_rules! impl_target_setters {
    ($builder:ident) => {
        impl<'c> $builder<'c> {
            /// Owning criteria; supplies resolver, binder, and strictness.
            #[must_use]
            pub fn criteria(mut self, criteria: &'c $crate::criteria::Criteria) -> Self {
                self.core.set_criteria(criteria);
                self
            }

            #[must_use]
            pub fn target(mut self, target: impl Into<$crate::criteria::builder::TargetSpec>) -> Self {
                self.core.set_target(target.into());
                self
            }

            /// Target a typed property handle.
            #[must_use]
            pub fn property(self, field: $crate::criteria::builder::FieldRef) -> Self {
                self.target($crate::criteria::builder::TargetSpec::Property(field))
            }

            /// Target a property by name.
            #[must_use]
            pub fn property_name(self, name: impl Into<String>) -> Self {
                self.target($crate::criteria::builder::TargetSpec::PropertyName(name.into()))
            }

            /// Target a raw column name.
            #[must_use]
            pub fn column(self, name: impl Into<String>) -> Self {
                self.target($crate::criteria::builder::TargetSpec::Column(name.into()))
            }

            #[must_use]
            pub const fn slot(mut self, slot: $crate::criteria::node::Slot) -> Self {
                self.core.set_slot(slot);
                self
            }
        }
    };
}

pub(crate) use impl_target_setters;
