//! Core runtime for sqlcriteria: values, entity models, schema resolution,
//! the criteria context, and the event sink used for lenient-mode reporting.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod config;
pub mod criteria;
pub mod error;
pub mod model;
pub mod obs;
pub mod schema;
pub mod traits;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// CONSTANTS
///

/// Default prefix for generated parameter keys (`p1`, `p2`, ...).
pub const DEFAULT_PARAM_PREFIX: &str = "p";

/// Default prefix for generated table aliases (`t1`, `t2`, ...).
pub const DEFAULT_ALIAS_PREFIX: &str = "t";

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, sinks, or resolvers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        criteria::{Criteria, FieldRef, FuzzyMode, Slot},
        model::{entity::EntityModel, field::FieldModel},
        traits::{EntityKind, FieldValue},
        value::Value,
    };
}
