//! ## Crate layout
//! - `core`: values, entity models, schema resolution, the criteria context,
//!   and the event sinks used for lenient-mode reporting.
//!
//! The `prelude` module carries the vocabulary needed to open a context and
//! chain predicates; errors, sinks and resolvers stay under `core`.

pub use sqlcriteria_core as core;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//
// Errors
//

pub use crate::core::error::CriteriaError as Error;

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
        criteria::{
            CompiledCondition, Criteria, CriteriaBuilder, FieldRef, FuzzyMode, Slot, col, prop,
        },
        model::{entity::EntityModel, field::FieldModel},
        traits::{EntityKind as _, FieldValue as _},
        value::Value,
    };
    pub use serde::Serialize;
}

///
/// entity!
///
/// Declares an entity marker type, its static `EntityModel`, and one
/// `FieldRef` constant per field.
///
/// ```ignore
/// sqlcriteria::entity! {
///     pub struct User {
///         entity = "user",
///         table = "users",
///         fields {
///             #[primary] ID: "id" => "id",
///             CREATED_AT: "createdAt" => "created_at",
///         }
///     }
/// }
/// ```
///

#[macro_export]
macro_rules! entity {
    (
        $vis:vis struct $name:ident {
            entity = $entity:literal,
            table = $table:literal,
            fields {
                $( $(#[$flag:ident])? $konst:ident : $field:literal => $column:literal ),* $(,)?
            }
        }
    ) => {
        $vis struct $name;

        impl $name {
            $(
                pub const $konst: $crate::core::criteria::FieldRef =
                    $crate::core::criteria::FieldRef::new($field);
            )*
        }

        impl $crate::core::traits::EntityKind for $name {
            const MODEL: &'static $crate::core::model::entity::EntityModel =
                &$crate::core::model::entity::EntityModel {
                    path: concat!(module_path!(), "::", stringify!($name)),
                    entity_name: $entity,
                    table: $table,
                    fields: &[
                        $( $crate::entity!(@field $field, $column $(, $flag)?) ),*
                    ],
                };
        }
    };

    (@field $field:literal, $column:literal, primary) => {
        $crate::core::model::field::FieldModel::primary($field, $column)
    };
    (@field $field:literal, $column:literal) => {
        $crate::core::model::field::FieldModel::new($field, $column)
    };
}
