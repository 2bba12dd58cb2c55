//! Module: criteria::node
//! Responsibility: the closed predicate model and its operator vocabulary.
//! Does not own: target resolution or parameter allocation (see `builder`).
//! Boundary: nodes are immutable once built; `render` is the only consumer.
//!
//! Pure, schema-agnostic representation of compiled predicates. Every bound
//! value has already been allocated a key by the time a node exists.

mod render;
mod template;


pub use render::RenderContext;
pub use template::{TemplatePayload, TemplatePiece};

pub(crate) use render::{render_scope, split_leading_connective, strip_leading_connective};
pub(crate) use template::compile_template;

use crate::{
    criteria::scope::Scope,
    schema::ColumnHandle,
    value::Value,
};
use derive_more::Display;
use std::sync::{Arc, OnceLock, Weak};

///
/// Slot
/// Boolean connective placed before a predicate.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Slot {
    #[default]
    And,
    Or,
    None,
}

impl Slot {
    #[must_use]
    pub const fn keyword(self) -> Option<&'static str> {
        match self {
            Self::And => Some("AND"),
            Self::Or => Some("OR"),
            Self::None => None,
        }
    }
}

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
        }
    }
}

///
/// RangeOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RangeOp {
    In,
    NotIn,
}

impl RangeOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::NotIn => "NOT IN",
        }
    }

    /// Constant condition rendered for an empty value set.
    #[must_use]
    pub const fn empty_condition(self) -> &'static str {
        match self {
            Self::In => "1 = 0",
            Self::NotIn => "1 = 1",
        }
    }
}

///
/// BetweenOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BetweenOp {
    Between,
    NotBetween,
}

impl BetweenOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Between => "BETWEEN",
            Self::NotBetween => "NOT BETWEEN",
        }
    }
}

///
/// LikeOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LikeOp {
    Like,
    NotLike,
}

impl LikeOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
        }
    }
}

///
/// NullOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NullOp {
    IsNull,
    IsNotNull,
}

impl NullOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }
}

///
/// FuzzyMode
/// Where the `%` wildcards go around a LIKE argument.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FuzzyMode {
    /// `arg%`
    Prefix,
    /// `%arg`
    Suffix,
    /// `%arg%`
    #[default]
    Anywhere,
    /// `arg`, unchanged
    None,
}

impl FuzzyMode {
    #[must_use]
    pub fn wrap(self, arg: &str) -> String {
        match self {
            Self::Prefix => format!("{arg}%"),
            Self::Suffix => format!("%{arg}"),
            Self::Anywhere => format!("%{arg}%"),
            Self::None => arg.to_string(),
        }
    }
}

///
/// TemplateShape
/// Binding shape of a template payload.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TemplateShape {
    Single,
    List,
    Map,
}

///
/// CriterionKind
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum CriterionKind {
    #[display("comparison")]
    Comparison,
    #[display("range")]
    Range,
    #[display("between")]
    Between,
    #[display("fuzzy_match")]
    FuzzyMatch,
    #[display("nullability")]
    Nullability,
    #[display("nested")]
    Nested,
    #[display("template")]
    Template,
    #[display("raw_sql")]
    RawSql,
}

///
/// Target
/// Left-hand side of a predicate.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Target {
    /// Column resolved through schema metadata.
    Resolved(ColumnHandle),
    /// Validated raw column name used as-is.
    Raw(String),
}

impl Target {
    #[must_use]
    pub fn column(&self) -> &str {
        match self {
            Self::Resolved(handle) => handle.column(),
            Self::Raw(name) => name,
        }
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

///
/// BoundParam
/// One allocated key and the value stored under it.
///

#[derive(Clone, Debug, PartialEq)]
pub struct BoundParam {
    pub key: String,
    pub value: Value,
}

///
/// Owner
///
/// Scope a node belongs to, set at most once. Holds a weak handle so a node
/// never keeps a discarded context alive. Not constructible outside the
/// crate, which keeps parameterized nodes builder-only.
///
/// Leaf nodes are claimed at `build()` by the scope whose parameters they
/// bound. `Nested` nodes start empty and are claimed by the first scope
/// that attaches them. Either way `Criteria::where_` rejects a node
/// claimed by another scope.
///

#[derive(Debug)]
pub struct Owner(OnceLock<Weak<Scope>>);

impl Owner {
    pub(crate) const fn empty() -> Self {
        Self(OnceLock::new())
    }

    pub(crate) fn claimed(scope: &Arc<Scope>) -> Self {
        let owner = Self::empty();
        let _ = owner.0.set(Arc::downgrade(scope));
        owner
    }

    /// Set the owner if absent, then report whether `scope` is the owner.
    pub(crate) fn claim(&self, scope: &Arc<Scope>) -> bool {
        let owner = self.0.get_or_init(|| Arc::downgrade(scope));
        Weak::ptr_eq(owner, &Arc::downgrade(scope))
    }

    #[cfg(test)]
    pub(crate) fn is_set(&self) -> bool {
        self.0.get().is_some()
    }
}

///
/// Criterion
///

#[derive(Debug)]
pub enum Criterion {
    Comparison {
        op: CompareOp,
        target: Target,
        slot: Slot,
        param: BoundParam,
        owner: Owner,
    },
    Range {
        op: RangeOp,
        target: Target,
        slot: Slot,
        params: Vec<BoundParam>,
        owner: Owner,
    },
    Between {
        op: BetweenOp,
        target: Target,
        slot: Slot,
        begin: BoundParam,
        end: BoundParam,
        owner: Owner,
    },
    FuzzyMatch {
        op: LikeOp,
        target: Target,
        slot: Slot,
        mode: FuzzyMode,
        escape: Option<char>,
        param: BoundParam,
        owner: Owner,
    },
    Nullability {
        op: NullOp,
        target: Target,
        slot: Slot,
        owner: Owner,
    },
    Nested {
        slot: Slot,
        negate: bool,
        children: Vec<Self>,
        owner: Owner,
    },
    Template {
        pattern: String,
        slot: Slot,
        shape: Option<TemplateShape>,
        pieces: Vec<TemplatePiece>,
        params: Vec<BoundParam>,
        owner: Owner,
    },
    RawSql {
        text: String,
    },
}

impl Criterion {
    /// Raw SQL passthrough. Never parameterized.
    #[must_use]
    pub fn raw(text: impl Into<String>) -> Self {
        Self::RawSql { text: text.into() }
    }

    pub(crate) fn nested(slot: Slot, negate: bool, children: Vec<Self>) -> Self {
        Self::Nested {
            slot,
            negate,
            children,
            owner: Owner::empty(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> CriterionKind {
        match self {
            Self::Comparison { .. } => CriterionKind::Comparison,
            Self::Range { .. } => CriterionKind::Range,
            Self::Between { .. } => CriterionKind::Between,
            Self::FuzzyMatch { .. } => CriterionKind::FuzzyMatch,
            Self::Nullability { .. } => CriterionKind::Nullability,
            Self::Nested { .. } => CriterionKind::Nested,
            Self::Template { .. } => CriterionKind::Template,
            Self::RawSql { .. } => CriterionKind::RawSql,
        }
    }

    /// Connective slot; raw SQL carries its own text and reports `None`.
    #[must_use]
    pub const fn slot(&self) -> Slot {
        match self {
            Self::Comparison { slot, .. }
            | Self::Range { slot, .. }
            | Self::Between { slot, .. }
            | Self::FuzzyMatch { slot, .. }
            | Self::Nullability { slot, .. }
            | Self::Nested { slot, .. }
            | Self::Template { slot, .. } => *slot,
            Self::RawSql { .. } => Slot::None,
        }
    }

    #[must_use]
    pub const fn target(&self) -> Option<&Target> {
        match self {
            Self::Comparison { target, .. }
            | Self::Range { target, .. }
            | Self::Between { target, .. }
            | Self::FuzzyMatch { target, .. }
            | Self::Nullability { target, .. } => Some(target),
            Self::Nested { .. } | Self::Template { .. } | Self::RawSql { .. } => None,
        }
    }

    /// Every parameter this node (and its children) allocated, in order.
    #[must_use]
    pub fn params(&self) -> Vec<&BoundParam> {
        let mut out = Vec::new();
        self.collect_params(&mut out);
        out
    }

    fn collect_params<'a>(&'a self, out: &mut Vec<&'a BoundParam>) {
        match self {
            Self::Comparison { param, .. } | Self::FuzzyMatch { param, .. } => out.push(param),
            Self::Range { params, .. } | Self::Template { params, .. } => out.extend(params),
            Self::Between { begin, end, .. } => {
                out.push(begin);
                out.push(end);
            }
            Self::Nested { children, .. } => {
                for child in children {
                    child.collect_params(out);
                }
            }
            Self::Nullability { .. } | Self::RawSql { .. } => {}
        }
    }

    pub(crate) const fn owner(&self) -> Option<&Owner> {
        match self {
            Self::Comparison { owner, .. }
            | Self::Range { owner, .. }
            | Self::Between { owner, .. }
            | Self::FuzzyMatch { owner, .. }
            | Self::Nullability { owner, .. }
            | Self::Nested { owner, .. }
            | Self::Template { owner, .. } => Some(owner),
            Self::RawSql { .. } => None,
        }
    }

    /// Render this node alone, as if it were the first predicate in scope.
    #[must_use]
    pub fn render(&self, ctx: &RenderContext<'_>) -> String {
        render_scope(std::slice::from_ref(self), ctx)
    }
}
