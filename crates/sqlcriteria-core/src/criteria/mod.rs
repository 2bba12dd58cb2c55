//! Module: criteria
//! Responsibility: the criteria context and its fluent predicate surface.
//! Does not own: statement execution, result mapping, or schema storage.
//! Boundary: callers assemble a `Criteria`, then hand `compile()` output to
//! the execution layer.
//!
//! Invariants:
//! - Parameters are allocated at build time, exactly once per placeholder.
//! - Rendering is pure: repeated `segment()` calls return identical text and
//!   never touch the parameter table.
//! - The first predicate in any scope never renders a leading connective.
//! - Nested and derived contexts share their root's sequences; independent
//!   roots never do.

pub mod alias;
pub mod binder;
pub mod builder;
pub mod fragment;
pub mod node;
mod scope;

#[cfg(test)]
mod tests;

pub use alias::AliasState;
pub use binder::{NULL_SENTINEL, ParameterBinder, ParameterMap};
pub use builder::{
    BetweenBuilder, BuilderStateError, ComparisonBuilder, FieldRef, FuzzyBuilder,
    NullabilityBuilder, RangeBuilder, TargetSpec, TemplateBuilder, col, prop,
};
pub use fragment::FragmentManager;
pub use node::{
    BetweenOp, BoundParam, CompareOp, Criterion, CriterionKind, FuzzyMode, LikeOp, NullOp,
    Owner, RangeOp, RenderContext, Slot, Target, TemplatePayload, TemplatePiece, TemplateShape,
};

use crate::{
    config::CriteriaConfig,
    error::CriteriaError,
    obs::{CriteriaEvent, CriteriaSink, TracingSink},
    schema::{SchemaResolver, is_sql_identifier},
    traits::{EntityKind, FieldValue},
};
use node::{split_leading_connective, strip_leading_connective};
use scope::Scope;
use serde::Serialize;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

///
/// CompiledCondition
/// Hand-off to the execution layer: condition text plus bound parameters.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompiledCondition {
    pub sql: String,
    pub where_sql: String,
    pub params: ParameterMap,
}

///
/// Criteria
///
/// Root object of a predicate tree. Owns the fragment list and shares the
/// parameter binder and alias sequence with every context derived from it.
///

#[derive(Debug)]
pub struct Criteria {
    scope: Arc<Scope>,
    entity: Option<String>,
    alias: AliasState,
    strict: AtomicBool,
    fragments: FragmentManager,
    pending: Option<Slot>,
}

impl Criteria {
    /// Unbound context: no entity, no resolver, default configuration.
    /// Targets are used as raw identifiers.
    #[must_use]
    pub fn new() -> Self {
        Self::root(
            CriteriaConfig::default(),
            None,
            None,
            Arc::new(TracingSink),
        )
    }

    /// Context bound to entity `E`, resolved through `resolver`.
    #[must_use]
    pub fn for_entity<E: EntityKind>(resolver: Arc<dyn SchemaResolver>) -> Self {
        Self::root(
            CriteriaConfig::default(),
            Some(E::MODEL.entity_name.to_string()),
            Some(resolver),
            Arc::new(TracingSink),
        )
    }

    #[must_use]
    pub fn builder() -> CriteriaBuilder {
        CriteriaBuilder::default()
    }

    fn root(
        config: CriteriaConfig,
        entity: Option<String>,
        resolver: Option<Arc<dyn SchemaResolver>>,
        sink: Arc<dyn CriteriaSink>,
    ) -> Self {
        let strict = config.strict;
        let scope = Arc::new(Scope::new(config, resolver, sink));
        let alias = AliasState::allocate(
            &scope.config.alias_prefix,
            scope.config.alias_enabled,
            Arc::clone(&scope.aliases),
        );

        Self {
            scope,
            entity,
            alias,
            strict: AtomicBool::new(strict),
            fragments: FragmentManager::default(),
            pending: None,
        }
    }

    // context for a nested group: same entity, same alias, shared sequences
    fn child(&self) -> Self {
        Self {
            scope: Arc::clone(&self.scope),
            entity: self.entity.clone(),
            alias: self.alias.inherit(),
            strict: AtomicBool::new(self.is_strict()),
            fragments: FragmentManager::default(),
            pending: None,
        }
    }

    /// Sub-context for another entity (e.g. a subquery or join target).
    /// Shares the parameter table and alias sequence, draws a fresh alias,
    /// and keeps its own fragment list.
    #[must_use]
    pub fn derive(&self, entity: impl Into<String>) -> Self {
        Self {
            scope: Arc::clone(&self.scope),
            entity: Some(entity.into()),
            alias: self.alias.derive(&self.scope.config.alias_prefix),
            strict: AtomicBool::new(self.is_strict()),
            fragments: FragmentManager::default(),
            pending: None,
        }
    }

    /// `derive` for a statically known entity.
    #[must_use]
    pub fn derive_for<E: EntityKind>(&self) -> Self {
        self.derive(E::MODEL.entity_name)
    }

    // ------------------------------------------------------------------
    // Context state
    // ------------------------------------------------------------------

    #[must_use]
    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    #[must_use]
    pub fn config(&self) -> &CriteriaConfig {
        &self.scope.config
    }

    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.strict.load(Ordering::Acquire)
    }

    /// Switch strict/lenient mode. Only affects builds made afterwards.
    pub fn set_strict(&self, strict: bool) {
        self.strict.store(strict, Ordering::Release);
    }

    /// Rendered table alias (empty when aliasing is disabled).
    #[must_use]
    pub fn alias(&self) -> &str {
        self.alias.alias()
    }

    /// Override the generated alias; a blank or `None` alias restores it.
    pub fn set_alias(&mut self, alias: Option<impl Into<String>>) -> &mut Self {
        self.alias.set_user(alias.map(Into::into));
        self
    }

    pub fn enable_alias(&mut self, enabled: bool) -> &mut Self {
        self.alias.set_enabled(enabled);
        self
    }

    /// Use `OR` as the connective of the next predicate only.
    pub fn or_next(&mut self) -> &mut Self {
        self.pending = Some(Slot::Or);
        self
    }

    /// Use `slot` as the connective of the next predicate only.
    pub fn with_slot(&mut self, slot: Slot) -> &mut Self {
        self.pending = Some(slot);
        self
    }

    fn take_slot(&mut self) -> Slot {
        self.pending.take().unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Comparison predicates
    // ------------------------------------------------------------------

    pub fn compare(
        &mut self,
        target: impl Into<TargetSpec>,
        op: CompareOp,
        value: impl FieldValue,
    ) -> Result<&mut Self, CriteriaError> {
        let slot = self.take_slot();
        let node = ComparisonBuilder::new()
            .criteria(self)
            .target(target)
            .slot(slot)
            .op(op)
            .value(value)
            .build()?;

        self.where_(node)
    }

    pub fn eq(
        &mut self,
        target: impl Into<TargetSpec>,
        value: impl FieldValue,
    ) -> Result<&mut Self, CriteriaError> {
        self.compare(target, CompareOp::Eq, value)
    }

    pub fn ne(
        &mut self,
        target: impl Into<TargetSpec>,
        value: impl FieldValue,
    ) -> Result<&mut Self, CriteriaError> {
        self.compare(target, CompareOp::Ne, value)
    }

    pub fn gt(
        &mut self,
        target: impl Into<TargetSpec>,
        value: impl FieldValue,
    ) -> Result<&mut Self, CriteriaError> {
        self.compare(target, CompareOp::Gt, value)
    }

    pub fn ge(
        &mut self,
        target: impl Into<TargetSpec>,
        value: impl FieldValue,
    ) -> Result<&mut Self, CriteriaError> {
        self.compare(target, CompareOp::Ge, value)
    }

    pub fn lt(
        &mut self,
        target: impl Into<TargetSpec>,
        value: impl FieldValue,
    ) -> Result<&mut Self, CriteriaError> {
        self.compare(target, CompareOp::Lt, value)
    }

    pub fn le(
        &mut self,
        target: impl Into<TargetSpec>,
        value: impl FieldValue,
    ) -> Result<&mut Self, CriteriaError> {
        self.compare(target, CompareOp::Le, value)
    }

    // ------------------------------------------------------------------
    // Range / between
    // ------------------------------------------------------------------

    fn range<I, V>(
        &mut self,
        target: impl Into<TargetSpec>,
        op: RangeOp,
        values: I,
    ) -> Result<&mut Self, CriteriaError>
    where
        I: IntoIterator<Item = V>,
        V: FieldValue,
    {
        let slot = self.take_slot();
        let node = RangeBuilder::new()
            .criteria(self)
            .target(target)
            .slot(slot)
            .op(op)
            .values(values)
            .build()?;

        self.where_(node)
    }

    pub fn in_list<I, V>(
        &mut self,
        target: impl Into<TargetSpec>,
        values: I,
    ) -> Result<&mut Self, CriteriaError>
    where
        I: IntoIterator<Item = V>,
        V: FieldValue,
    {
        self.range(target, RangeOp::In, values)
    }

    pub fn not_in<I, V>(
        &mut self,
        target: impl Into<TargetSpec>,
        values: I,
    ) -> Result<&mut Self, CriteriaError>
    where
        I: IntoIterator<Item = V>,
        V: FieldValue,
    {
        self.range(target, RangeOp::NotIn, values)
    }

    fn between_op(
        &mut self,
        target: impl Into<TargetSpec>,
        op: BetweenOp,
        begin: impl FieldValue,
        end: impl FieldValue,
    ) -> Result<&mut Self, CriteriaError> {
        let slot = self.take_slot();
        let node = BetweenBuilder::new()
            .criteria(self)
            .target(target)
            .slot(slot)
            .op(op)
            .begin(begin)
            .end(end)
            .build()?;

        self.where_(node)
    }

    pub fn between(
        &mut self,
        target: impl Into<TargetSpec>,
        begin: impl FieldValue,
        end: impl FieldValue,
    ) -> Result<&mut Self, CriteriaError> {
        self.between_op(target, BetweenOp::Between, begin, end)
    }

    pub fn not_between(
        &mut self,
        target: impl Into<TargetSpec>,
        begin: impl FieldValue,
        end: impl FieldValue,
    ) -> Result<&mut Self, CriteriaError> {
        self.between_op(target, BetweenOp::NotBetween, begin, end)
    }

    // ------------------------------------------------------------------
    // Fuzzy match
    // ------------------------------------------------------------------

    fn fuzzy(
        &mut self,
        target: impl Into<TargetSpec>,
        op: LikeOp,
        mode: FuzzyMode,
        escape: Option<char>,
        value: impl FieldValue,
    ) -> Result<&mut Self, CriteriaError> {
        let slot = self.take_slot();
        let mut builder = FuzzyBuilder::new()
            .criteria(self)
            .target(target)
            .slot(slot)
            .op(op)
            .mode(mode)
            .value(value);
        if let Some(escape) = escape {
            builder = builder.escape(escape);
        }
        let node = builder.build()?;

        self.where_(node)
    }

    /// `LIKE '%arg%'`
    pub fn like(
        &mut self,
        target: impl Into<TargetSpec>,
        value: impl FieldValue,
    ) -> Result<&mut Self, CriteriaError> {
        self.fuzzy(target, LikeOp::Like, FuzzyMode::Anywhere, None, value)
    }

    /// `LIKE '%arg'`
    pub fn like_left(
        &mut self,
        target: impl Into<TargetSpec>,
        value: impl FieldValue,
    ) -> Result<&mut Self, CriteriaError> {
        self.fuzzy(target, LikeOp::Like, FuzzyMode::Suffix, None, value)
    }

    /// `LIKE 'arg%'`
    pub fn like_right(
        &mut self,
        target: impl Into<TargetSpec>,
        value: impl FieldValue,
    ) -> Result<&mut Self, CriteriaError> {
        self.fuzzy(target, LikeOp::Like, FuzzyMode::Prefix, None, value)
    }

    /// `NOT LIKE '%arg%'`
    pub fn not_like(
        &mut self,
        target: impl Into<TargetSpec>,
        value: impl FieldValue,
    ) -> Result<&mut Self, CriteriaError> {
        self.fuzzy(target, LikeOp::NotLike, FuzzyMode::Anywhere, None, value)
    }

    /// LIKE with an explicit mode and `ESCAPE` character.
    pub fn like_escape(
        &mut self,
        target: impl Into<TargetSpec>,
        value: impl FieldValue,
        mode: FuzzyMode,
        escape: char,
    ) -> Result<&mut Self, CriteriaError> {
        self.fuzzy(target, LikeOp::Like, mode, Some(escape), value)
    }

    // ------------------------------------------------------------------
    // Nullability
    // ------------------------------------------------------------------

    fn nullability(
        &mut self,
        target: impl Into<TargetSpec>,
        op: NullOp,
    ) -> Result<&mut Self, CriteriaError> {
        let slot = self.take_slot();
        let node = NullabilityBuilder::new()
            .criteria(self)
            .target(target)
            .slot(slot)
            .op(op)
            .build()?;

        self.where_(node)
    }

    pub fn is_null(&mut self, target: impl Into<TargetSpec>) -> Result<&mut Self, CriteriaError> {
        self.nullability(target, NullOp::IsNull)
    }

    pub fn is_not_null(
        &mut self,
        target: impl Into<TargetSpec>,
    ) -> Result<&mut Self, CriteriaError> {
        self.nullability(target, NullOp::IsNotNull)
    }

    // ------------------------------------------------------------------
    // Templates and raw SQL
    // ------------------------------------------------------------------

    /// Template bound from a positional list (`{}` / `{0}` tokens).
    /// A pattern that opens with `AND`/`OR` uses that connective instead of
    /// the default one; a slot set with `or_next` / `with_slot` replaces it.
    pub fn template<I, V>(
        &mut self,
        pattern: impl Into<String>,
        values: I,
    ) -> Result<&mut Self, CriteriaError>
    where
        I: IntoIterator<Item = V>,
        V: FieldValue,
    {
        let pattern = pattern.into();
        let slot = self.template_slot(&pattern);
        let node = TemplateBuilder::new()
            .criteria(self)
            .pattern(pattern)
            .slot(slot)
            .values(values)
            .build()?;

        self.where_(node)
    }

    /// Template bound from named entries (`{name}` tokens).
    pub fn template_named<I, K, V>(
        &mut self,
        pattern: impl Into<String>,
        entries: I,
    ) -> Result<&mut Self, CriteriaError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: FieldValue,
    {
        let pattern = pattern.into();
        let slot = self.template_slot(&pattern);
        let node = TemplateBuilder::new()
            .criteria(self)
            .pattern(pattern)
            .slot(slot)
            .named(entries)
            .build()?;

        self.where_(node)
    }

    /// Template where every token binds the same single value.
    pub fn template_value(
        &mut self,
        pattern: impl Into<String>,
        value: impl FieldValue,
    ) -> Result<&mut Self, CriteriaError> {
        let pattern = pattern.into();
        let slot = self.template_slot(&pattern);
        let node = TemplateBuilder::new()
            .criteria(self)
            .pattern(pattern)
            .slot(slot)
            .value(value)
            .build()?;

        self.where_(node)
    }

    // pending slot, else the connective spelled in the pattern, else AND;
    // the renderer drops the spelled connective once the slot carries one
    fn template_slot(&mut self, pattern: &str) -> Slot {
        if let Some(slot) = self.pending.take() {
            return slot;
        }

        split_leading_connective(pattern).map_or(Slot::And, |(slot, _)| slot)
    }

    /// Append raw SQL verbatim. Never parameterized; text that is blank or
    /// only a connective is ignored.
    /// The text carries its own connective (`"AND x = 1"`); only a leading
    /// one on the first predicate in scope is removed.
    pub fn apply(&mut self, sql: impl Into<String>) -> Result<&mut Self, CriteriaError> {
        self.pending = None;
        self.where_(Criterion::raw(sql))
    }

    // ------------------------------------------------------------------
    // Nested groups
    // ------------------------------------------------------------------

    /// `AND (...)` built by `group` on a child context.
    pub fn and<F>(&mut self, group: F) -> Result<&mut Self, CriteriaError>
    where
        F: FnOnce(&mut Self) -> Result<(), CriteriaError>,
    {
        self.nest(Slot::And, false, group)
    }

    /// `OR (...)`
    pub fn or<F>(&mut self, group: F) -> Result<&mut Self, CriteriaError>
    where
        F: FnOnce(&mut Self) -> Result<(), CriteriaError>,
    {
        self.nest(Slot::Or, false, group)
    }

    /// `AND NOT (...)`
    pub fn and_not<F>(&mut self, group: F) -> Result<&mut Self, CriteriaError>
    where
        F: FnOnce(&mut Self) -> Result<(), CriteriaError>,
    {
        self.nest(Slot::And, true, group)
    }

    /// `OR NOT (...)`
    pub fn or_not<F>(&mut self, group: F) -> Result<&mut Self, CriteriaError>
    where
        F: FnOnce(&mut Self) -> Result<(), CriteriaError>,
    {
        self.nest(Slot::Or, true, group)
    }

    fn nest<F>(&mut self, slot: Slot, negate: bool, group: F) -> Result<&mut Self, CriteriaError>
    where
        F: FnOnce(&mut Self) -> Result<(), CriteriaError>,
    {
        self.pending = None;

        let mut child = self.child();
        group(&mut child)?;
        let children = child.fragments.into_nodes();

        if children.is_empty() {
            self.record(CriteriaEvent::EmptyGroupSkipped);
            return Ok(self);
        }

        self.where_(Criterion::nested(slot, negate, children))
    }

    // ------------------------------------------------------------------
    // Attach
    // ------------------------------------------------------------------

    /// Attach a built criterion. `None` (a lenient-mode skip) is ignored.
    pub fn where_(
        &mut self,
        criterion: impl Into<Option<Criterion>>,
    ) -> Result<&mut Self, CriteriaError> {
        let Some(criterion) = criterion.into() else {
            return Ok(self);
        };

        if let Some(owner) = criterion.owner()
            && !owner.claim(&self.scope)
        {
            return Err(BuilderStateError::ForeignCriterion.into());
        }
        if let Criterion::RawSql { text } = &criterion
            && strip_leading_connective(text).trim_end().is_empty()
        {
            return Ok(self);
        }

        self.record(CriteriaEvent::CriterionAttached {
            kind: criterion.kind(),
        });
        self.fragments.push(criterion);

        Ok(self)
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    #[must_use]
    pub fn has_condition(&self) -> bool {
        !self.fragments.is_empty()
    }

    #[must_use]
    pub const fn fragments(&self) -> &FragmentManager {
        &self.fragments
    }

    /// Condition text without `WHERE`.
    #[must_use]
    pub fn segment(&self) -> String {
        let qualifier = self.alias.qualifier();
        let ctx = RenderContext::new(&qualifier, self.scope.config.placeholder);

        self.fragments.segment(&ctx)
    }

    /// `WHERE <segment>`, or empty when no condition is attached.
    #[must_use]
    pub fn where_segment(&self) -> String {
        if self.has_condition() {
            format!("WHERE {}", self.segment())
        } else {
            String::new()
        }
    }

    /// Snapshot of every parameter bound in this scope, in key order.
    #[must_use]
    pub fn parameters(&self) -> ParameterMap {
        self.scope.binder.mapping()
    }

    #[must_use]
    pub fn compile(&self) -> CompiledCondition {
        let sql = self.segment();
        let where_sql = if sql.is_empty() {
            String::new()
        } else {
            format!("WHERE {sql}")
        };

        CompiledCondition {
            sql,
            where_sql,
            params: self.parameters(),
        }
    }

    // ------------------------------------------------------------------
    // Builder support (crate-internal)
    // ------------------------------------------------------------------

    pub(crate) fn record(&self, event: CriteriaEvent) {
        self.scope.record(event);
    }

    pub(crate) fn new_owner(&self) -> Owner {
        Owner::claimed(&self.scope)
    }

    pub(crate) fn bind(&self, value: crate::value::Value) -> BoundParam {
        let (key, value) = self.scope.binder.allocate_entry(value);
        self.record(CriteriaEvent::ParameterBound { key: key.clone() });

        BoundParam { key, value }
    }

    /// Resolve a builder target. Lenient failures are reported and yield `None`.
    pub(crate) fn resolve_target(
        &self,
        target: &TargetSpec,
    ) -> Result<Option<Target>, CriteriaError> {
        let failure = match self.lookup(target) {
            Ok(target) => return Ok(Some(target)),
            Err(failure) => failure,
        };
        if self.is_strict() {
            return Err(failure);
        }

        let event = match &failure {
            CriteriaError::ResolutionFailure {
                entity,
                identifier,
                kind,
            } => CriteriaEvent::UnresolvedTarget {
                entity: entity.clone(),
                identifier: identifier.clone(),
                kind: *kind,
            },
            CriteriaError::InvalidIdentifier { identifier } => CriteriaEvent::InvalidIdentifier {
                identifier: identifier.clone(),
            },
            _ => return Err(failure),
        };
        self.record(event);

        Ok(None)
    }

    fn lookup(&self, target: &TargetSpec) -> Result<Target, CriteriaError> {
        if let (Some(entity), Some(resolver)) =
            (self.entity.as_deref(), self.scope.resolver.as_deref())
        {
            let handle = match target {
                TargetSpec::Property(_) | TargetSpec::PropertyName(_) => {
                    resolver.resolve(entity, target.identifier())
                }
                TargetSpec::Column(column) => resolver.resolve_raw(entity, column),
            };

            return handle.map(Target::Resolved).ok_or_else(|| {
                CriteriaError::resolution(entity, target.identifier(), target.reference_kind())
            });
        }

        let name = target.identifier();
        if is_sql_identifier(name) {
            Ok(Target::Raw(name.to_string()))
        } else {
            Err(CriteriaError::InvalidIdentifier {
                identifier: name.to_string(),
            })
        }
    }
}

impl Default for Criteria {
    fn default() -> Self {
        Self::new()
    }
}

///
/// CriteriaBuilder
/// Assembles a root `Criteria` from configuration and collaborators.
///

#[derive(Default)]
pub struct CriteriaBuilder {
    config: CriteriaConfig,
    entity: Option<String>,
    resolver: Option<Arc<dyn SchemaResolver>>,
    sink: Option<Arc<dyn CriteriaSink>>,
}

impl CriteriaBuilder {
    #[must_use]
    pub fn config(mut self, config: CriteriaConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    #[must_use]
    pub fn entity_kind<E: EntityKind>(self) -> Self {
        self.entity(E::MODEL.entity_name)
    }

    #[must_use]
    pub fn resolver(mut self, resolver: Arc<dyn SchemaResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn CriteriaSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Validate the configuration and open the context.
    pub fn build(self) -> Result<Criteria, CriteriaError> {
        self.config.validate()?;
        let sink = self.sink.unwrap_or_else(|| Arc::new(TracingSink));

        Ok(Criteria::root(self.config, self.entity, self.resolver, sink))
    }
}
