use crate::{
    criteria::{
        Criteria,
        builder::{BuilderStateError, required},
        node::{
            Criterion, Slot, TemplatePayload, TemplateShape, compile_template,
            strip_leading_connective,
        },
    },
    error::CriteriaError,
    obs::CriteriaEvent,
    traits::FieldValue,
};

///
/// TemplateBuilder
///
/// Free-form SQL with `{}` / `{name}` tokens bound from a payload.
/// The binding shape follows whichever payload is non-empty unless
/// `shape` overrides it.
///

#[derive(Debug, Default)]
pub struct TemplateBuilder<'c> {
    criteria: Option<&'c Criteria>,
    pattern: Option<String>,
    slot: Slot,
    shape: Option<TemplateShape>,
    payload: TemplatePayload,
    fault: Option<BuilderStateError>,
}

impl<'c> TemplateBuilder<'c> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn criteria(mut self, criteria: &'c Criteria) -> Self {
        if self.criteria.replace(criteria).is_some() {
            self.fault
                .get_or_insert(BuilderStateError::CriteriaAlreadySet);
        }
        self
    }

    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        if self.pattern.replace(pattern.into()).is_some() {
            self.fault
                .get_or_insert(BuilderStateError::FieldAlreadySet { field: "pattern" });
        }
        self
    }

    #[must_use]
    pub const fn slot(mut self, slot: Slot) -> Self {
        self.slot = slot;
        self
    }

    /// Force a binding shape instead of detecting it from the payload.
    #[must_use]
    pub const fn shape(mut self, shape: TemplateShape) -> Self {
        self.shape = Some(shape);
        self
    }

    #[must_use]
    pub fn value(mut self, value: impl FieldValue) -> Self {
        self.payload.single = Some(value.to_value());
        self
    }

    #[must_use]
    pub fn values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: FieldValue,
    {
        self.payload
            .list
            .extend(values.into_iter().map(|v| v.to_value()));
        self
    }

    #[must_use]
    pub fn named<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: FieldValue,
    {
        self.payload
            .map
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.to_value())));
        self
    }

    pub fn build(self) -> Result<Option<Criterion>, CriteriaError> {
        if let Some(fault) = self.fault {
            return Err(fault.into());
        }
        let criteria = self.criteria.ok_or(BuilderStateError::MissingCriteria)?;
        let pattern = required(self.pattern, "pattern")?;
        if strip_leading_connective(&pattern).trim_end().is_empty() {
            return Err(CriteriaError::invalid_value("pattern", "template is blank"));
        }

        let shape = self.shape.or_else(|| self.payload.detect_shape());
        let compiled = compile_template(&pattern, shape, &self.payload, &mut |value| {
            criteria.bind(value)
        });

        for token in compiled.unresolved {
            criteria.record(CriteriaEvent::TemplateTokenUnresolved { token });
        }
        if compiled.unused > 0 {
            criteria.record(CriteriaEvent::TemplateValuesUnused {
                unused: compiled.unused,
            });
        }

        Ok(Some(Criterion::Template {
            pattern,
            slot: self.slot,
            shape,
            pieces: compiled.pieces,
            params: compiled.params,
            owner: criteria.new_owner(),
        }))
    }
}
