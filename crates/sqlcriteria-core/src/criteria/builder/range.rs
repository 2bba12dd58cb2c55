use crate::{
    criteria::{
        builder::{BuilderCore, impl_target_setters, required, scalar},
        node::{Criterion, RangeOp},
    },
    error::CriteriaError,
    traits::FieldValue,
    value::Value,
};

///
/// RangeBuilder
///
/// `<target> [NOT] IN (<p1>, <p2>, ...)`, one placeholder per value.
/// An empty value set is allowed and renders as a constant condition.
///

#[derive(Debug, Default)]
pub struct RangeBuilder<'c> {
    core: BuilderCore<'c>,
    op: Option<RangeOp>,
    values: Option<Vec<Value>>,
}

impl_target_setters!(RangeBuilder);

impl<'c> RangeBuilder<'c> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn op(mut self, op: RangeOp) -> Self {
        self.core.set_once(&mut self.op, op, "op");
        self
    }

    #[must_use]
    pub fn values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: FieldValue,
    {
        let values = values.into_iter().map(|v| v.to_value()).collect();
        self.core.set_once(&mut self.values, values, "values");
        self
    }

    pub fn build(self) -> Result<Option<Criterion>, CriteriaError> {
        let Self { core, op, values } = self;
        let checked = core.check()?;
        let op = required(op, "op")?;
        let values = required(values, "values")?;
        for value in &values {
            scalar(value, "values")?;
        }

        let criteria = checked.criteria;
        let Some(target) = criteria.resolve_target(&checked.target)? else {
            return Ok(None);
        };

        Ok(Some(Criterion::Range {
            op,
            target,
            slot: checked.slot,
            params: values.into_iter().map(|v| criteria.bind(v)).collect(),
            owner: criteria.new_owner(),
        }))
    }
}
