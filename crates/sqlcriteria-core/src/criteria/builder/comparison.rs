use crate::{
    criteria::{
        builder::{BuilderCore, impl_target_setters, required, scalar},
        node::{CompareOp, Criterion},
    },
    error::CriteriaError,
    traits::FieldValue,
    value::Value,
};

///
/// ComparisonBuilder
/// `<target> <op> <placeholder>`
///

#[derive(Debug, Default)]
pub struct ComparisonBuilder<'c> {
    core: BuilderCore<'c>,
    op: Option<CompareOp>,
    value: Option<Value>,
}

impl_target_setters!(ComparisonBuilder);

impl<'c> ComparisonBuilder<'c> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn op(mut self, op: CompareOp) -> Self {
        self.core.set_once(&mut self.op, op, "op");
        self
    }

    #[must_use]
    pub fn value(mut self, value: impl FieldValue) -> Self {
        self.core.set_once(&mut self.value, value.to_value(), "value");
        self
    }

    pub fn build(self) -> Result<Option<Criterion>, CriteriaError> {
        let Self { core, op, value } = self;
        let checked = core.check()?;
        let op = required(op, "op")?;
        let value = required(value, "value")?;
        scalar(&value, "value")?;

        let criteria = checked.criteria;
        let Some(target) = criteria.resolve_target(&checked.target)? else {
            return Ok(None);
        };

        Ok(Some(Criterion::Comparison {
            op,
            target,
            slot: checked.slot,
            param: criteria.bind(value),
            owner: criteria.new_owner(),
        }))
    }
}
