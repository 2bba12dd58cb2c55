use crate::{
    criteria::{
        builder::{BuilderCore, impl_target_setters},
        node::{Criterion, NullOp},
    },
    error::CriteriaError,
};

///
/// NullabilityBuilder
/// `<target> IS [NOT] NULL`; allocates nothing.
///

#[derive(Debug, Default)]
pub struct NullabilityBuilder<'c> {
    core: BuilderCore<'c>,
    op: Option<NullOp>,
}

impl_target_setters!(NullabilityBuilder);

impl<'c> NullabilityBuilder<'c> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn op(mut self, op: NullOp) -> Self {
        self.core.set_once(&mut self.op, op, "op");
        self
    }

    pub fn build(self) -> Result<Option<Criterion>, CriteriaError> {
        let Self { core, op } = self;
        let checked = core.check()?;
        let op = op.unwrap_or(NullOp::IsNull);

        let criteria = checked.criteria;
        let Some(target) = criteria.resolve_target(&checked.target)? else {
            return Ok(None);
        };

        Ok(Some(Criterion::Nullability {
            op,
            target,
            slot: checked.slot,
            owner: criteria.new_owner(),
        }))
    }
}
