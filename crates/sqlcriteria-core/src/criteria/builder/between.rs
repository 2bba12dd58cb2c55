use crate::{
    criteria::{
        builder::{BuilderCore, impl_target_setters, required, scalar},
        node::{BetweenOp, Criterion},
    },
    error::CriteriaError,
    traits::FieldValue,
    value::Value,
};

///
/// BetweenBuilder
/// `<target> [NOT] BETWEEN <begin> AND <end>`
///

#[derive(Debug, Default)]
pub struct BetweenBuilder<'c> {
    core: BuilderCore<'c>,
    op: Option<BetweenOp>,
    begin: Option<Value>,
    end: Option<Value>,
}

impl_target_setters!(BetweenBuilder);

impl<'c> BetweenBuilder<'c> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn op(mut self, op: BetweenOp) -> Self {
        self.core.set_once(&mut self.op, op, "op");
        self
    }

    #[must_use]
    pub fn begin(mut self, value: impl FieldValue) -> Self {
        self.core.set_once(&mut self.begin, value.to_value(), "begin");
        self
    }

    #[must_use]
    pub fn end(mut self, value: impl FieldValue) -> Self {
        self.core.set_once(&mut self.end, value.to_value(), "end");
        self
    }

    pub fn build(self) -> Result<Option<Criterion>, CriteriaError> {
        let Self {
            core,
            op,
            begin,
            end,
        } = self;
        let checked = core.check()?;
        let op = op.unwrap_or(BetweenOp::Between);
        let begin = required(begin, "begin")?;
        let end = required(end, "end")?;
        scalar(&begin, "begin")?;
        scalar(&end, "end")?;

        let criteria = checked.criteria;
        let Some(target) = criteria.resolve_target(&checked.target)? else {
            return Ok(None);
        };

        // begin is always allocated before end
        let begin = criteria.bind(begin);
        let end = criteria.bind(end);

        Ok(Some(Criterion::Between {
            op,
            target,
            slot: checked.slot,
            begin,
            end,
            owner: criteria.new_owner(),
        }))
    }
}
