use crate::{
    criteria::{
        builder::{BuilderCore, impl_target_setters, required, scalar},
        node::{Criterion, FuzzyMode, LikeOp},
    },
    error::CriteriaError,
    traits::FieldValue,
    value::Value,
};

///
/// FuzzyBuilder
///
/// `<target> [NOT] LIKE <placeholder> [ESCAPE '<c>']`.
/// The argument is wrapped per `FuzzyMode` before it is bound, so the
/// parameter table holds the final pattern (`%bo%`), not the raw input.
///

#[derive(Debug, Default)]
pub struct FuzzyBuilder<'c> {
    core: BuilderCore<'c>,
    op: Option<LikeOp>,
    mode: Option<FuzzyMode>,
    escape: Option<char>,
    value: Option<Value>,
}

impl_target_setters!(FuzzyBuilder);

impl<'c> FuzzyBuilder<'c> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn op(mut self, op: LikeOp) -> Self {
        self.core.set_once(&mut self.op, op, "op");
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: FuzzyMode) -> Self {
        self.core.set_once(&mut self.mode, mode, "mode");
        self
    }

    #[must_use]
    pub fn escape(mut self, escape: char) -> Self {
        self.core.set_once(&mut self.escape, escape, "escape");
        self
    }

    #[must_use]
    pub fn value(mut self, value: impl FieldValue) -> Self {
        self.core.set_once(&mut self.value, value.to_value(), "value");
        self
    }

    pub fn build(self) -> Result<Option<Criterion>, CriteriaError> {
        let Self {
            core,
            op,
            mode,
            escape,
            value,
        } = self;
        let checked = core.check()?;
        let op = op.unwrap_or(LikeOp::Like);
        let mode = mode.unwrap_or_default();
        let value = required(value, "value")?;
        scalar(&value, "value")?;

        let value = match mode {
            FuzzyMode::None => value,
            _ => {
                let text = value.to_pattern_text().ok_or_else(|| {
                    CriteriaError::invalid_value(
                        "value",
                        format!("{} cannot be used in a LIKE pattern", value.label()),
                    )
                })?;
                Value::Text(mode.wrap(&text))
            }
        };

        let criteria = checked.criteria;
        let Some(target) = criteria.resolve_target(&checked.target)? else {
            return Ok(None);
        };

        Ok(Some(Criterion::FuzzyMatch {
            op,
            target,
            slot: checked.slot,
            mode,
            escape,
            param: criteria.bind(value),
            owner: criteria.new_owner(),
        }))
    }
}
