use crate::{
    config::CriteriaConfig,
    criteria::{alias::AliasSequence, binder::ParameterBinder},
    obs::{CriteriaEvent, CriteriaSink},
    schema::SchemaResolver,
};
use std::{fmt, sync::Arc};

///
/// Scope
///
/// State shared by a root context and every context derived from it:
/// configuration, the parameter table, the alias sequence, and the
/// resolver/sink collaborators. Roots never share a scope.
///

pub(crate) struct Scope {
    pub(crate) config: CriteriaConfig,
    pub(crate) binder: ParameterBinder,
    pub(crate) aliases: Arc<AliasSequence>,
    pub(crate) resolver: Option<Arc<dyn SchemaResolver>>,
    pub(crate) sink: Arc<dyn CriteriaSink>,
}

impl Scope {
    pub(crate) fn new(
        config: CriteriaConfig,
        resolver: Option<Arc<dyn SchemaResolver>>,
        sink: Arc<dyn CriteriaSink>,
    ) -> Self {
        let binder = ParameterBinder::new(config.param_prefix.clone(), config.null_binding);

        Self {
            config,
            binder,
            aliases: Arc::new(AliasSequence::default()),
            resolver,
            sink,
        }
    }

    pub(crate) fn record(&self, event: CriteriaEvent) {
        self.sink.record(&event);
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("config", &self.config)
            .field("binder", &self.binder)
            .field("resolver", &self.resolver.is_some())
            .finish_non_exhaustive()
    }
}
