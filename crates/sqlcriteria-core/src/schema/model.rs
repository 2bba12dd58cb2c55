use crate::{
    model::entity::EntityModel,
    schema::{ColumnHandle, SchemaResolver},
};
use std::collections::BTreeMap;

///
/// ModelResolver
///
/// `SchemaResolver` backed by static `EntityModel`s, keyed by entity name.
///

#[derive(Debug, Default)]
pub struct ModelResolver {
    models: BTreeMap<&'static str, &'static EntityModel>,
}

impl ModelResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model, replacing any earlier model with the same entity name.
    #[must_use]
    pub fn with(mut self, model: &'static EntityModel) -> Self {
        self.register(model);
        self
    }

    pub fn register(&mut self, model: &'static EntityModel) {
        self.models.insert(model.entity_name, model);
    }

    #[must_use]
    pub fn model(&self, entity: &str) -> Option<&'static EntityModel> {
        self.models.get(entity).copied()
    }
}

impl FromIterator<&'static EntityModel> for ModelResolver {
    fn from_iter<I: IntoIterator<Item = &'static EntityModel>>(iter: I) -> Self {
        let mut resolver = Self::new();
        for model in iter {
            resolver.register(model);
        }

        resolver
    }
}

impl SchemaResolver for ModelResolver {
    fn resolve(&self, entity: &str, property: &str) -> Option<ColumnHandle> {
        let field = self.model(entity)?.field(property)?;

        Some(ColumnHandle::new(field.column, field.primary_key))
    }

    fn resolve_raw(&self, entity: &str, column: &str) -> Option<ColumnHandle> {
        let field = self.model(entity)?.field_by_column(column)?;

        Some(ColumnHandle::new(field.column, field.primary_key))
    }
}
