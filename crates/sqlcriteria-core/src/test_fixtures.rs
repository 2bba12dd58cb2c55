use crate::{
    criteria::FieldRef,
    model::{entity::EntityModel, field::FieldModel},
    schema::ModelResolver,
    traits::EntityKind,
};
use std::sync::Arc;

///
/// UserEntity
///

pub(crate) struct UserEntity;

static USER_FIELDS: [FieldModel; 6] = [
    FieldModel::primary("id", "id"),
    FieldModel::new("name", "name"),
    FieldModel::new("age", "age"),
    FieldModel::new("status", "status"),
    FieldModel::new("email", "email"),
    FieldModel::new("createdAt", "created_at"),
];

static USER_MODEL: EntityModel = EntityModel {
    path: "fixtures::UserEntity",
    entity_name: "user",
    table: "users",
    fields: &USER_FIELDS,
};

impl UserEntity {
    pub(crate) const NAME: FieldRef = FieldRef::new("name");
    pub(crate) const AGE: FieldRef = FieldRef::new("age");
    pub(crate) const STATUS: FieldRef = FieldRef::new("status");
    pub(crate) const CREATED_AT: FieldRef = FieldRef::new("createdAt");
}

impl EntityKind for UserEntity {
    const MODEL: &'static EntityModel = &USER_MODEL;
}

///
/// OrderEntity
///

pub(crate) struct OrderEntity;

static ORDER_FIELDS: [FieldModel; 3] = [
    FieldModel::primary("id", "order_id"),
    FieldModel::new("userId", "user_id"),
    FieldModel::new("total", "total"),
];

static ORDER_MODEL: EntityModel = EntityModel {
    path: "fixtures::OrderEntity",
    entity_name: "order",
    table: "orders",
    fields: &ORDER_FIELDS,
};

impl EntityKind for OrderEntity {
    const MODEL: &'static EntityModel = &ORDER_MODEL;
}

/// Resolver covering every fixture entity.
pub(crate) fn resolver() -> Arc<ModelResolver> {
    Arc::new(
        [UserEntity::MODEL, OrderEntity::MODEL]
            .into_iter()
            .collect(),
    )
}
