//! Runtime entity metadata consumed by schema resolution.
//! Models are plain statics; nothing here allocates or caches.

pub mod entity;
pub mod field;
