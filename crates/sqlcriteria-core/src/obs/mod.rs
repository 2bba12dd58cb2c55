//! Observability: criteria events and the sink abstraction they flow through.
//!
//! Builders and contexts never call `tracing` directly; every diagnostic is a
//! `CriteriaEvent` handed to the context's `CriteriaSink`.

pub(crate) mod sink;

// re-exports
pub use sink::{CriteriaEvent, CriteriaSink, EventLevel, MemorySink, TracingSink};
