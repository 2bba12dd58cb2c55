//! Criteria event sink boundary.
//!
//! This module is the only bridge between criteria assembly and logging.
//! Lenient-mode degradations MUST be reported here; they are never dropped
//! silently.

use crate::{criteria::CriterionKind, schema::ReferenceKind};
use parking_lot::Mutex;
use std::fmt;

///
/// EventLevel
///

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum EventLevel {
    Trace,
    Debug,
    Warn,
}

///
/// CriteriaEvent
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CriteriaEvent {
    /// Lenient mode skipped a predicate whose target did not resolve.
    UnresolvedTarget {
        entity: String,
        identifier: String,
        kind: ReferenceKind,
    },
    /// Lenient mode skipped a predicate whose raw name is not an identifier.
    InvalidIdentifier { identifier: String },
    /// A template token had no matching payload entry and was left as-is.
    TemplateTokenUnresolved { token: String },
    /// A template payload carried entries no token referenced.
    TemplateValuesUnused { unused: usize },
    /// A nested group produced no predicates and was not attached.
    EmptyGroupSkipped,
    ParameterBound { key: String },
    CriterionAttached { kind: CriterionKind },
}

impl CriteriaEvent {
    #[must_use]
    pub const fn level(&self) -> EventLevel {
        match self {
            Self::UnresolvedTarget { .. } | Self::InvalidIdentifier { .. } => EventLevel::Warn,
            Self::TemplateTokenUnresolved { .. }
            | Self::TemplateValuesUnused { .. }
            | Self::EmptyGroupSkipped => EventLevel::Debug,
            Self::ParameterBound { .. } | Self::CriterionAttached { .. } => EventLevel::Trace,
        }
    }
}

impl fmt::Display for CriteriaEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedTarget {
                entity,
                identifier,
                kind,
            } => write!(
                f,
                "skipping predicate: {kind} '{identifier}' not found on entity '{entity}'"
            ),
            Self::InvalidIdentifier { identifier } => {
                write!(f, "skipping predicate: '{identifier}' is not a valid sql identifier")
            }
            Self::TemplateTokenUnresolved { token } => {
                write!(f, "template token '{token}' left unresolved")
            }
            Self::TemplateValuesUnused { unused } => {
                write!(f, "template dropped {unused} unused value(s)")
            }
            Self::EmptyGroupSkipped => f.write_str("nested group is empty; not attached"),
            Self::ParameterBound { key } => write!(f, "bound parameter {key}"),
            Self::CriterionAttached { kind } => write!(f, "attached {kind} criterion"),
        }
    }
}

///
/// CriteriaSink
///

pub trait CriteriaSink: Send + Sync {
    fn record(&self, event: &CriteriaEvent);
}

///
/// TracingSink
/// Default sink; forwards every event to `tracing` at its level.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl CriteriaSink for TracingSink {
    fn record(&self, event: &CriteriaEvent) {
        match event {
            CriteriaEvent::UnresolvedTarget {
                entity,
                identifier,
                kind,
            } => {
                tracing::warn!(entity = %entity, identifier = %identifier, kind = %kind, "{event}");
            }
            CriteriaEvent::InvalidIdentifier { identifier } => {
                tracing::warn!(identifier = %identifier, "{event}");
            }
            _ => match event.level() {
                EventLevel::Warn => tracing::warn!("{event}"),
                EventLevel::Debug => tracing::debug!("{event}"),
                EventLevel::Trace => tracing::trace!("{event}"),
            },
        }
    }
}

///
/// MemorySink
///
/// Collects events in memory. Meant for tests and for callers that want to
/// surface lenient-mode warnings to their own users.
///

#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<CriteriaEvent>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<CriteriaEvent> {
        self.events.lock().clone()
    }

    /// Events at `EventLevel::Warn` only.
    #[must_use]
    pub fn warnings(&self) -> Vec<CriteriaEvent> {
        self.events
            .lock()
            .iter()
            .filter(|event| event.level() == EventLevel::Warn)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl CriteriaSink for MemorySink {
    fn record(&self, event: &CriteriaEvent) {
        self.events.lock().push(event.clone());
    }
}
