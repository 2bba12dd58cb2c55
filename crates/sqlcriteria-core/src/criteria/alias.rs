//! Module: criteria::alias
//! Responsibility: the table alias a context qualifies its columns with.
//! Does not own: FROM-clause generation; the execution layer applies the alias.
//! Boundary: rendering asks `AliasState::qualifier` once per pass.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

///
/// AliasSequence
/// Shared counter behind generated aliases. One per root scope.
///

#[derive(Debug, Default)]
pub(crate) struct AliasSequence(AtomicU64);

impl AliasSequence {
    fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }
}

///
/// AliasState
///

#[derive(Clone, Debug)]
pub struct AliasState {
    enabled: bool,
    user: Option<String>,
    generated: String,
    sequence: Arc<AliasSequence>,
}

impl AliasState {
    /// Draw a fresh generated alias from `sequence`.
    pub(crate) fn allocate(prefix: &str, enabled: bool, sequence: Arc<AliasSequence>) -> Self {
        let generated = format!("{prefix}{}", sequence.next());

        Self {
            enabled,
            user: None,
            generated,
            sequence,
        }
    }

    /// Same alias, same sequence; used for nested groups of one context.
    pub(crate) fn inherit(&self) -> Self {
        self.clone()
    }

    /// Fresh alias from the shared sequence; used for derived sub-contexts.
    pub(crate) fn derive(&self, prefix: &str) -> Self {
        Self::allocate(prefix, self.enabled, Arc::clone(&self.sequence))
    }

    /// Rendered alias: empty when disabled, else the user alias if non-blank,
    /// else the generated one.
    #[must_use]
    pub fn alias(&self) -> &str {
        if !self.enabled {
            return "";
        }

        match self.user.as_deref() {
            Some(user) if !user.trim().is_empty() => user.trim(),
            _ => &self.generated,
        }
    }

    /// `alias.` prefix for column references, or empty.
    #[must_use]
    pub fn qualifier(&self) -> String {
        let alias = self.alias();
        if alias.is_empty() {
            String::new()
        } else {
            format!("{alias}.")
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) const fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn set_user(&mut self, alias: Option<String>) {
        self.user = alias;
    }
}
