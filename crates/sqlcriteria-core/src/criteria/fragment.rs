//! Module: criteria::fragment
//! Responsibility: the ordered list of attached criteria and its rendering.
//! Does not own: parameter allocation; nodes arrive fully bound.
//! Boundary: `Criteria` is the only writer; rendering is read-only.

use crate::criteria::node::{Criterion, RenderContext, render_scope};

///
/// FragmentManager
///

#[derive(Debug, Default)]
pub struct FragmentManager {
    nodes: Vec<Criterion>,
}

impl FragmentManager {
    pub(crate) fn push(&mut self, node: Criterion) {
        self.nodes.push(node);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn nodes(&self) -> &[Criterion] {
        &self.nodes
    }

    pub(crate) fn into_nodes(self) -> Vec<Criterion> {
        self.nodes
    }

    /// Joined, normalized condition text (no `WHERE`).
    #[must_use]
    pub fn segment(&self, ctx: &RenderContext<'_>) -> String {
        render_scope(&self.nodes, ctx)
    }
}
