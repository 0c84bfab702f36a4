//! Identity registry.

use std::collections::{HashMap, HashSet};

use crate::core::StepId;
use crate::model::NodeId;

/// Maps step identities to nodes, plus the identities exempt from duplicate
/// reassignment.
///
/// Entries are non-owning: the document owns the nodes, the registry only
/// remembers where they are. The last registration for an identity wins.
#[derive(Debug, Clone, Default)]
pub struct StepRegistry {
    steps: HashMap<StepId, NodeId>,
    ignored: HashSet<StepId>,
}

impl StepRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Node registered under `id`.
    #[must_use]
    pub fn lookup(&self, id: StepId) -> Option<NodeId> {
        self.steps.get(&id).copied()
    }

    /// Register `node` under `id`, returning the node it replaced.
    pub fn register(&mut self, id: StepId, node: NodeId) -> Option<NodeId> {
        self.steps.insert(id, node)
    }

    /// Exempt `id` from duplicate reassignment.
    pub fn ignore(&mut self, id: StepId) {
        self.ignored.insert(id);
    }

    /// Whether `id` is exempt from duplicate reassignment.
    #[must_use]
    pub fn is_ignored(&self, id: StepId) -> bool {
        self.ignored.contains(&id)
    }

    /// Number of registered identities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of exempt identities.
    #[must_use]
    pub fn ignored_len(&self) -> usize {
        self.ignored.len()
    }

    /// All registrations, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (StepId, NodeId)> + '_ {
        self.steps.iter().map(|(id, node)| (*id, *node))
    }
}
