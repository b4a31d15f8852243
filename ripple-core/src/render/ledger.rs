//! Event Listener Ledger
//!
//! The ledger records which listener is attached to which node for which
//! event type. When a patch sees a listener prop whose value changed, it
//! consults the ledger and skips the attach if the new listener is already
//! attached to that node for that event.
//!
//! Entries are dropped when the renderer detaches a listener or removes the
//! node it was attached to, so the ledger tracks live attachments only.
//! [`LedgerPolicy::Bounded`] additionally caps the entry count by evicting
//! the oldest entries first. An evicted attachment is no longer
//! deduplicated: a later patch may attach the same listener again.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::listener::ListenerId;
use super::target::NodeHandle;

/// Growth policy for the [`ListenerLedger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum LedgerPolicy {
    /// Keep every live attachment.
    #[default]
    Unbounded,
    /// Keep at most `capacity` entries, oldest evicted first.
    Bounded { capacity: usize },
}

/// One listener attached to one node for one event type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LedgerEntry {
    pub node: NodeHandle,
    pub event_type: String,
    pub listener: ListenerId,
}

impl LedgerEntry {
    fn new(node: NodeHandle, event_type: &str, listener: &ListenerId) -> Self {
        Self {
            node,
            event_type: event_type.to_owned(),
            listener: listener.clone(),
        }
    }
}

/// Ordered record of listener attachments.
#[derive(Debug, Clone, Default)]
pub struct ListenerLedger {
    entries: IndexSet<LedgerEntry>,
    /// Live entry count per node, so removing listener-free nodes is free.
    per_node: HashMap<NodeHandle, usize>,
    policy: LedgerPolicy,
}

impl ListenerLedger {
    /// Create an empty ledger with the given policy.
    pub fn new(policy: LedgerPolicy) -> Self {
        Self {
            entries: IndexSet::new(),
            per_node: HashMap::new(),
            policy,
        }
    }

    /// Record an attachment. Recording a present entry keeps its position.
    pub fn record(&mut self, node: NodeHandle, event_type: &str, listener: &ListenerId) {
        if !self.entries.insert(LedgerEntry::new(node, event_type, listener)) {
            return;
        }
        *self.per_node.entry(node).or_default() += 1;

        if let LedgerPolicy::Bounded { capacity } = self.policy {
            while self.entries.len() > capacity {
                let Some(evicted) = self.entries.shift_remove_index(0) else {
                    break;
                };
                trace!(listener = %evicted.listener, node = evicted.node.raw(), "evicted from ledger");
                self.release(evicted.node);
            }
        }
    }

    /// Check whether `listener` is attached to `node` for `event_type`.
    pub fn contains(&self, node: NodeHandle, event_type: &str, listener: &ListenerId) -> bool {
        self.entries
            .contains(&LedgerEntry::new(node, event_type, listener))
    }

    /// Drop the entry for a detached listener.
    pub fn forget(&mut self, node: NodeHandle, event_type: &str, listener: &ListenerId) {
        if self
            .entries
            .shift_remove(&LedgerEntry::new(node, event_type, listener))
        {
            self.release(node);
        }
    }

    /// Drop every entry for a removed node.
    pub fn forget_node(&mut self, node: NodeHandle) {
        self.forget_nodes([node]);
    }

    /// Drop every entry for a set of removed nodes in one pass.
    pub fn forget_nodes<I>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = NodeHandle>,
    {
        let per_node = &mut self.per_node;
        let doomed: HashSet<NodeHandle> = nodes
            .into_iter()
            .filter(|node| per_node.remove(node).is_some())
            .collect();
        if !doomed.is_empty() {
            self.entries.retain(|entry| !doomed.contains(&entry.node));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn policy(&self) -> LedgerPolicy {
        self.policy
    }

    /// Number of entries recorded for `node`.
    pub fn node_len(&self, node: NodeHandle) -> usize {
        self.per_node.get(&node).copied().unwrap_or(0)
    }

    /// Iterate entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter()
    }

    fn release(&mut self, node: NodeHandle) {
        if let Entry::Occupied(mut count) = self.per_node.entry(node) {
            *count.get_mut() -= 1;
            if *count.get() == 0 {
                count.remove();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NODE: NodeHandle = NodeHandle::new(1);

    fn keyed(key: &'static str) -> ListenerId {
        ListenerId::Keyed(key.into())
    }

    #[test]
    fn unbounded_ledger_keeps_everything() {
        let mut ledger = ListenerLedger::default();
        for id in 0..100 {
            ledger.record(NODE, "click", &ListenerId::Unique(id));
        }

        assert_eq!(ledger.len(), 100);
        assert!(ledger.contains(NODE, "click", &ListenerId::Unique(0)));
        assert_eq!(ledger.policy(), LedgerPolicy::Unbounded);
    }

    #[test]
    fn entries_are_scoped_to_node_and_event() {
        let mut ledger = ListenerLedger::default();
        ledger.record(NODE, "click", &keyed("a"));

        assert!(ledger.contains(NODE, "click", &keyed("a")));
        assert!(!ledger.contains(NODE, "input", &keyed("a")));
        assert!(!ledger.contains(NodeHandle::new(2), "click", &keyed("a")));
    }

    #[test]
    fn duplicate_records_are_ignored() {
        let mut ledger = ListenerLedger::default();
        ledger.record(NODE, "click", &keyed("a"));
        ledger.record(NODE, "click", &keyed("b"));
        ledger.record(NODE, "click", &keyed("a"));

        let order: Vec<_> = ledger.iter().map(|entry| entry.listener.clone()).collect();
        assert_eq!(order, vec![keyed("a"), keyed("b")]);
    }

    #[test]
    fn forget_removes_entries() {
        let mut ledger = ListenerLedger::default();
        let other = NodeHandle::new(2);
        ledger.record(NODE, "click", &keyed("a"));
        ledger.record(NODE, "input", &keyed("b"));
        ledger.record(other, "click", &keyed("a"));

        ledger.forget(NODE, "click", &keyed("a"));
        assert!(!ledger.contains(NODE, "click", &keyed("a")));
        assert_eq!(ledger.len(), 2);

        ledger.forget_node(NODE);
        assert_eq!(ledger.len(), 1);
        assert!(ledger.contains(other, "click", &keyed("a")));
    }

    #[test]
    fn bounded_ledger_evicts_oldest() {
        let mut ledger = ListenerLedger::new(LedgerPolicy::Bounded { capacity: 2 });
        ledger.record(NODE, "click", &keyed("a"));
        ledger.record(NODE, "click", &keyed("b"));
        ledger.record(NODE, "click", &keyed("c"));

        assert_eq!(ledger.len(), 2);
        assert!(!ledger.contains(NODE, "click", &keyed("a")));
        assert!(ledger.contains(NODE, "click", &keyed("b")));
        assert!(ledger.contains(NODE, "click", &keyed("c")));
    }

    #[test]
    fn forget_nodes_clears_a_subtree() {
        let mut ledger = ListenerLedger::default();
        let (a, b, c) = (NodeHandle::new(1), NodeHandle::new(2), NodeHandle::new(3));
        ledger.record(a, "click", &keyed("a"));
        ledger.record(b, "click", &keyed("b"));
        ledger.record(b, "input", &keyed("b"));
        ledger.record(c, "click", &keyed("c"));

        ledger.forget_nodes([a, b, NodeHandle::new(9)]);

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.node_len(a), 0);
        assert_eq!(ledger.node_len(b), 0);
        assert_eq!(ledger.node_len(c), 1);
    }

    #[test]
    fn node_counts_follow_eviction_and_forget() {
        let mut ledger = ListenerLedger::new(LedgerPolicy::Bounded { capacity: 2 });
        let other = NodeHandle::new(2);
        ledger.record(NODE, "click", &keyed("a"));
        ledger.record(NODE, "click", &keyed("b"));
        ledger.record(other, "click", &keyed("c"));

        assert_eq!(ledger.node_len(NODE), 1);
        assert_eq!(ledger.node_len(other), 1);

        ledger.forget(NODE, "click", &keyed("b"));
        assert_eq!(ledger.node_len(NODE), 0);

        // Forgetting an absent entry leaves the counts alone
        ledger.forget(other, "click", &keyed("zzz"));
        assert_eq!(ledger.node_len(other), 1);
    }

    #[test]
    fn policy_deserializes() {
        let bounded: LedgerPolicy =
            serde_json::from_str(r#"{"policy": "bounded", "capacity": 8}"#).unwrap();
        assert_eq!(bounded, LedgerPolicy::Bounded { capacity: 8 });

        let unbounded: LedgerPolicy = serde_json::from_str(r#"{"policy": "unbounded"}"#).unwrap();
        assert_eq!(unbounded, LedgerPolicy::Unbounded);
    }
}
