//! Per-call-path timing statistics.

use crate::clock::Stamp;
use crate::registry::TimingId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Index of a node inside its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Raw arena index.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// One timed region at one position in the call tree.
///
/// The same label under two different parents gets two nodes.
#[derive(Debug, Clone)]
pub struct TimingNode {
    id: TimingId,
    label: String,
    parent: Option<NodeId>,
    children: HashMap<TimingId, NodeId>,
    /// Creation index among siblings
    order: usize,
    next_child_order: usize,

    cpu_us: u64,
    wall_us: u64,
    /// Sum of squared per-call CPU durations, in µs²
    sum_sq_us: f64,
    calls: u64,
    iteration_us: u64,
    max_us: u64,
    min_us: u64,
    iterations: u64,

    started: Option<Stamp>,
}

impl TimingNode {
    pub(crate) fn new(id: TimingId, label: impl Into<String>, parent: Option<NodeId>, order: usize) -> Self {
        Self {
            id,
            label: label.into(),
            parent,
            children: HashMap::new(),
            order,
            next_child_order: 0,
            cpu_us: 0,
            wall_us: 0,
            sum_sq_us: 0.0,
            calls: 0,
            iteration_us: 0,
            max_us: 0,
            min_us: 0,
            iterations: 0,
            started: None,
        }
    }

    /// Fold one call's elapsed time into the statistics.
    pub(crate) fn record(&mut self, cpu_us: u64, wall_us: u64) {
        self.calls += 1;
        self.cpu_us += cpu_us;
        self.wall_us += wall_us;
        self.sum_sq_us += (cpu_us as f64) * (cpu_us as f64);
        self.iteration_us += cpu_us;
    }

    /// Fold the per-iteration accumulator into min/max and clear it.
    ///
    /// Only this node; the tree drives the recursion.
    pub(crate) fn close_iteration(&mut self) {
        if self.iterations == 0 {
            self.max_us = self.iteration_us;
            self.min_us = self.iteration_us;
        } else {
            self.max_us = self.max_us.max(self.iteration_us);
            self.min_us = self.min_us.min(self.iteration_us);
        }
        self.iterations += 1;
        self.iteration_us = 0;
    }

    pub(crate) fn child_for(&self, id: TimingId) -> Option<NodeId> {
        self.children.get(&id).copied()
    }

    pub(crate) fn adopt(&mut self, id: TimingId, child: NodeId) -> usize {
        self.children.insert(id, child);
        let order = self.next_child_order;
        self.next_child_order += 1;
        order
    }

    pub(crate) fn start(&mut self, stamp: Stamp) {
        self.started = Some(stamp);
    }

    pub(crate) fn take_start(&mut self) -> Option<Stamp> {
        self.started.take()
    }

    pub(crate) fn child_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.values().copied()
    }

    /// Label id of this node.
    pub fn id(&self) -> TimingId {
        self.id
    }

    /// Label of this node.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Parent node, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Creation index among siblings.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Number of completed calls.
    pub fn calls(&self) -> u64 {
        self.calls
    }

    /// Cumulative CPU time in microseconds.
    pub fn cpu_us(&self) -> u64 {
        self.cpu_us
    }

    /// Cumulative wall time in microseconds.
    pub fn wall_us(&self) -> u64 {
        self.wall_us
    }

    /// Sum of squared per-call CPU times in µs².
    pub fn sum_sq_us(&self) -> f64 {
        self.sum_sq_us
    }

    /// CPU time accumulated since the last iteration boundary.
    pub fn iteration_us(&self) -> u64 {
        self.iteration_us
    }

    /// Number of iteration boundaries seen.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Largest per-iteration time, `None` before the first boundary.
    pub fn max_us(&self) -> Option<u64> {
        (self.iterations > 0).then_some(self.max_us)
    }

    /// Smallest per-iteration time, `None` before the first boundary.
    pub fn min_us(&self) -> Option<u64> {
        (self.iterations > 0).then_some(self.min_us)
    }

    /// Check whether the region is currently open.
    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    /// Mean CPU time per call in microseconds.
    pub fn mean_us(&self) -> f64 {
        if self.calls == 0 {
            return 0.0;
        }
        self.cpu_us as f64 / self.calls as f64
    }

    /// Standard deviation of per-call CPU time in microseconds.
    pub fn std_dev_us(&self) -> f64 {
        if self.calls == 0 {
            return 0.0;
        }
        let mean = self.mean_us();
        let variance = self.sum_sq_us / self.calls as f64 - mean * mean;
        // Rounding can push a zero variance slightly negative
        variance.max(0.0).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::LabelRegistry;

    fn node() -> TimingNode {
        let registry = LabelRegistry::new();
        TimingNode::new(registry.id_for("step"), "step", None, 0)
    }

    #[test]
    fn test_record_accumulates() {
        let mut n = node();
        n.record(3, 4);
        n.record(5, 6);

        assert_eq!(n.calls(), 2);
        assert_eq!(n.cpu_us(), 8);
        assert_eq!(n.wall_us(), 10);
        assert_eq!(n.sum_sq_us(), 34.0);
        assert_eq!(n.iteration_us(), 8);
    }

    #[test]
    fn test_mean_and_std_dev() {
        let mut n = node();
        for t in [2, 4, 4, 4, 5, 5, 7, 9] {
            n.record(t, t);
        }
        assert_eq!(n.mean_us(), 5.0);
        assert!((n.std_dev_us() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_std_dev_of_constant_series_is_zero() {
        let mut n = node();
        n.record(7, 7);
        n.record(7, 7);
        assert_eq!(n.std_dev_us(), 0.0);
    }

    #[test]
    fn test_empty_node_stats() {
        let n = node();
        assert_eq!(n.mean_us(), 0.0);
        assert_eq!(n.std_dev_us(), 0.0);
        assert_eq!(n.min_us(), None);
        assert_eq!(n.max_us(), None);
        assert!(!n.is_running());
    }

    #[test]
    fn test_close_iteration_extrema() {
        let mut n = node();
        for t in [5, 2, 8] {
            n.record(t, t);
            n.close_iteration();
        }
        assert_eq!(n.max_us(), Some(8));
        assert_eq!(n.min_us(), Some(2));
        assert_eq!(n.iterations(), 3);
        assert_eq!(n.iteration_us(), 0);
    }

    #[test]
    fn test_iteration_sums_multiple_entries() {
        let mut n = node();
        n.record(1, 1);
        n.record(2, 2);
        n.close_iteration();
        n.record(10, 10);
        n.close_iteration();

        assert_eq!(n.min_us(), Some(3));
        assert_eq!(n.max_us(), Some(10));
    }

    #[test]
    fn test_adopt_assigns_creation_order() {
        let registry = LabelRegistry::new();
        let mut n = node();
        assert_eq!(n.adopt(registry.id_for("a"), NodeId(1)), 0);
        assert_eq!(n.adopt(registry.id_for("b"), NodeId(2)), 1);
        assert_eq!(n.child_count(), 2);
        assert_eq!(n.child_for(registry.id_for("b")), Some(NodeId(2)));
    }
}
