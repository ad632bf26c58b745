//! Serializable copies of a timing tree.

use crate::clock::Clock;
use crate::error::TimingResult;
use crate::node::NodeId;
use crate::registry::TimingId;
use crate::tree::TimingTree;
use serde::{Deserialize, Serialize};

/// Statistics of one node and its subtree, detached from the live tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingSnapshot {
    /// Region label
    pub label: String,
    /// Label id
    pub id: TimingId,
    /// Completed calls
    pub calls: u64,
    /// Cumulative CPU time in microseconds
    pub cpu_us: u64,
    /// Cumulative wall time in microseconds
    pub wall_us: u64,
    /// CPU total, falling back to the children's sum for never-closed nodes
    pub total_us: u64,
    /// Mean CPU time per call in microseconds
    pub mean_us: f64,
    /// Standard deviation of per-call CPU time in microseconds
    pub std_dev_us: f64,
    /// Smallest per-iteration time
    pub min_us: Option<u64>,
    /// Largest per-iteration time
    pub max_us: Option<u64>,
    /// Iteration boundaries seen
    pub iterations: u64,
    /// Children in creation order
    pub children: Vec<TimingSnapshot>,
}

impl TimingSnapshot {
    /// Find a descendant by the labels on the path below this node.
    pub fn find(&self, path: &[&str]) -> Option<&TimingSnapshot> {
        path.iter().try_fold(self, |node, label| {
            node.children.iter().find(|child| child.label == *label)
        })
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> TimingResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot from JSON.
    pub fn from_json(json: &str) -> TimingResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl<C: Clock> TimingTree<C> {
    /// Copy the statistics of the whole tree.
    pub fn snapshot(&self) -> TimingSnapshot {
        self.snapshot_node(self.root())
    }

    /// Copy the statistics of `id` and its subtree.
    pub fn snapshot_node(&self, id: NodeId) -> TimingSnapshot {
        let node = &self[id];
        TimingSnapshot {
            label: node.label().to_string(),
            id: node.id(),
            calls: node.calls(),
            cpu_us: node.cpu_us(),
            wall_us: node.wall_us(),
            total_us: self.total_us(id),
            mean_us: node.mean_us(),
            std_dev_us: node.std_dev_us(),
            min_us: node.min_us(),
            max_us: node.max_us(),
            iterations: node.iterations(),
            children: self
                .children(id)
                .into_iter()
                .map(|child| self.snapshot_node(child))
                .collect(),
        }
    }

    /// Serialize the whole tree to pretty JSON.
    pub fn to_json(&self) -> TimingResult<String> {
        self.snapshot().to_json()
    }
}
