//! The timing tree and its cursor.
//!
//! A [`TimingTree`] owns every node in an arena. The cursor (`current`) names
//! the innermost open region; `tic` moves it down to a child, `toc` moves it
//! back to the parent. Calls must nest like brackets. When
//! [`TimingConfig::check_nesting`] is on, a `toc` naming a region other than
//! the open one is refused with [`TimingError::MismatchedToc`].
//!
//! # Example
//!
//! ```rust
//! use timing::{global_registry, TimingTree};
//!
//! let registry = global_registry();
//! let (solve, step) = (registry.id_for("solve"), registry.id_for("step"));
//!
//! let mut tree = TimingTree::new();
//! tree.tic(solve, "solve");
//! tree.tic(step, "step");
//! tree.toc(step, "step").unwrap();
//! tree.toc(solve, "solve").unwrap();
//!
//! let node = tree.find(&["solve", "step"]).unwrap();
//! assert_eq!(tree[node].calls(), 1);
//! ```

use crate::clock::{Clock, SystemClock};
use crate::config::TimingConfig;
use crate::error::{TimingError, TimingResult};
use crate::node::{NodeId, TimingNode};
use crate::registry::{global_registry, TimingId, TimingSite, ROOT_LABEL};
use std::ops::Index;

/// Call-path-sensitive timing statistics with a live cursor.
#[derive(Debug)]
pub struct TimingTree<C: Clock = SystemClock> {
    nodes: Vec<TimingNode>,
    current: NodeId,
    clock: C,
    config: TimingConfig,
    /// Incremented by every reset
    generation: u64,
}

const ROOT: NodeId = NodeId(0);

impl TimingTree<SystemClock> {
    /// Create a tree with the system clock and default config.
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }

    /// Create a tree with the system clock and the given config.
    pub fn with_config(config: TimingConfig) -> Self {
        Self::with_clock_and_config(SystemClock::new(), config)
    }
}

impl Default for TimingTree<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> TimingTree<C> {
    /// Create a tree reading time from `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self::with_clock_and_config(clock, TimingConfig::default())
    }

    /// Create a tree reading time from `clock` with the given config.
    pub fn with_clock_and_config(clock: C, config: TimingConfig) -> Self {
        Self {
            nodes: vec![root_node()],
            current: ROOT,
            clock,
            config,
            generation: 0,
        }
    }

    /// Resolve the child of `parent` for `id`, creating it on first use.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this tree, for example a
    /// `NodeId` kept from before a [`reset`](Self::reset).
    pub fn open(&mut self, parent: NodeId, id: TimingId, label: &str) -> NodeId {
        if let Some(child) = self.nodes[parent.0].child_for(id) {
            return child;
        }

        let child = NodeId(self.nodes.len());
        let order = self.nodes[parent.0].adopt(id, child);
        self.nodes.push(TimingNode::new(id, label, Some(parent), order));

        tracing::trace!(
            target: "timing::tree",
            label = label,
            parent = self.nodes[parent.0].label(),
            order = order,
            "node created"
        );

        child
    }

    /// Resolve the child of the cursor for `id` without opening it.
    pub fn child(&mut self, id: TimingId, label: &str) -> NodeId {
        self.open(self.current, id, label)
    }

    /// Open a region under the cursor and move the cursor into it.
    pub fn tic(&mut self, id: TimingId, label: &str) -> NodeId {
        let node = self.open(self.current, id, label);
        let now = self.clock.now();
        self.nodes[node.0].start(now);
        self.current = node;
        node
    }

    /// Close the open region and move the cursor back to its parent.
    ///
    /// `id` and `label` must name the region opened by the matching `tic`.
    pub fn toc(&mut self, id: TimingId, label: &str) -> TimingResult<()> {
        let current = self.current;
        let node = &self.nodes[current.0];

        let Some(parent) = node.parent() else {
            tracing::warn!(target: "timing::tree", label = label, "toc with no open region");
            return Err(TimingError::UnbalancedToc {
                label: label.to_string(),
            });
        };

        if node.id() != id {
            if self.config.check_nesting {
                return Err(TimingError::MismatchedToc {
                    expected: node.label().to_string(),
                    found: label.to_string(),
                });
            }
            tracing::warn!(
                target: "timing::tree",
                expected = node.label(),
                found = label,
                "mismatched tic/toc"
            );
        }

        let now = self.clock.now();
        let node = &mut self.nodes[current.0];
        if let Some(start) = node.take_start() {
            let elapsed = now.since(start);
            node.record(elapsed.cpu_us, elapsed.wall_us);
        }
        self.current = parent;
        Ok(())
    }

    /// Close every open region from the cursor up to and including `node`,
    /// and move the cursor to `node`'s parent.
    ///
    /// Regions opened inside `node` and still open are closed with it and
    /// logged at `warn`. Returns the number of regions closed.
    ///
    /// # Errors
    ///
    /// `UnbalancedToc` when `node` is the root or is not currently open; the
    /// cursor is left alone.
    pub fn close_to(&mut self, node: NodeId) -> TimingResult<usize> {
        if node == ROOT || !self.is_open(node) {
            let label = self.node(node).map(TimingNode::label).unwrap_or_default();
            return Err(TimingError::UnbalancedToc {
                label: label.to_string(),
            });
        }

        let enclosing = self.nodes[node.0].label().to_string();
        let now = self.clock.now();
        let mut closed = 0;
        loop {
            let current = self.current;
            let entry = &mut self.nodes[current.0];
            if current != node {
                tracing::warn!(
                    target: "timing::tree",
                    label = entry.label(),
                    enclosing = %enclosing,
                    "region still open when its enclosing region closed"
                );
            }
            if let Some(start) = entry.take_start() {
                let elapsed = now.since(start);
                entry.record(elapsed.cpu_us, elapsed.wall_us);
            }
            closed += 1;

            let Some(parent) = entry.parent() else {
                break;
            };
            self.current = parent;
            if current == node {
                break;
            }
        }
        Ok(closed)
    }

    /// Check whether `node` is the cursor or one of its ancestors.
    pub fn is_open(&self, node: NodeId) -> bool {
        let mut cursor = Some(self.current);
        while let Some(id) = cursor {
            if id == node {
                return true;
            }
            cursor = self.nodes[id.0].parent();
        }
        false
    }

    /// Open the region for a call site.
    pub fn tic_site(&mut self, site: &TimingSite) -> NodeId {
        self.tic(site.id(), site.label())
    }

    /// Close the region for a call site.
    pub fn toc_site(&mut self, site: &TimingSite) -> TimingResult<()> {
        self.toc(site.id(), site.label())
    }

    /// Run `f` inside a tic/toc pair.
    ///
    /// The region is closed when `f` returns, whatever it returns. A nesting
    /// error on close is logged; `f` itself must leave its own regions
    /// balanced.
    pub fn timed<R>(&mut self, id: TimingId, label: &str, f: impl FnOnce(&mut Self) -> R) -> R {
        self.tic(id, label);
        let result = f(self);
        if let Err(err) = self.toc(id, label) {
            tracing::warn!(target: "timing::tree", error = %err, "region not closed");
        }
        result
    }

    /// Declare an iteration boundary for the whole tree.
    ///
    /// Each node folds the time it accumulated since the previous boundary
    /// into its min/max and starts a new iteration.
    pub fn finish_iteration(&mut self) {
        // Every arena node is reachable from the root
        for node in &mut self.nodes {
            node.close_iteration();
        }
        tracing::trace!(target: "timing::tree", nodes = self.nodes.len(), "iteration finished");
    }

    /// Discard all statistics and start over with an empty root.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.nodes.push(root_node());
        self.current = ROOT;
        self.generation += 1;

        tracing::debug!(target: "timing::tree", generation = self.generation, "timing tree reset");
    }

    /// The root node ("Total").
    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// The innermost open node (the root when nothing is open).
    pub fn current(&self) -> NodeId {
        self.current
    }

    /// Get a node by id.
    pub fn node(&self, id: NodeId) -> Option<&TimingNode> {
        self.nodes.get(id.0)
    }

    /// Number of nodes, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree holds only its root, which [`len`](Self::len)
    /// counts.
    pub fn has_only_root(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Number of open regions.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cursor = self.nodes[self.current.0].parent();
        while let Some(parent) = cursor {
            depth += 1;
            cursor = self.nodes[parent.0].parent();
        }
        depth
    }

    /// Children of `id` in creation order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let Some(node) = self.node(id) else {
            return Vec::new();
        };
        let mut children: Vec<NodeId> = node.child_ids().collect();
        children.sort_by_key(|child| self.nodes[child.0].order());
        children
    }

    /// Find a node by the labels on the path below the root.
    pub fn find(&self, path: &[&str]) -> Option<NodeId> {
        path.iter().try_fold(ROOT, |node, label| {
            self.nodes[node.0]
                .child_ids()
                .find(|child| self.nodes[child.0].label() == *label)
        })
    }

    /// CPU total of a node in microseconds.
    ///
    /// A node that was never closed itself (such as the root) reports the
    /// sum of its children.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree, for example a `NodeId`
    /// kept from before a [`reset`](Self::reset). The same holds for
    /// [`total_wall_us`](Self::total_wall_us),
    /// [`children_us`](Self::children_us), [`self_us`](Self::self_us) and
    /// indexing with `tree[id]`.
    pub fn total_us(&self, id: NodeId) -> u64 {
        let node = &self.nodes[id.0];
        if node.calls() > 0 {
            node.cpu_us()
        } else {
            self.children_us(id)
        }
    }

    /// Wall total of a node in microseconds, with the same fallback as
    /// [`total_us`](Self::total_us).
    pub fn total_wall_us(&self, id: NodeId) -> u64 {
        let node = &self.nodes[id.0];
        if node.calls() > 0 {
            node.wall_us()
        } else {
            node.child_ids().map(|child| self.total_wall_us(child)).sum()
        }
    }

    /// Sum of the children's CPU totals in microseconds.
    pub fn children_us(&self, id: NodeId) -> u64 {
        self.nodes[id.0]
            .child_ids()
            .map(|child| self.total_us(child))
            .sum()
    }

    /// CPU time spent in a node outside its children.
    pub fn self_us(&self, id: NodeId) -> u64 {
        self.total_us(id).saturating_sub(self.children_us(id))
    }

    /// Counter bumped by every [`reset`](Self::reset).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Current configuration.
    pub fn config(&self) -> &TimingConfig {
        &self.config
    }

    /// Replace the configuration.
    pub fn set_config(&mut self, config: TimingConfig) {
        tracing::debug!(target: "timing::tree", ?config, "timing config updated");
        self.config = config;
    }

    /// The clock this tree reads.
    pub fn clock(&self) -> &C {
        &self.clock
    }
}

/// # Panics
///
/// Panics if the `NodeId` does not belong to this tree; use
/// [`TimingTree::node`] for a checked lookup.
impl<C: Clock> Index<NodeId> for TimingTree<C> {
    type Output = TimingNode;

    fn index(&self, id: NodeId) -> &TimingNode {
        &self.nodes[id.0]
    }
}

fn root_node() -> TimingNode {
    TimingNode::new(global_registry().id_for(ROOT_LABEL), ROOT_LABEL, None, 0)
}
