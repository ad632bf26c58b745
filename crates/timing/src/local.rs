//! The per-thread timing tree behind the free functions and macros.
//!
//! Every thread lazily gets its own [`TimingTree`] on first use. Regions opened
//! on one thread never nest under regions of another.
//!
//! The tree is held in a `RefCell`; calling back into this module from inside
//! a [`with_tree`] closure panics.

use crate::config::TimingConfig;
use crate::error::TimingResult;
use crate::node::NodeId;
use crate::registry::{TimingId, TimingSite};
use crate::snapshot::TimingSnapshot;
use crate::tree::TimingTree;
use std::cell::RefCell;
use std::io::Write;

thread_local! {
    static TREE: RefCell<TimingTree> = RefCell::new(TimingTree::new());
}

/// Read this thread's tree.
pub fn with_tree<R>(f: impl FnOnce(&TimingTree) -> R) -> R {
    TREE.with(|tree| f(&tree.borrow()))
}

fn with_tree_mut<R>(f: impl FnOnce(&mut TimingTree) -> R) -> R {
    TREE.with(|tree| f(&mut tree.borrow_mut()))
}

/// Open the region for `site` on this thread.
#[inline]
pub fn tic(site: &TimingSite) -> NodeId {
    tic_id(site.id(), site.label())
}

/// Close the region for `site` on this thread.
#[inline]
pub fn toc(site: &TimingSite) -> TimingResult<()> {
    toc_id(site.id(), site.label())
}

/// Open a region by id on this thread.
#[inline]
pub fn tic_id(id: TimingId, label: &str) -> NodeId {
    with_tree_mut(|tree| tree.tic(id, label))
}

/// Close a region by id on this thread.
#[inline]
pub fn toc_id(id: TimingId, label: &str) -> TimingResult<()> {
    with_tree_mut(|tree| tree.toc(id, label))
}

/// Close `node` and every region still open inside it on this thread.
pub fn close_to(node: NodeId) -> TimingResult<usize> {
    with_tree_mut(|tree| tree.close_to(node))
}

/// Close the region for `site`, logging a nesting error instead of
/// returning it. Used by `longtoc_!`.
pub fn close(site: &TimingSite) {
    if let Err(err) = toc(site) {
        tracing::warn!(target: "timing::local", label = site.label(), error = %err, "toc failed");
    }
}

/// Declare an iteration boundary for this thread's tree.
pub fn finish_iteration() {
    with_tree_mut(|tree| tree.finish_iteration());
}

/// Discard this thread's statistics.
///
/// Scoped timers still open from before the reset become inert.
pub fn reset() {
    with_tree_mut(|tree| tree.reset());
}

/// Replace this thread's config. Statistics are kept.
pub fn configure(config: TimingConfig) {
    with_tree_mut(|tree| tree.set_config(config));
}

/// Reset counter of this thread's tree.
pub fn generation() -> u64 {
    with_tree(|tree| tree.generation())
}

/// Print this thread's totals outline to the configured sink.
pub fn print() -> TimingResult<()> {
    with_tree(|tree| tree.print())
}

/// Print this thread's mean/standard-deviation outline to the configured sink.
pub fn print_mean_std_dev() -> TimingResult<()> {
    with_tree(|tree| tree.print_mean_std_dev())
}

/// Write this thread's totals outline to `out`.
pub fn print_to(out: &mut impl Write) -> TimingResult<()> {
    with_tree(|tree| tree.print_to(out))
}

/// Write this thread's mean/standard-deviation outline to `out`.
pub fn print_mean_std_dev_to(out: &mut impl Write) -> TimingResult<()> {
    with_tree(|tree| tree.print_mean_std_dev_to(out))
}

/// Copy this thread's statistics.
pub fn snapshot() -> TimingSnapshot {
    with_tree(|tree| tree.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;

    static OUTER: TimingSite = TimingSite::new("local_outer");
    static INNER: TimingSite = TimingSite::new("local_inner");

    #[test]
    fn test_thread_local_nesting() {
        reset();
        tic(&OUTER);
        tic(&INNER);
        toc(&INNER).unwrap();
        toc(&OUTER).unwrap();

        let snapshot = snapshot();
        let inner = snapshot.find(&["local_outer", "local_inner"]).unwrap();
        assert_eq!(inner.calls, 1);
        assert_eq!(with_tree(|tree| tree.depth()), 0);
    }

    #[test]
    fn test_threads_have_separate_trees() {
        reset();
        tic(&OUTER);

        let other = std::thread::spawn(|| {
            tic(&INNER);
            toc(&INNER).unwrap();
            snapshot()
        })
        .join()
        .unwrap();

        toc(&OUTER).unwrap();
        assert!(other.find(&["local_inner"]).is_some());
        assert!(other.find(&["local_outer"]).is_none());
        assert!(snapshot().find(&["local_outer", "local_inner"]).is_none());
    }

    #[test]
    fn test_reset_bumps_generation() {
        let before = generation();
        reset();
        assert_eq!(generation(), before + 1);
        assert_eq!(snapshot().node_count(), 1);
    }

    #[test]
    fn test_close_logs_instead_of_failing() {
        reset();
        close(&OUTER);
        assert_eq!(with_tree(|tree| tree.current()), with_tree(|tree| tree.root()));
    }

    #[test]
    fn test_print_to_buffer() {
        reset();
        tic(&OUTER);
        toc(&OUTER).unwrap();

        let mut buf = Vec::new();
        print_to(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("-local outer:"));

        let mut buf = Vec::new();
        print_mean_std_dev_to(&mut buf).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("1 calls"));
    }

    #[test]
    fn test_configure_keeps_statistics() {
        reset();
        tic(&OUTER);
        toc(&OUTER).unwrap();
        configure(TimingConfig::default().with_check_nesting(true));

        assert!(with_tree(|tree| tree.config().check_nesting));
        assert!(snapshot().find(&["local_outer"]).is_some());
    }
}
