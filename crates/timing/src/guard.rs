//! Scoped timers.

use crate::local;
use crate::node::NodeId;
use crate::registry::{TimingId, TimingSite};
use std::marker::PhantomData;

/// A timer that opens a region on creation and closes it on drop.
///
/// The region is closed exactly once: by [`stop`](Self::stop) if called, else
/// when the timer goes out of scope, including early returns and `?`
/// propagation. The timer works on the current thread's tree and cannot be
/// sent to another thread.
///
/// # Example
///
/// ```rust
/// use timing::{ScopedTimer, TimingSite};
///
/// static OPTIMIZE: TimingSite = TimingSite::new("optimize");
///
/// fn optimize() {
///     let _timer = ScopedTimer::start(&OPTIMIZE);
///     // ... work ...
/// } // Region closes here
/// # optimize();
/// ```
#[must_use = "dropping the timer immediately closes its region; bind it with `let _timer = ...`"]
#[derive(Debug)]
pub struct ScopedTimer {
    node: NodeId,
    label: &'static str,
    generation: u64,
    active: bool,
    _thread_bound: PhantomData<*const ()>,
}

impl ScopedTimer {
    /// Open the region for `site` on this thread's tree.
    #[inline]
    pub fn start(site: &TimingSite) -> Self {
        Self::start_with_id(site.id(), site.label())
    }

    /// Open a region by id on this thread's tree.
    pub fn start_with_id(id: TimingId, label: &'static str) -> Self {
        let generation = local::generation();
        let node = local::tic_id(id, label);
        Self {
            node,
            label,
            generation,
            active: true,
            _thread_bound: PhantomData,
        }
    }

    /// Close the region now. Later calls, and the drop, do nothing.
    ///
    /// Regions opened after this one and still open are closed with it, so
    /// the cursor always ends up back where [`start`](Self::start) found it.
    pub fn stop(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        if local::generation() != self.generation {
            tracing::warn!(
                target: "timing::guard",
                label = self.label,
                "timer outlived a reset of its tree; nothing recorded"
            );
            return;
        }

        if let Err(err) = local::close_to(self.node) {
            tracing::warn!(target: "timing::guard", label = self.label, error = %err, "toc failed");
        }
    }

    /// Check whether the region is still open.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Label of the timed region.
    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Stand-in for [`ScopedTimer`] when instrumentation is compiled out.
///
/// Same methods, no effect.
#[must_use]
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTimer;

impl NoopTimer {
    /// Do nothing.
    #[inline(always)]
    pub fn start(_site: &TimingSite) -> Self {
        NoopTimer
    }

    /// Do nothing.
    #[inline(always)]
    pub fn stop(&mut self) {}

    /// Always `false`.
    #[inline(always)]
    pub fn is_active(&self) -> bool {
        false
    }
}
