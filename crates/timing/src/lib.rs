//! Hierarchical Timing Instrumentation
//!
//! Low-overhead measurement of how much CPU and wall time the parts of an
//! algorithm take, reported as a call-tree outline:
//! - Nested regions opened with `tic` and closed with `toc`, or scoped with
//!   [`ScopedTimer`] so they close on every exit path
//! - Call-path sensitive statistics: the same label under two callers is
//!   tracked as two nodes
//! - Per-iteration min/max once the caller declares iteration boundaries
//! - Totals and mean/standard-deviation reports, plus a JSON snapshot
//!
//! # Two layers
//!
//! The `*_` macros ([`gttic_!`], [`gttoc_!`], [`longtic_!`], [`longtoc_!`])
//! and the functions at the crate root are always active. The macros without
//! the underscore and the [`conditional`] module compile to nothing unless
//! the `timing` feature is enabled. Libraries instrument themselves with the
//! conditional layer; applications use whichever they like.
//!
//! # Feature Flags
//!
//! - `timing` (default): enables the conditional layer
//!
//! # Example
//!
//! ```rust
//! use timing::{gttic_, gttoc_};
//!
//! fn iterate() {
//!     gttic_!(iterate);
//!     gttic_!(linearize);
//!     // ...
//!     gttoc_!(linearize);
//!     gttic_!(solve);
//!     // ...
//! }
//!
//! for _ in 0..3 {
//!     iterate();
//!     timing::finish_iteration();
//! }
//!
//! let outline = timing::with_tree(|tree| tree.outline());
//! assert!(outline.contains("| -iterate:"));
//! assert!(outline.contains("| | -linearize:"));
//! ```
//!
//! Every thread has its own tree; see [`local`]. Code that wants an explicit
//! tree instead of thread-local state uses [`TimingTree`] directly.

mod clock;
pub mod conditional;
mod config;
mod error;
mod guard;
pub mod local;
mod node;
mod profiler;
pub mod report;
mod registry;
mod snapshot;
mod tree;

pub use clock::{Clock, ManualClock, Stamp, SystemClock};
pub use config::{ReportConfig, ReportSink, TimingConfig};
pub use error::{TimingError, TimingResult};
pub use guard::{NoopTimer, ScopedTimer};
pub use local::{
    configure, finish_iteration, print, print_mean_std_dev, print_mean_std_dev_to, print_to, reset,
    snapshot, tic, toc, with_tree,
};
pub use node::{NodeId, TimingNode};
pub use profiler::{DefaultProfiler, NoopProfiler, Profiler};
pub use registry::{global_registry, LabelRegistry, TimingId, TimingSite, ROOT_LABEL};
pub use snapshot::TimingSnapshot;
pub use tree::TimingTree;

/// Open a scoped region named after `label`.
///
/// Binds a [`ScopedTimer`] to a local variable called `label`; the region
/// closes at the end of the enclosing block or at [`gttoc_!`]. The label's id
/// is looked up once per call site.
///
/// ```rust
/// use timing::{gttic_, gttoc_};
///
/// gttic_!(load_data);
/// // ...
/// gttoc_!(load_data);
/// ```
#[macro_export]
macro_rules! gttic_ {
    ($label:ident) => {
        #[allow(unused_mut, unused_variables)]
        let mut $label = {
            static SITE: $crate::TimingSite = $crate::TimingSite::new(stringify!($label));
            $crate::ScopedTimer::start(&SITE)
        };
    };
}

/// Close a region opened with [`gttic_!`] before the end of its scope.
#[macro_export]
macro_rules! gttoc_ {
    ($label:ident) => {
        $label.stop();
    };
}

/// Open an unscoped region; it stays open until the matching [`longtoc_!`].
#[macro_export]
macro_rules! longtic_ {
    ($label:ident) => {{
        static SITE: $crate::TimingSite = $crate::TimingSite::new(stringify!($label));
        $crate::tic(&SITE);
    }};
}

/// Close a region opened with [`longtic_!`].
#[macro_export]
macro_rules! longtoc_ {
    ($label:ident) => {{
        static SITE: $crate::TimingSite = $crate::TimingSite::new(stringify!($label));
        $crate::local::close(&SITE);
    }};
}

/// [`gttic_!`] when the `timing` feature is enabled, otherwise a no-op.
#[cfg(feature = "timing")]
#[macro_export]
macro_rules! gttic {
    ($label:ident) => {
        $crate::gttic_!($label);
    };
}

/// [`gttic_!`] when the `timing` feature is enabled, otherwise a no-op.
#[cfg(not(feature = "timing"))]
#[macro_export]
macro_rules! gttic {
    ($label:ident) => {
        #[allow(unused_mut, unused_variables)]
        let mut $label = $crate::NoopTimer;
    };
}

/// Close a region opened with [`gttic!`].
#[macro_export]
macro_rules! gttoc {
    ($label:ident) => {
        $label.stop();
    };
}

/// [`longtic_!`] when the `timing` feature is enabled, otherwise a no-op.
#[cfg(feature = "timing")]
#[macro_export]
macro_rules! longtic {
    ($label:ident) => {
        $crate::longtic_!($label);
    };
}

/// [`longtic_!`] when the `timing` feature is enabled, otherwise a no-op.
#[cfg(not(feature = "timing"))]
#[macro_export]
macro_rules! longtic {
    ($label:ident) => {{}};
}

/// [`longtoc_!`] when the `timing` feature is enabled, otherwise a no-op.
#[cfg(feature = "timing")]
#[macro_export]
macro_rules! longtoc {
    ($label:ident) => {
        $crate::longtoc_!($label);
    };
}

/// [`longtoc_!`] when the `timing` feature is enabled, otherwise a no-op.
#[cfg(not(feature = "timing"))]
#[macro_export]
macro_rules! longtoc {
    ($label:ident) => {{}};
}
