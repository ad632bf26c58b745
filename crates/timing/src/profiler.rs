//! A common interface over the real tree and its no-op twin.
//!
//! Code holding an explicit profiler picks the implementation by type:
//! [`TimingTree`] to measure, [`NoopProfiler`] to compile the instrumentation
//! away. [`DefaultProfiler`] follows the `timing` feature.

use crate::clock::Clock;
use crate::error::TimingResult;
use crate::registry::TimingSite;
use crate::tree::TimingTree;
use std::io::Write;

/// Operations shared by real and disabled instrumentation.
pub trait Profiler {
    /// Open the region for `site`.
    fn tic(&mut self, site: &TimingSite);

    /// Close the region for `site`.
    fn toc(&mut self, site: &TimingSite) -> TimingResult<()>;

    /// Declare an iteration boundary.
    fn finish_iteration(&mut self);

    /// Discard all statistics.
    fn reset(&mut self);

    /// Write the totals outline.
    fn print_to(&self, out: &mut dyn Write) -> TimingResult<()>;

    /// Write the mean/standard-deviation outline.
    fn print_mean_std_dev_to(&self, out: &mut dyn Write) -> TimingResult<()>;

    /// Run `f` inside the region for `site`.
    fn time<R>(&mut self, site: &TimingSite, f: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        self.tic(site);
        let result = f(self);
        if let Err(err) = self.toc(site) {
            tracing::warn!(target: "timing::profiler", label = site.label(), error = %err, "toc failed");
        }
        result
    }
}

impl<C: Clock> Profiler for TimingTree<C> {
    #[inline]
    fn tic(&mut self, site: &TimingSite) {
        self.tic_site(site);
    }

    #[inline]
    fn toc(&mut self, site: &TimingSite) -> TimingResult<()> {
        self.toc_site(site)
    }

    fn finish_iteration(&mut self) {
        TimingTree::finish_iteration(self);
    }

    fn reset(&mut self) {
        TimingTree::reset(self);
    }

    fn print_to(&self, mut out: &mut dyn Write) -> TimingResult<()> {
        TimingTree::print_to(self, &mut out)
    }

    fn print_mean_std_dev_to(&self, mut out: &mut dyn Write) -> TimingResult<()> {
        TimingTree::print_mean_std_dev_to(self, &mut out)
    }
}

/// A profiler that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProfiler;

impl Profiler for NoopProfiler {
    #[inline(always)]
    fn tic(&mut self, _site: &TimingSite) {}

    #[inline(always)]
    fn toc(&mut self, _site: &TimingSite) -> TimingResult<()> {
        Ok(())
    }

    #[inline(always)]
    fn finish_iteration(&mut self) {}

    #[inline(always)]
    fn reset(&mut self) {}

    fn print_to(&self, _out: &mut dyn Write) -> TimingResult<()> {
        Ok(())
    }

    fn print_mean_std_dev_to(&self, _out: &mut dyn Write) -> TimingResult<()> {
        Ok(())
    }
}

/// The profiler selected by the `timing` feature.
#[cfg(feature = "timing")]
pub type DefaultProfiler = TimingTree;

/// The profiler selected by the `timing` feature.
#[cfg(not(feature = "timing"))]
pub type DefaultProfiler = NoopProfiler;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    static STEP: TimingSite = TimingSite::new("profiler_step");

    fn run<P: Profiler>(profiler: &mut P, clock: &ManualClock) {
        for _ in 0..3 {
            profiler.time(&STEP, |_| clock.advance_both(4));
            profiler.finish_iteration();
        }
    }

    #[test]
    fn test_tree_profiler_records() {
        let clock = ManualClock::new();
        let mut tree = TimingTree::with_clock(clock.clone());
        run(&mut tree, &clock);

        let step = tree.find(&["profiler_step"]).unwrap();
        assert_eq!(tree[step].calls(), 3);
        assert_eq!(tree[step].cpu_us(), 12);

        let mut out = Vec::new();
        Profiler::print_to(&tree, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("profiler step"));
    }

    #[test]
    fn test_noop_profiler_is_silent() {
        let clock = ManualClock::new();
        let mut profiler = NoopProfiler;
        run(&mut profiler, &clock);

        let mut out = Vec::new();
        profiler.print_to(&mut out).unwrap();
        profiler.print_mean_std_dev_to(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_reset_through_trait() {
        let clock = ManualClock::new();
        let mut tree = TimingTree::with_clock(clock.clone());
        run(&mut tree, &clock);
        Profiler::reset(&mut tree);
        assert!(tree.has_only_root());
    }
}
