//! Instrumentation that disappears when the `timing` feature is off.
//!
//! Library code should time itself through this module (or the `gttic!`
//! family of macros) so that downstream builds without the feature pay
//! nothing at the call site. The signatures are identical in both builds.

use crate::error::TimingResult;
use crate::registry::TimingSite;
use std::io::Write;

/// Timer type returned by [`scoped`].
#[cfg(feature = "timing")]
pub type Timer = crate::guard::ScopedTimer;

/// Timer type returned by [`scoped`].
#[cfg(not(feature = "timing"))]
pub type Timer = crate::guard::NoopTimer;

/// Whether this build records anything.
pub const ENABLED: bool = cfg!(feature = "timing");

/// Open a scoped region for `site`.
#[inline(always)]
pub fn scoped(site: &TimingSite) -> Timer {
    Timer::start(site)
}

/// Open the region for `site`.
#[inline(always)]
pub fn tic(site: &TimingSite) {
    if ENABLED {
        crate::local::tic(site);
    }
}

/// Close the region for `site`.
#[inline(always)]
pub fn toc(site: &TimingSite) -> TimingResult<()> {
    if ENABLED {
        crate::local::toc(site)
    } else {
        Ok(())
    }
}

/// Declare an iteration boundary.
#[inline(always)]
pub fn finish_iteration() {
    if ENABLED {
        crate::local::finish_iteration();
    }
}

/// Discard all statistics on this thread.
#[inline(always)]
pub fn reset() {
    if ENABLED {
        crate::local::reset();
    }
}

/// Print the totals outline to the configured sink.
#[inline(always)]
pub fn print() -> TimingResult<()> {
    if ENABLED {
        crate::local::print()
    } else {
        Ok(())
    }
}

/// Print the mean/standard-deviation outline to the configured sink.
#[inline(always)]
pub fn print_mean_std_dev() -> TimingResult<()> {
    if ENABLED {
        crate::local::print_mean_std_dev()
    } else {
        Ok(())
    }
}

/// Write the totals outline to `out`.
#[inline(always)]
pub fn print_to(out: &mut impl Write) -> TimingResult<()> {
    if ENABLED {
        crate::local::print_to(out)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SITE: TimingSite = TimingSite::new("conditional_site");

    #[test]
    fn test_conditional_matches_feature() {
        reset();
        {
            let _timer = scoped(&SITE);
        }
        tic(&SITE);
        toc(&SITE).unwrap();
        finish_iteration();

        let recorded = crate::local::snapshot()
            .find(&["conditional_site"])
            .map(|node| node.calls)
            .unwrap_or(0);
        if ENABLED {
            assert_eq!(recorded, 2);
        } else {
            assert_eq!(recorded, 0);
        }
    }

    #[test]
    fn test_print_to_matches_feature() {
        reset();
        let mut out = Vec::new();
        print_to(&mut out).unwrap();
        assert_eq!(out.is_empty(), !ENABLED);
    }
}
