//! Time sources for the timing tree.
//!
//! Wall time comes from the monotonic [`Instant`]. CPU time comes from
//! `clock_gettime(CLOCK_THREAD_CPUTIME_ID)` through inline FFI on Linux and
//! macOS; elsewhere the CPU reading falls back to wall time.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// A pair of CPU and wall readings in microseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stamp {
    /// Thread CPU time in microseconds
    pub cpu_us: u64,
    /// Wall time in microseconds since the clock's epoch
    pub wall_us: u64,
}

impl Stamp {
    /// Create a stamp from raw readings.
    pub fn new(cpu_us: u64, wall_us: u64) -> Self {
        Self { cpu_us, wall_us }
    }

    /// Elapsed time from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn since(&self, earlier: Stamp) -> Stamp {
        Stamp {
            cpu_us: self.cpu_us.saturating_sub(earlier.cpu_us),
            wall_us: self.wall_us.saturating_sub(earlier.wall_us),
        }
    }
}

/// Source of [`Stamp`]s for a timing tree.
pub trait Clock {
    /// Read the current CPU and wall time.
    fn now(&self) -> Stamp;
}

/// The real clock: thread CPU time plus monotonic wall time.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    /// Create a clock whose wall readings start at zero now.
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Stamp {
        let wall_us = self.epoch.elapsed().as_micros() as u64;
        let cpu_us = match cpu_now_ns() {
            Some(ns) => ns / 1_000,
            None => wall_us,
        };
        Stamp { cpu_us, wall_us }
    }
}

/// A hand-driven clock for deterministic measurements.
///
/// Clones share the same reading, so a test can keep one handle and give
/// another to the tree.
///
/// ```rust
/// use timing::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
/// handle.advance(5, 7);
/// assert_eq!(clock.now().cpu_us, 5);
/// assert_eq!(clock.now().wall_us, 7);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    reading: Rc<Cell<Stamp>>,
}

impl ManualClock {
    /// Create a clock reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward.
    pub fn advance(&self, cpu_us: u64, wall_us: u64) {
        let current = self.reading.get();
        self.reading.set(Stamp {
            cpu_us: current.cpu_us + cpu_us,
            wall_us: current.wall_us + wall_us,
        });
    }

    /// Move CPU and wall time forward by the same amount.
    pub fn advance_both(&self, us: u64) {
        self.advance(us, us);
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> Stamp {
        self.reading.get()
    }
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
mod ffi {
    use std::os::raw::{c_int, c_long};

    #[repr(C)]
    pub(super) struct Timespec {
        pub(super) tv_sec: c_long,
        pub(super) tv_nsec: c_long,
    }

    #[cfg(target_os = "linux")]
    pub(super) const CLOCK_THREAD_CPUTIME_ID: c_int = 3;

    #[cfg(target_os = "macos")]
    pub(super) const CLOCK_THREAD_CPUTIME_ID: c_int = 16;

    extern "C" {
        pub(super) fn clock_gettime(clk_id: c_int, tp: *mut Timespec) -> c_int;
    }
}

/// Current thread's CPU time in nanoseconds, if the platform exposes it.
#[cfg(any(target_os = "linux", target_os = "macos"))]
pub(crate) fn cpu_now_ns() -> Option<u64> {
    let mut ts = ffi::Timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: `ts` is a valid, writable timespec for the duration of the call.
    let ret = unsafe { ffi::clock_gettime(ffi::CLOCK_THREAD_CPUTIME_ID, &mut ts) };
    if ret != 0 {
        return None;
    }
    Some(ts.tv_sec as u64 * 1_000_000_000 + ts.tv_nsec as u64)
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
pub(crate) fn cpu_now_ns() -> Option<u64> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_since_saturates() {
        let earlier = Stamp::new(10, 20);
        let later = Stamp::new(15, 18);
        assert_eq!(later.since(earlier), Stamp::new(5, 0));
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new();
        let other = clock.clone();
        other.advance_both(42);
        assert_eq!(clock.now(), Stamp::new(42, 42));
    }

    #[test]
    fn test_system_clock_wall_is_monotonic() {
        let clock = SystemClock::new();
        let first = clock.now();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = clock.now();
        assert!(second.wall_us >= first.wall_us + 1_000);
    }

    #[cfg(any(target_os = "linux", target_os = "macos"))]
    #[test]
    fn test_cpu_time_advances_during_compute() {
        let before = cpu_now_ns().unwrap();
        let mut buf = [0u8; 4096];
        for i in 0u64..50_000 {
            for b in &mut buf {
                *b = b.wrapping_add(i as u8).wrapping_mul(31);
            }
        }
        std::hint::black_box(&buf);
        let after = cpu_now_ns().unwrap();
        assert!(after > before, "CPU clock should advance: {before} -> {after}");
    }
}
