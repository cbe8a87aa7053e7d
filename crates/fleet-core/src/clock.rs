//! Monotonic millisecond timestamps for `Child::started_ms`/`finished_ms`.

use std::sync::OnceLock;
use std::time::Instant;

/// Source of monotonic timestamps, injectable so the scheduler's timing
/// logic can be tested without real elapsed time.
pub trait Clock: Send + Sync {
    /// Milliseconds elapsed since some fixed, clock-specific epoch.
    ///
    /// Only differences between two calls on the same `Clock` are
    /// meaningful; the absolute value carries no meaning across clocks.
    fn now_ms(&self) -> u64;
}

/// Wall-clock `Clock` backed by [`Instant`], monotonic for the life of the
/// process.
#[derive(Debug, Default)]
pub struct MonotonicClock;

fn epoch() -> &'static Instant {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    EPOCH.get_or_init(Instant::now)
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        epoch().elapsed().as_millis() as u64
    }
}

#[cfg(test)]
pub mod test_support {
    use super::Clock;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Deterministic clock for tests: each call advances by a fixed step.
    #[derive(Debug)]
    pub struct FixedStepClock {
        current: AtomicU64,
        step_ms: u64,
    }

    impl FixedStepClock {
        pub fn new(step_ms: u64) -> Self {
            Self {
                current: AtomicU64::new(0),
                step_ms,
            }
        }
    }

    impl Clock for FixedStepClock {
        fn now_ms(&self) -> u64 {
            self.current.fetch_add(self.step_ms, Ordering::SeqCst)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_clock_never_goes_backwards() {
        let clock = MonotonicClock;
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }

    #[test]
    fn fixed_step_clock_advances_deterministically() {
        let clock = test_support::FixedStepClock::new(10);
        assert_eq!(clock.now_ms(), 0);
        assert_eq!(clock.now_ms(), 10);
        assert_eq!(clock.now_ms(), 20);
    }
}
