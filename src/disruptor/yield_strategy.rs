//! Strategies for waiting when a producer or consumer cannot make progress yet.
//!
//! Callers re-check their gating condition in a loop and call [`YieldStrategy::yield_now`] once
//! per failed attempt, passing the attempt counter back in so the strategy can escalate.

use std::thread;
use std::time::Duration;

/// How a producer or consumer backs off while polling a cursor that hasn't advanced yet.
///
/// `attempt` is the number of consecutive failed polls so far (starting at 0) and is reset by
/// the caller as soon as a poll succeeds.
pub trait YieldStrategy: Send + Sync {
    fn yield_now(&self, attempt: u32);
}

/// Pure CPU spin. Lowest latency, highest CPU usage; appropriate when callers can dedicate a
/// core to a producer or consumer.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpinYield;

impl YieldStrategy for SpinYield {
    #[inline]
    fn yield_now(&self, _attempt: u32) {
        std::hint::spin_loop();
    }
}

/// Spins for a fixed number of attempts, then hands the core back to the OS scheduler on
/// every subsequent attempt. A middle ground between [`SpinYield`] and [`HybridYield`].
#[derive(Debug, Clone, Copy)]
pub struct ThreadedYield {
    spin_threshold: u32,
}

impl ThreadedYield {
    pub fn new(spin_threshold: u32) -> Self {
        Self { spin_threshold }
    }
}

impl Default for ThreadedYield {
    fn default() -> Self {
        Self::new(crate::constants::SPIN_COUNT_BEFORE_YIELDING)
    }
}

impl YieldStrategy for ThreadedYield {
    #[inline]
    fn yield_now(&self, attempt: u32) {
        if attempt < self.spin_threshold {
            std::hint::spin_loop();
        } else {
            thread::yield_now();
        }
    }
}

/// Escalating backoff: spin, spin harder, yield to the OS scheduler, sleep for increasing
/// durations. Lowest CPU usage at the cost of tail latency once the schedule reaches the
/// sleeping tiers.
///
/// Schedule, by consecutive-failed-attempt count:
/// - 0..10: one `spin_loop` pause
/// - 10..20: fifty `spin_loop` pauses
/// - 20..22: `thread::yield_now()`
/// - 22..24: `sleep(0)`
/// - 24..26: `sleep(1µs)`
/// - 26..: `sleep((attempt - 25) * 10µs)`
#[derive(Debug, Default, Clone, Copy)]
pub struct HybridYield;

impl YieldStrategy for HybridYield {
    fn yield_now(&self, attempt: u32) {
        match attempt {
            0..=9 => std::hint::spin_loop(),
            10..=19 => {
                for _ in 0..50 {
                    std::hint::spin_loop();
                }
            }
            20..=21 => thread::yield_now(),
            22..=23 => thread::sleep(Duration::from_micros(0)),
            24..=25 => thread::sleep(Duration::from_micros(1)),
            n => thread::sleep(Duration::from_micros(u64::from(n - 25) * 10)),
        }
    }
}
