//! Tuning constants shared across the queue, producers, and consumers.

/// Minimum ring size; smaller requests are raised to this floor.
pub const MIN_RING_SIZE: usize = 16;

/// Default ring size when the caller doesn't request one explicitly.
pub const DEFAULT_RING_SIZE: usize = 65_536;

/// Default producer batch size.
pub const DEFAULT_BATCH_SIZE: i32 = 4096;

/// Cache line size used to pad shared counters against false sharing.
pub const CACHE_LINE_SIZE: usize = 64;

/// Number of spin iterations the threaded strategy burns through before
/// falling back to an OS thread-yield.
pub const SPIN_COUNT_BEFORE_YIELDING: u32 = 100;

/// A starting cursor value close enough to `i32::MAX` that a short-lived test run wraps the
/// modular ID space almost immediately, instead of waiting ~2^31 publications for it to occur
/// naturally. Production queues use a starting value of 0.
pub const WRAP_TEST_STARTING_VALUE: i32 = i32::MAX - 2 * DEFAULT_BATCH_SIZE;
