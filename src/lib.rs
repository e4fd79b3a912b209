//! vring - a lock-free, multi-producer multi-consumer in-memory queue
//!
//! Modeled after the LMAX Disruptor: a ring buffer of preallocated value slots coordinated by
//! cache-line-padded cursors instead of locks. Producers claim batches of value IDs, write
//! payloads, then publish; consumers observe the published cursor (or their declared upstream
//! consumers', for dependency chains) and deliver values strictly in ID order. In-band control
//! messages (HOLE, FLUSH, EOF) let producers skip slots, close partial batches, and signal
//! stream end without a side channel.
//!
//! See [`disruptor`] for the engine itself; [`Queue`], [`Producer`], and [`Consumer`] are the
//! types most callers need.

pub mod constants;
pub mod disruptor;
pub mod error;
pub mod metrics;

pub use disruptor::{
    Consumer, ConsumerStatus, DefaultFactory, HybridYield, Producer, Queue, QueueConfig, SpinYield, Tag,
    ThreadedYield, ValueFactory, ValueId, YieldStrategy,
};
pub use error::{DisruptorError, Result};

/// Crate version, as reported by Cargo.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
