//! The disruptor engine: ring buffer, producers, consumers, and the primitives they share.
//!
//! A `Queue<T>` is a power-of-two array of preallocated `T` slots guarded by cache-line-padded
//! cursors rather than locks. Producers claim contiguous ID ranges, write payloads, then
//! publish; consumers observe the published cursor (or an upstream consumer's, for dependency
//! chains) and deliver values strictly in ID order, transparently skipping HOLEs and folding in
//! FLUSH/EOF control messages.
//!
//! ```rust
//! use std::sync::Arc;
//! use vring::disruptor::{Consumer, ConsumerStatus, Producer, Queue, QueueConfig};
//! use vring::disruptor::slot::DefaultFactory;
//!
//! let factory = DefaultFactory::<i64>::new();
//! let mut queue = Queue::new("demo", QueueConfig { size: 16, starting_value: 0 }, &factory).unwrap();
//! let p0 = queue.attach_producer("p0", 4).unwrap();
//! let c0 = queue.attach_consumer("c0").unwrap();
//! let queue = Arc::new(queue);
//!
//! let mut producer = Producer::new(queue.clone(), p0);
//! let mut consumer = Consumer::new(queue.clone(), c0);
//!
//! for i in 0..4 {
//!     let mut claimed = producer.claim();
//!     *claimed.value_mut() = i;
//! }
//! producer.publish();
//! producer.eof();
//!
//! let mut sum = 0;
//! loop {
//!     match consumer.next() {
//!         ConsumerStatus::Ok(v) => sum += *v,
//!         ConsumerStatus::Eof => break,
//!         ConsumerStatus::Flush => continue,
//!     }
//! }
//! assert_eq!(sum, 6);
//! ```

pub mod consumer;
pub mod padded;
pub mod producer;
pub mod queue;
pub mod sequence;
pub mod slot;
pub mod yield_strategy;

pub use consumer::{Consumer, ConsumerStatus};
pub use producer::{Claimed, Producer};
pub use queue::{Queue, QueueConfig};
pub use sequence::ValueId;
pub use slot::{DefaultFactory, Slot, Tag, ValueFactory};
pub use yield_strategy::{HybridYield, SpinYield, ThreadedYield, YieldStrategy};
