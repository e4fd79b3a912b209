//! Consumer side of the next-value protocol.

use std::sync::Arc;

use tracing::debug;

use crate::disruptor::queue::Queue;
use crate::disruptor::sequence::{le, lt, min_modular, ValueId};
use crate::disruptor::slot::Tag;
use crate::disruptor::yield_strategy::{HybridYield, YieldStrategy};
use crate::metrics::{noop_consumer_metrics, ConsumerMetrics};

/// The outcome of one [`Consumer::next`] call.
pub enum ConsumerStatus<'a, T> {
    /// An ordinary value, borrowed from its slot. Valid only until the next call to `next` on
    /// this consumer.
    Ok(&'a T),
    /// Every attached producer has emitted EOF and this consumer has delivered every value
    /// that preceded each one.
    Eof,
    /// A producer closed a partial batch; any buffered downstream work should be finalized.
    Flush,
}

/// A handle to one of a queue's attached consumers.
///
/// Like [`crate::Producer`], every method takes `&mut self`: a consumer is driven by exactly
/// one thread for its lifetime.
pub struct Consumer<T: Send> {
    queue: Arc<Queue<T>>,
    index: usize,
    current_id: ValueId,
    last_available_id: ValueId,
    eof_count: usize,
    yield_strategy: Box<dyn YieldStrategy>,
    metrics: Arc<ConsumerMetrics>,
}

impl<T: Send> Consumer<T> {
    /// Construct a handle for the consumer at `index`, using a [`HybridYield`] backoff and no
    /// metrics sink. `index` must come from a prior [`Queue::attach_consumer`] call, with all
    /// dependency wiring already done.
    pub fn new(queue: Arc<Queue<T>>, index: usize) -> Self {
        Self::with_yield_strategy(queue, index, Box::new(HybridYield))
    }

    pub fn with_yield_strategy(queue: Arc<Queue<T>>, index: usize, yield_strategy: Box<dyn YieldStrategy>) -> Self {
        let starting = queue.consumer_cursor(index).observe_load();
        debug!(queue = %queue.name(), index, "consumer ready");
        Self {
            queue,
            index,
            current_id: starting,
            last_available_id: starting,
            eof_count: 0,
            yield_strategy,
            metrics: noop_consumer_metrics(),
        }
    }

    /// Attach a metrics sink, replacing the default no-op one.
    pub fn with_metrics(mut self, metrics: Arc<ConsumerMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    fn cursor(&self) -> &crate::disruptor::padded::Cursor {
        self.queue.consumer_cursor(self.index)
    }

    /// Deliver the next value, skipping HOLEs and counting EOFs until every producer has
    /// closed. Blocks (with the configured yield strategy) until a value, FLUSH, or the final
    /// EOF becomes available.
    pub fn next(&mut self) -> ConsumerStatus<'_, T> {
        loop {
            let last_consumed = self.current_id;
            self.current_id = self.current_id.wrapping_add(1);

            if !le(self.current_id, self.last_available_id) {
                self.cursor().publish_store(last_consumed);
                self.last_available_id = self.wait_for_available(last_consumed);
            }

            // SAFETY: `current_id` is now known to be at or below the published/dependency
            // cursor observed above, so this slot's producer has finished writing it and the
            // observe-load/publish-store pair establishes happens-before.
            let slot = unsafe { &*self.queue.slot(self.current_id) };
            match slot.tag {
                Tag::None => {
                    self.metrics.consumed();
                    self.metrics.values();
                    return ConsumerStatus::Ok(slot.value());
                }
                Tag::Hole => {
                    self.metrics.consumed();
                    self.metrics.holes();
                }
                Tag::Flush => {
                    self.metrics.consumed();
                    self.metrics.flushes();
                    return ConsumerStatus::Flush;
                }
                Tag::Eof => {
                    self.metrics.consumed();
                    self.eof_count += 1;
                    if self.eof_count == self.queue.producer_count() {
                        self.metrics.eofs();
                        self.cursor().publish_store(self.current_id);
                        return ConsumerStatus::Eof;
                    }
                }
            }
        }
    }

    fn wait_for_available(&mut self, last_consumed: ValueId) -> ValueId {
        let dependencies = self.queue.consumer_dependencies(self.index);
        let mut attempt = 0u32;
        loop {
            let candidate = if dependencies.is_empty() {
                self.queue.published_cursor().observe_load()
            } else {
                min_modular(dependencies.iter().map(|&d| self.queue.consumer_cursor(d).observe_load()))
                    .expect("dependency list checked non-empty above")
            };
            if lt(last_consumed, candidate) {
                self.metrics.received_batches();
                return candidate;
            }
            self.metrics.yields();
            self.yield_strategy.yield_now(attempt);
            attempt += 1;
        }
    }
}
