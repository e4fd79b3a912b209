//! Producer side of the claim/publish protocol.
//!
//! Dispatches between a single-writer and a multi-writer path, decided once at construction
//! from the queue's final producer count (see `DESIGN.md`, "Dynamic dispatch of claim/publish").

use std::sync::Arc;

use tracing::debug;

use crate::disruptor::queue::Queue;
use crate::disruptor::sequence::{le, lt, min_modular, ValueId};
use crate::disruptor::slot::{Slot, Tag};
use crate::disruptor::yield_strategy::{HybridYield, YieldStrategy};
use crate::metrics::{noop_producer_metrics, ProducerMetrics};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterMode {
    Single,
    Multi,
}

/// A handle to one of a queue's attached producers.
///
/// Owned entirely by the thread that drives it: every method takes `&mut self`, so the
/// borrow checker statically prevents the only two unsafe things a caller could otherwise do:
/// calling `claim` again before publishing the previous slot, or sharing a producer across
/// threads.
pub struct Producer<T: Send> {
    queue: Arc<Queue<T>>,
    index: usize,
    batch_size: ValueId,
    mode: WriterMode,
    last_claimed_id: ValueId,
    last_produced_id: ValueId,
    last_consumed_id: ValueId,
    yield_strategy: Box<dyn YieldStrategy>,
    metrics: Arc<ProducerMetrics>,
}

/// A freshly claimed, writable slot. Borrowing from the owning [`Producer`] prevents claiming
/// a second slot before this one is either published or dropped.
pub struct Claimed<'a, T> {
    id: ValueId,
    slot: &'a mut Slot<T>,
}

impl<'a, T> Claimed<'a, T> {
    #[inline]
    pub fn id(&self) -> ValueId {
        self.id
    }

    #[inline]
    pub fn value_mut(&mut self) -> &mut T {
        self.slot.value_mut()
    }
}

impl<T: Send> Producer<T> {
    /// Construct a handle for the producer at `index`, using a [`HybridYield`] backoff and no
    /// metrics sink. `index` must come from a prior [`Queue::attach_producer`] call, and the
    /// queue must already be final (wrapped in its `Arc`). See `DESIGN.md`, "Cyclic ownership".
    pub fn new(queue: Arc<Queue<T>>, index: usize) -> Self {
        Self::with_yield_strategy(queue, index, Box::new(HybridYield))
    }

    pub fn with_yield_strategy(queue: Arc<Queue<T>>, index: usize, yield_strategy: Box<dyn YieldStrategy>) -> Self {
        let batch_size = queue.producer_batch_size(index);
        let mode = if queue.producer_count() > 1 {
            WriterMode::Multi
        } else {
            WriterMode::Single
        };
        let starting = queue.published_cursor().observe_load();
        debug!(queue = %queue.name(), index, batch_size, multi_writer = mode == WriterMode::Multi, "producer ready");
        Self {
            queue,
            index,
            batch_size,
            mode,
            last_claimed_id: starting,
            last_produced_id: starting,
            last_consumed_id: starting,
            yield_strategy,
            metrics: noop_producer_metrics(),
        }
    }

    /// Attach a metrics sink, replacing the default no-op one.
    pub fn with_metrics(mut self, metrics: Arc<ProducerMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Reserve the next value ID and return a writable handle onto its slot.
    pub fn claim(&mut self) -> Claimed<'_, T> {
        if self.last_produced_id == self.last_claimed_id {
            self.claim_batch();
        }
        self.last_produced_id = self.last_produced_id.wrapping_add(1);
        self.metrics.claims();

        let slot = unsafe { &mut *self.queue.slot(self.last_produced_id) };
        slot.id = self.last_produced_id;
        slot.tag = Tag::None;
        Claimed {
            id: self.last_produced_id,
            slot,
        }
    }

    fn claim_batch(&mut self) {
        self.metrics.claimed_batches();
        match self.mode {
            WriterMode::Single => {
                self.last_claimed_id = self.last_claimed_id.wrapping_add(self.batch_size);
            }
            WriterMode::Multi => {
                let old = self.queue.claim_cursor().fetch_add(self.batch_size);
                self.last_claimed_id = old.wrapping_add(self.batch_size);
                self.last_produced_id = old;
            }
        }
        self.wait_for_slot();
    }

    /// Gate on the slowest consumer before handing out the slot about to be overwritten.
    fn wait_for_slot(&mut self) {
        let wrapped = self.last_claimed_id.wrapping_sub(self.queue.len() as ValueId);
        if le(wrapped, self.last_consumed_id) {
            return;
        }
        let mut attempt = 0u32;
        loop {
            let minimum = min_modular(self.queue.all_consumer_cursors().iter().map(|c| c.observe_load()));
            match minimum {
                None => return, // no consumers attached: nothing gates production
                Some(minimum) if le(wrapped, minimum) => {
                    self.last_consumed_id = minimum;
                    return;
                }
                _ => {
                    self.metrics.yields();
                    self.yield_strategy.yield_now(attempt);
                    attempt += 1;
                }
            }
        }
    }

    /// Release the currently claimed batch, if it is complete.
    ///
    /// A call that lands mid-batch (`last_produced_id < last_claimed_id`, i.e. fewer values
    /// have been claimed via [`Self::claim`] than were reserved by the last batch) is a no-op:
    /// publication happens exactly once per batch, at the point where the whole reservation has
    /// been written. Callers that want every claimed value visible immediately should claim
    /// exactly one value per batch (`batch_size` of 1), or call [`Self::flush`].
    pub fn publish(&mut self) {
        if self.last_produced_id != self.last_claimed_id {
            return;
        }
        match self.mode {
            WriterMode::Single => {
                self.queue.published_cursor().publish_store(self.last_claimed_id);
            }
            WriterMode::Multi => {
                let target = self.last_claimed_id.wrapping_sub(self.batch_size);
                let mut attempt = 0u32;
                while lt(self.queue.published_cursor().observe_load(), target) {
                    self.metrics.yields();
                    self.yield_strategy.yield_now(attempt);
                    attempt += 1;
                }
                self.queue.published_cursor().publish_store(self.last_claimed_id);
            }
        }
        self.metrics.publishes();
        self.metrics.published_batches();
    }

    /// Mark the most recently claimed slot as a [`Tag::Hole`] and publish.
    pub fn skip(&mut self) {
        let slot = unsafe { &mut *self.queue.slot(self.last_produced_id) };
        slot.tag = Tag::Hole;
        self.metrics.skips();
        self.publish();
    }

    /// Terminate the current partial batch with a FLUSH control message, filling the rest of
    /// the reservation with HOLEs. A no-op if there is no partial reservation.
    pub fn flush(&mut self) {
        if self.last_produced_id == self.last_claimed_id {
            return;
        }
        let flush_id = self.last_produced_id.wrapping_add(1);
        {
            let slot = unsafe { &mut *self.queue.slot(flush_id) };
            slot.id = flush_id;
            slot.tag = Tag::Flush;
        }
        let mut id = flush_id.wrapping_add(1);
        while le(id, self.last_claimed_id) {
            let slot = unsafe { &mut *self.queue.slot(id) };
            slot.id = id;
            slot.tag = Tag::Hole;
            self.metrics.flushed_holes();
            id = id.wrapping_add(1);
        }
        self.last_produced_id = self.last_claimed_id;
        self.metrics.flushes();
        self.publish();
    }

    /// Terminate the stream: claim one more value tagged EOF, publish it, then flush any
    /// trailing reservation.
    pub fn eof(&mut self) {
        {
            let mut claimed = self.claim();
            claimed.slot.tag = Tag::Eof;
        }
        self.publish();
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disruptor::queue::QueueConfig;
    use crate::disruptor::slot::DefaultFactory;

    fn build_queue(size: usize, producers: usize) -> Arc<Queue<i64>> {
        let factory = DefaultFactory::<i64>::new();
        let mut q = Queue::new(
            "t",
            QueueConfig {
                size,
                starting_value: 0,
            },
            &factory,
        )
        .unwrap();
        for i in 0..producers {
            q.attach_producer(format!("p{i}"), 4).unwrap();
        }
        q.attach_consumer("c0").unwrap();
        Arc::new(q)
    }

    #[test]
    fn single_writer_claim_and_publish_round_trips() {
        let queue = build_queue(16, 1);
        let mut producer = Producer::new(queue.clone(), 0);

        for i in 0..4 {
            let mut claimed = producer.claim();
            *claimed.value_mut() = i;
        }
        producer.publish();
        assert_eq!(queue.published_cursor().observe_load(), 4);
    }

    #[test]
    fn publish_mid_batch_is_a_no_op() {
        let queue = build_queue(16, 1);
        let mut producer = Producer::new(queue.clone(), 0);
        let mut claimed = producer.claim();
        *claimed.value_mut() = 1;
        producer.publish();
        assert_eq!(queue.published_cursor().observe_load(), 0);
    }

    #[test]
    fn flush_with_nothing_claimed_is_a_no_op() {
        let queue = build_queue(16, 1);
        let mut producer = Producer::new(queue.clone(), 0);
        producer.flush();
        assert_eq!(queue.published_cursor().observe_load(), 0);
    }

    #[test]
    fn skip_marks_a_hole_and_publishes() {
        let queue = build_queue(16, 1);
        let mut producer = Producer::new(queue.clone(), 0);
        for _ in 0..4 {
            let _ = producer.claim();
        }
        producer.skip();
        assert_eq!(queue.published_cursor().observe_load(), 4);
    }

    #[test]
    fn multi_writer_mode_is_selected_for_two_producers() {
        let queue = build_queue(16, 2);
        let producer = Producer::new(queue.clone(), 0);
        assert_eq!(producer.mode, WriterMode::Multi);
    }
}
