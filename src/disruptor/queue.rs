//! The ring buffer itself: slot storage, cursors, and the attached participant lists.
//!
//! `Queue<T>` is an arena that owns every producer's and consumer's shared cursor state,
//! resolving the queue-producer-consumer cyclic reference by having `Producer`/`Consumer` hold
//! only an `Arc<Queue<T>>` and an index (see `DESIGN.md`, "Cyclic ownership").

use std::cell::UnsafeCell;

use tracing::debug;

use crate::constants::{DEFAULT_BATCH_SIZE, DEFAULT_RING_SIZE, MIN_RING_SIZE};
use crate::disruptor::padded::Cursor;
use crate::disruptor::sequence::ValueId;
use crate::disruptor::slot::{Slot, Tag, ValueFactory};
use crate::error::{DisruptorError, Result};

/// Construction-time parameters for a [`Queue`].
#[derive(Debug, Clone, Copy)]
pub struct QueueConfig {
    /// Requested slot count. Rounded up to a power of two, floored at
    /// [`crate::constants::MIN_RING_SIZE`].
    pub size: usize,
    /// Initial value of every cursor. Production callers use 0; tests that want to exercise
    /// the modular wrap early pass a value near `i32::MAX`.
    pub starting_value: ValueId,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_RING_SIZE,
            starting_value: 0,
        }
    }
}

struct ProducerSlot {
    name: String,
    batch_size: ValueId,
}

struct ConsumerSlot {
    name: String,
    dependencies: Vec<usize>,
}

/// The ring buffer: a power-of-two array of preallocated slots plus the published and claim
/// cursors, and every attached producer's and consumer's administrative state.
///
/// Slot payloads are wrapped in [`UnsafeCell`] because producers and consumers access disjoint
/// ID ranges at any instant by construction of the claim/gating protocol; no lock protects slot
/// content.
pub struct Queue<T> {
    name: String,
    mask: ValueId,
    slots: Box<[UnsafeCell<Slot<T>>]>,
    published: Cursor,
    claim: Cursor,
    consumer_cursors: Vec<Cursor>,
    producers: Vec<ProducerSlot>,
    consumers: Vec<ConsumerSlot>,
}

// SAFETY: slot payload access is serialized by the cursor protocol; only one producer ever
// holds a given ID range, and consumers never write slot contents.
unsafe impl<T: Send> Sync for Queue<T> {}

impl<T> Queue<T> {
    /// Allocate a queue, calling `factory.new_value()` once per slot.
    pub fn new<F: ValueFactory<Value = T>>(name: impl Into<String>, config: QueueConfig, factory: &F) -> Result<Self> {
        let name = name.into();
        let size = Self::round_size(config.size);
        debug!(queue = %name, size, "allocating queue");
        let mut slots = Vec::with_capacity(size);
        for i in 0..size {
            slots.push(UnsafeCell::new(Slot {
                id: config.starting_value.wrapping_add(i as ValueId),
                tag: Tag::None,
                value: factory.new_value(),
            }));
        }
        Ok(Self {
            name,
            mask: (size - 1) as ValueId,
            slots: slots.into_boxed_slice(),
            published: Cursor::new(config.starting_value),
            claim: Cursor::new(config.starting_value),
            consumer_cursors: Vec::new(),
            producers: Vec::new(),
            consumers: Vec::new(),
        })
    }

    fn round_size(requested: usize) -> usize {
        requested.max(MIN_RING_SIZE).next_power_of_two()
    }

    /// This queue's configured name, used in log events and error messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of preallocated slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    pub(crate) fn mask(&self) -> ValueId {
        self.mask
    }

    #[inline]
    pub(crate) fn slot_index(&self, id: ValueId) -> usize {
        (id & self.mask) as usize
    }

    #[inline]
    pub(crate) fn slot(&self, id: ValueId) -> *mut Slot<T> {
        self.slots[self.slot_index(id)].get()
    }

    #[inline]
    pub(crate) fn published_cursor(&self) -> &Cursor {
        &self.published
    }

    #[inline]
    pub(crate) fn claim_cursor(&self) -> &Cursor {
        &self.claim
    }

    #[inline]
    pub(crate) fn consumer_cursor(&self, index: usize) -> &Cursor {
        &self.consumer_cursors[index]
    }

    pub fn producer_count(&self) -> usize {
        self.producers.len()
    }

    pub fn consumer_count(&self) -> usize {
        self.consumers.len()
    }

    pub(crate) fn producer_batch_size(&self, index: usize) -> ValueId {
        self.producers[index].batch_size
    }

    pub(crate) fn consumer_dependencies(&self, index: usize) -> &[usize] {
        &self.consumers[index].dependencies
    }

    /// Every attached consumer's cursor, as used by the producer-side gating computation
    /// (`min_modular` over all consumers, not just a declared subset).
    pub(crate) fn all_consumer_cursors(&self) -> &[Cursor] {
        &self.consumer_cursors
    }

    /// Attach a producer, assigning it the next index. Must be called before the queue is
    /// shared (`&mut self`); see `DESIGN.md`, "Cyclic ownership", for why that's enforced
    /// statically rather than by convention.
    ///
    /// `batch_size == 0` selects the default; any requested size is capped at `len() / 4`.
    pub fn attach_producer(&mut self, name: impl Into<String>, batch_size: ValueId) -> Result<usize> {
        if batch_size < 0 {
            return Err(DisruptorError::arguments("batch_size must not be negative"));
        }
        let batch_size = if batch_size == 0 { DEFAULT_BATCH_SIZE } else { batch_size };
        let cap = (self.len() / 4) as ValueId;
        let batch_size = batch_size.min(cap.max(1));
        let index = self.producers.len();
        let name = name.into();
        debug!(queue = %self.name, producer = %name, index, batch_size, "attaching producer");
        self.producers.push(ProducerSlot { name, batch_size });
        Ok(index)
    }

    /// Attach a consumer, assigning it the next index and a dedicated cursor.
    pub fn attach_consumer(&mut self, name: impl Into<String>) -> Result<usize> {
        let index = self.consumers.len();
        let name = name.into();
        debug!(queue = %self.name, consumer = %name, index, "attaching consumer");
        self.consumers.push(ConsumerSlot {
            name,
            dependencies: Vec::new(),
        });
        self.consumer_cursors.push(Cursor::new(self.published.observe_load()));
        Ok(index)
    }

    /// Declare that `consumer` must not observe a value until `upstream` already has.
    pub fn add_dependency(&mut self, consumer: usize, upstream: usize) -> Result<()> {
        if consumer == upstream {
            return Err(DisruptorError::arguments("a consumer cannot depend on itself"));
        }
        if consumer >= self.consumers.len() || upstream >= self.consumers.len() {
            return Err(DisruptorError::arguments("dependency index out of range"));
        }
        self.consumers[consumer].dependencies.push(upstream);
        Ok(())
    }
}
