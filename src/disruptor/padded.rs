//! Cache-line padded cursors.
//!
//! Padding sits on both sides of the atomic word rather than relying on alignment alone, so a
//! `Cursor` never shares a cache line with its neighbors in a `Vec<Cursor>`.

use std::sync::atomic::{AtomicI32, Ordering};

use crate::constants::CACHE_LINE_SIZE;
use crate::disruptor::sequence::ValueId;

const PAD: usize = CACHE_LINE_SIZE;

/// A single modular ID counter isolated on its own cache line.
///
/// Exposes exactly the three operations the protocol needs: a release-ordered
/// `publish_store`, an acquire-ordered `observe_load`, and (for the multi-producer claim
/// cursor only) an acquire+release `fetch_add`.
#[repr(C, align(64))]
pub struct Cursor {
    _head_pad: [u8; PAD],
    value: AtomicI32,
    _tail_pad: [u8; PAD],
}

impl Cursor {
    pub fn new(initial: ValueId) -> Self {
        Self {
            _head_pad: [0; PAD],
            value: AtomicI32::new(initial),
            _tail_pad: [0; PAD],
        }
    }

    /// Release-store: consumers/producers that later `observe_load` this cursor are
    /// guaranteed to see every write this thread made before the store.
    #[inline]
    pub fn publish_store(&self, v: ValueId) {
        self.value.store(v, Ordering::Release);
    }

    /// Acquire-load: pairs with [`Self::publish_store`] to establish happens-before.
    #[inline]
    pub fn observe_load(&self) -> ValueId {
        self.value.load(Ordering::Acquire)
    }

    /// Atomic fetch-add with acquire+release ordering, returning the prior value.
    /// Used only by the multi-producer claim cursor.
    #[inline]
    pub fn fetch_add(&self, delta: ValueId) -> ValueId {
        self.value.fetch_add(delta, Ordering::AcqRel)
    }
}

static_assertions::const_assert!(std::mem::size_of::<Cursor>() >= 2 * CACHE_LINE_SIZE);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_then_load_round_trips() {
        let c = Cursor::new(0);
        c.publish_store(42);
        assert_eq!(c.observe_load(), 42);
    }

    #[test]
    fn fetch_add_returns_prior_value() {
        let c = Cursor::new(10);
        assert_eq!(c.fetch_add(5), 10);
        assert_eq!(c.observe_load(), 15);
    }

    #[test]
    fn cursor_is_at_least_two_cache_lines() {
        assert!(std::mem::size_of::<Cursor>() >= 2 * CACHE_LINE_SIZE);
    }
}
