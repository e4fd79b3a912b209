//! Increment-only counter handles for producers and consumers.
//!
//! Call sites never need to check whether a metrics sink is attached: a queue built without
//! one hands every producer/consumer a handle onto a shared, process-wide no-op instance
//! instead.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;

macro_rules! counter_struct {
    ($name:ident { $($field:ident),+ $(,)? }) => {
        #[derive(Default)]
        pub struct $name {
            $(pub $field: AtomicU64,)+
        }

        impl $name {
            $(
                #[inline]
                pub fn $field(&self) {
                    self.$field.fetch_add(1, Ordering::Relaxed);
                }
            )+
        }
    };
}

counter_struct!(ProducerMetrics {
    claims,
    claimed_batches,
    flushes,
    flushed_holes,
    publishes,
    published_batches,
    skips,
    yields,
});

counter_struct!(ConsumerMetrics {
    consumed,
    eofs,
    flushes,
    holes,
    received_batches,
    values,
    yields,
});

static NOOP_PRODUCER_METRICS: Lazy<Arc<ProducerMetrics>> =
    Lazy::new(|| Arc::new(ProducerMetrics::default()));

static NOOP_CONSUMER_METRICS: Lazy<Arc<ConsumerMetrics>> =
    Lazy::new(|| Arc::new(ConsumerMetrics::default()));

/// The shared no-op producer counter handle used when no sink is attached.
pub fn noop_producer_metrics() -> Arc<ProducerMetrics> {
    NOOP_PRODUCER_METRICS.clone()
}

/// The shared no-op consumer counter handle used when no sink is attached.
pub fn noop_consumer_metrics() -> Arc<ConsumerMetrics> {
    NOOP_CONSUMER_METRICS.clone()
}
