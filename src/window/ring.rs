//! Ring buffer of time slots.
//!
//! Each slot pairs the bucket number it currently represents with the number
//! of events recorded for that bucket. The two fields are independently
//! atomic: a reader can briefly observe a freshly recycled timestamp next to
//! the previous bucket's count.
//!
//! ```text
//!   bucket:   ... 13   14   15   16   17 ...
//!                  │    │    │    │    │
//!                  ▼    ▼    ▼    ▼    ▼      index = bucket & mask
//!               ┌────┬────┬────┬────┐
//!   slots:      │ 16 │ 17 │ 14 │ 15 │        timestamp (bucket number)
//!               │  3 │  1 │  9 │  4 │        count
//!               └────┴────┴────┴────┘
//! ```
//!
//! Slots are cache-line padded so that writers hitting neighbouring buckets
//! do not invalidate each other's lines.

use crossbeam_utils::CachePadded;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Timestamp of a slot that has never been written. Lower than any window
/// start, so empty slots are never counted.
pub(crate) const EMPTY: i64 = i64::MIN;

/// One bucket of the ring.
#[derive(Debug)]
pub(crate) struct Slot {
    timestamp: AtomicI64,
    count: AtomicU64,
}

impl Slot {
    const fn new() -> Self {
        Self {
            timestamp: AtomicI64::new(EMPTY),
            count: AtomicU64::new(0),
        }
    }

    /// The bucket number this slot currently represents.
    #[inline]
    pub(crate) fn timestamp(&self) -> i64 {
        self.timestamp.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn count(&self) -> u64 {
        self.count.load(Ordering::Acquire)
    }

    /// Adds `value` to the slot's count, whatever bucket it represents.
    #[inline]
    pub(crate) fn add(&self, value: u64) {
        self.count.fetch_add(value, Ordering::AcqRel);
    }

    /// Moves the slot from bucket `observed` to bucket `bucket`, starting the
    /// new bucket's count at `value`.
    ///
    /// Returns `false` without touching the count if another writer moved the
    /// slot first.
    ///
    /// Writers that see the new timestamp may add to the count before the
    /// reset lands. The reset therefore removes the count observed before the
    /// hand-off rather than overwriting, so those writes survive.
    #[inline]
    pub(crate) fn recycle(&self, observed: i64, bucket: i64, value: u64) -> bool {
        let stale = self.count.load(Ordering::Acquire);
        if self
            .timestamp
            .compare_exchange(observed, bucket, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        self.reset(stale, value);
        true
    }

    #[inline]
    fn reset(&self, stale: u64, value: u64) {
        let _ = self
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                Some(count.saturating_sub(stale).saturating_add(value))
            });
    }
}

/// Fixed-size, power-of-two ring of [`Slot`]s.
pub(crate) struct RingBuffer {
    slots: Box<[CachePadded<Slot>]>,
    mask: i64,
}

impl RingBuffer {
    /// Allocates `len` empty slots. `len` must be a power of two.
    pub(crate) fn new(len: usize) -> Self {
        debug_assert!(len.is_power_of_two());
        let slots = (0..len).map(|_| CachePadded::new(Slot::new())).collect();
        Self {
            slots,
            mask: len as i64 - 1,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// The slot that hosts `bucket`.
    #[inline]
    pub(crate) fn slot(&self, bucket: i64) -> &Slot {
        // Masking a two's complement value keeps it in `0..len` even for
        // negative bucket numbers.
        &self.slots[(bucket & self.mask) as usize]
    }

    /// Iterates over `(index, timestamp, count)` of every written slot.
    pub(crate) fn occupied(&self) -> impl Iterator<Item = (usize, i64, u64)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            let timestamp = slot.timestamp();
            (timestamp != EMPTY).then(|| (i, timestamp, slot.count()))
        })
    }
}
