//! Lock-free sliding-window event counter.
//!
//! This module provides [`SlidingCounter`], which answers "how many events
//! happened during the last `W`?" for any number of concurrent writers and
//! readers, without locks.
//!
//! # Design
//!
//! The window is split into a power-of-two number of slots (see
//! [`Geometry`]). Time is divided into *buckets* of one slot duration, and
//! bucket `b` lives in slot `b & mask`. Once the ring wraps, a slot is reused
//! for a newer bucket:
//!
//! ```text
//!   increment() at bucket b
//!        │
//!        ▼
//!   slot = ring[b & mask] ──load timestamp──┐
//!                                           │
//!        ┌─────────────── == b ─────────────┼──► count += 1
//!        │                                  │
//!        │  < b (stale)  CAS timestamp b ───┼──► ok: count = 1
//!        │                                  │    lost: retry
//!        │                                  │
//!        └─────────────── > b (skew) ───────┴──► count += 1
//! ```
//!
//! Recycling is lazy: there is no sweeper and no background thread, a stale
//! slot is reclaimed by the first writer that lands on it.
//!
//! [`SlidingCounter::peek`] scans every slot and sums those whose bucket is
//! one of the last `slot_count` buckets.
//!
//! # Accuracy
//!
//! Counts are approximate at the edges:
//!
//! - the window moves in whole slots, so events near the oldest slot age out
//!   up to one slot duration early or late;
//! - a slot's timestamp and count are separate atomics, so a reader racing a
//!   recycle may briefly see the new bucket with the old count;
//! - a writer whose clock reading is behind the slot it lands on (clock skew
//!   between cores) adds to the newer bucket rather than rewinding it. This
//!   keeps every event counted but is a best-effort mitigation, not a
//!   guarantee under arbitrary skew.
//!
//! # Examples
//!
//! ```rust
//! use finestra::SlidingCounter;
//! use std::sync::Arc;
//! use std::thread;
//! use std::time::Duration;
//!
//! let counter = Arc::new(SlidingCounter::new(Duration::from_secs(10)).unwrap());
//! let mut handles = vec![];
//!
//! for _ in 0..4 {
//!     let c = Arc::clone(&counter);
//!     handles.push(thread::spawn(move || {
//!         for _ in 0..1000 {
//!             c.increment();
//!         }
//!     }));
//! }
//!
//! for h in handles {
//!     h.join().unwrap();
//! }
//!
//! assert_eq!(counter.peek(), 4000);
//! ```

mod clock;
mod geometry;
mod ring;

pub use clock::Clock;
pub use geometry::Geometry;

use std::fmt::{self, Debug};
use std::time::Duration;

use tracing::{debug, trace};

use crate::error::Result;
use crate::observable::{CounterValue, Observable};
use ring::RingBuffer;

/// A lock-free counter of the events recorded during a trailing time window.
///
/// # Window Rounding
///
/// The requested window is approximated by whole slots, and the slot duration
/// is truncated to an integer number of nanoseconds. The window actually
/// tracked is returned by [`window`](Self::window) and may be slightly
/// shorter than the one requested:
///
/// ```rust
/// use finestra::SlidingCounter;
/// use std::time::Duration;
///
/// let counter = SlidingCounter::new(Duration::from_nanos(1_000_003)).unwrap();
/// assert_eq!(counter.slot_count(), 1);
///
/// let counter = SlidingCounter::new(Duration::from_nanos(10_000_001)).unwrap();
/// assert_eq!(counter.slot_count(), 8);
/// assert_eq!(counter.window(), Duration::from_millis(10));
/// ```
///
/// # Examples
///
/// ```rust
/// use finestra::{Clock, SlidingCounter};
/// use std::time::Duration;
///
/// let (clock, mock) = Clock::mock();
/// let counter = SlidingCounter::with_clock(Duration::from_millis(77), clock).unwrap();
///
/// assert_eq!(counter.peek(), 0);
///
/// counter.increment();
/// counter.increment();
/// assert_eq!(counter.peek(), 2);
///
/// mock.increment(Duration::from_millis(55));
/// counter.increment();
/// assert_eq!(counter.peek(), 3);
///
/// // The first two events age out.
/// mock.increment(Duration::from_millis(22));
/// assert_eq!(counter.peek(), 1);
/// ```
pub struct SlidingCounter {
    name: &'static str,
    geometry: Geometry,
    ring: RingBuffer,
    clock: Clock,
}

impl SlidingCounter {
    /// Creates a counter over `window` using the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`](crate::Error::InvalidConfiguration)
    /// if `window` is zero.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use finestra::SlidingCounter;
    /// use std::time::Duration;
    ///
    /// let counter = SlidingCounter::new(Duration::from_secs(1)).unwrap();
    /// assert_eq!(counter.slot_count(), 16);
    /// assert_eq!(counter.slot_duration(), Duration::from_micros(62_500));
    ///
    /// assert!(SlidingCounter::new(Duration::ZERO).is_err());
    /// ```
    pub fn new(window: Duration) -> Result<Self> {
        Self::with_clock(window, Clock::new())
    }

    /// Creates a counter over `window` reading time from `clock`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`](crate::Error::InvalidConfiguration)
    /// if `window` is zero.
    pub fn with_clock(window: Duration, clock: Clock) -> Result<Self> {
        let geometry = Geometry::for_window(window)?;

        debug!(
            requested = ?window,
            window = ?geometry.window(),
            slots = geometry.slot_count(),
            slot_duration = ?geometry.slot_duration(),
            "sliding window created"
        );
        if geometry.window() < window {
            debug!(
                requested = ?window,
                window = ?geometry.window(),
                "sliding window truncated to whole slots"
            );
        }

        Ok(Self {
            name: "",
            ring: RingBuffer::new(geometry.slot_count()),
            geometry,
            clock,
        })
    }

    /// Sets the name of this counter, returning `self` for method chaining.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use finestra::{Observable, SlidingCounter};
    /// use std::time::Duration;
    ///
    /// let counter = SlidingCounter::new(Duration::from_secs(1))
    ///     .unwrap()
    ///     .with_name("logins");
    /// assert_eq!(counter.name(), "logins");
    /// ```
    pub fn with_name(self, name: &'static str) -> Self {
        Self { name, ..self }
    }

    /// The geometry this counter was built with.
    #[inline]
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// The effective window, `slot_duration() * slot_count()`.
    #[inline]
    pub fn window(&self) -> Duration {
        self.geometry.window()
    }

    /// The time covered by a single slot.
    ///
    /// This is the granularity at which events age out of the window.
    #[inline]
    pub fn slot_duration(&self) -> Duration {
        self.geometry.slot_duration()
    }

    /// The number of slots in the ring.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.geometry.slot_count()
    }

    /// Records one event at the current time.
    #[inline]
    pub fn increment(&self) {
        self.add(1);
    }

    /// Records `value` events at the current time.
    ///
    /// Never blocks. Writers only retry when another writer recycled the same
    /// slot at the same instant.
    pub fn add(&self, value: u64) {
        let bucket = self.clock.bucket(self.slot_duration());
        let slot = self.ring.slot(bucket);

        loop {
            let timestamp = slot.timestamp();

            if timestamp == bucket {
                slot.add(value);
                return;
            }

            if timestamp < bucket {
                if slot.recycle(timestamp, bucket, value) {
                    return;
                }
                continue;
            }

            // The slot already belongs to a later bucket than this writer's
            // clock reading. Count the event there instead of rewinding.
            trace!(
                counter = self.name,
                slot_bucket = timestamp,
                bucket,
                "clock skew on sliding window write"
            );
            slot.add(value);
            return;
        }
    }

    /// Returns the number of events recorded during the trailing window.
    ///
    /// The scan is not a snapshot: concurrent writes may or may not be
    /// included.
    pub fn peek(&self) -> u64 {
        let bucket = self.clock.bucket(self.slot_duration());
        let slots = self.ring.len() as i64;
        let window_start = bucket.saturating_sub(slots - 1);

        (0..slots)
            .map(|i| self.ring.slot(bucket.wrapping_sub(i)))
            .filter(|slot| slot.timestamp() >= window_start)
            .fold(0u64, |total, slot| total.saturating_add(slot.count()))
    }

    /// Returns the average number of events per second over the window.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use finestra::{Clock, SlidingCounter};
    /// use std::time::Duration;
    ///
    /// let (clock, _mock) = Clock::mock();
    /// let counter = SlidingCounter::with_clock(Duration::from_secs(2), clock).unwrap();
    /// counter.add(10);
    /// assert_eq!(counter.rate(), 5.0);
    /// ```
    pub fn rate(&self) -> f64 {
        self.peek() as f64 / self.window().as_secs_f64()
    }
}

impl Observable for SlidingCounter {
    #[inline]
    fn name(&self) -> &str {
        self.name
    }

    #[inline]
    fn value(&self) -> CounterValue {
        CounterValue::Unsigned(self.peek())
    }

    #[inline]
    fn window(&self) -> Duration {
        self.geometry.window()
    }
}

impl Debug for SlidingCounter {
    /// Formats the counter showing its geometry and every written slot.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{{ window:{:?} slots:{}x{:?} |",
            self.name,
            self.window(),
            self.slot_count(),
            self.slot_duration()
        )?;
        for (i, bucket, count) in self.ring.occupied() {
            write!(f, " [{i}]:{bucket}={count}")?;
        }
        write!(f, " }}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn mock_counter(window: Duration) -> (SlidingCounter, Arc<quanta::Mock>) {
        let (clock, mock) = Clock::mock();
        (SlidingCounter::with_clock(window, clock).unwrap(), mock)
    }

    #[test]
    fn test_new() {
        let counter = SlidingCounter::new(Duration::from_millis(80)).unwrap();
        assert_eq!(counter.peek(), 0);
        assert_eq!(counter.slot_count(), 8);
        assert_eq!(counter.slot_duration(), Duration::from_millis(10));
        assert_eq!(counter.window(), Duration::from_millis(80));
        assert_eq!(counter.name(), "");
    }

    #[test]
    fn test_zero_window() {
        let err = SlidingCounter::new(Duration::ZERO).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_with_name() {
        let counter = SlidingCounter::new(Duration::from_secs(1))
            .unwrap()
            .with_name("my_window");
        assert_eq!(counter.name(), "my_window");
    }

    #[test]
    fn test_geometry_is_stable() {
        let (counter, mock) = mock_counter(Duration::from_millis(77));
        let geometry = counter.geometry();

        for _ in 0..20 {
            counter.increment();
            mock.increment(Duration::from_millis(13));
            assert_eq!(counter.geometry(), geometry);
            assert_eq!(counter.window(), Duration::from_millis(77));
            assert_eq!(counter.slot_duration(), Duration::from_micros(9_625));
        }
    }

    #[test]
    fn test_increments_within_one_slot() {
        let (counter, _mock) = mock_counter(Duration::from_secs(1));
        for _ in 0..1_000 {
            counter.increment();
        }
        assert_eq!(counter.peek(), 1_000);
    }

    #[test]
    fn test_add() {
        let (counter, mock) = mock_counter(Duration::from_secs(1));
        counter.add(5);
        counter.add(3);
        assert_eq!(counter.peek(), 8);

        mock.increment(Duration::from_millis(100));
        counter.add(2);
        assert_eq!(counter.peek(), 10);
    }

    #[test]
    fn test_boundary_scenario() {
        let (counter, mock) = mock_counter(Duration::from_millis(77));

        assert_eq!(counter.peek(), 0);

        counter.increment();
        counter.increment();
        assert_eq!(counter.peek(), 2);

        mock.increment(Duration::from_millis(55));
        counter.increment();
        assert_eq!(counter.peek(), 3);

        mock.increment(Duration::from_millis(22));
        assert_eq!(counter.peek(), 1);
    }

    #[test]
    fn test_events_age_out_slot_by_slot() {
        // 8 slots of 10ms.
        let (counter, mock) = mock_counter(Duration::from_millis(80));
        counter.increment();

        for _ in 0..7 {
            mock.increment(Duration::from_millis(10));
            assert_eq!(counter.peek(), 1);
        }

        mock.increment(Duration::from_millis(10));
        assert_eq!(counter.peek(), 0);
    }

    #[test]
    fn test_window_rollout() {
        let (counter, mock) = mock_counter(Duration::from_millis(80));

        counter.add(4);
        mock.increment(Duration::from_millis(40));
        counter.add(2);
        assert_eq!(counter.peek(), 6);

        // The first batch is now exactly one window old.
        mock.increment(Duration::from_millis(40));
        assert_eq!(counter.peek(), 2);

        mock.increment(counter.window());
        assert_eq!(counter.peek(), 0);
    }

    #[test]
    fn test_long_idle_reads_zero() {
        let (counter, mock) = mock_counter(Duration::from_secs(1));
        for _ in 0..100 {
            counter.increment();
        }
        mock.increment(Duration::from_secs(3600));
        assert_eq!(counter.peek(), 0);
    }

    #[test]
    fn test_recycled_slot_drops_previous_epoch() {
        let (counter, mock) = mock_counter(Duration::from_millis(80));

        counter.add(5);
        // Same slot index, one full ring later.
        mock.increment(Duration::from_millis(80));
        counter.increment();
        assert_eq!(counter.peek(), 1);

        // And several rings later.
        mock.increment(Duration::from_millis(80 * 5));
        counter.increment();
        counter.increment();
        assert_eq!(counter.peek(), 2);
    }

    #[test]
    fn test_clock_skew_is_counted_without_rewinding() {
        let (counter, mock) = mock_counter(Duration::from_millis(80));

        // Bucket 8 lands in slot 0.
        mock.increment(Duration::from_millis(80));
        counter.increment();

        // A writer reading an older clock hits slot 0 with bucket 0.
        mock.decrement(Duration::from_millis(80));
        counter.increment();

        mock.increment(Duration::from_millis(80));
        assert_eq!(counter.peek(), 2);
        assert_eq!(counter.ring.slot(8).timestamp(), 8);
    }

    #[test]
    fn test_single_slot_window() {
        let (counter, mock) = mock_counter(Duration::from_micros(500));
        assert_eq!(counter.slot_count(), 1);

        counter.increment();
        counter.increment();
        assert_eq!(counter.peek(), 2);

        mock.increment(Duration::from_micros(500));
        assert_eq!(counter.peek(), 0);
        counter.increment();
        assert_eq!(counter.peek(), 1);
    }

    #[test]
    fn test_rate() {
        let (counter, _mock) = mock_counter(Duration::from_millis(500));
        counter.add(8);
        assert_eq!(counter.rate(), 16.0);
    }

    #[test]
    fn test_multiple_threads() {
        let (counter, _mock) = mock_counter(Duration::from_secs(1));
        let counter = Arc::new(counter);
        let mut handles = vec![];

        for _ in 0..4 {
            let c = Arc::clone(&counter);
            handles.push(thread::spawn(move || {
                for _ in 0..10_000 {
                    c.increment();
                }
            }));
        }

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(counter.peek(), 40_000);
    }

    #[test]
    fn test_many_writers_on_a_fresh_slot() {
        const THREADS: usize = 64;
        const ITERATIONS: u64 = 500;

        let (counter, mock) = mock_counter(Duration::from_millis(80));
        counter.increment();
        // Every writer races to recycle the same stale slot.
        mock.increment(Duration::from_millis(80));

        let counter = Arc::new(counter);
        let barrier = Arc::new(Barrier::new(THREADS));
        let mut handles = vec![];

        for _ in 0..THREADS {
            let c = Arc::clone(&counter);
            let b = Arc::clone(&barrier);
            handles.push(thread::spawn(move || {
                b.wait();
                for _ in 0..ITERATIONS {
                    c.increment();
                }
            }));
        }

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(counter.peek(), THREADS as u64 * ITERATIONS);
    }

    #[test]
    fn test_concurrent_readers_and_writers() {
        let (counter, _mock) = mock_counter(Duration::from_secs(1));
        let counter = Arc::new(counter);
        let mut handles = vec![];

        for _ in 0..4 {
            let c = Arc::clone(&counter);
            handles.push(thread::spawn(move || {
                for _ in 0..1_000 {
                    c.increment();
                }
            }));
        }

        let reader = {
            let c = Arc::clone(&counter);
            thread::spawn(move || {
                let mut last = 0;
                for _ in 0..1_000 {
                    let seen = c.peek();
                    assert!(seen >= last);
                    assert!(seen <= 4_000);
                    last = seen;
                }
            })
        };

        for h in handles {
            h.join().unwrap();
        }
        reader.join().unwrap();

        assert_eq!(counter.peek(), 4_000);
    }

    #[test]
    fn test_system_clock_scenario() {
        let counter = SlidingCounter::new(Duration::from_millis(200)).unwrap();
        counter.increment();
        counter.increment();
        assert_eq!(counter.peek(), 2);

        thread::sleep(counter.window() + counter.slot_duration());
        assert_eq!(counter.peek(), 0);
    }

    #[test]
    fn test_observable_impl() {
        let (counter, _mock) = mock_counter(Duration::from_secs(1));
        let counter = counter.with_name("events");
        counter.add(7);

        assert_eq!(Observable::name(&counter), "events");
        assert_eq!(counter.value(), CounterValue::Unsigned(7));
        assert_eq!(Observable::window(&counter), Duration::from_secs(1));
    }

    #[test]
    fn test_debug() {
        let (counter, _mock) = mock_counter(Duration::from_millis(80));
        let counter = counter.with_name("test");
        counter.add(42);

        let debug_str = format!("{:?}", counter);
        assert!(debug_str.contains("test"));
        assert!(debug_str.contains("[0]:0=42"));
    }
}
