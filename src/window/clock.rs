//! Time source for sliding windows.
//!
//! Bucket numbers are derived from the time elapsed since the clock was
//! anchored, not from wall time. [`quanta`] provides a cheap monotonic
//! reading on the hot path and a mock source that tests can move forwards
//! (and backwards) at will.

use std::fmt::{self, Debug};
use std::sync::Arc;
use std::time::Duration;

use quanta::Mock;

/// A monotonic clock anchored at the moment it was created.
///
/// # Examples
///
/// ```rust
/// use finestra::Clock;
/// use std::time::Duration;
///
/// let (clock, mock) = Clock::mock();
/// assert_eq!(clock.elapsed(), Duration::ZERO);
///
/// mock.increment(Duration::from_millis(5));
/// assert_eq!(clock.elapsed(), Duration::from_millis(5));
/// ```
#[derive(Clone)]
pub struct Clock {
    inner: quanta::Clock,
    anchor: quanta::Instant,
}

impl Clock {
    /// Creates a clock backed by the system's monotonic time source.
    pub fn new() -> Self {
        Self::from_quanta(quanta::Clock::new())
    }

    /// Creates a clock whose time only moves when the returned [`Mock`]
    /// handle is incremented or decremented.
    pub fn mock() -> (Self, Arc<Mock>) {
        let (inner, mock) = quanta::Clock::mock();
        (Self::from_quanta(inner), mock)
    }

    /// Anchors an existing `quanta` clock at its current reading.
    pub fn from_quanta(inner: quanta::Clock) -> Self {
        let anchor = inner.now();
        Self { inner, anchor }
    }

    /// Time elapsed since the clock was anchored.
    ///
    /// Readings earlier than the anchor saturate to zero.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.inner.now().duration_since(self.anchor)
    }

    /// The bucket number of the current instant for slots of `slot_duration`.
    ///
    /// Saturates at `i64::MAX`, which is unreachable for any slot duration
    /// of at least one nanosecond within a process lifetime.
    #[inline]
    pub(crate) fn bucket(&self, slot_duration: Duration) -> i64 {
        let slot_nanos = slot_duration.as_nanos().max(1);
        i64::try_from(self.elapsed().as_nanos() / slot_nanos).unwrap_or(i64::MAX)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clock")
            .field("elapsed", &self.elapsed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_advances_with_mock() {
        let (clock, mock) = Clock::mock();
        let slot = Duration::from_millis(10);

        assert_eq!(clock.bucket(slot), 0);
        mock.increment(Duration::from_millis(9));
        assert_eq!(clock.bucket(slot), 0);
        mock.increment(Duration::from_millis(1));
        assert_eq!(clock.bucket(slot), 1);
        mock.increment(Duration::from_millis(95));
        assert_eq!(clock.bucket(slot), 10);
    }

    #[test]
    fn test_bucket_follows_mock_backwards() {
        let (clock, mock) = Clock::mock();
        let slot = Duration::from_millis(10);

        mock.increment(Duration::from_millis(50));
        assert_eq!(clock.bucket(slot), 5);
        mock.decrement(Duration::from_millis(30));
        assert_eq!(clock.bucket(slot), 2);
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = Clock::new();
        let first = clock.elapsed();
        std::thread::sleep(Duration::from_millis(2));
        assert!(clock.elapsed() > first);
    }

    #[test]
    fn test_clones_share_anchor() {
        let (clock, mock) = Clock::mock();
        mock.increment(Duration::from_millis(3));
        let cloned = clock.clone();
        assert_eq!(cloned.elapsed(), clock.elapsed());
    }
}
