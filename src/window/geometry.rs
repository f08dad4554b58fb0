//! Slot geometry of a sliding window.
//!
//! A requested window `W` is approximated by a power-of-two number of equally
//! sized slots. The number of slots grows with the logarithm of `W` expressed
//! in milliseconds, which keeps the read path (one pass over all slots) cheap
//! even for very long windows:
//!
//! ```text
//! slot_count    = next_power_of_two(ceil(log2(W_ms)) + 1)
//! slot_duration = W / slot_count          (truncating)
//! window        = slot_duration * slot_count
//! ```
//!
//! Because `slot_duration` is truncated, the effective `window` may be a few
//! nanoseconds shorter than the requested one. The effective value is the one
//! every counter actually tracks and is exposed through [`Geometry::window`].
//!
//! | Requested | Slots | Slot duration | Effective window |
//! |-----------|-------|---------------|------------------|
//! | 500µs     | 1     | 500µs         | 500µs            |
//! | 1ms       | 1     | 1ms           | 1ms              |
//! | 77ms      | 8     | 9.625ms       | 77ms             |
//! | 80ms      | 8     | 10ms          | 80ms             |
//! | 1s        | 16    | 62.5ms        | 1s               |
//! | 60s       | 32    | 1.875s        | 60s              |

use std::time::Duration;

use crate::error::{Error, Result};

/// The immutable layout of a sliding window: how many slots it has and how
/// much time each slot covers.
///
/// # Examples
///
/// ```rust
/// use finestra::Geometry;
/// use std::time::Duration;
///
/// let geometry = Geometry::for_window(Duration::from_millis(80)).unwrap();
/// assert_eq!(geometry.slot_count(), 8);
/// assert_eq!(geometry.slot_duration(), Duration::from_millis(10));
/// assert_eq!(geometry.window(), Duration::from_millis(80));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    slot_count: usize,
    slot_duration: Duration,
    window: Duration,
}

impl Geometry {
    /// Derives the geometry approximating `window`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `window` is zero.
    pub fn for_window(window: Duration) -> Result<Self> {
        if window.is_zero() {
            return Err(Error::InvalidConfiguration {
                window,
                reason: "window must be positive",
            });
        }

        let millis = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        let slot_count = (ceil_log2(millis) + 1).next_power_of_two() as usize;

        // slot_count is at most 128, so the conversion always succeeds.
        let divisor = u32::try_from(slot_count).unwrap_or(u32::MAX);
        let slot_duration = window / divisor;
        if slot_duration.is_zero() {
            return Err(Error::InvalidConfiguration {
                window,
                reason: "window is too short to be split into slots",
            });
        }

        Ok(Self {
            slot_count,
            slot_duration,
            window: slot_duration * divisor,
        })
    }

    /// Number of slots in the ring (always a power of two).
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Time covered by a single slot.
    #[inline]
    pub fn slot_duration(&self) -> Duration {
        self.slot_duration
    }

    /// Effective window: `slot_duration * slot_count`.
    #[inline]
    pub fn window(&self) -> Duration {
        self.window
    }
}

/// `ceil(log2(n))` for `n >= 1`, and 0 for `n == 0`.
#[inline]
fn ceil_log2(n: u64) -> u32 {
    if n <= 1 {
        0
    } else {
        u64::BITS - (n - 1).leading_zeros()
    }
}
