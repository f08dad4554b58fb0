//! Rate wrapper for windowed counters.
//!
//! [`PerSecond`] turns any [`Observable`] into an events-per-second gauge by
//! dividing its value by the length of its window.
//!
//! # Example
//!
//! ```rust
//! use finestra::{Clock, CounterValue, Observable, SlidingCounter};
//! use finestra::adapters::PerSecond;
//! use std::time::Duration;
//!
//! let (clock, _mock) = Clock::mock();
//! let counter = PerSecond::new(
//!     SlidingCounter::with_clock(Duration::from_secs(4), clock).unwrap(),
//! );
//! counter.add(10);
//!
//! assert_eq!(counter.value(), CounterValue::Float(2.5));
//! ```

use crate::observable::{CounterValue, Observable};
use std::fmt::{self, Debug};
use std::ops::Deref;
use std::time::Duration;

/// A wrapper reporting the wrapped counter as a rate per second.
///
/// The name and window are those of the inner counter; only
/// [`value`](Observable::value) changes.
pub struct PerSecond<T> {
    inner: T,
}

impl<T> PerSecond<T> {
    /// Wraps `inner`.
    pub const fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Returns a reference to the inner counter.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Consumes the wrapper and returns the inner counter.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Observable> Observable for PerSecond<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    /// Returns the inner value divided by the window length in seconds.
    fn value(&self) -> CounterValue {
        let secs = self.inner.window().as_secs_f64();
        if secs > 0.0 {
            CounterValue::Float(self.inner.value().as_f64() / secs)
        } else {
            CounterValue::Float(0.0)
        }
    }

    fn window(&self) -> Duration {
        self.inner.window()
    }
}

impl<T: Debug> Debug for PerSecond<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerSecond")
            .field("inner", &self.inner)
            .finish()
    }
}

/// Allows recording events through the wrapper.
impl<T> Deref for PerSecond<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
