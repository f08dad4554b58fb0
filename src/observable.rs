//! Common interface for reading windowed counters.
//!
//! Every windowed value in this crate implements [`Observable`], which lets
//! heterogeneous counters be collected into a single slice and handed to an
//! exporter such as the JSON or Prometheus observers.
//!
//! ```rust
//! use finestra::{Observable, SlidingCounter};
//! use finestra::adapters::PerSecond;
//! use std::time::Duration;
//!
//! let requests = SlidingCounter::new(Duration::from_secs(1))
//!     .unwrap()
//!     .with_name("requests");
//! let throughput = PerSecond::new(
//!     SlidingCounter::new(Duration::from_secs(1))
//!         .unwrap()
//!         .with_name("throughput"),
//! );
//!
//! let counters: Vec<&dyn Observable> = vec![&requests, &throughput];
//! for counter in counters {
//!     println!("{counter}");
//! }
//! ```

use std::fmt::{self, Debug, Display};
use std::time::Duration;

/// The value reported by an [`Observable`].
///
/// # Examples
///
/// ```rust
/// use finestra::CounterValue;
///
/// assert!(CounterValue::Unsigned(0).is_zero());
/// assert!(!CounterValue::Float(0.5).is_zero());
/// assert_eq!(CounterValue::Unsigned(3).as_f64(), 3.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum CounterValue {
    /// An event count.
    Unsigned(u64),
    /// A derived value such as a rate.
    Float(f64),
}

impl CounterValue {
    /// Returns `true` if the value is zero.
    pub fn is_zero(&self) -> bool {
        match self {
            CounterValue::Unsigned(v) => *v == 0,
            CounterValue::Float(v) => *v == 0.0,
        }
    }

    /// Returns the value as an `f64`.
    pub fn as_f64(&self) -> f64 {
        match self {
            CounterValue::Unsigned(v) => *v as f64,
            CounterValue::Float(v) => *v,
        }
    }
}

impl Display for CounterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CounterValue::Unsigned(v) => write!(f, "{v}"),
            CounterValue::Float(v) => write!(f, "{v}"),
        }
    }
}

/// A named value computed over a trailing time window.
pub trait Observable: Debug {
    /// The name of this counter, or an empty string if none was set.
    fn name(&self) -> &str;

    /// The value over the trailing window, as of now.
    ///
    /// Windowed values go up and down as events age out, so exporters treat
    /// them as gauges.
    fn value(&self) -> CounterValue;

    /// The effective window the value is computed over.
    fn window(&self) -> Duration;
}

impl Display for dyn Observable + '_ {
    /// Formats the counter as `name:value` if named, or just `value` otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name().is_empty() {
            write!(f, "{}", self.value())
        } else {
            write!(f, "{}:{}", self.name(), self.value())
        }
    }
}
