//! # Finestra - Lock-Free Sliding-Window Event Counters
//!
//! A Rust library answering "how many events happened in the last `W`?" for
//! highly concurrent workloads, with wait-free writes in the common case and
//! no locks or background threads anywhere.
//!
//! ## The Problem
//!
//! A windowed count needs old events to disappear as time moves on. The usual
//! answers are a mutex around a queue of timestamps, or a timer thread that
//! periodically clears expired buckets. The first serializes every writer; the
//! second adds a thread to manage and still needs synchronization with the
//! writers.
//!
//! ## The Solution: A Ring of Timestamped Slots
//!
//! [`SlidingCounter`] splits the window into a power-of-two ring of slots.
//! Each slot stores the *bucket number* it currently counts for next to the
//! count itself, both as independent atomics:
//!
//! 1. **Writes** compute the current bucket, load the slot's bucket number and
//!    either add to it (same bucket) or take it over with a compare-and-swap
//!    (stale bucket). Old slots are recycled lazily by the first writer that
//!    needs them.
//!
//! 2. **Reads** walk every slot and sum the ones whose bucket number falls
//!    inside the trailing window. Stale slots are skipped without being
//!    cleared.
//!
//! 3. **Cache Line Padding**: each slot is wrapped in
//!    [`crossbeam_utils::CachePadded`] so writers landing on neighbouring
//!    buckets never contend on the same cache line.
//!
//! 4. **Logarithmic Geometry**: the number of slots grows with the logarithm
//!    of the window length (see [`Geometry`]), so a one hour window costs 32
//!    slot reads per [`peek`](SlidingCounter::peek).
//!
//! ## Quick Start
//!
//! ```rust
//! use finestra::SlidingCounter;
//! use std::time::Duration;
//!
//! let requests = SlidingCounter::new(Duration::from_secs(60))
//!     .unwrap()
//!     .with_name("requests");
//!
//! // Record from any thread.
//! requests.increment();
//! requests.add(5);
//!
//! // Events of the last minute.
//! assert_eq!(requests.peek(), 6);
//! ```
//!
//! ## Accuracy
//!
//! Counting is approximate by design. The window advances one slot at a time,
//! readers do not see an atomic snapshot, and writers whose clock lags behind
//! a slot count into that newer slot instead of rewinding it. In exchange,
//! writers never block. See the [`window`] module for details.
//!
//! ## Deterministic Time
//!
//! Counters read time from a [`Clock`]. [`Clock::mock`] returns a clock that
//! only moves when told to, which makes window behavior testable:
//!
//! ```rust
//! use finestra::{Clock, SlidingCounter};
//! use std::time::Duration;
//!
//! let (clock, mock) = Clock::mock();
//! let counter = SlidingCounter::with_clock(Duration::from_secs(1), clock).unwrap();
//!
//! counter.increment();
//! mock.increment(Duration::from_secs(1));
//! assert_eq!(counter.peek(), 0);
//! ```
//!
//! ## Observers
//!
//! Counters implement [`Observable`] and can be exported with the optional
//! observers:
//!
//! | Feature | Module | Description |
//! |---------|--------|-------------|
//! | `serde` | [`snapshot`] | Serializable counter snapshots |
//! | `json` | [`observers::json`] | Serialize counters to JSON |
//! | `prometheus` | [`observers::prometheus`] | Export in Prometheus exposition format |
//! | `full` | All observers | Enables all observer modules |
//!
//! ```rust,ignore
//! use finestra::observers::prometheus::PrometheusObserver;
//!
//! let output = PrometheusObserver::new()
//!     .with_namespace("myapp")
//!     .with_window_label(true)
//!     .render(counters.into_iter())?;
//! ```

pub mod adapters;
pub mod error;
pub mod observable;
pub mod observers;
pub mod window;

#[cfg(feature = "serde")]
pub mod snapshot;

pub use error::{Error, Result};
pub use observable::{CounterValue, Observable};
pub use window::{Clock, Geometry, SlidingCounter};
