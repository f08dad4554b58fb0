//! Wrapper types that change how a windowed counter is reported.
//!
//! Wrappers implement [`Observable`](crate::Observable) and dereference to
//! the wrapped counter, so recording events goes through them transparently.
//!
//! | Wrapper | Reports |
//! |---------|---------|
//! | [`PerSecond`] | The windowed value divided by the window length in seconds |
//!
//! ```rust
//! use finestra::{Observable, SlidingCounter};
//! use finestra::adapters::PerSecond;
//! use std::time::Duration;
//!
//! let requests = PerSecond::new(
//!     SlidingCounter::new(Duration::from_secs(10))
//!         .unwrap()
//!         .with_name("requests_per_sec"),
//! );
//! requests.increment();
//!
//! assert_eq!(requests.name(), "requests_per_sec");
//! ```

mod per_second;

pub use per_second::PerSecond;
