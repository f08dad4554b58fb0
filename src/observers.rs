//! Exporters for collections of windowed counters.
//!
//! - [`json`] - Serialize counters to JSON
//! - [`prometheus`] - Export counters in the Prometheus exposition format
//!
//! # Feature Flags
//!
//! Each observer is gated behind a feature flag to minimize dependencies:
//!
//! - `json` - Enables the [`json`] module
//! - `prometheus` - Enables the [`prometheus`] module
//! - `full` - Enables all observer modules
//!
//! # Example
//!
//! ```rust,ignore
//! use finestra::{Observable, SlidingCounter};
//! use finestra::observers::Result;
//! use finestra::observers::prometheus::PrometheusObserver;
//!
//! fn export_metrics(counters: &[&dyn Observable]) -> Result<String> {
//!     PrometheusObserver::new()
//!         .with_namespace("myapp")
//!         .render(counters.iter().copied())
//! }
//! ```

mod error;

pub use error::{ObserverError, Result};

#[cfg(feature = "prometheus")]
pub use error::PrometheusError;

#[cfg(feature = "json")]
pub mod json;

#[cfg(feature = "prometheus")]
pub mod prometheus;
