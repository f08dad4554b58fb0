//! JSON observer for windowed counters.
//!
//! This module provides [`JsonObserver`], which serializes a collection of
//! [`Observable`] counters to JSON using the snapshot types of
//! [`crate::snapshot`].
//!
//! # Feature Flag
//!
//! This module requires the `json` feature:
//!
//! ```toml
//! [dependencies]
//! finestra = { version = "0.1", features = ["json"] }
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use finestra::{Observable, SlidingCounter};
//! use finestra::observers::json::JsonObserver;
//! use std::time::Duration;
//!
//! let logins = SlidingCounter::new(Duration::from_secs(60))?.with_name("logins");
//! let failures = SlidingCounter::new(Duration::from_secs(60))?.with_name("failures");
//!
//! logins.add(1000);
//! failures.add(5);
//!
//! let counters: Vec<&dyn Observable> = vec![&logins, &failures];
//! let json = JsonObserver::new().to_json(counters.into_iter())?;
//! // [{"name":"logins","value":1000,"window_secs":60.0},
//! //  {"name":"failures","value":5,"window_secs":60.0}]
//! ```

use crate::observable::Observable;
use crate::observers::Result;
use crate::snapshot::{current_timestamp_ms, CounterSnapshot, MetricsSnapshot};
use serde::Serialize;

/// Configuration for the JSON observer.
#[derive(Debug, Clone, Default)]
pub struct JsonConfig {
    /// Whether to pretty-print the JSON output.
    pub pretty: bool,
    /// Whether to include a timestamp in the output.
    pub include_timestamp: bool,
    /// Whether to wrap counters in a [`MetricsSnapshot`] object.
    pub wrap_in_snapshot: bool,
}

/// An observer that serializes counters to JSON.
///
/// By default the output is a bare array of [`CounterSnapshot`]s. With
/// [`wrap_in_snapshot`](Self::wrap_in_snapshot) it is a [`MetricsSnapshot`]
/// object, optionally stamped with the current time.
#[derive(Debug, Clone, Default)]
pub struct JsonObserver {
    config: JsonConfig,
}

impl JsonObserver {
    /// Creates a new JSON observer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new JSON observer with the specified configuration.
    pub fn with_config(config: JsonConfig) -> Self {
        Self { config }
    }

    /// Enables or disables pretty-printing.
    pub fn pretty(mut self, enabled: bool) -> Self {
        self.config.pretty = enabled;
        self
    }

    /// Enables or disables timestamp inclusion.
    ///
    /// Only has effect when `wrap_in_snapshot` is also enabled.
    pub fn include_timestamp(mut self, enabled: bool) -> Self {
        self.config.include_timestamp = enabled;
        self
    }

    /// Enables or disables wrapping the output in a [`MetricsSnapshot`].
    pub fn wrap_in_snapshot(mut self, enabled: bool) -> Self {
        self.config.wrap_in_snapshot = enabled;
        self
    }

    /// Reads every counter into a [`CounterSnapshot`].
    pub fn collect<'a>(
        &self,
        counters: impl Iterator<Item = &'a dyn Observable>,
    ) -> Vec<CounterSnapshot> {
        counters.map(CounterSnapshot::from_observable).collect()
    }

    /// Serializes counters to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ObserverError::Json`](crate::observers::ObserverError::Json)
    /// if serialization fails.
    pub fn to_json<'a>(&self, counters: impl Iterator<Item = &'a dyn Observable>) -> Result<String> {
        let snapshots = self.collect(counters);
        if self.config.wrap_in_snapshot {
            self.encode(&self.wrap(snapshots))
        } else {
            self.encode(&snapshots)
        }
    }

    /// Serializes counters to a JSON byte vector.
    ///
    /// # Errors
    ///
    /// Returns [`ObserverError::Json`](crate::observers::ObserverError::Json)
    /// if serialization fails.
    pub fn to_json_bytes<'a>(
        &self,
        counters: impl Iterator<Item = &'a dyn Observable>,
    ) -> Result<Vec<u8>> {
        Ok(self.to_json(counters)?.into_bytes())
    }

    fn wrap(&self, snapshots: Vec<CounterSnapshot>) -> MetricsSnapshot {
        if self.config.include_timestamp {
            MetricsSnapshot::with_timestamp(snapshots, current_timestamp_ms())
        } else {
            MetricsSnapshot::new(snapshots)
        }
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let json = if self.config.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(json)
    }
}
