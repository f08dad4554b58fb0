//! Serializable snapshots of windowed counters.
//!
//! # Feature Flag
//!
//! This module requires the `serde` feature:
//!
//! ```toml
//! [dependencies]
//! finestra = { version = "0.1", features = ["serde"] }
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use finestra::SlidingCounter;
//! use finestra::snapshot::CounterSnapshot;
//! use std::time::Duration;
//!
//! let counter = SlidingCounter::new(Duration::from_secs(60))?.with_name("logins");
//! counter.increment();
//!
//! let snapshot = CounterSnapshot::from_observable(&counter);
//! let json = serde_json::to_string(&snapshot)?;
//! // {"name":"logins","value":1,"window_secs":60.0}
//! ```

use crate::observable::{CounterValue, Observable};
use serde::{Deserialize, Serialize};

/// Name used for counters that were never given one.
pub const UNNAMED: &str = "(unnamed)";

/// The state of one windowed counter at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CounterSnapshot {
    /// The name of the counter.
    pub name: String,
    /// The value over the window when the snapshot was taken.
    pub value: CounterValue,
    /// Length of the window the value covers, in seconds.
    pub window_secs: f64,
}

impl CounterSnapshot {
    /// Creates a new counter snapshot.
    pub fn new(name: impl Into<String>, value: CounterValue, window_secs: f64) -> Self {
        Self {
            name: name.into(),
            value,
            window_secs,
        }
    }

    /// Reads an observable counter.
    pub fn from_observable(counter: &dyn Observable) -> Self {
        let name = if counter.name().is_empty() {
            UNNAMED
        } else {
            counter.name()
        };
        Self::new(name, counter.value(), counter.window().as_secs_f64())
    }
}

/// A point-in-time capture of several counters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsSnapshot {
    /// Optional timestamp in milliseconds since Unix epoch.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timestamp_ms: Option<u64>,
    /// The counter snapshots.
    pub counters: Vec<CounterSnapshot>,
}

impl MetricsSnapshot {
    /// Creates a new metrics snapshot with the given counters.
    pub fn new(counters: Vec<CounterSnapshot>) -> Self {
        Self {
            timestamp_ms: None,
            counters,
        }
    }

    /// Creates a new metrics snapshot with counters and a timestamp.
    pub fn with_timestamp(counters: Vec<CounterSnapshot>, timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms: Some(timestamp_ms),
            counters,
        }
    }

    /// Finds a counter by name.
    pub fn get(&self, name: &str) -> Option<&CounterSnapshot> {
        self.counters.iter().find(|c| c.name == name)
    }

    /// Reads every counter of the iterator.
    pub fn collect<'a>(counters: impl Iterator<Item = &'a dyn Observable>) -> Self {
        Self::new(counters.map(CounterSnapshot::from_observable).collect())
    }

    /// Reads every counter of the iterator and stamps the result with the
    /// current wall-clock time.
    pub fn collect_now<'a>(counters: impl Iterator<Item = &'a dyn Observable>) -> Self {
        Self::with_timestamp(
            counters.map(CounterSnapshot::from_observable).collect(),
            current_timestamp_ms(),
        )
    }
}

/// Returns the current timestamp in milliseconds since Unix epoch.
pub(crate) fn current_timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::PerSecond;
    use crate::window::{Clock, SlidingCounter};
    use std::time::Duration;

    fn counter(name: &'static str, window: Duration) -> SlidingCounter {
        let (clock, _mock) = Clock::mock();
        SlidingCounter::with_clock(window, clock)
            .unwrap()
            .with_name(name)
    }

    #[test]
    fn test_counter_snapshot_from_observable() {
        let requests = counter("requests", Duration::from_secs(1));
        requests.add(100);

        let snapshot = CounterSnapshot::from_observable(&requests);
        assert_eq!(snapshot.name, "requests");
        assert_eq!(snapshot.value, CounterValue::Unsigned(100));
        assert_eq!(snapshot.window_secs, 1.0);
    }

    #[test]
    fn test_counter_snapshot_unnamed() {
        let (clock, _mock) = Clock::mock();
        let counter = SlidingCounter::with_clock(Duration::from_secs(1), clock).unwrap();

        let snapshot = CounterSnapshot::from_observable(&counter);
        assert_eq!(snapshot.name, UNNAMED);
    }

    #[test]
    fn test_metrics_snapshot_collect() {
        let hits = counter("hits", Duration::from_secs(1));
        let rate = PerSecond::new(counter("hits_per_sec", Duration::from_millis(500)));
        hits.add(10);
        rate.add(4);

        let counters: Vec<&dyn Observable> = vec![&hits, &rate];
        let snapshot = MetricsSnapshot::collect(counters.into_iter());

        assert_eq!(snapshot.counters.len(), 2);
        assert!(snapshot.timestamp_ms.is_none());
        assert_eq!(snapshot.get("hits").unwrap().value, CounterValue::Unsigned(10));
        assert_eq!(
            snapshot.get("hits_per_sec").unwrap().value,
            CounterValue::Float(8.0)
        );
        assert!(snapshot.get("misses").is_none());
    }

    #[test]
    fn test_metrics_snapshot_collect_now() {
        let hits = counter("hits", Duration::from_secs(1));
        let counters: Vec<&dyn Observable> = vec![&hits];
        let snapshot = MetricsSnapshot::collect_now(counters.into_iter());
        assert!(snapshot.timestamp_ms.unwrap() > 0);
    }

    #[test]
    fn test_serialize_counter_snapshot() {
        let snapshot = CounterSnapshot::new("test", CounterValue::Unsigned(42), 0.5);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(json, r#"{"name":"test","value":42,"window_secs":0.5}"#);
    }

    #[test]
    fn test_deserialize_counter_snapshot() {
        let json = r#"{"name":"rate","value":2.5,"window_secs":60.0}"#;
        let snapshot: CounterSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.name, "rate");
        assert_eq!(snapshot.value, CounterValue::Float(2.5));
        assert_eq!(snapshot.window_secs, 60.0);
    }

    #[test]
    fn test_deserialize_metrics_snapshot_without_timestamp() {
        let json = r#"{"counters":[{"name":"a","value":1,"window_secs":1.0}]}"#;
        let snapshot: MetricsSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.timestamp_ms, None);
        assert_eq!(snapshot.counters[0].value, CounterValue::Unsigned(1));
    }
}
