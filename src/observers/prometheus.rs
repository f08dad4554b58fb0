//! Prometheus observer for windowed counters.
//!
//! This module provides [`PrometheusObserver`], which renders a collection of
//! [`Observable`] counters in the Prometheus text exposition format using the
//! official `prometheus` crate ([`Registry`] and [`TextEncoder`]).
//!
//! A windowed value goes down as events age out of the window, so every
//! counter is exported as a **gauge**: integer counts as `IntGauge`, rates as
//! `Gauge`.
//!
//! # Feature Flag
//!
//! This module requires the `prometheus` feature:
//!
//! ```toml
//! [dependencies]
//! finestra = { version = "0.1", features = ["prometheus"] }
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use finestra::{Observable, SlidingCounter};
//! use finestra::adapters::PerSecond;
//! use finestra::observers::prometheus::PrometheusObserver;
//! use std::time::Duration;
//!
//! let requests = SlidingCounter::new(Duration::from_secs(60))?.with_name("http_requests");
//! let throughput = PerSecond::new(
//!     SlidingCounter::new(Duration::from_secs(10))?.with_name("http_requests_per_second"),
//! );
//!
//! let observer = PrometheusObserver::new()
//!     .with_namespace("myapp")
//!     .with_const_label("instance", "localhost:8080")
//!     .with_window_label(true)
//!     .with_help("http_requests", "HTTP requests in the last minute");
//!
//! let counters: Vec<&dyn Observable> = vec![&requests, &throughput];
//! let output = observer.render(counters.into_iter())?;
//! // # HELP myapp_http_requests HTTP requests in the last minute
//! // # TYPE myapp_http_requests gauge
//! // myapp_http_requests{instance="localhost:8080",window_seconds="60"} 0
//! ```

use crate::observable::{CounterValue, Observable};
use crate::observers::{PrometheusError, Result};
use prometheus::{Encoder, Gauge, IntGauge, Opts, Registry, TextEncoder};
use std::collections::HashMap;

/// Name of the label carrying a counter's window length, in seconds.
pub const WINDOW_LABEL: &str = "window_seconds";

/// Observer that exports windowed counters as Prometheus gauges.
#[derive(Debug, Clone, Default)]
pub struct PrometheusObserver {
    /// Namespace (prefix) for all metrics.
    namespace: Option<String>,
    /// Subsystem for all metrics.
    subsystem: Option<String>,
    /// Constant labels applied to all metrics.
    const_labels: HashMap<String, String>,
    /// Per-metric help text, keyed by counter name.
    help: HashMap<String, String>,
    /// Whether to label each metric with its window length.
    window_label: bool,
}

impl PrometheusObserver {
    /// Creates a new `PrometheusObserver`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the namespace (prefix) for all metrics.
    ///
    /// For example, namespace "myapp" + metric "requests" = "myapp_requests".
    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_string());
        self
    }

    /// Sets the subsystem for all metrics.
    ///
    /// The subsystem appears between namespace and metric name.
    pub fn with_subsystem(mut self, subsystem: &str) -> Self {
        self.subsystem = Some(subsystem.to_string());
        self
    }

    /// Adds a constant label to all metrics.
    pub fn with_const_label(mut self, name: &str, value: &str) -> Self {
        self.const_labels.insert(name.to_string(), value.to_string());
        self
    }

    /// Sets the help text for a specific counter.
    pub fn with_help(mut self, name: &str, help: &str) -> Self {
        self.help.insert(name.to_string(), help.to_string());
        self
    }

    /// Adds a [`WINDOW_LABEL`] label holding each counter's window length.
    pub fn with_window_label(mut self, enabled: bool) -> Self {
        self.window_label = enabled;
        self
    }

    /// Sanitizes a metric name to be Prometheus-compatible.
    ///
    /// Prometheus metric names must match `[a-zA-Z_:][a-zA-Z0-9_:]*`.
    fn sanitize_name(name: &str) -> String {
        let mut result: String = name
            .chars()
            .filter_map(|c| match c {
                c if c.is_ascii_alphanumeric() || c == '_' || c == ':' => Some(c),
                '-' | '.' | ' ' | '/' => Some('_'),
                _ => None,
            })
            .collect();
        if result.is_empty() {
            result.push_str("unnamed");
        }
        if result.starts_with(|c: char| c.is_ascii_digit()) {
            result.insert(0, '_');
        }
        result
    }

    /// Builds the full metric name with namespace and subsystem.
    fn build_full_name(&self, name: &str) -> String {
        let sanitized = Self::sanitize_name(name);
        match (&self.namespace, &self.subsystem) {
            (Some(ns), Some(ss)) => format!("{ns}_{ss}_{sanitized}"),
            (Some(ns), None) => format!("{ns}_{sanitized}"),
            (None, Some(ss)) => format!("{ss}_{sanitized}"),
            (None, None) => sanitized,
        }
    }

    /// Renders counters to the Prometheus exposition format.
    ///
    /// Each call reads every counter once and registers it in a fresh
    /// registry, so repeated renders never conflict.
    ///
    /// # Errors
    ///
    /// Returns an error if two counters map to the same metric name, or if
    /// metric creation or encoding fails.
    pub fn render<'a>(&self, counters: impl Iterator<Item = &'a dyn Observable>) -> Result<String> {
        let registry = Registry::new();

        for counter in counters {
            let raw_name = if counter.name().is_empty() {
                "unnamed"
            } else {
                counter.name()
            };

            let help = self
                .help
                .get(raw_name)
                .cloned()
                .unwrap_or_else(|| format!("{raw_name} over a sliding window"));

            let mut labels = self.const_labels.clone();
            if self.window_label {
                labels.insert(
                    WINDOW_LABEL.to_string(),
                    counter.window().as_secs_f64().to_string(),
                );
            }

            let opts = Opts::new(self.build_full_name(raw_name), help).const_labels(labels);
            Self::register_gauge(&registry, opts, counter.value())?;
        }

        Self::encode_registry(&registry)
    }

    /// Renders counters to bytes (useful for HTTP responses).
    ///
    /// # Errors
    ///
    /// Same as [`render`](Self::render).
    pub fn render_bytes<'a>(
        &self,
        counters: impl Iterator<Item = &'a dyn Observable>,
    ) -> Result<Vec<u8>> {
        Ok(self.render(counters)?.into_bytes())
    }

    /// Registers a gauge holding `value`.
    fn register_gauge(registry: &Registry, opts: Opts, value: CounterValue) -> Result<()> {
        match value {
            CounterValue::Unsigned(v) => {
                let gauge = IntGauge::with_opts(opts)?;
                gauge.set(i64::try_from(v).unwrap_or(i64::MAX));
                registry.register(Box::new(gauge))?;
            }
            CounterValue::Float(v) => {
                let gauge = Gauge::with_opts(opts)?;
                gauge.set(v);
                registry.register(Box::new(gauge))?;
            }
        }
        Ok(())
    }

    /// Encodes the registry to a string.
    fn encode_registry(registry: &Registry) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&registry.gather(), &mut buffer)
            .map_err(|e| PrometheusError::EncodeError(e.to_string()))?;
        Ok(String::from_utf8(buffer)?)
    }
}
