//! Unified error type for all observers.
//!
//! Every exporter returns [`ObserverError`], so switching from one output
//! format to another does not change error handling.

use thiserror::Error;

/// Unified error type for all observer operations.
#[derive(Debug, Error)]
pub enum ObserverError {
    /// Error from the JSON observer.
    #[cfg(feature = "json")]
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from the Prometheus observer.
    #[cfg(feature = "prometheus")]
    #[error("prometheus error: {0}")]
    Prometheus(#[from] PrometheusError),

    /// Error encoding to UTF-8.
    #[error("utf8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Result type for observer operations.
pub type Result<T> = std::result::Result<T, ObserverError>;

/// Error type specific to Prometheus observer operations.
#[cfg(feature = "prometheus")]
#[derive(Debug, Error)]
pub enum PrometheusError {
    /// Error creating or registering a metric.
    #[error("metric error: {0}")]
    MetricError(String),

    /// Error encoding metrics to text format.
    #[error("encode error: {0}")]
    EncodeError(String),
}

#[cfg(feature = "prometheus")]
impl From<prometheus::Error> for PrometheusError {
    fn from(err: prometheus::Error) -> Self {
        PrometheusError::MetricError(err.to_string())
    }
}

#[cfg(feature = "prometheus")]
impl From<prometheus::Error> for ObserverError {
    fn from(err: prometheus::Error) -> Self {
        ObserverError::Prometheus(PrometheusError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_error_display() {
        let err = String::from_utf8(vec![0xff]).unwrap_err();
        let err = ObserverError::from(err);
        assert!(err.to_string().starts_with("utf8 error:"));
    }

    #[cfg(feature = "prometheus")]
    #[test]
    fn test_prometheus_error_display() {
        let err = PrometheusError::MetricError("test error".to_string());
        assert_eq!(err.to_string(), "metric error: test error");

        let err = ObserverError::from(PrometheusError::EncodeError("failed".to_string()));
        assert_eq!(err.to_string(), "prometheus error: encode error: failed");
    }
}
