//! Prometheus metrics for monitoring the travel relay.
//!
//! This module provides a centralized metrics registry tracking inbound
//! requests, upstream calls, and normalizer degradations.

use prometheus::{
    register_gauge_vec, register_histogram_vec, register_int_counter_vec, GaugeVec, HistogramVec,
    IntCounterVec,
};
use std::sync::OnceLock;

/// Container for all application metrics.
pub struct Metrics {
    /// Total number of requests by method, endpoint, and status
    pub request_count: IntCounterVec,

    /// Request duration histogram in seconds
    pub request_duration: HistogramVec,

    /// Number of currently active requests by endpoint
    pub active_requests: GaugeVec,

    /// Outbound calls by upstream service and outcome
    pub upstream_requests: IntCounterVec,

    /// Upstream response latency histogram in seconds
    pub upstream_latency: HistogramVec,

    /// Responses served from a fallback shape instead of upstream data
    pub normalizer_fallbacks: IntCounterVec,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Initialize the metrics registry.
///
/// This should be called once at application startup. Subsequent calls
/// return the same instance.
///
/// # Examples
///
/// ```no_run
/// use travel_relay::core::metrics::init_metrics;
///
/// let metrics = init_metrics();
/// metrics.request_count.with_label_values(&["GET", "/health", "200"]).inc();
/// ```
pub fn init_metrics() -> &'static Metrics {
    METRICS.get_or_init(|| {
        let request_count = register_int_counter_vec!(
            "travel_relay_requests_total",
            "Total number of requests",
            &["method", "endpoint", "status_code"]
        )
        .expect("Failed to register request_count metric");

        let request_duration = register_histogram_vec!(
            "travel_relay_request_duration_seconds",
            "Request duration in seconds",
            &["method", "endpoint"],
            vec![0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]
        )
        .expect("Failed to register request_duration metric");

        let active_requests = register_gauge_vec!(
            "travel_relay_active_requests",
            "Number of active requests",
            &["endpoint"]
        )
        .expect("Failed to register active_requests metric");

        let upstream_requests = register_int_counter_vec!(
            "travel_relay_upstream_requests_total",
            "Total number of outbound calls to upstream services",
            &["service", "outcome"]
        )
        .expect("Failed to register upstream_requests metric");

        let upstream_latency = register_histogram_vec!(
            "travel_relay_upstream_latency_seconds",
            "Upstream response latency in seconds",
            &["service"],
            vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]
        )
        .expect("Failed to register upstream_latency metric");

        let normalizer_fallbacks = register_int_counter_vec!(
            "travel_relay_normalizer_fallbacks_total",
            "Responses built from fallback values instead of upstream data",
            &["normalizer", "reason"]
        )
        .expect("Failed to register normalizer_fallbacks metric");

        Metrics {
            request_count,
            request_duration,
            active_requests,
            upstream_requests,
            upstream_latency,
            normalizer_fallbacks,
        }
    })
}

/// Get the global metrics instance, registering it on first use.
pub fn get_metrics() -> &'static Metrics {
    init_metrics()
}

/// Record the outcome and latency of one upstream call.
pub fn record_upstream_call(service: &str, outcome: &str, elapsed_secs: f64) {
    let metrics = get_metrics();
    metrics
        .upstream_requests
        .with_label_values(&[service, outcome])
        .inc();
    metrics
        .upstream_latency
        .with_label_values(&[service])
        .observe(elapsed_secs);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_initialization() {
        let metrics = init_metrics();
        let metrics2 = get_metrics();
        assert!(std::ptr::eq(metrics, metrics2));
    }

    #[test]
    fn test_request_count_metric() {
        let metrics = init_metrics();
        let labels = ["POST", "/api/unique-count-test", "201"];

        let initial = metrics.request_count.with_label_values(&labels).get();
        metrics.request_count.with_label_values(&labels).inc();
        let after = metrics.request_count.with_label_values(&labels).get();

        assert_eq!(after, initial + 1);
    }

    #[test]
    fn test_active_requests_metric() {
        let metrics = init_metrics();
        let gauge = metrics
            .active_requests
            .with_label_values(&["/api/unique-gauge-test"]);

        let initial = gauge.get();
        gauge.inc();
        assert_eq!(gauge.get(), initial + 1.0);
        gauge.dec();
        assert_eq!(gauge.get(), initial);
    }

    #[test]
    fn test_record_upstream_call() {
        let metrics = init_metrics();
        let initial = metrics
            .upstream_requests
            .with_label_values(&["unique-service", "success"])
            .get();

        record_upstream_call("unique-service", "success", 0.25);

        let after = metrics
            .upstream_requests
            .with_label_values(&["unique-service", "success"])
            .get();
        assert_eq!(after, initial + 1);
        assert!(
            metrics
                .upstream_latency
                .with_label_values(&["unique-service"])
                .get_sample_count()
                >= 1
        );
    }
}
