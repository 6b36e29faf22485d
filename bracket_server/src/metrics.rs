//! Prometheus metrics for the bracket server.
//!
//! Metrics are exposed in Prometheus text format on a separate listener.
//! Recording is a no-op until [`init_metrics`] installs the exporter, so the
//! helpers are safe to call from tests.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use bracket_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("PUT", "/api/v1/matches/{id}/result", 200);
//! metrics::brackets_generated_total(8, 0);
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Increments the total HTTP request counter with method, path, and status labels.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Bracket Metrics
// ============================================================================

/// Count a generated bracket and the byes it resolved at creation.
pub fn brackets_generated_total(participants: u32, byes: usize) {
    metrics::counter!("brackets_generated_total").increment(1);
    metrics::histogram!("bracket_participants").record(participants as f64);
    if byes > 0 {
        metrics::counter!("byes_resolved_total").increment(byes as u64);
    }
}

/// Count a reported match result.
pub fn results_reported_total(round: u32) {
    metrics::counter!("results_reported_total",
        "round" => round.to_string()
    )
    .increment(1);
}

/// Count a tournament decided by its final.
pub fn champions_total() {
    metrics::counter!("champions_total").increment(1);
}

/// Count matches cancelled with their tournament.
pub fn matches_cancelled_total(count: u64) {
    metrics::counter!("matches_cancelled_total").increment(count);
}

/// Count slots written by an advancement rebuild.
pub fn advancement_repairs_total(count: usize) {
    metrics::counter!("advancement_repairs_total").increment(count as u64);
}

// ============================================================================
// Registration Metrics
// ============================================================================

/// Count a registration attempt by outcome.
pub fn registrations_total(accepted: bool) {
    metrics::counter!("registrations_total",
        "accepted" => accepted.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_exporter_is_noop() {
        http_requests_total("GET", "/health", 200);
        http_request_duration_ms("GET", "/health", 1.5);
        brackets_generated_total(5, 1);
        results_reported_total(2);
        champions_total();
        matches_cancelled_total(3);
        advancement_repairs_total(0);
        registrations_total(false);
    }
}
