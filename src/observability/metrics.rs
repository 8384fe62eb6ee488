//! Metrics collection.
//!
//! # Metrics
//! - `eth_connector_rpc_requests_total` (counter): RPC calls by method, outcome
//! - `eth_connector_transactions_total` (counter): submissions by kind, outcome
//! - `eth_connector_receipt_wait_seconds` (histogram): time spent waiting for inclusion
//!
//! The library records through the `metrics` facade only; installing an
//! exporter is up to the embedding application.

use std::time::Duration;

fn outcome(ok: bool) -> &'static str {
    if ok {
        "success"
    } else {
        "failure"
    }
}

/// Record one JSON-RPC round trip.
pub fn record_rpc(method: &'static str, ok: bool) {
    metrics::counter!(
        "eth_connector_rpc_requests_total",
        "method" => method,
        "outcome" => outcome(ok)
    )
    .increment(1);
}

/// Record a transaction submission (`transfer`, `call` or `deploy`).
pub fn record_transaction(kind: &'static str, ok: bool) {
    metrics::counter!(
        "eth_connector_transactions_total",
        "kind" => kind,
        "outcome" => outcome(ok)
    )
    .increment(1);
}

/// Record how long a receipt wait lasted.
pub fn record_receipt_wait(elapsed: Duration) {
    metrics::histogram!("eth_connector_receipt_wait_seconds").record(elapsed.as_secs_f64());
}
