//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lottery_reads_total` (counter): projection reads by projection, outcome
//! - `lottery_writes_total` (counter): transactions by action, outcome
//! - `lottery_stale_responses_total` (counter): responses dropped as superseded
//! - `lottery_contract_balance_wei` (gauge): last applied contract balance
//! - `lottery_rpc_healthy` (gauge): 1=reachable, 0=unreachable
//!
//! Without an installed recorder every call is a no-op.

use alloy::primitives::U256;
use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

fn outcome(ok: bool) -> &'static str {
    if ok { "ok" } else { "error" }
}

/// Install the Prometheus exporter on `addr`. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_read(projection: &'static str, ok: bool) {
    counter!("lottery_reads_total", "projection" => projection, "outcome" => outcome(ok)).increment(1);
}

pub fn record_write(action: &'static str, ok: bool) {
    counter!("lottery_writes_total", "action" => action, "outcome" => outcome(ok)).increment(1);
}

pub fn record_stale_response(projection: &'static str) {
    counter!("lottery_stale_responses_total", "projection" => projection).increment(1);
}

pub fn record_contract_balance(wei: U256) {
    // Precision loss above 2^53 wei is acceptable for a gauge
    let value = u128::try_from(wei).map(|v| v as f64).unwrap_or(f64::MAX);
    gauge!("lottery_contract_balance_wei").set(value);
}

pub fn record_rpc_health(healthy: bool) {
    gauge!("lottery_rpc_healthy").set(if healthy { 1.0 } else { 0.0 });
}
