// metrics/mod.rs
use crate::commands::Action;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

pub const COMMANDS_TOTAL: &str = "irusb_commands_total";

pub fn setup_metrics(port: u16) -> Result<(), BuildError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
}

/// No-op until a recorder is installed.
pub fn record_command(action: Action, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    metrics::counter!(COMMANDS_TOTAL, "action" => action.name(), "outcome" => outcome).increment(1);
}
