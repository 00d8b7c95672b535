//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dispatch_handlers_registered_total` (counter): registrations by kind
//! - `dispatch_handlers_invoked_total` (counter): invocations by route, kind
//! - `dispatch_exhausted_total` (counter): chains that reached their end, by outcome

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::dispatch::{DispatchEvent, Observer};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Dispatcher observer that records counters.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsObserver;

impl Observer for MetricsObserver {
    fn notify(&self, event: &DispatchEvent<'_>) {
        match event {
            DispatchEvent::Registered { kind, .. } => {
                metrics::counter!("dispatch_handlers_registered_total", "kind" => kind.as_str())
                    .increment(1);
            }
            DispatchEvent::Invoked { route, kind } => {
                let route = if route.is_empty() { "/" } else { *route };
                metrics::counter!(
                    "dispatch_handlers_invoked_total",
                    "route" => route.to_string(),
                    "kind" => kind.as_str()
                )
                .increment(1);
            }
            DispatchEvent::Exhausted { error } => {
                let outcome = if error.is_some() { "error" } else { "unhandled" };
                metrics::counter!("dispatch_exhausted_total", "outcome" => outcome).increment(1);
            }
        }
    }
}
