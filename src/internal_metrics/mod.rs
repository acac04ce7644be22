//! # Internal Metrics Module
//!
//! Registers the application's metric descriptions and installs the
//! Prometheus recorder. The rendered output is served by the API server at
//! `/metrics`.
//!
//! Metrics are recorded at the call site with the `metrics` macros; when no
//! recorder is installed those calls are no-ops.

use crate::config::MetricsConfig;
use metrics::Unit;
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use tracing::{error, info};

const DURATION_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Registers descriptions for every metric receiverd emits.
pub fn describe_metrics() {
    metrics::describe_counter!(
        "notifications_dispatched_total",
        Unit::Count,
        "Total number of notification dispatches, labeled by receiver type and outcome."
    );
    metrics::describe_histogram!(
        "notification_dispatch_duration_seconds",
        Unit::Seconds,
        "Time taken to deliver a notification, from notifier selection to platform response."
    );
    metrics::describe_counter!(
        "receivers_written_total",
        Unit::Count,
        "Total number of receiver writes, labeled by operation (create, update, delete)."
    );
}

/// Builder for the metrics system.
pub struct MetricsBuilder {
    config: MetricsConfig,
}

impl MetricsBuilder {
    pub fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    /// Installs the Prometheus recorder as the global recorder.
    ///
    /// Returns `None` if metrics are disabled or the recorder could not be
    /// installed; the service keeps running without `/metrics` in that case.
    pub fn build(self) -> Option<PrometheusHandle> {
        if !self.config.enabled {
            info!("Metrics disabled.");
            return None;
        }

        match Self::install() {
            Ok(handle) => {
                describe_metrics();
                Some(handle)
            }
            Err(e) => {
                error!(error = %e, "Failed to install Prometheus recorder");
                None
            }
        }
    }

    fn install() -> Result<PrometheusHandle, BuildError> {
        PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                DURATION_BUCKETS,
            )?
            .install_recorder()
    }
}
