//! Metrics for the directory build, one submodule per phase
//!
//! Recording is cheap and safe before `init_metrics` runs: without an installed
//! recorder the `metrics` macros are no-ops.

pub mod core;
pub mod enrich;
pub mod normalize;
pub mod parser;
pub mod site;

pub use self::core::{time_operation, TimingGuard};
pub use enrich::EnrichMetrics;
pub use normalize::NormalizeMetrics;
pub use parser::ParseMetrics;
pub use site::SiteMetrics;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::{Once, OnceLock};
use tracing::{debug, warn};

static INIT: Once = Once::new();
static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder and describe every phase metric. Idempotent.
pub fn init_metrics() {
    INIT.call_once(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if HANDLE.set(handle).is_err() {
                warn!("Metrics handle was already set");
            }
            ParseMetrics::register_metrics();
            NormalizeMetrics::register_metrics();
            EnrichMetrics::register_metrics();
            SiteMetrics::register_metrics();
            debug!("Prometheus recorder installed");
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
        }
    });
}

/// Render everything recorded so far in the Prometheus text format
pub fn render_snapshot() -> Option<String> {
    HANDLE.get().map(|handle| handle.render())
}

/// Implemented by each phase's metrics collection
pub trait PhaseMetrics {
    /// Describe the phase's metrics to the installed recorder
    fn register_metrics() {
        for doc in Self::metrics_documentation() {
            match doc.metric_type {
                MetricType::Counter => ::metrics::describe_counter!(doc.name, doc.help),
                MetricType::Histogram => ::metrics::describe_histogram!(doc.name, doc.help),
            }
        }
        debug!("Described {} phase metrics", Self::phase_name());
    }

    fn phase_name() -> &'static str;

    fn metrics_documentation() -> Vec<MetricDoc>;
}

#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Histogram,
}

/// Builds `clinic_{phase}_{name}[_total]` at compile time
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("clinic_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("clinic_", $phase, "_", $name)
    };
}

pub(crate) use phase_metric;
