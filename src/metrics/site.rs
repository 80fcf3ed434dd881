//! Site generation metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub const GENERATE_DURATION: &str = phase_metric!(histogram, "site", "generate_duration_seconds");

pub struct SiteMetrics;

impl SiteMetrics {
    pub fn page_written(bytes: usize) {
        ::metrics::counter!(phase_metric!(counter, "site", "pages_written")).increment(1);
        ::metrics::counter!(phase_metric!(counter, "site", "bytes_written")).increment(bytes as u64);
    }
}

impl PhaseMetrics for SiteMetrics {
    fn phase_name() -> &'static str {
        "site"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "site", "pages_written"),
                metric_type: MetricType::Counter,
                help: "Files written to the output directory",
            },
            MetricDoc {
                name: phase_metric!(counter, "site", "bytes_written"),
                metric_type: MetricType::Counter,
                help: "Bytes written to the output directory",
            },
            MetricDoc {
                name: GENERATE_DURATION,
                metric_type: MetricType::Histogram,
                help: "Wall time of a full site generation",
            },
        ]
    }
}
