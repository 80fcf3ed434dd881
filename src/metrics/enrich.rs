//! Rating enrichment metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct EnrichMetrics;

impl EnrichMetrics {
    pub fn lookup_found(duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "enrich", "lookups_found")).increment(1);
        ::metrics::histogram!(phase_metric!(histogram, "enrich", "lookup_duration_seconds"))
            .record(duration_secs);
    }

    pub fn lookup_empty() {
        ::metrics::counter!(phase_metric!(counter, "enrich", "lookups_empty")).increment(1);
    }

    pub fn lookup_failed() {
        ::metrics::counter!(phase_metric!(counter, "enrich", "lookups_failed")).increment(1);
    }

    pub fn lookup_timed_out() {
        ::metrics::counter!(phase_metric!(counter, "enrich", "lookups_timed_out")).increment(1);
    }
}

impl PhaseMetrics for EnrichMetrics {
    fn phase_name() -> &'static str {
        "enrich"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "enrich", "lookups_found"),
                metric_type: MetricType::Counter,
                help: "Rating lookups that returned a rating",
            },
            MetricDoc {
                name: phase_metric!(counter, "enrich", "lookups_empty"),
                metric_type: MetricType::Counter,
                help: "Rating lookups that returned no data",
            },
            MetricDoc {
                name: phase_metric!(counter, "enrich", "lookups_failed"),
                metric_type: MetricType::Counter,
                help: "Rating lookups that errored",
            },
            MetricDoc {
                name: phase_metric!(counter, "enrich", "lookups_timed_out"),
                metric_type: MetricType::Counter,
                help: "Rating lookups abandoned after the timeout",
            },
            MetricDoc {
                name: phase_metric!(histogram, "enrich", "lookup_duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Duration of successful rating lookups",
            },
        ]
    }
}
