//! Normalize phase metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct NormalizeMetrics;

impl NormalizeMetrics {
    pub fn record_batch(records: usize, uncategorized: usize) {
        ::metrics::counter!(phase_metric!(counter, "normalize", "records")).increment(records as u64);
        ::metrics::counter!(phase_metric!(counter, "normalize", "uncategorized"))
            .increment(uncategorized as u64);
    }

    pub fn slug_disambiguated() {
        ::metrics::counter!(phase_metric!(counter, "normalize", "slug_collisions")).increment(1);
    }
}

impl PhaseMetrics for NormalizeMetrics {
    fn phase_name() -> &'static str {
        "normalize"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "normalize", "records"),
                metric_type: MetricType::Counter,
                help: "Clinic records produced",
            },
            MetricDoc {
                name: phase_metric!(counter, "normalize", "uncategorized"),
                metric_type: MetricType::Counter,
                help: "Records that fell back to the uncategorized community",
            },
            MetricDoc {
                name: phase_metric!(counter, "normalize", "slug_collisions"),
                metric_type: MetricType::Counter,
                help: "Slugs that needed a numeric suffix to stay unique",
            },
        ]
    }
}
