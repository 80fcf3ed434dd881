//! Parse phase metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct ParseMetrics;

impl ParseMetrics {
    pub fn record_rows(kept: usize, dropped: usize) {
        ::metrics::counter!(phase_metric!(counter, "parse", "rows")).increment(kept as u64);
        ::metrics::counter!(phase_metric!(counter, "parse", "rows_dropped"))
            .increment(dropped as u64);
    }

    pub fn record_source_bytes(bytes: usize) {
        ::metrics::histogram!(phase_metric!(histogram, "parse", "source_bytes")).record(bytes as f64);
    }
}

impl PhaseMetrics for ParseMetrics {
    fn phase_name() -> &'static str {
        "parse"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "parse", "rows"),
                metric_type: MetricType::Counter,
                help: "Data rows kept after parsing",
            },
            MetricDoc {
                name: phase_metric!(counter, "parse", "rows_dropped"),
                metric_type: MetricType::Counter,
                help: "Data rows dropped because the name column was empty",
            },
            MetricDoc {
                name: phase_metric!(histogram, "parse", "source_bytes"),
                metric_type: MetricType::Histogram,
                help: "Size of the source text in bytes",
            },
        ]
    }
}
