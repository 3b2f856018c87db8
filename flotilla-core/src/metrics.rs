//! Seam through which backend-defined auxiliary metrics reach the fleet-wide
//! aggregation.
//!
//! Workers report an open-ended map of named numeric metrics alongside the
//! fixed counters. The coordinator does not interpret these; it only
//! guarantees that every per-worker source is handed to the configured
//! combiner without loss. The merge policy itself (sum, last-write-wins,
//! anything else) belongs to the combiner implementation.

use std::collections::HashMap;

/// A producer of auxiliary, backend-defined numeric metrics.
pub trait MetricsSource {
    /// Yields (metric name, value) pairs lazily, in no particular order.
    fn metrics(&self) -> Box<dyn Iterator<Item = (&str, f64)> + '_>;
}

/// Folds per-worker auxiliary metrics into one fleet-wide map.
pub trait MetricsCombiner: Send + Sync {
    fn combine(&self, sources: &[&dyn MetricsSource]) -> HashMap<String, f64>;
}

/// Reference policy: values reported under the same name are summed across
/// workers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SumCombiner;

impl MetricsCombiner for SumCombiner {
    fn combine(&self, sources: &[&dyn MetricsSource]) -> HashMap<String, f64> {
        let mut merged = HashMap::new();
        for source in sources {
            for (name, value) in source.metrics() {
                *merged.entry(name.to_string()).or_insert(0.0) += value;
            }
        }
        merged
    }
}
