//! Statistics snapshots exchanged with worker processes, and the merged
//! fleet-wide views the aggregation produces.
//!
//! Snapshot structs are value objects: a worker produces one fresh per query,
//! the coordinator merges and never mutates them afterwards. Every histogram
//! field is an opaque compressed payload (see [`crate::histogram`]); the
//! merged views hold live decoded histograms instead.

use std::collections::HashMap;
use std::fmt;

use hdrhistogram::Histogram;
use serde::{Deserialize, Serialize};

use crate::histogram::{
    self, END_TO_END_LATENCY_MAX_MICROS, PUBLISH_DELAY_LATENCY_MAX_MICROS,
    PUBLISH_LATENCY_MAX_MICROS,
};
use crate::metrics::MetricsSource;

/// Per-worker snapshot covering the last sampling period.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodStats {
    pub messages_sent: u64,
    pub bytes_sent: u64,
    pub messages_received: u64,
    pub bytes_received: u64,
    pub total_messages_sent: u64,
    pub total_messages_received: u64,
    /// Wall-clock length of the worker's sampling window
    pub elapsed_millis: u64,
    pub publish_errors: u64,
    pub consumer_errors: u64,
    #[serde(with = "crate::b64")]
    pub publish_latency: Vec<u8>,
    #[serde(with = "crate::b64")]
    pub publish_delay_latency: Vec<u8>,
    #[serde(with = "crate::b64")]
    pub end_to_end_latency: Vec<u8>,
}

/// Per-worker publish-latency snapshot taken outside the periodic cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OnDemandStats {
    #[serde(with = "crate::b64")]
    pub publish_latency: Vec<u8>,
}

/// Per-worker latency distributions accumulated since the last reset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CumulativeLatencies {
    #[serde(with = "crate::b64")]
    pub publish_latency: Vec<u8>,
    #[serde(with = "crate::b64")]
    pub publish_delay_latency: Vec<u8>,
    #[serde(with = "crate::b64")]
    pub end_to_end_latency: Vec<u8>,
}

/// Per-worker counter snapshot, including backend-defined auxiliary metrics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CountersStats {
    pub messages_sent: u64,
    pub messages_received: u64,
    pub elapsed_millis: u64,
    pub publish_errors: u64,
    pub consumer_errors: u64,
    /// Producer instances currently running on the worker
    pub producers: u64,
    /// Consumer instances currently running on the worker
    pub consumers: u64,
    pub additional_metrics: HashMap<String, f64>,
}

impl MetricsSource for CountersStats {
    fn metrics(&self) -> Box<dyn Iterator<Item = (&str, f64)> + '_> {
        Box::new(
            self.additional_metrics
                .iter()
                .map(|(name, value)| (name.as_str(), *value)),
        )
    }
}

/// Fleet-wide period view: counters summed, elapsed time averaged, latency
/// distributions unioned across all workers.
pub struct MergedPeriodStats {
    pub messages_sent: u64,
    pub bytes_sent: u64,
    pub messages_received: u64,
    pub bytes_received: u64,
    pub total_messages_sent: u64,
    pub total_messages_received: u64,
    pub elapsed_millis: u64,
    pub publish_errors: u64,
    pub consumer_errors: u64,
    pub publish_latency: Histogram<u64>,
    pub publish_delay_latency: Histogram<u64>,
    pub end_to_end_latency: Histogram<u64>,
}

impl fmt::Debug for MergedPeriodStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergedPeriodStats")
            .field("messages_sent", &self.messages_sent)
            .field("bytes_sent", &self.bytes_sent)
            .field("messages_received", &self.messages_received)
            .field("bytes_received", &self.bytes_received)
            .field("total_messages_sent", &self.total_messages_sent)
            .field("total_messages_received", &self.total_messages_received)
            .field("elapsed_millis", &self.elapsed_millis)
            .field("publish_errors", &self.publish_errors)
            .field("consumer_errors", &self.consumer_errors)
            .field("publish_latency_samples", &self.publish_latency.len())
            .field(
                "publish_delay_latency_samples",
                &self.publish_delay_latency.len(),
            )
            .field("end_to_end_latency_samples", &self.end_to_end_latency.len())
            .finish()
    }
}

impl MergedPeriodStats {
    pub fn empty() -> histogram::Result<Self> {
        Ok(MergedPeriodStats {
            messages_sent: 0,
            bytes_sent: 0,
            messages_received: 0,
            bytes_received: 0,
            total_messages_sent: 0,
            total_messages_received: 0,
            elapsed_millis: 0,
            publish_errors: 0,
            consumer_errors: 0,
            publish_latency: histogram::empty(PUBLISH_LATENCY_MAX_MICROS)?,
            publish_delay_latency: histogram::empty(PUBLISH_DELAY_LATENCY_MAX_MICROS)?,
            end_to_end_latency: histogram::empty(END_TO_END_LATENCY_MAX_MICROS)?,
        })
    }
}

/// Fleet-wide on-demand view.
pub struct MergedOnDemandStats {
    pub publish_latency: Histogram<u64>,
}

impl fmt::Debug for MergedOnDemandStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergedOnDemandStats")
            .field("publish_latency_samples", &self.publish_latency.len())
            .finish()
    }
}

impl MergedOnDemandStats {
    pub fn empty() -> histogram::Result<Self> {
        Ok(MergedOnDemandStats {
            publish_latency: histogram::empty(PUBLISH_LATENCY_MAX_MICROS)?,
        })
    }
}

/// Fleet-wide cumulative latency view.
pub struct MergedCumulativeLatencies {
    pub publish_latency: Histogram<u64>,
    pub publish_delay_latency: Histogram<u64>,
    pub end_to_end_latency: Histogram<u64>,
}

impl fmt::Debug for MergedCumulativeLatencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergedCumulativeLatencies")
            .field("publish_latency_samples", &self.publish_latency.len())
            .field(
                "publish_delay_latency_samples",
                &self.publish_delay_latency.len(),
            )
            .field("end_to_end_latency_samples", &self.end_to_end_latency.len())
            .finish()
    }
}

impl MergedCumulativeLatencies {
    pub fn empty() -> histogram::Result<Self> {
        Ok(MergedCumulativeLatencies {
            publish_latency: histogram::empty(PUBLISH_LATENCY_MAX_MICROS)?,
            publish_delay_latency: histogram::empty(PUBLISH_DELAY_LATENCY_MAX_MICROS)?,
            end_to_end_latency: histogram::empty(END_TO_END_LATENCY_MAX_MICROS)?,
        })
    }
}

/// Fleet-wide counter view, with auxiliary metrics folded by the configured
/// combiner.
#[derive(Debug, Clone, Default)]
pub struct MergedCountersStats {
    pub messages_sent: u64,
    pub messages_received: u64,
    pub elapsed_millis: u64,
    pub publish_errors: u64,
    pub consumer_errors: u64,
    pub producers: u64,
    pub consumers: u64,
    pub additional_metrics: HashMap<String, f64>,
}
