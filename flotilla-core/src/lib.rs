//! # Flotilla Core
//!
//! Wire-protocol surface shared by the Flotilla control process and any worker
//! implementation.
//!
//! ## Contents
//!
//! - **Commands**: the payloads the control process posts to worker processes
//!   (topic specs, producer/consumer assignments, load parameters)
//! - **Stats**: the per-worker statistics snapshots returned by the query
//!   endpoints, plus the merged fleet-wide views
//! - **Histogram codec**: encode/decode of compressed latency histograms with
//!   fixed trackable-value bounds per latency field
//! - **Metrics seam**: traits through which backend-defined auxiliary metrics
//!   flow from workers into the fleet-wide aggregation
//!
//! All wire types decode schema-tolerantly: unknown fields are ignored and
//! unrecognized enum tags fall back to a default, so control-process and
//! worker versions may differ.

mod b64;
pub mod commands;
pub mod histogram;
pub mod metrics;
pub mod stats;

pub use commands::{
    paths, ConsumerAssignment, KeyDistributorType, PayloadBlob, ProducerWorkAssignment,
    TopicSubscription, TopicsSpec,
};
pub use histogram::HistogramCodecError;
pub use metrics::{MetricsCombiner, MetricsSource, SumCombiner};
pub use stats::{
    CountersStats, CumulativeLatencies, MergedCountersStats, MergedCumulativeLatencies,
    MergedOnDemandStats, MergedPeriodStats, OnDemandStats, PeriodStats,
};
