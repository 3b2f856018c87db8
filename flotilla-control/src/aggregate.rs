//! Statistics merging: pure reductions from per-worker snapshots to one
//! fleet-wide snapshot.
//!
//! Scalar counters are summed. Elapsed-time fields are averaged across the
//! fleet: each worker measures the same nominal wall-clock window
//! independently, and the mean weights them fairly without trying to
//! coordinate the sampling windows. Histogram fields are decoded per worker
//! at the field's fixed trackable bound and unioned; a single decode failure
//! aborts the whole merge with the field and worker named, since it signals a
//! protocol mismatch rather than a data blip.

use hdrhistogram::Histogram;

use flotilla_core::histogram::{
    self, END_TO_END_LATENCY_MAX_MICROS, PUBLISH_DELAY_LATENCY_MAX_MICROS,
    PUBLISH_LATENCY_MAX_MICROS,
};
use flotilla_core::metrics::{MetricsCombiner, MetricsSource};
use flotilla_core::stats::{
    CountersStats, CumulativeLatencies, MergedCountersStats, MergedCumulativeLatencies,
    MergedOnDemandStats, MergedPeriodStats, OnDemandStats, PeriodStats,
};

use crate::errors::{ControlError, Result};
use crate::rpc::WorkerEndpoint;

pub fn merge_period_stats(
    workers: &[WorkerEndpoint],
    snapshots: &[PeriodStats],
) -> Result<MergedPeriodStats> {
    let mut merged = MergedPeriodStats::empty().map_err(allocation)?;

    let mut elapsed_total = 0u64;
    for (worker, stats) in workers.iter().zip(snapshots) {
        merged.messages_sent += stats.messages_sent;
        merged.bytes_sent += stats.bytes_sent;
        merged.messages_received += stats.messages_received;
        merged.bytes_received += stats.bytes_received;
        merged.total_messages_sent += stats.total_messages_sent;
        merged.total_messages_received += stats.total_messages_received;
        merged.publish_errors += stats.publish_errors;
        merged.consumer_errors += stats.consumer_errors;
        elapsed_total += stats.elapsed_millis;

        union_field(
            &mut merged.publish_latency,
            &stats.publish_latency,
            PUBLISH_LATENCY_MAX_MICROS,
            "publish latency",
            worker,
        )?;
        union_field(
            &mut merged.publish_delay_latency,
            &stats.publish_delay_latency,
            PUBLISH_DELAY_LATENCY_MAX_MICROS,
            "publish delay latency",
            worker,
        )?;
        union_field(
            &mut merged.end_to_end_latency,
            &stats.end_to_end_latency,
            END_TO_END_LATENCY_MAX_MICROS,
            "end-to-end latency",
            worker,
        )?;
    }
    merged.elapsed_millis = mean_millis(elapsed_total, snapshots.len());

    Ok(merged)
}

pub fn merge_on_demand_stats(
    workers: &[WorkerEndpoint],
    snapshots: &[OnDemandStats],
) -> Result<MergedOnDemandStats> {
    let mut merged = MergedOnDemandStats::empty().map_err(allocation)?;

    for (worker, stats) in workers.iter().zip(snapshots) {
        union_field(
            &mut merged.publish_latency,
            &stats.publish_latency,
            PUBLISH_LATENCY_MAX_MICROS,
            "publish latency",
            worker,
        )?;
    }

    Ok(merged)
}

pub fn merge_cumulative_latencies(
    workers: &[WorkerEndpoint],
    snapshots: &[CumulativeLatencies],
) -> Result<MergedCumulativeLatencies> {
    let mut merged = MergedCumulativeLatencies::empty().map_err(allocation)?;

    for (worker, stats) in workers.iter().zip(snapshots) {
        union_field(
            &mut merged.publish_latency,
            &stats.publish_latency,
            PUBLISH_LATENCY_MAX_MICROS,
            "publish latency",
            worker,
        )?;
        union_field(
            &mut merged.publish_delay_latency,
            &stats.publish_delay_latency,
            PUBLISH_DELAY_LATENCY_MAX_MICROS,
            "publish delay latency",
            worker,
        )?;
        union_field(
            &mut merged.end_to_end_latency,
            &stats.end_to_end_latency,
            END_TO_END_LATENCY_MAX_MICROS,
            "end-to-end latency",
            worker,
        )?;
    }

    Ok(merged)
}

/// Counter merge has no histograms and cannot fail; auxiliary metrics from
/// every worker are handed to the combiner without loss.
pub fn merge_counters_stats(
    snapshots: &[CountersStats],
    combiner: &dyn MetricsCombiner,
) -> MergedCountersStats {
    let mut merged = MergedCountersStats::default();

    let mut elapsed_total = 0u64;
    for stats in snapshots {
        merged.messages_sent += stats.messages_sent;
        merged.messages_received += stats.messages_received;
        merged.publish_errors += stats.publish_errors;
        merged.consumer_errors += stats.consumer_errors;
        merged.producers += stats.producers;
        merged.consumers += stats.consumers;
        elapsed_total += stats.elapsed_millis;
    }
    merged.elapsed_millis = mean_millis(elapsed_total, snapshots.len());

    let sources: Vec<&dyn MetricsSource> = snapshots
        .iter()
        .map(|stats| stats as &dyn MetricsSource)
        .collect();
    merged.additional_metrics = combiner.combine(&sources);

    merged
}

fn union_field(
    into: &mut Histogram<u64>,
    payload: &[u8],
    max_micros: u64,
    field: &'static str,
    worker: &WorkerEndpoint,
) -> Result<()> {
    histogram::decode_into(into, payload, max_micros).map_err(|source| {
        ControlError::HistogramDecode {
            field,
            worker: worker.to_string(),
            source,
        }
    })
}

fn mean_millis(total: u64, count: usize) -> u64 {
    if count == 0 {
        0
    } else {
        total / count as u64
    }
}

fn allocation(error: flotilla_core::HistogramCodecError) -> ControlError {
    ControlError::Unrecoverable(format!("histogram allocation failed: {error}"))
}
