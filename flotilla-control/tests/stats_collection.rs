//! Fleet-wide statistics queries: merging counters, averaged elapsed times
//! and compressed latency histograms collected from fake workers.

mod common;

use flotilla_control::{ControlError, EnsembleConfig, Worker, WorkerEnsemble};
use flotilla_core::histogram::{
    self, END_TO_END_LATENCY_MAX_MICROS, LATENCY_SIGFIGS, PUBLISH_DELAY_LATENCY_MAX_MICROS,
    PUBLISH_LATENCY_MAX_MICROS,
};
use flotilla_core::stats::{CumulativeLatencies, OnDemandStats, PeriodStats};
use hdrhistogram::Histogram;

use common::{fleet_urls, spawn_worker, FakeWorker, WorkerBehavior};

fn encoded(values: &[u64], max_micros: u64) -> Vec<u8> {
    let mut hist = histogram::empty(max_micros).expect("bounded histogram");
    for value in values {
        hist.record(*value).expect("record");
    }
    histogram::encode(&hist).expect("encode")
}

fn period_snapshot(
    sent: u64,
    received: u64,
    elapsed_millis: u64,
    publish_micros: &[u64],
) -> PeriodStats {
    PeriodStats {
        messages_sent: sent,
        bytes_sent: sent * 1024,
        messages_received: received,
        bytes_received: received * 1024,
        total_messages_sent: sent,
        total_messages_received: received,
        elapsed_millis,
        publish_latency: encoded(publish_micros, PUBLISH_LATENCY_MAX_MICROS),
        publish_delay_latency: encoded(&[250], PUBLISH_DELAY_LATENCY_MAX_MICROS),
        end_to_end_latency: encoded(&[5_000], END_TO_END_LATENCY_MAX_MICROS),
        ..Default::default()
    }
}

fn ensemble_for(workers: &[FakeWorker]) -> WorkerEnsemble {
    common::init_tracing();
    let config = EnsembleConfig {
        workers: fleet_urls(workers),
        extra_consumer_workers: false,
        request_timeout_ms: 5_000,
    };
    WorkerEnsemble::new(config).expect("ensemble")
}

#[tokio::test]
async fn period_stats_sum_counters_average_elapsed_and_union_histograms() {
    let workers = vec![
        spawn_worker(WorkerBehavior::ok().with_json(
            "/period-stats",
            &period_snapshot(100, 90, 1_000, &[500, 1_500]),
        ))
        .await,
        spawn_worker(WorkerBehavior::ok().with_json(
            "/period-stats",
            &period_snapshot(50, 45, 3_000, &[1_000]),
        ))
        .await,
    ];
    let ensemble = ensemble_for(&workers);

    let merged = ensemble.period_stats().await.expect("period stats");

    assert_eq!(merged.messages_sent, 150);
    assert_eq!(merged.messages_received, 135);
    assert_eq!(merged.elapsed_millis, 2_000);
    assert_eq!(merged.publish_latency.len(), 3);
    assert_eq!(merged.publish_delay_latency.len(), 2);
    assert_eq!(merged.end_to_end_latency.len(), 2);
    assert!(merged.publish_latency.value_at_quantile(1.0) >= 1_500);
}

#[tokio::test]
async fn on_demand_and_cumulative_queries_merge_their_field_subsets() {
    let on_demand_a = OnDemandStats {
        publish_latency: encoded(&[100, 300], PUBLISH_LATENCY_MAX_MICROS),
    };
    let on_demand_b = OnDemandStats {
        publish_latency: encoded(&[200], PUBLISH_LATENCY_MAX_MICROS),
    };
    let cumulative = CumulativeLatencies {
        publish_latency: encoded(&[400], PUBLISH_LATENCY_MAX_MICROS),
        publish_delay_latency: encoded(&[40], PUBLISH_DELAY_LATENCY_MAX_MICROS),
        end_to_end_latency: encoded(&[4_000], END_TO_END_LATENCY_MAX_MICROS),
    };

    let workers = vec![
        spawn_worker(
            WorkerBehavior::ok()
                .with_json("/ondemand-stats", &on_demand_a)
                .with_json("/cumulative-latencies", &cumulative),
        )
        .await,
        spawn_worker(
            WorkerBehavior::ok()
                .with_json("/ondemand-stats", &on_demand_b)
                .with_json("/cumulative-latencies", &cumulative),
        )
        .await,
    ];
    let ensemble = ensemble_for(&workers);

    let on_demand = ensemble.on_demand_stats().await.expect("on-demand");
    assert_eq!(on_demand.publish_latency.len(), 3);

    let latencies = ensemble
        .cumulative_latencies()
        .await
        .expect("cumulative latencies");
    assert_eq!(latencies.publish_latency.len(), 2);
    assert_eq!(latencies.publish_delay_latency.len(), 2);
    assert_eq!(latencies.end_to_end_latency.len(), 2);
}

#[tokio::test]
async fn bound_incompatible_histogram_fails_the_query_and_names_the_worker() {
    // The second worker ships a publish-latency payload recorded beyond the
    // 60s publish bound, as if it were built against a different protocol
    // version.
    let mut oversized = Histogram::<u64>::new(LATENCY_SIGFIGS).expect("histogram");
    oversized.record(90 * 1_000_000).expect("record");
    let mut bad = period_snapshot(1, 1, 1_000, &[100]);
    bad.publish_latency = histogram::encode(&oversized).expect("encode");

    let workers = vec![
        spawn_worker(
            WorkerBehavior::ok().with_json("/period-stats", &period_snapshot(1, 1, 1_000, &[100])),
        )
        .await,
        spawn_worker(WorkerBehavior::ok().with_json("/period-stats", &bad)).await,
    ];
    let ensemble = ensemble_for(&workers);

    let result = ensemble.period_stats().await;

    match result {
        Err(ControlError::HistogramDecode { field, worker, .. }) => {
            assert_eq!(field, "publish latency");
            assert_eq!(worker, workers[1].base_url);
        }
        other => panic!("expected HistogramDecode, got {other:?}"),
    }
}
