use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::{debug, info};

use flotilla_core::commands::{paths, ConsumerAssignment, ProducerWorkAssignment, TopicsSpec};
use flotilla_core::metrics::{MetricsCombiner, SumCombiner};
use flotilla_core::stats::{
    CountersStats, CumulativeLatencies, MergedCountersStats, MergedCumulativeLatencies,
    MergedOnDemandStats, MergedPeriodStats, OnDemandStats, PeriodStats,
};

use crate::aggregate;
use crate::config::EnsembleConfig;
use crate::dispatcher;
use crate::errors::{ControlError, Result};
use crate::partition::{assign_work, per_worker_rate};
use crate::roles::RoleGroups;
use crate::rpc::{WorkerClient, WorkerEndpoint};
use crate::worker::Worker;

/// Composition root: drives a fleet of remote worker processes as one
/// [`Worker`].
///
/// The fleet is split into a producer and a consumer role group at
/// construction; commands fan out concurrently to the relevant group and
/// queries merge every member's snapshot into one fleet-wide view. All
/// operations take `&self` so statistics queries may interleave with an
/// in-progress load phase, but the lifecycle itself (initialize, create,
/// load, stop) is expected to be driven by a single logical caller.
pub struct WorkerEnsemble {
    fleet: Vec<WorkerEndpoint>,
    producer_workers: Vec<WorkerEndpoint>,
    consumer_workers: Vec<WorkerEndpoint>,
    client: WorkerClient,
    /// Producers that received a non-empty topic assignment; rate division
    /// uses this, not the configured group size.
    used_producer_workers: AtomicUsize,
    metrics_combiner: Box<dyn MetricsCombiner>,
}

impl WorkerEnsemble {
    pub fn new(config: EnsembleConfig) -> Result<Self> {
        let fleet: Vec<WorkerEndpoint> = config
            .workers
            .iter()
            .map(|url| WorkerEndpoint::new(url.as_str()))
            .collect();
        let roles = RoleGroups::assign(&fleet, config.extra_consumer_workers)?;
        let client = WorkerClient::new(config.request_timeout())?;

        Ok(WorkerEnsemble {
            fleet,
            producer_workers: roles.producers,
            consumer_workers: roles.consumers,
            client,
            used_producer_workers: AtomicUsize::new(0),
            metrics_combiner: Box::new(SumCombiner),
        })
    }

    /// Replaces the auxiliary-metrics merge policy.
    pub fn with_metrics_combiner(
        mut self,
        combiner: impl MetricsCombiner + 'static,
    ) -> Self {
        self.metrics_combiner = Box::new(combiner);
        self
    }

    pub fn fleet(&self) -> &[WorkerEndpoint] {
        &self.fleet
    }

    pub fn producer_workers(&self) -> &[WorkerEndpoint] {
        &self.producer_workers
    }

    pub fn consumer_workers(&self) -> &[WorkerEndpoint] {
        &self.consumer_workers
    }

    /// Releases the shared transport pool. Taking the ensemble by value
    /// guarantees no fleet operation is still borrowing it, so in-flight
    /// calls have already completed or failed by the time the pool is torn
    /// down, and the release happens exactly once on every exit path.
    pub fn shutdown(self) {
        info!("Shutting down worker ensemble");
    }

    fn topic_creation_worker(&self) -> &WorkerEndpoint {
        // Topic creation is not fanned out; the first fleet member does it.
        &self.fleet[0]
    }

    fn divided_rate(&self, aggregate_rate: f64) -> Result<f64> {
        let used = self.used_producer_workers.load(Ordering::Acquire);
        if used == 0 {
            return Err(ControlError::Configuration(
                "no producer worker holds a topic assignment; create producers before starting load"
                    .to_string(),
            ));
        }
        Ok(per_worker_rate(aggregate_rate, used))
    }
}

#[async_trait]
impl Worker for WorkerEnsemble {
    async fn initialize_driver(&self, driver_config: &[u8]) -> Result<()> {
        dispatcher::broadcast_blob(
            &self.client,
            &self.fleet,
            paths::INITIALIZE_DRIVER,
            driver_config,
        )
        .await
    }

    async fn create_topics(&self, spec: TopicsSpec) -> Result<Vec<String>> {
        self.client
            .post_json_expect(self.topic_creation_worker(), paths::CREATE_TOPICS, &spec)
            .await
    }

    async fn create_producers(&self, topics: Vec<String>) -> Result<()> {
        let assignments = assign_work(&self.producer_workers, topics);
        self.used_producer_workers
            .store(assignments.len(), Ordering::Release);

        info!(
            "Number of producer workers with assigned topics: {}",
            assignments.len()
        );
        for (worker, topics) in &assignments {
            debug!("Producer assignment {} => {:?}", worker, topics);
        }

        dispatcher::scatter_json(&self.client, &assignments, paths::CREATE_PRODUCERS).await
    }

    async fn create_consumers(&self, assignment: ConsumerAssignment) -> Result<()> {
        let assignments: Vec<(WorkerEndpoint, ConsumerAssignment)> =
            assign_work(&self.consumer_workers, assignment.topics_subscriptions)
                .into_iter()
                .map(|(worker, topics_subscriptions)| {
                    (
                        worker,
                        ConsumerAssignment {
                            topics_subscriptions,
                        },
                    )
                })
                .collect();

        info!(
            "Number of consumer workers with assigned subscriptions: {}",
            assignments.len()
        );
        for (worker, assignment) in &assignments {
            debug!(
                "Consumer assignment {} => {:?}",
                worker, assignment.topics_subscriptions
            );
        }

        dispatcher::scatter_json(&self.client, &assignments, paths::CREATE_CONSUMERS).await
    }

    async fn start_load(&self, mut assignment: ProducerWorkAssignment) -> Result<()> {
        assignment.publish_rate = self.divided_rate(assignment.publish_rate)?;
        dispatcher::broadcast_json(
            &self.client,
            &self.producer_workers,
            paths::START_LOAD,
            &assignment,
        )
        .await
    }

    async fn probe_producers(&self) -> Result<()> {
        dispatcher::broadcast(&self.client, &self.producer_workers, paths::PROBE_PRODUCERS).await
    }

    async fn adjust_publish_rate(&self, publish_rate: f64) -> Result<()> {
        let share = self.divided_rate(publish_rate)?;
        dispatcher::broadcast_json(
            &self.client,
            &self.producer_workers,
            paths::ADJUST_PUBLISH_RATE,
            &share,
        )
        .await
    }

    async fn pause_producers(&self) -> Result<()> {
        dispatcher::broadcast(&self.client, &self.producer_workers, paths::PAUSE_PRODUCERS).await
    }

    async fn resume_producers(&self) -> Result<()> {
        dispatcher::broadcast(
            &self.client,
            &self.producer_workers,
            paths::RESUME_PRODUCERS,
        )
        .await
    }

    async fn pause_consumers(&self) -> Result<()> {
        dispatcher::broadcast(&self.client, &self.consumer_workers, paths::PAUSE_CONSUMERS).await
    }

    async fn resume_consumers(&self) -> Result<()> {
        dispatcher::broadcast(
            &self.client,
            &self.consumer_workers,
            paths::RESUME_CONSUMERS,
        )
        .await
    }

    async fn stop_all(&self) -> Result<()> {
        dispatcher::broadcast(&self.client, &self.fleet, paths::STOP_ALL).await
    }

    async fn period_stats(&self) -> Result<MergedPeriodStats> {
        let snapshots: Vec<PeriodStats> =
            dispatcher::query(&self.client, &self.fleet, paths::PERIOD_STATS).await?;
        aggregate::merge_period_stats(&self.fleet, &snapshots)
    }

    async fn on_demand_stats(&self) -> Result<MergedOnDemandStats> {
        let snapshots: Vec<OnDemandStats> =
            dispatcher::query(&self.client, &self.fleet, paths::ONDEMAND_STATS).await?;
        aggregate::merge_on_demand_stats(&self.fleet, &snapshots)
    }

    async fn cumulative_latencies(&self) -> Result<MergedCumulativeLatencies> {
        let snapshots: Vec<CumulativeLatencies> =
            dispatcher::query(&self.client, &self.fleet, paths::CUMULATIVE_LATENCIES).await?;
        aggregate::merge_cumulative_latencies(&self.fleet, &snapshots)
    }

    async fn counters_stats(&self) -> Result<MergedCountersStats> {
        let snapshots: Vec<CountersStats> =
            dispatcher::query(&self.client, &self.fleet, paths::COUNTERS_STATS).await?;
        Ok(aggregate::merge_counters_stats(
            &snapshots,
            self.metrics_combiner.as_ref(),
        ))
    }

    async fn reset_stats(&self) -> Result<()> {
        dispatcher::broadcast(&self.client, &self.fleet, paths::RESET_STATS).await
    }
}
