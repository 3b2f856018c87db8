use async_trait::async_trait;

use flotilla_core::commands::{ConsumerAssignment, ProducerWorkAssignment, TopicsSpec};
use flotilla_core::stats::{
    MergedCountersStats, MergedCumulativeLatencies, MergedOnDemandStats, MergedPeriodStats,
};

use crate::errors::Result;

/// The fleet-wide operation surface a workload driver programs against.
///
/// [`WorkerEnsemble`](crate::WorkerEnsemble) implements it by fanning
/// commands out over the remote fleet; a single-process implementation could
/// satisfy it locally for development runs.
#[async_trait]
pub trait Worker: Send + Sync {
    /// Pushes the backend driver configuration blob to every worker.
    async fn initialize_driver(&self, driver_config: &[u8]) -> Result<()>;

    /// Creates the benchmark topics and returns their names.
    async fn create_topics(&self, spec: TopicsSpec) -> Result<Vec<String>>;

    /// Distributes `topics` across the producer group and instantiates
    /// producers on the workers that received a share.
    async fn create_producers(&self, topics: Vec<String>) -> Result<()>;

    /// Distributes the subscription list across the consumer group and
    /// instantiates consumers on the workers that received a share.
    async fn create_consumers(&self, assignment: ConsumerAssignment) -> Result<()>;

    /// Starts load generation on the producer group.
    async fn start_load(&self, assignment: ProducerWorkAssignment) -> Result<()>;

    /// Asks the producer group to verify its producers are functional.
    async fn probe_producers(&self) -> Result<()>;

    /// Changes the aggregate publish rate of a running load phase.
    async fn adjust_publish_rate(&self, publish_rate: f64) -> Result<()>;

    async fn pause_producers(&self) -> Result<()>;
    async fn resume_producers(&self) -> Result<()>;
    async fn pause_consumers(&self) -> Result<()>;
    async fn resume_consumers(&self) -> Result<()>;

    /// Stops producers and consumers on the entire fleet.
    async fn stop_all(&self) -> Result<()>;

    async fn period_stats(&self) -> Result<MergedPeriodStats>;
    async fn on_demand_stats(&self) -> Result<MergedOnDemandStats>;
    async fn cumulative_latencies(&self) -> Result<MergedCumulativeLatencies>;
    async fn counters_stats(&self) -> Result<MergedCountersStats>;

    /// Clears accumulated statistics on the entire fleet.
    async fn reset_stats(&self) -> Result<()>;
}
