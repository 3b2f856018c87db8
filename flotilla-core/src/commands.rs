use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// RPC paths understood by every worker process.
pub mod paths {
    pub const INITIALIZE_DRIVER: &str = "/initialize-driver";
    pub const CREATE_TOPICS: &str = "/create-topics";
    pub const CREATE_PRODUCERS: &str = "/create-producers";
    pub const CREATE_CONSUMERS: &str = "/create-consumers";
    pub const START_LOAD: &str = "/start-load";
    pub const PROBE_PRODUCERS: &str = "/probe-producers";
    pub const ADJUST_PUBLISH_RATE: &str = "/adjust-publish-rate";
    pub const PAUSE_PRODUCERS: &str = "/pause-producers";
    pub const RESUME_PRODUCERS: &str = "/resume-producers";
    pub const PAUSE_CONSUMERS: &str = "/pause-consumers";
    pub const RESUME_CONSUMERS: &str = "/resume-consumers";
    pub const STOP_ALL: &str = "/stop-all";
    pub const PERIOD_STATS: &str = "/period-stats";
    pub const ONDEMAND_STATS: &str = "/ondemand-stats";
    pub const CUMULATIVE_LATENCIES: &str = "/cumulative-latencies";
    pub const COUNTERS_STATS: &str = "/counters-stats";
    pub const RESET_STATS: &str = "/reset-stats";
}

/// Topic creation request, executed by a single designated worker.
/// The response is the ordered list of created topic names, taken verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicsSpec {
    /// Number of topics to create
    pub number_of_topics: usize,
    /// Partitions per created topic
    pub number_of_partitions_per_topic: usize,
}

/// One (topic, subscription) pair a consumer worker must subscribe to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicSubscription {
    pub topic: String,
    pub subscription: String,
}

impl Display for TopicSubscription {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.topic, self.subscription)
    }
}

/// Subscription work for consumer workers. The control process partitions the
/// fleet-wide list and sends each consumer worker its own slice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumerAssignment {
    pub topics_subscriptions: Vec<TopicSubscription>,
}

/// How producer workers spread messages across topic partitions.
///
/// Decoding is schema-tolerant: a tag introduced by a newer worker version
/// falls back to [`KeyDistributorType::NoKey`] instead of failing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyDistributorType {
    #[default]
    NoKey,
    KeyRoundRobin,
    RandomNano,
}

impl<'de> Deserialize<'de> for KeyDistributorType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(match tag.as_str() {
            "KEY_ROUND_ROBIN" => KeyDistributorType::KeyRoundRobin,
            "RANDOM_NANO" => KeyDistributorType::RandomNano,
            _ => KeyDistributorType::default(),
        })
    }
}

/// One pre-generated message payload, base64-encoded on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadBlob(#[serde(with = "crate::b64")] pub Vec<u8>);

/// Load parameters for the producer role group. The control process divides
/// `publish_rate` by the used-producer count before sending, so each worker
/// receives its own share of the requested aggregate rate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProducerWorkAssignment {
    pub key_distributor: KeyDistributorType,
    pub payload_data: Vec<PayloadBlob>,
    /// Messages per second for the receiving worker
    pub publish_rate: f64,
}
