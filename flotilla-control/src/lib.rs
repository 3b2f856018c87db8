//! # Flotilla Control
//!
//! Worker-fleet coordinator for the Flotilla distributed load-testing
//! harness.
//!
//! ## Core Responsibilities
//!
//! - **Role assignment**: splits the configured fleet into producer and
//!   consumer groups, fixed for the run
//! - **Work partitioning**: divides topics, subscriptions and the aggregate
//!   publish rate across the workers that actually receive work
//! - **Concurrent dispatch**: fans commands out to worker endpoints over
//!   HTTP with wait-for-all barrier semantics and all-or-nothing failure
//! - **Statistics merging**: folds per-worker counters, averaged elapsed
//!   times and compressed latency histograms into one fleet-wide snapshot
//!
//! The coordinator holds no messaging-protocol knowledge; workers load a
//! backend driver and talk to the system under test themselves.

pub mod aggregate;
pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod partition;
pub mod roles;
pub mod rpc;

mod ensemble;
mod worker;

pub use config::EnsembleConfig;
pub use ensemble::WorkerEnsemble;
pub use errors::{ControlError, Result};
pub use roles::RoleGroups;
pub use rpc::{WorkerClient, WorkerEndpoint};
pub use worker::Worker;
