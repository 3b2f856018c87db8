//! Concurrent fan-out with barrier semantics.
//!
//! Each helper issues one RPC per endpoint concurrently, with no fan-out
//! concurrency cap, and releases the caller only once every call has settled.
//! If any call failed, the whole operation fails with the first error in
//! endpoint order and sibling results are discarded. There is no retry: a
//! single failed worker fails the fleet-wide operation.

use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::Result;
use crate::rpc::{WorkerClient, WorkerEndpoint};

/// Fans an empty-bodied command out to every endpoint.
pub async fn broadcast(
    client: &WorkerClient,
    workers: &[WorkerEndpoint],
    path: &str,
) -> Result<()> {
    settle_void(join_all(workers.iter().map(|worker| client.post_empty(worker, path))).await)
}

/// Fans a shared JSON command out to every endpoint.
pub async fn broadcast_json<B>(
    client: &WorkerClient,
    workers: &[WorkerEndpoint],
    path: &str,
    body: &B,
) -> Result<()>
where
    B: Serialize + Sync + ?Sized,
{
    settle_void(join_all(workers.iter().map(|worker| client.post_json(worker, path, body))).await)
}

/// Fans an opaque binary payload out to every endpoint.
pub async fn broadcast_blob(
    client: &WorkerClient,
    workers: &[WorkerEndpoint],
    path: &str,
    blob: &[u8],
) -> Result<()> {
    settle_void(join_all(workers.iter().map(|worker| client.post_bytes(worker, path, blob))).await)
}

/// Parameterized fan-out: each listed worker receives its own payload.
pub async fn scatter_json<B>(
    client: &WorkerClient,
    assignments: &[(WorkerEndpoint, B)],
    path: &str,
) -> Result<()>
where
    B: Serialize + Sync,
{
    settle_void(
        join_all(
            assignments
                .iter()
                .map(|(worker, body)| client.post_json(worker, path, body)),
        )
        .await,
    )
}

/// Value-collecting fan-out. Results are ordered exactly as the input
/// endpoint list.
pub async fn query<T: DeserializeOwned>(
    client: &WorkerClient,
    workers: &[WorkerEndpoint],
    path: &str,
) -> Result<Vec<T>> {
    settle(join_all(workers.iter().map(|worker| client.get_json::<T>(worker, path))).await)
}

/// Barrier bookkeeping: every call has settled by the time this runs.
fn settle<T>(results: Vec<Result<T>>) -> Result<Vec<T>> {
    let mut collected = Vec::with_capacity(results.len());
    for result in results {
        collected.push(result?);
    }
    Ok(collected)
}

fn settle_void(results: Vec<Result<()>>) -> Result<()> {
    for result in results {
        result?;
    }
    Ok(())
}
