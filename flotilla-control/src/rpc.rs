use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::error;

use crate::errors::{ControlError, Result};

/// Base URL of one worker process. Immutable once the fleet is configured.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkerEndpoint(String);

impl WorkerEndpoint {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut url = base_url.into();
        while url.ends_with('/') {
            url.pop();
        }
        WorkerEndpoint(url)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.0, path)
    }
}

impl Display for WorkerEndpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Issues single request/response exchanges against worker endpoints over one
/// shared connection pool. The pool lives until the owning ensemble shuts
/// down; dropping the last clone releases it.
#[derive(Debug, Clone)]
pub struct WorkerClient {
    http: reqwest::Client,
}

impl WorkerClient {
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(WorkerClient { http })
    }

    /// GET with a structured response body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        worker: &WorkerEndpoint,
        path: &str,
    ) -> Result<T> {
        let response = self.http.get(worker.url_for(path)).send().await?;
        let body = Self::success_body(worker, path, response).await?;
        decode_body(worker, path, &body)
    }

    /// POST with no payload; any response body is ignored.
    pub async fn post_empty(&self, worker: &WorkerEndpoint, path: &str) -> Result<()> {
        let response = self.http.post(worker.url_for(path)).send().await?;
        Self::success_body(worker, path, response).await.map(|_| ())
    }

    /// POST a JSON payload; any response body is ignored.
    pub async fn post_json<B>(&self, worker: &WorkerEndpoint, path: &str, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let response = self.http.post(worker.url_for(path)).json(body).send().await?;
        Self::success_body(worker, path, response).await.map(|_| ())
    }

    /// POST an opaque binary payload (e.g. a driver configuration blob).
    pub async fn post_bytes(&self, worker: &WorkerEndpoint, path: &str, body: &[u8]) -> Result<()> {
        let response = self
            .http
            .post(worker.url_for(path))
            .body(body.to_vec())
            .send()
            .await?;
        Self::success_body(worker, path, response).await.map(|_| ())
    }

    /// POST a JSON payload and decode a structured response.
    pub async fn post_json_expect<B, T>(
        &self,
        worker: &WorkerEndpoint,
        path: &str,
        body: &B,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.http.post(worker.url_for(path)).json(body).send().await?;
        let body = Self::success_body(worker, path, response).await?;
        decode_body(worker, path, &body)
    }

    async fn success_body(
        worker: &WorkerEndpoint,
        path: &str,
        response: reqwest::Response,
    ) -> Result<Vec<u8>> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.bytes().await?.to_vec());
        }

        let body = response.text().await.unwrap_or_default();
        error!(
            "Worker request to {}{} failed -- status: {} body: {}",
            worker, path, status, body
        );
        Err(ControlError::RemoteCommandFailed {
            host: worker.to_string(),
            path: path.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

fn decode_body<T: DeserializeOwned>(
    worker: &WorkerEndpoint,
    path: &str,
    body: &[u8],
) -> Result<T> {
    serde_json::from_slice(body).map_err(|source| ControlError::MalformedResponse {
        host: worker.to_string(),
        path: path.to_string(),
        source,
    })
}
