use flotilla_core::HistogramCodecError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ControlError>;

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("remote command failed: {host}{path} returned status {status}: {body}")]
    RemoteCommandFailed {
        host: String,
        path: String,
        status: u16,
        body: String,
    },

    #[error("malformed response from {host}{path}: {source}")]
    MalformedResponse {
        host: String,
        path: String,
        source: serde_json::Error,
    },

    #[error("failed to decode {field} histogram reported by {worker}: {source}")]
    HistogramDecode {
        field: &'static str,
        worker: String,
        source: HistogramCodecError,
    },

    #[error("invalid ensemble configuration: {0}")]
    Configuration(String),

    #[error("unable to perform operation: {0}")]
    Unrecoverable(String),
}
