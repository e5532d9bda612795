use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single API call. Views treat every variant the same way
/// ("request failed"); the distinction only matters for logs.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid API base url `{0}`")]
    InvalidBaseUrl(String),

    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned {status}")]
    Status { url: String, status: StatusCode },

    #[error("unexpected response body from {url}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("the API worker thread has stopped")]
    WorkerStopped,
}
