//! Error types for the bridge.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors raised by the Backlog and Slack API clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (transport, invalid URL, undecodable body)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// Slack answered `ok: false`
    #[error("Slack API error: {0}")]
    SlackApi(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures of a single webhook delivery.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Bad method or body. Carries the response text.
    #[error("{0}")]
    InvalidRequest(&'static str),

    /// Backlog or Slack user directory could not be fetched.
    #[error("cannot fetch users: {0}")]
    UpstreamFetch(#[source] ClientError),

    /// Issue detail lookup failed. This path is not guarded by the
    /// controller and only surfaces through the unhandled error path.
    #[error("unhandled issue lookup failure: {0}")]
    IssueFetch(#[source] ClientError),

    /// Posting to Slack failed.
    #[error("{0}")]
    UpstreamPost(#[source] ClientError),
}

impl BridgeError {
    /// HTTP status answered for this failure.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::UpstreamFetch(_) => StatusCode::BAD_REQUEST,
            Self::IssueFetch(_) | Self::UpstreamPost(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Response body answered for this failure.
    #[must_use]
    pub fn response_body(&self) -> String {
        match self {
            Self::InvalidRequest(message) => (*message).to_string(),
            Self::UpstreamFetch(_) => "cannot fetch users".to_string(),
            Self::IssueFetch(_) => String::new(),
            Self::UpstreamPost(source) => source.to_string(),
        }
    }
}
