//! Error types for the upstream todo gateway.

use kanban_core::InvalidTaskId;
use reqwest::StatusCode;
use thiserror::Error;

/// A payload that could not be turned into a domain value.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The body was not JSON at all.
    #[error("response body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A required field was absent (or `null`).
    #[error("missing field `{path}`")]
    MissingField {
        /// Location of the field, e.g. `todos[3].todo`.
        path: String,
    },

    /// A field was present with the wrong shape.
    #[error("invalid field `{path}`: expected {expected}")]
    InvalidField {
        /// Location of the field.
        path: String,
        /// Human description of the accepted shape.
        expected: &'static str,
    },
}

/// Errors that can occur while talking to the upstream todo API.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Connection, timeout or body transfer failure.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("Request to {url} failed with status {status}")]
    Status {
        /// HTTP status returned.
        status: StatusCode,
        /// Requested URL.
        url: String,
    },

    /// Upstream answered with something that is not a todo record.
    #[error("Unexpected response from {url}: {source}")]
    Decode {
        /// Requested URL.
        url: String,
        /// What was wrong with the payload.
        #[source]
        source: DecodeError,
    },

    /// The id could not be mapped to an upstream record.
    #[error(transparent)]
    InvalidId(#[from] InvalidTaskId),

    /// The configured base URL cannot carry a path.
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

impl GatewayError {
    /// Whether the failure happened while reaching or receiving from the API.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. } | Self::Decode { .. })
    }

    /// HTTP status for [`GatewayError::Status`] failures.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
