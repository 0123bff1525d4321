//! Transport error taxonomy.
//!
//! Every error carries the target URL and enough context for a human to
//! act on it. The password is never part of any error or log line.

use thiserror::Error;

/// Errors raised by the transport layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The API host cannot be reached (DNS failure, connection refused,
    /// timeout). Retried per policy.
    #[error("cannot reach Hummingbot API at {url}: {message}. {hint}")]
    Connectivity {
        url: String,
        message: String,
        hint: String,
    },

    /// HTTP 401. Never retried: new credentials are required first.
    #[error(
        "authentication failed for user '{username}' at {url}: \
         update the stored credentials for this server"
    )]
    Authentication { url: String, username: String },

    /// HTTP 400 or an error `detail` payload: the request was understood
    /// and rejected. Terminal for this call.
    #[error("request rejected by {url}: {detail}")]
    Validation { url: String, detail: String },

    /// HTTP 404: the referenced executor/config/account does not exist.
    #[error("not found at {url}: {detail}")]
    NotFound { url: String, detail: String },

    /// HTTP 409: e.g. a config name that already exists without an
    /// override flag. Terminal unless the caller opts into overwrite.
    #[error("conflict at {url}: {detail}")]
    Conflict { url: String, detail: String },

    /// HTTP 5xx. Retried per policy.
    #[error("server error HTTP {status} from {url}: {body}")]
    Server {
        url: String,
        status: u16,
        body: String,
    },

    /// Any other status the API is not expected to return.
    #[error("unexpected HTTP {status} from {url}: {body}")]
    UnexpectedStatus {
        url: String,
        status: u16,
        body: String,
    },

    /// Response body was not valid JSON.
    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    /// Cooperative cancellation between retry attempts.
    #[error("request cancelled")]
    Cancelled,

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl TransportError {
    /// Transient failures worth retrying: connectivity and 5xx.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connectivity { .. } | Self::Server { .. })
    }
}

/// Result type alias for transport operations.
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Connectivity hint, aware of the common Docker-networking pitfall.
pub(crate) fn connectivity_hint(url: &str) -> String {
    if url.contains("localhost") || url.contains("127.0.0.1") {
        "Is the API running? From inside a container, 'localhost' is the \
         container itself; use host.docker.internal or the compose service name"
            .to_string()
    } else {
        "Is the API running and the host/port reachable?".to_string()
    }
}
