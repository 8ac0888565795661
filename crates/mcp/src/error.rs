//! MCP error types.

use crate::protocol::{JsonRpcError, RequestId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("MCP request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("MCP request failed: {status}\n{body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to serialize request: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("response ID mismatch: expected {expected}, got {actual:?}")]
    IdMismatch {
        expected: RequestId,
        actual: Option<RequestId>,
    },

    #[error("MCP error: {0}")]
    JsonRpc(#[from] JsonRpcError),

    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

pub type Result<T> = std::result::Result<T, Error>;
