use thiserror::Error;

use crate::llm::ModelError;

/// Faults that end an agent run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("model call failed after {attempts} attempts: {source}")]
    Model {
        attempts: u32,
        #[source]
        source: ModelError,
    },

    #[error("malformed {name} reply after {attempts} attempts: {reason}")]
    MalformedReply {
        name: String,
        attempts: u32,
        reason: String,
    },

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("maximum iterations ({0}) reached")]
    MaxIterations(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
