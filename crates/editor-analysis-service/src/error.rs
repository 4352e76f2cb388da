//! Error types for `editor-analysis-service`.

use editor_analysis::{EditError, EventError};
use thiserror::Error;

/// Errors reported by an [`AnalysisEngine`](crate::engine::AnalysisEngine).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// No document is registered under this id.
    #[error("no document registered as `{0}`")]
    UnknownDocument(String),

    /// An edit did not fit the document.
    #[error(transparent)]
    Edit(#[from] EditError),

    /// A query could not be answered.
    #[error("analysis query failed: {0}")]
    Query(String),
}

/// Errors produced while synchronizing a buffer with an engine document.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The engine rejected the edit.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The event could not be decoded or replayed.
    #[error(transparent)]
    Event(#[from] EventError),

    /// The engine's text no longer matches the buffer.
    #[error("document `{id}` diverged from the editor buffer")]
    Desynchronized {
        /// Document id.
        id: String,
    },
}

/// Errors produced by the background worker handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkerError {
    /// The worker thread has stopped.
    #[error("analysis worker stopped")]
    Disconnected,

    /// No response arrived within the timeout.
    #[error("timed out waiting for analysis response id={id}")]
    Timeout {
        /// Request id.
        id: u64,
    },

    /// The worker answered with an error.
    #[error("analysis worker error: {0}")]
    Engine(String),
}

/// Errors produced while loading an [`AnalysisConfig`](crate::config::AnalysisConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration text is not valid JSON for the config shape.
    #[error("invalid analysis config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of its accepted range.
    #[error("invalid analysis config value `{field}`: {reason}")]
    Invalid {
        /// Field name.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}
