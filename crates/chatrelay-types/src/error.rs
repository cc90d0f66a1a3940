//! Error taxonomy shared across the workspace.
//!
//! `RepositoryError` covers storage, `UpstreamError` covers the inference
//! engine, and `ChatError` is the turn-level union the orchestrator reports.
//! Each turn-level failure has a stable wire kind (`ChatError::kind`) carried
//! in the terminal `error` stream event.

use thiserror::Error;

/// Errors from repository operations (trait definitions live in chatrelay-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,
}

/// Errors from the upstream inference engine.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connection could not be established, or the engine rejected the
    /// request before any byte of the body arrived.
    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    /// No data arrived within the idle window after the stream started.
    #[error("upstream idle timeout after {0}s")]
    Timeout(u64),

    /// The response framing could not be decoded.
    #[error("upstream protocol error: {0}")]
    Protocol(String),

    /// The engine reported an error inline in its response framing.
    #[error("upstream reported error: {0}")]
    Reported(String),
}

impl UpstreamError {
    /// Stable wire identifier for this failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Unavailable(_) => "upstream_unavailable",
            UpstreamError::Timeout(_) => "upstream_timeout",
            UpstreamError::Protocol(_) => "upstream_protocol_error",
            UpstreamError::Reported(_) => "upstream_reported_error",
        }
    }
}

/// Turn-level errors surfaced by the chat orchestrator.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Caller input malformed; rejected before any side effect.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown conversation id; rejected before any side effect.
    #[error("conversation not found")]
    NotFound,

    /// The upstream produced zero fragments; treated as a failure, never as
    /// an empty success.
    #[error("upstream produced no output")]
    EmptyResponse,

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),
}

impl ChatError {
    /// Stable wire identifier for this failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ChatError::InvalidRequest(_) => "invalid_request",
            ChatError::NotFound => "not_found",
            ChatError::EmptyResponse => "empty_response",
            ChatError::Upstream(e) => e.kind(),
            ChatError::Repository(_) => "storage_error",
        }
    }
}
