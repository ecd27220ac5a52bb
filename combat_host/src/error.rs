//! Errors surfaced by the host API.
//!
//! Engine rejections pass through untouched so callers can match on the
//! [`EngineError`] variant; the rest describe worker coordination failures.
use combat_core::EngineError;
use thiserror::Error;
use tokio::sync::oneshot;

pub type Result<T> = std::result::Result<T, HostError>;

#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("session worker command channel closed")]
    CommandChannelClosed,

    #[error("session worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("session worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}

impl HostError {
    /// The engine rejection carried by this error, if any
    pub fn engine(&self) -> Option<&EngineError> {
        match self {
            HostError::Engine(err) => Some(err),
            _ => None,
        }
    }
}
