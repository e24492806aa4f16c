//! Error types for the goalchain domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Agent failures are data (they end up in the trajectory); only contract
//! defects surface as the top-level [`Error`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agent::AgentId;

/// The top-level error type for goalchain operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Context collision: {agent} tried to overwrite existing key '{key}'")]
    ContextCollision { agent: AgentId, key: String },

    #[error("No agent registered for plan step: {0}")]
    AgentNotRegistered(AgentId),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Classification of an agent failure, used by the engine's retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    TransientNetwork,
    InvalidResponse,
    MissingDependency,
    RateLimited,
}

impl ErrorKind {
    /// Whether the engine should try the step again after this kind of failure.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::TransientNetwork | Self::RateLimited)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TransientNetwork => write!(f, "transient_network"),
            Self::InvalidResponse => write!(f, "invalid_response"),
            Self::MissingDependency => write!(f, "missing_dependency"),
            Self::RateLimited => write!(f, "rate_limited"),
        }
    }
}

/// A failure reported by a single agent run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AgentError {
    #[error("Network error: {0}")]
    TransientNetwork(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),
}

impl AgentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TransientNetwork(_) => ErrorKind::TransientNetwork,
            Self::InvalidResponse(_) => ErrorKind::InvalidResponse,
            Self::MissingDependency(_) => ErrorKind::MissingDependency,
            Self::RateLimited(_) => ErrorKind::RateLimited,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}
