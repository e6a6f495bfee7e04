use std::time::Duration;
use thiserror::Error;

/// Failure modes of one broker request/reply round-trip.
///
/// Timeout and transport failures select the fallback read path; a reply
/// that arrived but cannot be decoded is a contract break and fails hard.
#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("broker reply timed out after {0:?}")]
    Timeout(Duration),

    #[error("broker transport failed: {0}")]
    Transport(String),

    #[error("broker reply is not valid JSON: {0}")]
    Decode(String),
}

impl BrokerError {
    /// Whether the gateway should degrade to the direct secondary read.
    pub fn triggers_fallback(&self) -> bool {
        matches!(self, BrokerError::Timeout(_) | BrokerError::Transport(_))
    }
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("malformed reply from queue {queue}: {reason}")]
    MalformedReply { queue: String, reason: String },

    #[error("forecast service unavailable: {0}")]
    ForecastUnavailable(String),

    #[error("invalid risk user: {0}")]
    InvalidRiskUser(String),

    #[error("repository error: {0}")]
    RepositoryError(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
