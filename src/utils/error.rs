//! Error types shared by the broker core and the layers wrapping it.
//!
//! Every broker error is terminal: the core never retries or recovers, it
//! reports the condition verbatim and leaves retry policy to the caller.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BrokerError {
    /// The broker has been closed. Returned by every operation after
    /// `close`, including a second `close`.
    #[error("broker is unavailable")]
    Unavailable,

    /// No record was ever stored under this (subject, identifier) pair.
    #[error("message with this id is invalid")]
    InvalidIdentifier,

    /// The record exists but its time-to-live has elapsed.
    #[error("message with this id has expired")]
    ExpiredIdentifier,

    /// The caller's cancellation token fired before the call took effect.
    #[error("operation was cancelled by the caller")]
    Cancelled,
}

impl BrokerError {
    /// Short stable label, used for log fields and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            BrokerError::Unavailable => "unavailable",
            BrokerError::InvalidIdentifier => "invalid_id",
            BrokerError::ExpiredIdentifier => "expired_id",
            BrokerError::Cancelled => "cancelled",
        }
    }
}

pub type Result<T> = std::result::Result<T, BrokerError>;
