//! The `error` module defines the error type returned by every broker
//! operation.
//!
//! The variants are the only error kinds that cross the boundary between
//! the broker core and its transport. Transports translate them into their
//! own status codes (see `transport::message::ErrorCode`).

use crate::broker::message::DeliveryId;

/// Errors returned by the broker core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BrokerError {
    /// The broker has been shut down. Permanent for this broker instance.
    #[error("broker is closed")]
    Closed,

    /// The delivery id is not pending: never published, already
    /// acknowledged, or superseded by a requeue.
    #[error("invalid delivery id: {0}")]
    InvalidId(DeliveryId),

    /// The caller's context was cancelled before the operation ran.
    #[error("context cancelled")]
    Cancelled,

    /// The caller's context deadline passed before the operation ran.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

impl BrokerError {
    /// Whether retrying with a fresh context could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}

pub type Result<T> = std::result::Result<T, BrokerError>;
