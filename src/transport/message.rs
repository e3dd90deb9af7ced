use serde::{Deserialize, Serialize};

use crate::broker::{Delivery, DeliveryId};
use crate::utils::error::BrokerError;

/// Frames sent by clients.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Ask for the next delivery. Answered with exactly one `delivery` or
    /// `error` frame.
    Fetch,
    Publish { body: String },
    Acknowledge { id: DeliveryId },
    Requeue { id: DeliveryId },
}

/// Frames sent by the server.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Delivery {
        id: DeliveryId,
        body: String,
        enqueued_at: i64,
    },
    Published {
        id: DeliveryId,
    },
    Acknowledged {
        id: DeliveryId,
    },
    Requeued {
        id: DeliveryId,
        new_id: DeliveryId,
    },
    Error {
        code: ErrorCode,
        message: String,
    },
}

/// Wire-level status of a failed request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unavailable,
    InvalidArgument,
    Cancelled,
    DeadlineExceeded,
    BadRequest,
}

impl From<&BrokerError> for ErrorCode {
    fn from(err: &BrokerError) -> Self {
        match err {
            BrokerError::Closed => Self::Unavailable,
            BrokerError::InvalidId(_) => Self::InvalidArgument,
            BrokerError::Cancelled => Self::Cancelled,
            BrokerError::DeadlineExceeded => Self::DeadlineExceeded,
        }
    }
}

impl From<Delivery> for ServerMessage {
    fn from(delivery: Delivery) -> Self {
        Self::Delivery {
            id: delivery.id,
            body: delivery.message.body,
            enqueued_at: delivery.enqueued_at,
        }
    }
}

impl From<&BrokerError> for ServerMessage {
    fn from(err: &BrokerError) -> Self {
        Self::Error {
            code: err.into(),
            message: err.to_string(),
        }
    }
}

impl ServerMessage {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Error {
            code: ErrorCode::BadRequest,
            message: message.into(),
        }
    }
}
