//! Message and delivery definitions
//!
//! A `Message` is what producers hand to the broker. A `Delivery` is one
//! handoff attempt of that message to a consumer: the same message gets a
//! fresh `Delivery` (and a fresh id) every time it is requeued.

use serde::{Deserialize, Serialize};

/// Identifier of a single delivery attempt.
///
/// Randomly generated, non-negative, and unique among the deliveries that
/// are pending at the time it is created.
pub type DeliveryId = i32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub body: String,
}

impl Message {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

impl From<&str> for Message {
    fn from(body: &str) -> Self {
        Self::new(body)
    }
}

impl From<String> for Message {
    fn from(body: String) -> Self {
        Self::new(body)
    }
}

/// A message as handed out by the delivery stream.
///
/// `enqueued_at` is set by the broker (milliseconds since UNIX epoch) when
/// the delivery is pushed onto the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: DeliveryId,
    pub message: Message,
    pub enqueued_at: i64,
}

impl Delivery {
    pub(crate) fn new(id: DeliveryId, message: Message) -> Self {
        Self {
            id,
            message,
            enqueued_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}
