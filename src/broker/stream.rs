//! Consumer side of the delivery queue
//!
//! There is exactly one receiver for the whole broker. Every
//! `DeliveryStream` handed out by `Broker::subscribe` shares it, so when
//! several consumers pull concurrently each delivery reaches only one of
//! them, in enqueue order.

use std::sync::Arc;

use futures::Stream;
use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::broker::message::Delivery;

#[derive(Debug, Clone)]
pub struct DeliveryStream {
    receiver: Arc<Mutex<UnboundedReceiver<Delivery>>>,
}

impl DeliveryStream {
    pub(crate) fn new(receiver: UnboundedReceiver<Delivery>) -> Self {
        Self {
            receiver: Arc::new(Mutex::new(receiver)),
        }
    }

    /// Wait for the next delivery.
    ///
    /// Returns `None` once the broker is closed (or dropped) and every
    /// delivery buffered before that point has been handed out.
    pub async fn recv(&self) -> Option<Delivery> {
        self.receiver.lock().await.recv().await
    }

    /// Take the next delivery if one is immediately available.
    ///
    /// Also returns `None` when another consumer is currently waiting on
    /// the queue.
    pub fn try_recv(&self) -> Option<Delivery> {
        let mut receiver = self.receiver.try_lock().ok()?;
        receiver.try_recv().ok()
    }

    pub fn into_stream(self) -> impl Stream<Item = Delivery> {
        futures::stream::unfold(self, |deliveries| async move {
            let next = deliveries.recv().await?;
            Some((next, deliveries))
        })
    }
}
