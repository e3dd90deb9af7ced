use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::warn;
use tungstenite::protocol::Message as WsMessage;

use crate::broker::Context;
use crate::transport::message::ServerMessage;

/// A connected WebSocket client.
///
/// Clones share the same socket channel, context and fetch queue.
#[derive(Debug, Clone)]
pub struct Client {
    /// Unique identifier for the connection.
    pub id: String,

    /// Channel to send WebSocket messages to the client.
    pub sender: UnboundedSender<WsMessage>,

    /// Context every broker call made on behalf of this client runs under.
    /// Cancelled when the connection goes away.
    pub ctx: Context,

    fetches: UnboundedSender<()>,
}

impl Client {
    /// Create a client writing to `sender`. The returned receiver yields
    /// one item per `request_fetch` call.
    pub fn new(sender: UnboundedSender<WsMessage>) -> (Self, UnboundedReceiver<()>) {
        let (fetches, requests) = mpsc::unbounded_channel();
        let client = Self {
            id: format!("client-{}", uuid::Uuid::new_v4()),
            sender,
            ctx: Context::background(),
            fetches,
        };
        (client, requests)
    }

    /// Serialize `reply` and queue it for the socket. Returns `false` once
    /// the socket side is gone.
    pub fn send(&self, reply: &ServerMessage) -> bool {
        let text = match serde_json::to_string(reply) {
            Ok(json) => json,
            Err(e) => {
                warn!(client = %self.id, "Failed to serialize reply: {e}");
                return false;
            }
        };
        self.sender.send(WsMessage::text(text)).is_ok()
    }

    pub fn request_fetch(&self) -> bool {
        self.fetches.send(()).is_ok()
    }

    pub fn disconnect(&self) {
        self.ctx.cancel();
    }
}
