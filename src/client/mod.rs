//! The `client` module defines the broker's view of one connected
//! WebSocket client: its id, the channel feeding its socket, the context
//! its operations run under, and its queue of outstanding fetch requests.

pub mod pubsub_client;
pub use pubsub_client::Client;

#[cfg(test)]
mod tests;
