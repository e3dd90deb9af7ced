//! The `transport` module exposes the broker over WebSockets.
//!
//! It defines the JSON frames exchanged with clients and the server that
//! parses them, calls the broker, and maps broker errors onto wire-level
//! error codes. The broker itself knows nothing about the wire format.

pub mod message;
pub mod websocket;
