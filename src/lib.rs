//! # ackqueue
//!
//! `ackqueue` is an in-memory message broker with at-least-once delivery.
//! Producers publish messages onto a single global queue, consumers pull
//! deliveries from it, and every delivery must be acknowledged. A delivery
//! that is not acknowledged within the configured TTL goes back on the
//! queue under a new id.
//!
//! ## Core Modules
//!
//! - `broker`: the broker engine, its delivery stream, and the cancellation
//!   context every operation takes.
//! - `client`: a connected WebSocket client as seen by the transport.
//! - `config`: loading server, broker and logging settings.
//! - `transport`: the WebSocket server exposing the broker operations.
//! - `utils`: the broker error type and logging setup.

pub mod broker;
pub mod client;
pub mod config;
pub mod transport;
pub mod utils;
