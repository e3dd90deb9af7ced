//! The `utils` module holds the pieces shared by every other module of
//! `ackqueue`: the broker error type and logging setup.

pub mod error;
pub mod logging;

pub use error::{BrokerError, Result};
