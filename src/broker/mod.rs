pub mod context;
pub mod engine;
pub mod message;
pub mod stream;

pub use context::Context;
pub use engine::Broker;
pub use message::{Delivery, DeliveryId, Message};
pub use stream::DeliveryStream;
