//! The dispatch engine.
//!
//! [`BatchSender`] delivers to many targets through a [`DeliveryChannel`],
//! bounding concurrency and driving each target through the retry decisions
//! of a [`RetryPolicy`].

mod batch_sender;
mod channel;
mod retry;

pub use batch_sender::BatchSender;
pub use channel::DeliveryChannel;
pub use retry::{ErrorClass, RetryDecision, RetryPolicy, WaitKind};
