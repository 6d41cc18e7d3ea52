//! The delivery capability consumed by the batch sender.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::DeliveryError;

/// Delivers one logical payload to one target.
///
/// Implementations should return [`DeliveryError::Cancelled`] if they observe
/// `cancel` while waiting on the remote side. They are never required to;
/// the sender checks the token itself between attempts.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Deliver to `target_id`.
    async fn deliver(
        &self,
        target_id: u32,
        cancel: &CancellationToken,
    ) -> Result<(), DeliveryError>;
}

#[async_trait]
impl<C: DeliveryChannel + ?Sized> DeliveryChannel for Arc<C> {
    async fn deliver(
        &self,
        target_id: u32,
        cancel: &CancellationToken,
    ) -> Result<(), DeliveryError> {
        (**self).deliver(target_id, cancel).await
    }
}
