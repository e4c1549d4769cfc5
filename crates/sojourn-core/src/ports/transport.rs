//! Transport port - delivers notifications to a chat destination.

use async_trait::async_trait;

use crate::domain::{ChannelId, MessageRef, OutgoingMessage, TransportError};

/// External message transport.
///
/// Errors on this path are never fatal to the caller: the activity has
/// already been processed when a send is attempted.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        destination: ChannelId,
        message: OutgoingMessage,
    ) -> Result<MessageRef, TransportError>;
}
