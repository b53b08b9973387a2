//! Transport abstraction
//!
//! The link to the device is half-duplex and unacknowledged: a transport
//! accepts a frame plus its channel addressing and reports only whether it
//! could hand the bytes off. Responses come back through a separate receiver,
//! which signals the runtime's sync gate on its own.

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::PodsyncResult;
use crate::message::Message;

// ----------------------------------------------------------------------------
// Transport Trait
// ----------------------------------------------------------------------------

/// Outbound side of the device link
///
/// Implementations must tolerate concurrent `send` calls; the controller does
/// not serialize fire-and-forget traffic.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transmit one message on the given channel/sub-channel
    async fn send(&self, message: Message, channel: u8, sub_channel: u8) -> PodsyncResult<()>;

    /// Human-readable name used in logs
    fn name(&self) -> &'static str {
        "transport"
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, message: Message, channel: u8, sub_channel: u8) -> PodsyncResult<()> {
        (**self).send(message, channel, sub_channel).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
