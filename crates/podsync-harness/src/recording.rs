//! Recording transport
//!
//! Keeps every message the controller sends, in order, with its channel
//! addressing. It never answers queries; pair it with a controller whose
//! handshakes are expected to time out, or with operations that do not wait.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use podsync_core::{Message, MessageKind, PodsyncResult, Transport, TransportError};
use tracing::debug;

/// One recorded send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub message: Message,
    pub channel: u8,
    pub sub_channel: u8,
}

#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<SentMessage>>,
    failing: AtomicBool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self) -> MutexGuard<'_, Vec<SentMessage>> {
        self.sent.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make subsequent sends fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.log().clone()
    }

    /// Kinds of everything sent so far, in order
    pub fn kinds(&self) -> Vec<MessageKind> {
        self.log().iter().map(|s| s.message.kind()).collect()
    }

    pub fn count_where(&self, predicate: impl Fn(&MessageKind) -> bool) -> usize {
        self.log()
            .iter()
            .filter(|s| predicate(&s.message.kind()))
            .count()
    }

    pub fn len(&self) -> usize {
        self.log().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log().is_empty()
    }

    pub fn clear(&self) {
        self.log().clear();
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, message: Message, channel: u8, sub_channel: u8) -> PodsyncResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TransportError::SendFailed {
                reason: format!("recording transport set to fail ({})", message.kind()),
            }
            .into());
        }
        debug!(kind = %message.kind(), channel, sub_channel, "Recorded send");
        self.log().push(SentMessage {
            message,
            channel,
            sub_channel,
        });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
