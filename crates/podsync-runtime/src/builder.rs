//! Controller Builder API
//!
//! The receiver that answers queries needs the board and the completion
//! signal, while the controller needs the transport; the builder hands out
//! the first two before the transport is registered so both sides can be
//! wired from the same parts.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use podsync_core::{
    FrameFactory, MessageFactory, PedalBoard, PodsyncConfig, PodsyncError, PodsyncResult,
    Transport,
};
use tracing::info;

use crate::board::SharedBoard;
use crate::controller::{Controller, Inner};
use crate::notify::NotificationHub;
use crate::sync_gate::{CompletionSignal, SyncGate};
use crate::tasks::TaskSet;

// ----------------------------------------------------------------------------
// Controller Builder
// ----------------------------------------------------------------------------

/// Builder for a [`Controller`]
pub struct ControllerBuilder {
    config: PodsyncConfig,
    board: SharedBoard,
    gate: SyncGate,
    transport: Option<Arc<dyn Transport>>,
    factory: Arc<dyn MessageFactory>,
    start: bool,
}

impl ControllerBuilder {
    /// Create a builder with a fresh board shaped by `config.layout`
    pub fn new(config: PodsyncConfig) -> Self {
        let board = SharedBoard::new(PedalBoard::new(config.layout));
        let gate = SyncGate::new(config.sync.handshake_timeout());
        Self {
            config,
            board,
            gate,
            transport: None,
            factory: Arc::new(FrameFactory::new()),
            start: false,
        }
    }

    /// Board the controller will own
    pub fn board(&self) -> SharedBoard {
        self.board.clone()
    }

    /// Signal the receiver posts completions on
    pub fn completion_signal(&self) -> CompletionSignal {
        self.gate.signal()
    }

    /// Register the outbound link
    pub fn transport<T>(mut self, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Register an already-shared outbound link
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replace the default [`FrameFactory`]
    pub fn factory<F>(mut self, factory: F) -> Self
    where
        F: MessageFactory + 'static,
    {
        self.factory = Arc::new(factory);
        self
    }

    /// Start the controller as part of `build`
    pub fn started(mut self) -> Self {
        self.start = true;
        self
    }

    /// Validate the configuration and assemble the controller
    pub fn build(self) -> PodsyncResult<Controller> {
        self.config.validate()?;
        let transport = self
            .transport
            .ok_or_else(|| PodsyncError::configuration("a transport is required"))?;

        info!(
            sets = self.config.layout.number_set,
            presets = self.config.layout.preset_per_set,
            timeout_ms = self.config.sync.handshake_timeout_ms,
            "Building controller"
        );

        let hub = NotificationHub::new(self.config.event_capacity());
        let controller = Controller::from_inner(Inner {
            config: self.config,
            board: self.board,
            gate: self.gate,
            hub,
            tasks: TaskSet::new(),
            transport,
            factory: self.factory,
            started: AtomicBool::new(false),
        });
        if self.start {
            controller.start();
        }
        Ok(controller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use podsync_core::{DeviceLayout, Message, StatusEvent};
    use tokio::sync::broadcast;

    struct NullTransport;

    #[async_trait]
    impl Transport for NullTransport {
        async fn send(&self, _: Message, _: u8, _: u8) -> PodsyncResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_transport_is_required() {
        let err = ControllerBuilder::new(PodsyncConfig::testing())
            .build()
            .unwrap_err();
        assert!(matches!(err, PodsyncError::Configuration { .. }));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PodsyncConfig::testing().with_layout(DeviceLayout::new(2, 0));
        let result = ControllerBuilder::new(config).transport(NullTransport).build();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_early_handles_share_controller_state() {
        let builder = ControllerBuilder::new(PodsyncConfig::testing());
        let board = builder.board();
        let signal = builder.completion_signal();
        let controller = builder.transport(NullTransport).started().build().unwrap();

        assert!(controller.is_started());
        board.lock().await.set_current_set(1).unwrap();
        assert_eq!(controller.board().lock().await.current_set(), Some(1));

        assert!(!signal.complete());
        assert_eq!(controller.gate().stray_completions(), 1);
    }

    #[tokio::test]
    async fn test_event_channel_holds_a_full_init() {
        let mut config = PodsyncConfig::default();
        config.channels.event_buffer_size = 16;
        let controller = ControllerBuilder::new(config)
            .transport(NullTransport)
            .build()
            .unwrap();
        let mut events = controller.subscribe();

        let expected = controller.config().layout.init_event_count();
        for _ in 0..expected {
            controller.publish(StatusEvent::InitDone);
        }

        let mut received = 0;
        loop {
            match events.try_recv() {
                Ok(_) => received += 1,
                Err(broadcast::error::TryRecvError::Empty) => break,
                Err(e) => panic!("lost events: {e}"),
            }
        }
        assert_eq!(received, expected);
    }
}
