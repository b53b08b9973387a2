//! Controller handle
//!
//! [`Controller`] is a cheap, cloneable handle over the shared board, the sync
//! gate, the notification hub and the device link. The operations themselves
//! live in `mutator`, `bulk` and `selection`; this module holds the plumbing
//! they share: activity gating, inline and fire-and-forget sends, and task
//! detachment.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use podsync_core::{
    Message, MessageFactory, PodsyncConfig, PodsyncResult, StatusEvent, Transport,
};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::board::SharedBoard;
use crate::notify::NotificationHub;
use crate::outbound::Outbound;
use crate::sync_gate::{CompletionSignal, SyncGate, SyncSession};
use crate::tasks::TaskSet;

pub(crate) struct Inner {
    pub(crate) config: PodsyncConfig,
    pub(crate) board: SharedBoard,
    pub(crate) gate: SyncGate,
    pub(crate) hub: NotificationHub,
    pub(crate) tasks: TaskSet,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) factory: Arc<dyn MessageFactory>,
    pub(crate) started: AtomicBool,
}

/// Device synchronization controller
#[derive(Clone)]
pub struct Controller {
    inner: Arc<Inner>,
}

impl Controller {
    pub(crate) fn from_inner(inner: Inner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Begin accepting operations
    pub fn start(&self) {
        if !self.inner.started.swap(true, Ordering::SeqCst) {
            info!(transport = self.inner.transport.name(), "Controller started");
        }
    }

    /// Stop accepting operations; an in-flight handshake fails as abandoned
    pub fn stop(&self) {
        if self.inner.started.swap(false, Ordering::SeqCst) {
            self.inner.gate.cancel();
            info!("Controller stopped");
        }
    }

    pub fn is_started(&self) -> bool {
        self.inner.started.load(Ordering::SeqCst)
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn config(&self) -> &PodsyncConfig {
        &self.inner.config
    }

    pub fn board(&self) -> &SharedBoard {
        &self.inner.board
    }

    pub fn gate(&self) -> &SyncGate {
        &self.inner.gate
    }

    pub fn completion_signal(&self) -> CompletionSignal {
        self.inner.gate.signal()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.inner.hub.subscribe()
    }

    // ------------------------------------------------------------------------
    // Scheduling
    // ------------------------------------------------------------------------

    /// Run an operation as its own task and hand back the join handle
    ///
    /// ```ignore
    /// let scan = controller.detach(|c| async move { c.query_all_presets().await });
    /// ```
    pub fn detach<F, Fut>(&self, operation: F) -> JoinHandle<PodsyncResult<()>>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: Future<Output = PodsyncResult<()>> + Send + 'static,
    {
        tokio::spawn(operation(self.clone()))
    }

    /// Wait until every fire-and-forget send, and the response of every
    /// fire-and-forget query, has finished
    pub async fn settle(&self) {
        self.inner.tasks.settle().await;
    }

    // ------------------------------------------------------------------------
    // Plumbing shared by the operations
    // ------------------------------------------------------------------------

    pub(crate) fn factory(&self) -> &dyn MessageFactory {
        &*self.inner.factory
    }

    pub(crate) fn publish(&self, event: StatusEvent) {
        self.inner.hub.publish(event);
    }

    /// Send one message on the configured route and wait for the transport
    pub(crate) async fn transmit(&self, message: Message) -> PodsyncResult<()> {
        let route = self.inner.config.route;
        debug!(kind = %message.kind(), bytes = message.frame().len(), "Sending");
        self.inner
            .transport
            .send(message, route.channel, route.sub_channel)
            .await
    }

    /// Send already-built messages in order without waiting; failures are logged
    ///
    /// Queries still go through the sync gate: the task waits for its own
    /// session and consumes the response, so the caller never blocks on it.
    pub(crate) fn dispatch(&self, outbound: Outbound) {
        if outbound.is_empty() {
            return;
        }
        let controller = self.clone();
        self.inner.tasks.spawn(async move {
            for message in outbound {
                let kind = message.kind();
                let sent = if message.is_query() {
                    let session = controller.gate().session().await;
                    if !controller.is_started() {
                        debug!(kind = %kind, "Controller stopped, dropping queued query");
                        return;
                    }
                    controller.exchange(&session, message).await
                } else {
                    controller.transmit(message).await
                };
                if let Err(e) = sent {
                    warn!(kind = %kind, "Fire-and-forget send failed: {}", e);
                }
            }
        });
    }

    /// Send a query inside `session` and wait for its response
    pub(crate) async fn exchange(
        &self,
        session: &SyncSession<'_>,
        query: Message,
    ) -> PodsyncResult<()> {
        session.handshake(query.kind(), self.transmit(query)).await
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("started", &self.is_started())
            .field("layout", &self.inner.config.layout)
            .field("transport", &self.inner.transport.name())
            .finish()
    }
}
