//! Query/response handshake
//!
//! The device link allows one outstanding query at a time. [`SyncGate`] owns
//! the single completion slot: a handshake arms it, sends its query and waits
//! (bounded) for the receiver to post exactly one completion through a
//! [`CompletionSignal`]. Every handshake runs inside a [`SyncSession`], which
//! holds the gate's owner lock, so two handshakes never interleave.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard as StdMutexGuard};
use std::time::Duration;

use podsync_core::{MessageKind, PodsyncResult, SyncError};
use tokio::sync::{oneshot, Mutex, MutexGuard, Notify};
use tracing::{debug, warn};

// ----------------------------------------------------------------------------
// Sync State
// ----------------------------------------------------------------------------

#[derive(Debug, Default)]
struct SyncState {
    in_flight: AtomicBool,
    slot: StdMutex<Option<oneshot::Sender<()>>>,
    completed: AtomicU64,
    stray: AtomicU64,
    armed: Notify,
}

impl SyncState {
    fn slot(&self) -> StdMutexGuard<'_, Option<oneshot::Sender<()>>> {
        // A panic while holding the slot cannot leave it half-written
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn arm(&self) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        let mut slot = self.slot();
        if slot.replace(tx).is_some() {
            warn!("Sync slot was still armed; previous waiter dropped");
        }
        self.in_flight.store(true, Ordering::SeqCst);
        self.armed.notify_waiters();
        rx
    }

    fn disarm(&self) {
        let mut slot = self.slot();
        slot.take();
        self.in_flight.store(false, Ordering::SeqCst);
    }
}

/// Clears the slot however the handshake ends
struct Disarm<'a>(&'a SyncState);

impl Drop for Disarm<'_> {
    fn drop(&mut self) {
        self.0.disarm();
    }
}

// ----------------------------------------------------------------------------
// Completion Signal
// ----------------------------------------------------------------------------

/// Handle the receiver uses to report that the outstanding query was answered
#[derive(Debug, Clone)]
pub struct CompletionSignal {
    state: Arc<SyncState>,
}

impl CompletionSignal {
    /// Post one completion; returns `false` when nothing was waiting
    pub fn complete(&self) -> bool {
        let sender = self.state.slot().take();
        match sender {
            Some(tx) => {
                self.state.completed.fetch_add(1, Ordering::SeqCst);
                // The waiter may have timed out between take and send; that is harmless
                let _ = tx.send(());
                true
            }
            None => {
                self.state.stray.fetch_add(1, Ordering::SeqCst);
                debug!("Ignoring completion with no query in flight");
                false
            }
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.state.in_flight.load(Ordering::SeqCst)
    }
}

// ----------------------------------------------------------------------------
// Sync Gate
// ----------------------------------------------------------------------------

/// Controller-owned handshake primitive
#[derive(Debug)]
pub struct SyncGate {
    owner: Mutex<()>,
    state: Arc<SyncState>,
    timeout: Duration,
}

impl SyncGate {
    pub fn new(timeout: Duration) -> Self {
        Self {
            owner: Mutex::new(()),
            state: Arc::new(SyncState::default()),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn signal(&self) -> CompletionSignal {
        CompletionSignal {
            state: self.state.clone(),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.state.in_flight.load(Ordering::SeqCst)
    }

    /// Resolve once a handshake is armed and waiting for its response
    pub async fn wait_in_flight(&self) {
        loop {
            let armed = self.state.armed.notified();
            if self.is_in_flight() {
                return;
            }
            armed.await;
        }
    }

    /// Completions that arrived with nothing in flight
    pub fn stray_completions(&self) -> u64 {
        self.state.stray.load(Ordering::SeqCst)
    }

    /// Completions that released a waiting handshake
    pub fn completed(&self) -> u64 {
        self.state.completed.load(Ordering::SeqCst)
    }

    /// Drop the pending completion so the current waiter fails as abandoned
    pub fn cancel(&self) {
        if self.state.slot().take().is_some() {
            debug!("Cancelled in-flight handshake");
        }
    }

    /// Become the sync owner; waits for any other session to finish
    pub async fn session(&self) -> SyncSession<'_> {
        let owner = self.owner.lock().await;
        SyncSession {
            gate: self,
            _owner: owner,
        }
    }
}

/// Exclusive right to run handshakes on a gate
pub struct SyncSession<'a> {
    gate: &'a SyncGate,
    _owner: MutexGuard<'a, ()>,
}

impl SyncSession<'_> {
    /// Arm the slot, run `send`, then wait for the matching completion
    ///
    /// The slot is armed before sending so a response that races the send is
    /// still caught. The slot is cleared on every exit path.
    pub async fn handshake<F>(&self, query: MessageKind, send: F) -> PodsyncResult<()>
    where
        F: Future<Output = PodsyncResult<()>>,
    {
        let state = &*self.gate.state;
        let completion = state.arm();
        let _disarm = Disarm(state);

        send.await?;

        match tokio::time::timeout(self.gate.timeout, completion).await {
            Ok(Ok(())) => {
                debug!(query = %query, "Handshake complete");
                Ok(())
            }
            Ok(Err(_)) => Err(SyncError::Abandoned {
                query: query.to_string(),
            }
            .into()),
            Err(_) => {
                warn!(query = %query, "No response before timeout");
                Err(SyncError::Timeout {
                    query: query.to_string(),
                    duration_ms: self.gate.timeout.as_millis() as u64,
                }
                .into())
            }
        }
    }
}
