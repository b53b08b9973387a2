//! Shared board
//!
//! The pedal board is the only shared mutable state in the controller. It sits
//! behind one async mutex; [`BoardGuard`] is the scoped handle every operation
//! reads and writes through, and it records its own release so lock hygiene
//! can be observed from the outside.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use podsync_core::{PedalBoard, PresetSnapshot};
use tokio::sync::{Mutex, MutexGuard};

// ----------------------------------------------------------------------------
// Lock Statistics
// ----------------------------------------------------------------------------

/// Acquire/release counters for the board lock
#[derive(Debug, Default)]
pub struct LockStats {
    acquired: AtomicU64,
    released: AtomicU64,
}

impl LockStats {
    pub fn acquired(&self) -> u64 {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> u64 {
        self.released.load(Ordering::SeqCst)
    }

    /// Guards currently alive
    pub fn held(&self) -> u64 {
        self.acquired().saturating_sub(self.released())
    }
}

// ----------------------------------------------------------------------------
// Shared Board
// ----------------------------------------------------------------------------

/// Cloneable handle to the single board instance
#[derive(Debug, Clone)]
pub struct SharedBoard {
    inner: Arc<Mutex<PedalBoard>>,
    stats: Arc<LockStats>,
}

impl SharedBoard {
    pub fn new(board: PedalBoard) -> Self {
        Self {
            inner: Arc::new(Mutex::new(board)),
            stats: Arc::new(LockStats::default()),
        }
    }

    /// Take the exclusive lock; released when the guard drops
    pub async fn lock(&self) -> BoardGuard<'_> {
        let guard = self.inner.lock().await;
        self.stats.acquired.fetch_add(1, Ordering::SeqCst);
        BoardGuard {
            guard,
            stats: &self.stats,
        }
    }

    pub fn stats(&self) -> &LockStats {
        &self.stats
    }

    /// Copy of the current preset taken under the lock
    pub async fn snapshot(&self) -> PresetSnapshot {
        self.lock().await.snapshot()
    }
}

/// Scoped exclusive access to the board
pub struct BoardGuard<'a> {
    guard: MutexGuard<'a, PedalBoard>,
    stats: &'a LockStats,
}

impl Deref for BoardGuard<'_> {
    type Target = PedalBoard;

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl DerefMut for BoardGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.guard
    }
}

impl Drop for BoardGuard<'_> {
    fn drop(&mut self) {
        self.stats.released.fetch_add(1, Ordering::SeqCst);
    }
}
