//! Tracking for fire-and-forget work
//!
//! Sends that the caller does not wait for still run as tracked tasks, so
//! tests and shutdown can wait for the link to go quiet with
//! [`TaskSet::settle`].

use std::future::Future;
use std::sync::Mutex;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::warn;

#[derive(Debug, Default)]
pub struct TaskSet {
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl TaskSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn handles(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.handles.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Spawn a tracked task, pruning ones that already finished
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task);
        let mut handles = self.handles();
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    /// Tasks not yet observed as finished
    pub fn pending(&self) -> usize {
        self.handles().iter().filter(|h| !h.is_finished()).count()
    }

    /// Wait until every tracked task, including ones spawned meanwhile, is done
    pub async fn settle(&self) {
        loop {
            let batch: Vec<_> = self.handles().drain(..).collect();
            if batch.is_empty() {
                return;
            }
            for result in join_all(batch).await {
                if let Err(e) = result {
                    if e.is_panic() {
                        warn!("Background send panicked: {}", e);
                    }
                }
            }
        }
    }
}
