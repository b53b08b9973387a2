//! Device-wide scans and status queries
//!
//! Scans walk every set (or every preset of every set) one handshake at a
//! time, moving the board's selection along with the query so the receiver
//! files each response under the right indices. Progress is published after
//! each completed handshake.

use podsync_core::{PodsyncResult, StatusEvent, CURRENT_PRESET, CURRENT_SET};
use smallvec::smallvec;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::controller::Controller;
use crate::sync_gate::SyncSession;

/// Progress after set `index` of `sets` completes
pub fn set_progress(index: u32, sets: u32) -> u32 {
    ((index + 1) * 100) / sets
}

/// Progress after preset `preset` of set `set` completes
pub fn preset_progress(set: u32, preset: u32, sets: u32, presets_per_set: u32) -> u32 {
    ((set * presets_per_set + preset + 1) * 100) / (sets * presets_per_set)
}

impl Controller {
    // ------------------------------------------------------------------------
    // Initialization
    // ------------------------------------------------------------------------

    /// Full device sync: all sets, all presets, the current ids, then the
    /// current preset; publishes `InitDone` at the end
    pub async fn init_device(&self) -> PodsyncResult<()> {
        if !self.is_started() {
            return Ok(());
        }

        info!("Initializing device state");
        {
            let session = self.gate().session().await;
            self.scan_sets(&session).await?;
            self.scan_presets(&session).await?;
            self.exchange(&session, self.factory().status_query_set_id()?)
                .await?;
            self.exchange(&session, self.factory().status_query_preset_id()?)
                .await?;
        }
        self.query_current_preset().await?;

        self.publish(StatusEvent::InitDone);
        info!("Device initialization complete");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Bulk scans
    // ------------------------------------------------------------------------

    pub async fn query_all_sets(&self) -> PodsyncResult<()> {
        if !self.is_started() {
            return Ok(());
        }
        let session = self.gate().session().await;
        self.scan_sets(&session).await
    }

    pub async fn query_all_presets(&self) -> PodsyncResult<()> {
        if !self.is_started() {
            return Ok(());
        }
        let session = self.gate().session().await;
        self.scan_presets(&session).await
    }

    pub fn query_all_sets_detached(&self) -> JoinHandle<PodsyncResult<()>> {
        self.detach(|controller| async move { controller.query_all_sets().await })
    }

    pub fn query_all_presets_detached(&self) -> JoinHandle<PodsyncResult<()>> {
        self.detach(|controller| async move { controller.query_all_presets().await })
    }

    async fn scan_sets(&self, session: &SyncSession<'_>) -> PodsyncResult<()> {
        let sets = u32::from(self.config().layout.number_set);
        debug!(sets, "Scanning sets");

        for set in 0..sets {
            self.board().lock().await.set_current_set(set as u8)?;

            self.exchange(session, self.factory().set_query(set)?).await?;

            let percent = set_progress(set, sets);
            self.publish(StatusEvent::progress(percent));
        }
        Ok(())
    }

    async fn scan_presets(&self, session: &SyncSession<'_>) -> PodsyncResult<()> {
        let layout = self.config().layout;
        let sets = u32::from(layout.number_set);
        let presets = u32::from(layout.preset_per_set);
        debug!(sets, presets, "Scanning presets");

        for set in 0..sets {
            self.board().lock().await.set_current_set(set as u8)?;
            for preset in 0..presets {
                self.board().lock().await.set_current_preset(preset as u8)?;

                let query = self.factory().preset_query(preset as u16, set as u16)?;
                self.exchange(session, query).await?;

                let percent = preset_progress(set, preset, sets, presets);
                self.publish(StatusEvent::progress(percent));
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Single queries
    // ------------------------------------------------------------------------

    /// Ask the device which set is current and wait for the answer
    pub async fn query_current_set_id(&self) -> PodsyncResult<()> {
        if !self.is_started() {
            return Ok(());
        }
        let session = self.gate().session().await;
        self.exchange(&session, self.factory().status_query_set_id()?)
            .await
    }

    /// Ask the device which preset is current and wait for the answer
    pub async fn query_current_preset_id(&self) -> PodsyncResult<()> {
        if !self.is_started() {
            return Ok(());
        }
        let session = self.gate().session().await;
        self.exchange(&session, self.factory().status_query_preset_id()?)
            .await
    }

    /// Request a preset without waiting for the response
    ///
    /// The query is handed to a background task that takes its own sync
    /// session, so it never overlaps another handshake. Send failures and
    /// timeouts are logged there; [`Controller::settle`] waits for it.
    pub async fn query_preset(&self, preset: u16, set: u16) -> PodsyncResult<()> {
        if !self.is_started() {
            return Ok(());
        }
        self.dispatch(smallvec![self.factory().preset_query(preset, set)?]);
        Ok(())
    }

    /// Request whatever preset is current on the device, without waiting
    pub async fn query_current_preset(&self) -> PodsyncResult<()> {
        self.query_preset(CURRENT_PRESET, CURRENT_SET).await
    }

    /// Re-request the selected preset; nothing happens without a selection
    pub async fn reload_preset(&self) -> PodsyncResult<()> {
        if !self.is_started() {
            return Ok(());
        }
        let selection = self.board().lock().await.selection();
        match selection {
            Some((set, preset)) => self.query_preset(u16::from(preset), u16::from(set)).await,
            None => {
                debug!("No current selection, nothing to reload");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_progress_values() {
        let values: Vec<u32> = (0..3).map(|i| set_progress(i, 3)).collect();
        assert_eq!(values, vec![33, 66, 100]);
    }

    #[test]
    fn test_preset_progress_reaches_100_on_last_unit() {
        let values: Vec<u32> = (0..2)
            .flat_map(|i| (0..2).map(move |j| preset_progress(i, j, 2, 2)))
            .collect();
        assert_eq!(values, vec![25, 50, 75, 100]);

        assert!(preset_progress(7, 62, 8, 64) < 100);
        assert_eq!(preset_progress(7, 63, 8, 64), 100);
    }
}
