//! Preset selection, saving, renaming and repositioning
//!
//! These operations first fetch the current preset through a full handshake
//! so the board reflects the device before anything is pushed back, then
//! announce the complete preset definition.

use podsync_core::{
    validate_preset_name, PodsyncResult, StatusEvent, CURRENT_PRESET, CURRENT_SET,
};
use tracing::{debug, info};

use crate::controller::Controller;
use crate::sync_gate::SyncSession;

impl Controller {
    /// Make (`preset`, `set`) the active preset on the device
    pub async fn select_preset(&self, preset: u8, set: u8) -> PodsyncResult<()> {
        if !self.is_started() {
            return Ok(());
        }

        let session = self.gate().session().await;
        self.board().lock().await.select(set, preset)?;
        info!(set, preset, "Selecting preset");

        let query = self
            .factory()
            .preset_query(u16::from(preset), u16::from(set))?;
        self.exchange(&session, query).await?;

        self.transmit(self.factory().set_change(set)?).await?;
        self.transmit(self.factory().preset_change(preset)?).await?;
        self.announce_current_preset().await
    }

    /// Store the board's current preset into its selected slot on the device
    pub async fn save_preset(&self) -> PodsyncResult<()> {
        if !self.is_started() {
            return Ok(());
        }

        let session = self.gate().session().await;
        self.fetch_current_preset(&session).await?;

        let (trigger, definition) = {
            let board = self.board().lock().await;
            let (set, preset) = match board.selection() {
                Some(selection) => selection,
                None => {
                    debug!("No current selection, nothing to save");
                    return Ok(());
                }
            };
            let snapshot = board.snapshot();
            (
                self.factory().save_trigger()?,
                self.factory()
                    .preset_definition(&snapshot, u16::from(preset), u16::from(set))?,
            )
        };

        info!("Saving current preset");
        self.transmit(trigger).await?;
        self.transmit(definition).await
    }

    /// Rename the current preset and push the result to the device
    pub async fn set_current_preset_name(&self, name: &str) -> PodsyncResult<()> {
        if !self.is_started() {
            return Ok(());
        }
        validate_preset_name(name)?;

        let session = self.gate().session().await;
        self.fetch_current_preset(&session).await?;

        let (definition, set, preset) = {
            let mut board = self.board().lock().await;
            let (set, preset) = match board.selection() {
                Some(selection) => selection,
                None => {
                    debug!("No current selection, nothing to rename");
                    return Ok(());
                }
            };
            let mut snapshot = board.snapshot();
            snapshot.name = name.to_string();
            let definition =
                self.factory()
                    .preset_definition(&snapshot, CURRENT_PRESET, CURRENT_SET)?;
            board.set_preset_name(set, preset, name)?;
            (definition, set, preset)
        };

        self.transmit(definition).await?;
        // Answered once this session is released
        self.query_current_preset().await?;

        self.publish(StatusEvent::PresetRenamed {
            set,
            preset,
            name: name.to_string(),
        });
        Ok(())
    }

    /// Move the item at `slot` within the chain
    pub async fn set_pedal_board_item_position(
        &self,
        slot: u32,
        pos: u16,
        kind: u8,
    ) -> PodsyncResult<()> {
        if !self.is_started() {
            return Ok(());
        }

        let session = self.gate().session().await;
        self.fetch_current_preset(&session).await?;

        let (definition, item) = {
            let mut board = self.board().lock().await;
            let mut snapshot = board.snapshot();
            let item = match snapshot.items.iter_mut().find(|item| item.slot() == slot) {
                Some(item) => {
                    item.set_position(pos, kind);
                    item.clone()
                }
                None => {
                    debug!(slot, "Item not found, ignoring");
                    return Ok(());
                }
            };
            let definition =
                self.factory()
                    .preset_definition(&snapshot, CURRENT_PRESET, CURRENT_SET)?;
            if let Some(target) = board.item_mut(slot) {
                *target = item.clone();
            }
            (definition, item)
        };

        self.transmit(definition).await?;
        self.publish(StatusEvent::ItemChanged { item });
        Ok(())
    }

    async fn fetch_current_preset(&self, session: &SyncSession<'_>) -> PodsyncResult<()> {
        let query = self.factory().preset_query(CURRENT_PRESET, CURRENT_SET)?;
        self.exchange(session, query).await
    }

    /// Send the full current preset addressed at the device's current slot
    async fn announce_current_preset(&self) -> PodsyncResult<()> {
        let snapshot = self.board().snapshot().await;
        let definition =
            self.factory()
                .preset_definition(&snapshot, CURRENT_PRESET, CURRENT_SET)?;
        self.transmit(definition).await
    }
}
