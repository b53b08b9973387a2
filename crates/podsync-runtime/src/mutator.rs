//! User-facing mutations
//!
//! Every mutation follows one sequence: bail out if the controller is
//! stopped, take the board lock, resolve the target, apply the parsed value
//! to a copy, build the outbound messages from that copy, commit it to the
//! board, release the lock, then send and notify. A rejected value or a
//! failed message build leaves the board untouched.
//!
//! Missing items and parameters are silent no-ops, and so are role ids
//! outside their role's domain. Missing tone descriptors and rejected values
//! are errors. The lock is released on every path because the guard never
//! outlives the block that resolves the target.

use podsync_core::{
    ItemAddress, ParameterOwner, ParameterScope, PodsyncError, PodsyncResult, StatusEvent,
    ToneDescriptor, ToneTarget, CURRENT_PRESET, CURRENT_SET,
};
use smallvec::smallvec;
use tracing::debug;

use crate::board::BoardGuard;
use crate::controller::Controller;
use crate::outbound::{Outbound, OutboundPlan};

/// Which parameter bound a change applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Min,
    Max,
}

#[derive(Debug, Clone, Copy)]
enum ToneField {
    Class,
    Mode,
    Topology,
}

impl Controller {
    // ------------------------------------------------------------------------
    // Parameter values
    // ------------------------------------------------------------------------

    /// Set the current value of parameter `pid` on the item at `slot`
    pub async fn set_pedal_board_item_parameter_value(
        &self,
        slot: u32,
        pid: u32,
        value: &str,
    ) -> PodsyncResult<()> {
        if !self.is_started() {
            return Ok(());
        }

        let (outbound, parameter) = {
            let mut board = self.board().lock().await;
            let param = match board.parameter_mut(slot, pid) {
                Some(param) => param,
                None => {
                    debug!(slot, pid, "Parameter not found, ignoring");
                    return Ok(());
                }
            };
            let mut updated = param.clone();
            updated.set_value_current(value)?;
            let outbound =
                OutboundPlan::for_parameter(&updated).build(self.factory(), slot, &updated)?;
            *param = updated.clone();
            (outbound, updated)
        };

        self.dispatch(outbound);
        self.publish(StatusEvent::ParameterChanged {
            owner: ParameterOwner::Item { slot },
            parameter,
        });
        Ok(())
    }

    pub async fn set_amp_parameter_value(&self, id: u32, pid: u32, value: &str) -> PodsyncResult<()> {
        match self.role_slot(ItemAddress::amp(id)) {
            Some(slot) => {
                self.set_pedal_board_item_parameter_value(slot, pid, value)
                    .await
            }
            None => Ok(()),
        }
    }

    pub async fn set_pedal_parameter_value(
        &self,
        id: u32,
        pid: u32,
        value: &str,
    ) -> PodsyncResult<()> {
        match self.role_slot(ItemAddress::pedal(id)) {
            Some(slot) => {
                self.set_pedal_board_item_parameter_value(slot, pid, value)
                    .await
            }
            None => Ok(()),
        }
    }

    /// Cabinet parameters always use the cabinet-scoped message
    pub async fn set_cab_parameter_value(&self, id: u32, pid: u32, value: &str) -> PodsyncResult<()> {
        if !self.is_started() {
            return Ok(());
        }
        let slot = match self.role_slot(ItemAddress::cab(id)) {
            Some(slot) => slot,
            None => return Ok(()),
        };

        let (message, parameter) = {
            let mut board = self.board().lock().await;
            let param = match board.parameter_mut(slot, pid) {
                Some(param) => param,
                None => {
                    debug!(cab = id, pid, "Cab parameter not found, ignoring");
                    return Ok(());
                }
            };
            let mut updated = param.clone();
            updated.set_value_current(value)?;
            let message = self
                .factory()
                .parameter_change(ParameterScope::Cabinet { slot }, &updated)?;
            *param = updated.clone();
            (message, updated)
        };

        self.dispatch(smallvec![message]);
        self.publish(StatusEvent::ParameterChanged {
            owner: ParameterOwner::Item { slot },
            parameter,
        });
        Ok(())
    }

    /// Set a parameter owned by the board itself
    pub async fn set_pedal_board_parameter_value(&self, pid: u32, value: &str) -> PodsyncResult<()> {
        if !self.is_started() {
            return Ok(());
        }

        let (message, parameter) = {
            let mut board = self.board().lock().await;
            let param = match board.board_parameter_mut(pid) {
                Some(param) => param,
                None => {
                    debug!(pid, "Board parameter not found, ignoring");
                    return Ok(());
                }
            };
            let mut updated = param.clone();
            updated.set_value_current(value)?;
            let message = self
                .factory()
                .parameter_change(ParameterScope::Board, &updated)?;
            *param = updated.clone();
            (message, updated)
        };

        self.dispatch(smallvec![message]);
        self.publish(StatusEvent::ParameterChanged {
            owner: ParameterOwner::Board,
            parameter,
        });
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Parameter bounds
    // ------------------------------------------------------------------------

    pub async fn set_pedal_board_item_parameter_value_min(
        &self,
        slot: u32,
        pid: u32,
        value: &str,
    ) -> PodsyncResult<()> {
        self.set_parameter_bound(Bound::Min, slot, pid, value).await
    }

    pub async fn set_pedal_board_item_parameter_value_max(
        &self,
        slot: u32,
        pid: u32,
        value: &str,
    ) -> PodsyncResult<()> {
        self.set_parameter_bound(Bound::Max, slot, pid, value).await
    }

    /// Set the min or max sweep bound of parameter `pid` on the item at `slot`
    pub async fn set_parameter_bound(
        &self,
        bound: Bound,
        slot: u32,
        pid: u32,
        value: &str,
    ) -> PodsyncResult<()> {
        if !self.is_started() {
            return Ok(());
        }

        let (message, parameter) = {
            let mut board = self.board().lock().await;
            let param = match board.parameter_mut(slot, pid) {
                Some(param) => param,
                None => {
                    debug!(slot, pid, ?bound, "Parameter not found, ignoring");
                    return Ok(());
                }
            };
            let mut updated = param.clone();
            let message = match bound {
                Bound::Min => {
                    updated.set_value_min(value)?;
                    self.factory().parameter_change_min(slot, &updated)?
                }
                Bound::Max => {
                    updated.set_value_max(value)?;
                    self.factory().parameter_change_max(slot, &updated)?
                }
            };
            *param = updated.clone();
            (message, updated)
        };

        self.dispatch(smallvec![message]);
        self.publish(StatusEvent::ParameterChanged {
            owner: ParameterOwner::Item { slot },
            parameter,
        });
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Item state
    // ------------------------------------------------------------------------

    pub async fn set_pedal_board_item_active(&self, slot: u32, active: bool) -> PodsyncResult<()> {
        if !self.is_started() {
            return Ok(());
        }

        let (message, item) = {
            let mut board = self.board().lock().await;
            let item = match board.item_mut(slot) {
                Some(item) => item,
                None => {
                    debug!(slot, "Item not found, ignoring");
                    return Ok(());
                }
            };
            let mut updated = item.clone();
            updated.set_active(active);
            let message = self.factory().active_change(&updated)?;
            *item = updated.clone();
            (message, updated)
        };

        self.dispatch(smallvec![message]);
        self.publish(StatusEvent::ItemChanged { item });
        Ok(())
    }

    pub async fn set_amp_active(&self, id: u32, active: bool) -> PodsyncResult<()> {
        match self.role_slot(ItemAddress::amp(id)) {
            Some(slot) => self.set_pedal_board_item_active(slot, active).await,
            None => Ok(()),
        }
    }

    pub async fn set_pedal_active(&self, id: u32, active: bool) -> PodsyncResult<()> {
        match self.role_slot(ItemAddress::pedal(id)) {
            Some(slot) => self.set_pedal_board_item_active(slot, active).await,
            None => Ok(()),
        }
    }

    /// Change an item's type/model and ask the device to resend the preset
    ///
    /// The resend request is answered in the background once the sync gate
    /// is free.
    pub async fn set_pedal_board_item_type(
        &self,
        slot: u32,
        fx_type: &str,
        fx_model: &str,
    ) -> PodsyncResult<()> {
        if !self.is_started() {
            return Ok(());
        }

        let (outbound, item) = {
            let mut board = self.board().lock().await;
            let item = match board.item_mut(slot) {
                Some(item) => item,
                None => {
                    debug!(slot, "Item not found, ignoring");
                    return Ok(());
                }
            };
            let mut updated = item.clone();
            updated.set_type(fx_type, fx_model)?;
            let outbound: Outbound = smallvec![
                self.factory().type_change(&updated)?,
                self.factory().preset_query(CURRENT_PRESET, CURRENT_SET)?,
            ];
            *item = updated.clone();
            (outbound, updated)
        };

        self.dispatch(outbound);
        self.publish(StatusEvent::ItemChanged { item });
        Ok(())
    }

    pub async fn set_amp_type(&self, id: u32, name: &str) -> PodsyncResult<()> {
        match self.role_slot(ItemAddress::amp(id)) {
            Some(slot) => self.set_pedal_board_item_type(slot, name, "").await,
            None => Ok(()),
        }
    }

    pub async fn set_cab_type(&self, id: u32, name: &str) -> PodsyncResult<()> {
        match self.role_slot(ItemAddress::cab(id)) {
            Some(slot) => self.set_pedal_board_item_type(slot, name, "").await,
            None => Ok(()),
        }
    }

    pub async fn set_pedal_type(&self, id: u32, fx_type: &str, fx_model: &str) -> PodsyncResult<()> {
        match self.role_slot(ItemAddress::pedal(id)) {
            Some(slot) => {
                self.set_pedal_board_item_type(slot, fx_type, fx_model)
                    .await
            }
            None => Ok(()),
        }
    }

    /// Slot of a role address, or `None` when the id is outside its role
    fn role_slot(&self, address: ItemAddress) -> Option<u32> {
        if address.is_valid(&self.config().layout) {
            Some(address.slot())
        } else {
            debug!(%address, "Item id outside its role, ignoring");
            None
        }
    }

    // ------------------------------------------------------------------------
    // Tone descriptors
    // ------------------------------------------------------------------------

    pub async fn set_dt_class(&self, target: ToneTarget, value: &str) -> PodsyncResult<()> {
        self.set_tone_field(target, ToneField::Class, value).await
    }

    pub async fn set_dt_mode(&self, target: ToneTarget, value: &str) -> PodsyncResult<()> {
        self.set_tone_field(target, ToneField::Mode, value).await
    }

    pub async fn set_dt_topology(&self, target: ToneTarget, value: &str) -> PodsyncResult<()> {
        self.set_tone_field(target, ToneField::Topology, value).await
    }

    async fn set_tone_field(
        &self,
        target: ToneTarget,
        field: ToneField,
        value: &str,
    ) -> PodsyncResult<()> {
        if !self.is_started() {
            return Ok(());
        }

        let (message, tone) = {
            let mut board = self.board().lock().await;
            let tone = resolve_tone(&mut board, target)?;
            let mut updated = tone.clone();
            let message = match field {
                ToneField::Class => {
                    updated.set_class(value)?;
                    self.factory().tone_class_change(&updated)?
                }
                ToneField::Mode => {
                    updated.set_mode(value)?;
                    self.factory().tone_mode_change(&updated)?
                }
                ToneField::Topology => {
                    updated.set_topology(value)?;
                    self.factory().tone_topology_change(&updated)?
                }
            };
            *tone = updated.clone();
            (message, updated)
        };

        self.dispatch(smallvec![message]);
        self.publish(StatusEvent::ToneChanged { tone });
        Ok(())
    }
}

fn resolve_tone<'b>(
    board: &'b mut BoardGuard<'_>,
    target: ToneTarget,
) -> PodsyncResult<&'b mut ToneDescriptor> {
    match target {
        ToneTarget::Id(id) => board
            .tone_mut(id)
            .ok_or_else(|| PodsyncError::descriptor_not_found(id)),
        ToneTarget::Amp(amp_id) => board
            .tone_for_amp_mut(amp_id)
            .ok_or_else(|| PodsyncError::descriptor_not_found_for_amp(amp_id)),
    }
}
