//! Status events published to observers

use crate::model::{Item, Parameter, ToneDescriptor};

/// Where a changed parameter lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ParameterOwner {
    Item { slot: u32 },
    Board,
}

/// Event emitted by the controller after the board lock is released
///
/// Payloads are snapshots; observers never touch the live board.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum StatusEvent {
    /// Device initialization finished
    InitDone,
    /// Bulk scan progress, 0 to 100
    Progress { percent: u8 },
    /// A parameter value or bound changed
    ParameterChanged {
        owner: ParameterOwner,
        parameter: Parameter,
    },
    /// Item state (active flag, type, position) changed
    ItemChanged { item: Item },
    /// Tone descriptor changed
    ToneChanged { tone: ToneDescriptor },
    /// The current preset was renamed
    PresetRenamed { set: u8, preset: u8, name: String },
}

impl StatusEvent {
    pub fn progress(percent: u32) -> Self {
        StatusEvent::Progress {
            percent: percent.min(100) as u8,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StatusEvent::InitDone => "init-done",
            StatusEvent::Progress { .. } => "progress",
            StatusEvent::ParameterChanged { .. } => "parameter-changed",
            StatusEvent::ItemChanged { .. } => "item-changed",
            StatusEvent::ToneChanged { .. } => "tone-changed",
            StatusEvent::PresetRenamed { .. } => "preset-renamed",
        }
    }
}
