//! Podsync Core
//!
//! Device model, item addressing, protocol message shapes and the transport
//! seam for a controller that keeps an in-memory pedal board consistent with a
//! multi-bank guitar processor over a half-duplex link. The async runtime that
//! drives all of this lives in `podsync-runtime`.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod addressing;
pub mod config;
pub mod errors;
pub mod events;
pub mod message;
pub mod model;
pub mod transport;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use addressing::{
    amp_slot, cab_slot, pedal_slot, slot_count, ItemAddress, ItemRole, AMP_COUNT, CURRENT_PRESET,
    CURRENT_SET, RESERVED_SLOTS,
};
pub use config::{ChannelConfig, DeviceLayout, PodsyncConfig, RouteConfig, SyncConfig};
pub use errors::{PodsyncError, PodsyncResult, SyncError, TransportError, ValidationError};
pub use events::{ParameterOwner, StatusEvent};
pub use message::{
    Frame, FrameBody, FrameFactory, Message, MessageFactory, MessageKind, ParameterScope,
};
pub use model::{
    validate_preset_name, Item, ItemPosition, ItemType, NoteDivision, Parameter, ParameterKind,
    PedalBoard, PresetSnapshot, ToneClass, ToneDescriptor, ToneMode, ToneTarget, ToneTopology,
    ValueRange, PRESET_NAME_MAX, TEMPO_FREE_THRESHOLD, TEMPO_PRIMARY_ID, TEMPO_SECONDARY_ID,
};
pub use transport::Transport;
