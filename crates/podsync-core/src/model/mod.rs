//! In-memory device model

pub mod board;
pub mod item;
pub mod parameter;
pub mod tone;

pub use board::{validate_preset_name, PedalBoard, PresetSnapshot, PRESET_NAME_MAX};
pub use item::{Item, ItemPosition, ItemType};
pub use parameter::{
    NoteDivision, Parameter, ParameterKind, ValueRange, TEMPO_FREE_THRESHOLD, TEMPO_PRIMARY_ID,
    TEMPO_SECONDARY_ID,
};
pub use tone::{ToneClass, ToneDescriptor, ToneMode, ToneTarget, ToneTopology};
