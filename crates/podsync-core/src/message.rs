//! Protocol messages
//!
//! A [`Message`] is an immutable frame tagged with the semantic role it plays
//! in the protocol. The controller never looks inside the frame; it only needs
//! the kind to tell queries from mutations and to log what it sends. Frames are
//! produced by a [`MessageFactory`], and [`FrameFactory`] is the stock one.

use std::sync::Arc;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::PodsyncResult;
use crate::model::{
    Item, ItemPosition, ItemType, Parameter, PresetSnapshot, ToneClass, ToneDescriptor, ToneMode,
    ToneTopology,
};

// ----------------------------------------------------------------------------
// Message Kinds
// ----------------------------------------------------------------------------

/// Owner of a changed parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterScope {
    /// Amp or pedal item at the given slot
    Item { slot: u32 },
    /// Cabinet at the given slot
    Cabinet { slot: u32 },
    /// The board itself
    Board,
}

/// Semantic role of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    SetQuery { set: u32 },
    PresetQuery { preset: u16, set: u16 },
    StatusQuerySetId,
    StatusQueryPresetId,
    ParameterChange { scope: ParameterScope, id: u32 },
    ParameterChangeMin { slot: u32, id: u32 },
    ParameterChangeMax { slot: u32, id: u32 },
    TempoChange { slot: u32, id: u32 },
    TempoChangeSecondary { slot: u32, id: u32 },
    ActiveChange { slot: u32 },
    TypeChange { slot: u32 },
    ToneClassChange { tone: u32 },
    ToneModeChange { tone: u32 },
    ToneTopologyChange { tone: u32 },
    SetChange { set: u8 },
    PresetChange { preset: u8 },
    SaveTrigger,
    PresetDefinition { preset: u16, set: u16 },
}

impl MessageKind {
    /// Whether the device answers this message with a response
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            MessageKind::SetQuery { .. }
                | MessageKind::PresetQuery { .. }
                | MessageKind::StatusQuerySetId
                | MessageKind::StatusQueryPresetId
        )
    }

    /// Short name for logs and errors
    pub fn label(&self) -> &'static str {
        match self {
            MessageKind::SetQuery { .. } => "set-query",
            MessageKind::PresetQuery { .. } => "preset-query",
            MessageKind::StatusQuerySetId => "status-query-set-id",
            MessageKind::StatusQueryPresetId => "status-query-preset-id",
            MessageKind::ParameterChange { .. } => "parameter-change",
            MessageKind::ParameterChangeMin { .. } => "parameter-change-min",
            MessageKind::ParameterChangeMax { .. } => "parameter-change-max",
            MessageKind::TempoChange { .. } => "tempo-change",
            MessageKind::TempoChangeSecondary { .. } => "tempo-change-2",
            MessageKind::ActiveChange { .. } => "active-change",
            MessageKind::TypeChange { .. } => "type-change",
            MessageKind::ToneClassChange { .. } => "tone-class-change",
            MessageKind::ToneModeChange { .. } => "tone-mode-change",
            MessageKind::ToneTopologyChange { .. } => "tone-topology-change",
            MessageKind::SetChange { .. } => "set-change",
            MessageKind::PresetChange { .. } => "preset-change",
            MessageKind::SaveTrigger => "save-trigger",
            MessageKind::PresetDefinition { .. } => "preset-definition",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::SetQuery { set } => write!(f, "set-query(set={})", set),
            MessageKind::PresetQuery { preset, set } => {
                write!(f, "preset-query(preset={:#x}, set={:#x})", preset, set)
            }
            MessageKind::PresetDefinition { preset, set } => {
                write!(f, "preset-definition(preset={:#x}, set={:#x})", preset, set)
            }
            other => f.write_str(other.label()),
        }
    }
}

// ----------------------------------------------------------------------------
// Message
// ----------------------------------------------------------------------------

/// Immutable protocol frame plus its semantic kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    kind: MessageKind,
    frame: Arc<[u8]>,
}

impl Message {
    pub fn new(kind: MessageKind, frame: impl Into<Arc<[u8]>>) -> Self {
        Self {
            kind,
            frame: frame.into(),
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    pub fn is_query(&self) -> bool {
        self.kind.is_query()
    }
}

// ----------------------------------------------------------------------------
// Message Factory
// ----------------------------------------------------------------------------

/// Builds the protocol message for each semantic operation
///
/// Implementations must be pure: the same inputs always give the same frame,
/// and nothing is sent or mutated.
pub trait MessageFactory: Send + Sync {
    fn set_query(&self, set: u32) -> PodsyncResult<Message>;
    fn preset_query(&self, preset: u16, set: u16) -> PodsyncResult<Message>;
    fn status_query_set_id(&self) -> PodsyncResult<Message>;
    fn status_query_preset_id(&self) -> PodsyncResult<Message>;

    fn parameter_change(&self, scope: ParameterScope, param: &Parameter)
        -> PodsyncResult<Message>;
    fn parameter_change_min(&self, slot: u32, param: &Parameter) -> PodsyncResult<Message>;
    fn parameter_change_max(&self, slot: u32, param: &Parameter) -> PodsyncResult<Message>;
    fn tempo_change(&self, slot: u32, param: &Parameter) -> PodsyncResult<Message>;
    fn tempo_change_secondary(&self, slot: u32, param: &Parameter) -> PodsyncResult<Message>;

    fn active_change(&self, item: &Item) -> PodsyncResult<Message>;
    fn type_change(&self, item: &Item) -> PodsyncResult<Message>;

    fn tone_class_change(&self, tone: &ToneDescriptor) -> PodsyncResult<Message>;
    fn tone_mode_change(&self, tone: &ToneDescriptor) -> PodsyncResult<Message>;
    fn tone_topology_change(&self, tone: &ToneDescriptor) -> PodsyncResult<Message>;

    fn set_change(&self, set: u8) -> PodsyncResult<Message>;
    fn preset_change(&self, preset: u8) -> PodsyncResult<Message>;
    fn save_trigger(&self) -> PodsyncResult<Message>;
    fn preset_definition(
        &self,
        snapshot: &PresetSnapshot,
        preset: u16,
        set: u16,
    ) -> PodsyncResult<Message>;
}

// ----------------------------------------------------------------------------
// Frame Factory
// ----------------------------------------------------------------------------

/// Payload carried in a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FrameBody {
    Empty,
    Value {
        value: [u8; 4],
        min: f32,
        max: f32,
    },
    Item {
        active: bool,
        position: ItemPosition,
        item_type: ItemType,
    },
    Tone {
        class: ToneClass,
        mode: ToneMode,
        topology: ToneTopology,
    },
    Preset(PresetSnapshot),
}

/// Decoded frame as produced by [`FrameFactory`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub kind: MessageKind,
    pub body: FrameBody,
}

/// Default factory: `bincode`-encoded [`Frame`] envelopes
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameFactory;

impl FrameFactory {
    pub fn new() -> Self {
        Self
    }

    /// Decode a frame produced by this factory
    pub fn decode(frame: &[u8]) -> PodsyncResult<Frame> {
        Ok(bincode::deserialize(frame)?)
    }

    fn encode(&self, kind: MessageKind, body: FrameBody) -> PodsyncResult<Message> {
        let bytes = bincode::serialize(&Frame { kind, body })?;
        Ok(Message::new(kind, bytes))
    }

    fn value_body(param: &Parameter) -> FrameBody {
        FrameBody::Value {
            value: param.binary_value(),
            min: param.min(),
            max: param.max(),
        }
    }

    fn item_body(item: &Item) -> FrameBody {
        FrameBody::Item {
            active: item.is_active(),
            position: item.position(),
            item_type: item.item_type().clone(),
        }
    }

    fn tone_body(tone: &ToneDescriptor) -> FrameBody {
        FrameBody::Tone {
            class: tone.class(),
            mode: tone.mode(),
            topology: tone.topology(),
        }
    }
}

impl MessageFactory for FrameFactory {
    fn set_query(&self, set: u32) -> PodsyncResult<Message> {
        self.encode(MessageKind::SetQuery { set }, FrameBody::Empty)
    }

    fn preset_query(&self, preset: u16, set: u16) -> PodsyncResult<Message> {
        self.encode(MessageKind::PresetQuery { preset, set }, FrameBody::Empty)
    }

    fn status_query_set_id(&self) -> PodsyncResult<Message> {
        self.encode(MessageKind::StatusQuerySetId, FrameBody::Empty)
    }

    fn status_query_preset_id(&self) -> PodsyncResult<Message> {
        self.encode(MessageKind::StatusQueryPresetId, FrameBody::Empty)
    }

    fn parameter_change(
        &self,
        scope: ParameterScope,
        param: &Parameter,
    ) -> PodsyncResult<Message> {
        let kind = MessageKind::ParameterChange {
            scope,
            id: param.id(),
        };
        self.encode(kind, Self::value_body(param))
    }

    fn parameter_change_min(&self, slot: u32, param: &Parameter) -> PodsyncResult<Message> {
        let kind = MessageKind::ParameterChangeMin {
            slot,
            id: param.id(),
        };
        self.encode(kind, Self::value_body(param))
    }

    fn parameter_change_max(&self, slot: u32, param: &Parameter) -> PodsyncResult<Message> {
        let kind = MessageKind::ParameterChangeMax {
            slot,
            id: param.id(),
        };
        self.encode(kind, Self::value_body(param))
    }

    fn tempo_change(&self, slot: u32, param: &Parameter) -> PodsyncResult<Message> {
        let kind = MessageKind::TempoChange {
            slot,
            id: param.id(),
        };
        self.encode(kind, Self::value_body(param))
    }

    fn tempo_change_secondary(&self, slot: u32, param: &Parameter) -> PodsyncResult<Message> {
        let kind = MessageKind::TempoChangeSecondary {
            slot,
            id: param.id(),
        };
        self.encode(kind, Self::value_body(param))
    }

    fn active_change(&self, item: &Item) -> PodsyncResult<Message> {
        let kind = MessageKind::ActiveChange { slot: item.slot() };
        self.encode(kind, Self::item_body(item))
    }

    fn type_change(&self, item: &Item) -> PodsyncResult<Message> {
        let kind = MessageKind::TypeChange { slot: item.slot() };
        self.encode(kind, Self::item_body(item))
    }

    fn tone_class_change(&self, tone: &ToneDescriptor) -> PodsyncResult<Message> {
        let kind = MessageKind::ToneClassChange { tone: tone.id() };
        self.encode(kind, Self::tone_body(tone))
    }

    fn tone_mode_change(&self, tone: &ToneDescriptor) -> PodsyncResult<Message> {
        let kind = MessageKind::ToneModeChange { tone: tone.id() };
        self.encode(kind, Self::tone_body(tone))
    }

    fn tone_topology_change(&self, tone: &ToneDescriptor) -> PodsyncResult<Message> {
        let kind = MessageKind::ToneTopologyChange { tone: tone.id() };
        self.encode(kind, Self::tone_body(tone))
    }

    fn set_change(&self, set: u8) -> PodsyncResult<Message> {
        self.encode(MessageKind::SetChange { set }, FrameBody::Empty)
    }

    fn preset_change(&self, preset: u8) -> PodsyncResult<Message> {
        self.encode(MessageKind::PresetChange { preset }, FrameBody::Empty)
    }

    fn save_trigger(&self) -> PodsyncResult<Message> {
        self.encode(MessageKind::SaveTrigger, FrameBody::Empty)
    }

    fn preset_definition(
        &self,
        snapshot: &PresetSnapshot,
        preset: u16,
        set: u16,
    ) -> PodsyncResult<Message> {
        self.encode(
            MessageKind::PresetDefinition { preset, set },
            FrameBody::Preset(snapshot.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addressing::{CURRENT_PRESET, CURRENT_SET};
    use crate::model::{PedalBoard, ValueRange};

    #[test]
    fn test_query_classification() {
        let factory = FrameFactory::new();
        assert!(factory.set_query(3).unwrap().is_query());
        assert!(factory.status_query_preset_id().unwrap().is_query());
        assert!(!factory.save_trigger().unwrap().is_query());
        assert!(!factory.set_change(1).unwrap().is_query());
    }

    #[test]
    fn test_parameter_frame_carries_binary_value() {
        let factory = FrameFactory::new();
        let param = Parameter::new(4, "Presence", ValueRange::UNIT).with_value(0.5);
        let message = factory
            .parameter_change(ParameterScope::Cabinet { slot: 3 }, &param)
            .unwrap();

        let frame = FrameFactory::decode(message.frame()).unwrap();
        assert_eq!(frame.kind, message.kind());
        match frame.body {
            FrameBody::Value { value, .. } => assert_eq!(f32::from_le_bytes(value), 0.5),
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[test]
    fn test_preset_definition_embeds_snapshot() {
        let factory = FrameFactory::new();
        let board = PedalBoard::default();
        let message = factory
            .preset_definition(&board.snapshot(), CURRENT_PRESET, CURRENT_SET)
            .unwrap();

        assert_eq!(
            message.kind().to_string(),
            "preset-definition(preset=0xffff, set=0xffff)"
        );
        let frame = FrameFactory::decode(message.frame()).unwrap();
        assert_eq!(frame.body, FrameBody::Preset(board.snapshot()));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(FrameFactory::decode(&[0xFF; 3]).is_err());
    }
}
