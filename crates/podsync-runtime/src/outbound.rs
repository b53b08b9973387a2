//! Message shaping per parameter kind
//!
//! Ordinary parameters produce a single generic change. Tempo-linked
//! parameters produce their id-specific tempo message, and also the generic
//! change when the value is free-running (decoded value at or below 1); note
//! divisions are only understood by the tempo messages.

use podsync_core::{
    Message, MessageFactory, Parameter, ParameterKind, ParameterScope, PodsyncResult,
    TEMPO_FREE_THRESHOLD, TEMPO_PRIMARY_ID, TEMPO_SECONDARY_ID,
};
use smallvec::SmallVec;

/// Messages built under the lock and sent after it is released, in order
pub type Outbound = SmallVec<[Message; 2]>;

/// Which tempo message a tempo-linked parameter uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempoMessage {
    Primary,
    Secondary,
}

impl TempoMessage {
    pub fn for_id(id: u32) -> Option<Self> {
        match id {
            TEMPO_PRIMARY_ID => Some(TempoMessage::Primary),
            TEMPO_SECONDARY_ID => Some(TempoMessage::Secondary),
            _ => None,
        }
    }
}

/// Messages a value change on an item parameter turns into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundPlan {
    Generic,
    Tempo {
        message: Option<TempoMessage>,
        generic: bool,
    },
}

impl OutboundPlan {
    pub fn for_parameter(param: &Parameter) -> Self {
        match param.kind() {
            ParameterKind::Standard => OutboundPlan::Generic,
            ParameterKind::Tempo => OutboundPlan::Tempo {
                message: TempoMessage::for_id(param.id()),
                generic: param.decoded_value() <= TEMPO_FREE_THRESHOLD,
            },
        }
    }

    pub fn build(
        &self,
        factory: &dyn MessageFactory,
        slot: u32,
        param: &Parameter,
    ) -> PodsyncResult<Outbound> {
        let mut outbound = Outbound::new();
        match *self {
            OutboundPlan::Generic => {
                outbound.push(factory.parameter_change(ParameterScope::Item { slot }, param)?);
            }
            OutboundPlan::Tempo { message, generic } => {
                match message {
                    Some(TempoMessage::Primary) => outbound.push(factory.tempo_change(slot, param)?),
                    Some(TempoMessage::Secondary) => {
                        outbound.push(factory.tempo_change_secondary(slot, param)?)
                    }
                    None => {}
                }
                if generic {
                    outbound.push(factory.parameter_change(ParameterScope::Item { slot }, param)?);
                }
            }
        }
        Ok(outbound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podsync_core::{FrameFactory, MessageKind, ValueRange};

    fn kinds(outbound: &Outbound) -> Vec<MessageKind> {
        outbound.iter().map(Message::kind).collect()
    }

    #[test]
    fn test_standard_parameter_single_message() {
        let param = Parameter::new(5, "Volume", ValueRange::UNIT).with_value(0.5);
        let plan = OutboundPlan::for_parameter(&param);
        let outbound = plan.build(&FrameFactory, 0, &param).unwrap();
        assert_eq!(
            kinds(&outbound),
            vec![MessageKind::ParameterChange {
                scope: ParameterScope::Item { slot: 0 },
                id: 5
            }]
        );
    }

    #[test]
    fn test_free_running_tempo_sends_both() {
        let mut param = Parameter::tempo(TEMPO_PRIMARY_ID, "Time");
        param.set_value_current("1").unwrap();
        let outbound = OutboundPlan::for_parameter(&param)
            .build(&FrameFactory, 4, &param)
            .unwrap();
        assert_eq!(
            kinds(&outbound),
            vec![
                MessageKind::TempoChange {
                    slot: 4,
                    id: TEMPO_PRIMARY_ID
                },
                MessageKind::ParameterChange {
                    scope: ParameterScope::Item { slot: 4 },
                    id: TEMPO_PRIMARY_ID
                },
            ]
        );
    }

    #[test]
    fn test_synced_tempo_skips_generic() {
        let mut param = Parameter::tempo(TEMPO_SECONDARY_ID, "Rate");
        param.set_value_current("1/4.").unwrap();
        let outbound = OutboundPlan::for_parameter(&param)
            .build(&FrameFactory, 6, &param)
            .unwrap();
        assert_eq!(
            kinds(&outbound),
            vec![MessageKind::TempoChangeSecondary {
                slot: 6,
                id: TEMPO_SECONDARY_ID
            }]
        );
    }

    #[test]
    fn test_unrecognized_tempo_id_only_generic() {
        let param = Parameter::tempo(0x3F10_0001, "Other").with_value(0.2);
        assert_eq!(
            OutboundPlan::for_parameter(&param),
            OutboundPlan::Tempo {
                message: None,
                generic: true
            }
        );
        let outbound = OutboundPlan::for_parameter(&param)
            .build(&FrameFactory, 4, &param)
            .unwrap();
        assert_eq!(outbound.len(), 1);
    }
}
