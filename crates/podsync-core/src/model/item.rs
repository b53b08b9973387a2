//! Effect chain items

use crate::addressing::{ItemAddress, ItemRole};
use crate::errors::ValidationError;
use crate::model::parameter::Parameter;

/// Placement of an item in the signal chain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ItemPosition {
    pub pos: u16,
    pub kind: u8,
}

/// Type/model selector of an item
///
/// Amps and cabs are selected by type name alone; pedals also carry a model.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ItemType {
    pub fx_type: String,
    pub fx_model: Option<String>,
}

/// One amplifier, cabinet or pedal slot
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Item {
    slot: u32,
    role: ItemRole,
    name: String,
    active: bool,
    position: ItemPosition,
    item_type: ItemType,
    params: Vec<Parameter>,
}

impl Item {
    pub fn new(address: ItemAddress, name: impl Into<String>) -> Self {
        Self {
            slot: address.slot(),
            role: address.role,
            name: name.into(),
            active: true,
            position: ItemPosition {
                pos: address.slot() as u16,
                kind: 0,
            },
            item_type: ItemType::default(),
            params: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_parameters(mut self, params: impl IntoIterator<Item = Parameter>) -> Self {
        self.params.extend(params);
        self
    }

    pub fn slot(&self) -> u32 {
        self.slot
    }

    pub fn role(&self) -> ItemRole {
        self.role
    }

    pub fn address(&self) -> ItemAddress {
        ItemAddress::from_slot(self.slot)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn position(&self) -> ItemPosition {
        self.position
    }

    pub fn item_type(&self) -> &ItemType {
        &self.item_type
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.params
    }

    pub fn parameter(&self, pid: u32) -> Option<&Parameter> {
        self.params.iter().find(|p| p.id() == pid)
    }

    pub fn parameter_mut(&mut self, pid: u32) -> Option<&mut Parameter> {
        self.params.iter_mut().find(|p| p.id() == pid)
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn set_position(&mut self, pos: u16, kind: u8) {
        self.position = ItemPosition { pos, kind };
    }

    /// Apply a new type/model selector; an empty model means "type only"
    pub fn set_type(&mut self, fx_type: &str, fx_model: &str) -> Result<(), ValidationError> {
        let fx_type = fx_type.trim();
        if fx_type.is_empty() {
            return Err(ValidationError::unknown_option("type", fx_type));
        }
        let fx_model = fx_model.trim();
        self.item_type = ItemType {
            fx_type: fx_type.to_string(),
            fx_model: (!fx_model.is_empty()).then(|| fx_model.to_string()),
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parameter::ValueRange;

    fn pedal() -> Item {
        Item::new(ItemAddress::pedal(1), "Delay")
            .with_parameter(Parameter::new(0, "Mix", ValueRange::UNIT))
            .with_parameter(Parameter::new(2, "Feedback", ValueRange::UNIT))
    }

    #[test]
    fn test_parameter_lookup_by_id() {
        let item = pedal();
        assert_eq!(item.slot(), 5);
        assert_eq!(item.parameter(2).map(|p| p.name()), Some("Feedback"));
        assert!(item.parameter(1).is_none());
    }

    #[test]
    fn test_position_and_type() {
        let mut item = pedal();
        assert_eq!(item.position(), ItemPosition { pos: 5, kind: 0 });
        item.set_position(7, 1);
        assert_eq!(item.position(), ItemPosition { pos: 7, kind: 1 });

        item.set_type("Delay", "Tape Echo").unwrap();
        assert_eq!(item.item_type().fx_model.as_deref(), Some("Tape Echo"));
        item.set_type("Brit J-800", "").unwrap();
        assert_eq!(item.item_type().fx_model, None);
        assert!(item.set_type("  ", "Tape Echo").is_err());
        assert_eq!(item.item_type().fx_type, "Brit J-800");
    }
}
