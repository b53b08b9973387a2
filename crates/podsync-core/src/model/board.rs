//! Pedal board model
//!
//! [`PedalBoard`] is the in-memory mirror of the device. It is not synchronized
//! itself; the runtime wraps it in a single exclusive lock and every read or
//! write goes through that lock.

use crate::addressing::{slot_count, ItemAddress, AMP_COUNT};
use crate::config::DeviceLayout;
use crate::errors::ValidationError;
use crate::model::item::Item;
use crate::model::parameter::{Parameter, ValueRange, TEMPO_PRIMARY_ID, TEMPO_SECONDARY_ID};
use crate::model::tone::ToneDescriptor;

/// Longest preset name the device stores
pub const PRESET_NAME_MAX: usize = 16;

const AMP_PARAMETERS: [&str; 11] = [
    "Drive", "Bass", "Mid", "Treble", "Presence", "Volume", "Sag", "Hum", "Bias", "BiasX",
    "Master",
];

const CAB_PARAMETERS: [&str; 5] = ["Mic", "LowCut", "Resonance", "HiCut", "Level"];

const PEDAL_PARAMETERS: [&str; 5] = ["Mix", "Feedback", "Depth", "Tone", "Level"];

/// Check a preset name against the device's storage constraints
pub fn validate_preset_name(name: &str) -> Result<(), ValidationError> {
    let length = name.chars().count();
    if length > PRESET_NAME_MAX {
        return Err(ValidationError::NameTooLong {
            length,
            max: PRESET_NAME_MAX,
        });
    }
    if let Some(character) = name.chars().find(|c| !(' '..='~').contains(c)) {
        return Err(ValidationError::InvalidNameCharacter { character });
    }
    Ok(())
}

// ----------------------------------------------------------------------------
// Pedal Board
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PedalBoard {
    layout: DeviceLayout,
    current_set: Option<u8>,
    current_preset: Option<u8>,
    items: Vec<Item>,
    params: Vec<Parameter>,
    tones: Vec<ToneDescriptor>,
    set_names: Vec<String>,
    preset_names: Vec<String>,
}

impl PedalBoard {
    /// Board with the stock chain: two amp/cab pairs followed by the pedals
    pub fn new(layout: DeviceLayout) -> Self {
        let items = (0..slot_count(&layout))
            .map(|slot| default_item(ItemAddress::from_slot(slot)))
            .collect();
        let tones = (0..AMP_COUNT).map(|amp| ToneDescriptor::new(amp, amp)).collect();
        let params = vec![
            Parameter::new(0, "Tempo", ValueRange::new(30.0, 240.0)).with_value(120.0),
            Parameter::new(1, "Input", ValueRange::UNIT).with_value(0.5),
        ];

        Self {
            layout,
            current_set: None,
            current_preset: None,
            items,
            params,
            tones,
            set_names: vec![String::new(); layout.number_set as usize],
            preset_names: vec![String::new(); layout.total_presets() as usize],
        }
    }

    pub fn layout(&self) -> &DeviceLayout {
        &self.layout
    }

    // Items and parameters

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, slot: u32) -> Option<&Item> {
        self.items.get(slot as usize)
    }

    pub fn item_mut(&mut self, slot: u32) -> Option<&mut Item> {
        self.items.get_mut(slot as usize)
    }

    pub fn parameter(&self, slot: u32, pid: u32) -> Option<&Parameter> {
        self.item(slot)?.parameter(pid)
    }

    pub fn parameter_mut(&mut self, slot: u32, pid: u32) -> Option<&mut Parameter> {
        self.item_mut(slot)?.parameter_mut(pid)
    }

    /// Parameter owned by the board itself rather than an item
    pub fn board_parameter(&self, pid: u32) -> Option<&Parameter> {
        self.params.iter().find(|p| p.id() == pid)
    }

    pub fn board_parameter_mut(&mut self, pid: u32) -> Option<&mut Parameter> {
        self.params.iter_mut().find(|p| p.id() == pid)
    }

    pub fn board_parameters(&self) -> &[Parameter] {
        &self.params
    }

    // Tone descriptors

    pub fn tones(&self) -> &[ToneDescriptor] {
        &self.tones
    }

    pub fn tone(&self, id: u32) -> Option<&ToneDescriptor> {
        self.tones.iter().find(|t| t.id() == id)
    }

    pub fn tone_mut(&mut self, id: u32) -> Option<&mut ToneDescriptor> {
        self.tones.iter_mut().find(|t| t.id() == id)
    }

    pub fn tone_for_amp(&self, amp_id: u32) -> Option<&ToneDescriptor> {
        self.tones.iter().find(|t| t.amp_id() == amp_id)
    }

    pub fn tone_for_amp_mut(&mut self, amp_id: u32) -> Option<&mut ToneDescriptor> {
        self.tones.iter_mut().find(|t| t.amp_id() == amp_id)
    }

    // Selection

    pub fn current_set(&self) -> Option<u8> {
        self.current_set
    }

    pub fn current_preset(&self) -> Option<u8> {
        self.current_preset
    }

    /// Both halves of the selection, if both are known
    pub fn selection(&self) -> Option<(u8, u8)> {
        Some((self.current_set?, self.current_preset?))
    }

    pub fn set_current_set(&mut self, set: u8) -> Result<(), ValidationError> {
        check_index("set", set, self.layout.number_set)?;
        self.current_set = Some(set);
        Ok(())
    }

    pub fn set_current_preset(&mut self, preset: u8) -> Result<(), ValidationError> {
        check_index("preset", preset, self.layout.preset_per_set)?;
        self.current_preset = Some(preset);
        Ok(())
    }

    /// Move both halves of the selection at once; nothing changes on error
    pub fn select(&mut self, set: u8, preset: u8) -> Result<(), ValidationError> {
        check_index("set", set, self.layout.number_set)?;
        check_index("preset", preset, self.layout.preset_per_set)?;
        self.current_set = Some(set);
        self.current_preset = Some(preset);
        Ok(())
    }

    // Names

    pub fn set_name(&self, set: u8) -> Option<&str> {
        self.set_names.get(set as usize).map(String::as_str)
    }

    pub fn set_set_name(&mut self, set: u8, name: &str) -> Result<(), ValidationError> {
        check_index("set", set, self.layout.number_set)?;
        self.set_names[set as usize] = name.to_string();
        Ok(())
    }

    pub fn preset_name(&self, set: u8, preset: u8) -> Option<&str> {
        let index = self.preset_index(set, preset)?;
        self.preset_names.get(index).map(String::as_str)
    }

    pub fn set_preset_name(&mut self, set: u8, preset: u8, name: &str) -> Result<(), ValidationError> {
        check_index("set", set, self.layout.number_set)?;
        check_index("preset", preset, self.layout.preset_per_set)?;
        validate_preset_name(name)?;
        if let Some(index) = self.preset_index(set, preset) {
            self.preset_names[index] = name.to_string();
        }
        Ok(())
    }

    pub fn current_preset_name(&self) -> Option<&str> {
        let (set, preset) = self.selection()?;
        self.preset_name(set, preset)
    }

    /// Rename the selected preset; returns `false` when nothing is selected
    pub fn set_current_preset_name(&mut self, name: &str) -> Result<bool, ValidationError> {
        validate_preset_name(name)?;
        match self.selection() {
            Some((set, preset)) => {
                self.set_preset_name(set, preset, name)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn preset_index(&self, set: u8, preset: u8) -> Option<usize> {
        if set >= self.layout.number_set || preset >= self.layout.preset_per_set {
            return None;
        }
        Some(set as usize * self.layout.preset_per_set as usize + preset as usize)
    }

    /// Copy of everything that makes up the current preset
    pub fn snapshot(&self) -> PresetSnapshot {
        PresetSnapshot {
            set: self.current_set,
            preset: self.current_preset,
            name: self.current_preset_name().unwrap_or_default().to_string(),
            items: self.items.clone(),
            params: self.params.clone(),
            tones: self.tones.clone(),
        }
    }
}

impl Default for PedalBoard {
    fn default() -> Self {
        Self::new(DeviceLayout::default())
    }
}

fn check_index(field: &str, index: u8, count: u8) -> Result<(), ValidationError> {
    if index < count {
        Ok(())
    } else {
        Err(ValidationError::IndexOutOfRange {
            field: field.to_string(),
            index: u32::from(index),
            count: u32::from(count),
        })
    }
}

fn default_item(address: ItemAddress) -> Item {
    use crate::addressing::ItemRole;

    let unit = |(pid, name): (usize, &&str)| Parameter::new(pid as u32, *name, ValueRange::UNIT);
    match address.role {
        ItemRole::Amp => Item::new(address, format!("Amp {}", address.id))
            .with_parameters(AMP_PARAMETERS.iter().enumerate().map(unit)),
        ItemRole::Cab => Item::new(address, format!("Cab {}", address.id))
            .with_parameters(CAB_PARAMETERS.iter().enumerate().map(unit)),
        ItemRole::Pedal => Item::new(address, format!("FX {}", address.id))
            .with_parameters(PEDAL_PARAMETERS.iter().enumerate().map(unit))
            .with_parameter(Parameter::tempo(TEMPO_PRIMARY_ID, "Time"))
            .with_parameter(Parameter::tempo(TEMPO_SECONDARY_ID, "Rate")),
    }
}

// ----------------------------------------------------------------------------
// Snapshots
// ----------------------------------------------------------------------------

/// Detached copy of the current preset, taken under the board lock
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PresetSnapshot {
    pub set: Option<u8>,
    pub preset: Option<u8>,
    pub name: String,
    pub items: Vec<Item>,
    pub params: Vec<Parameter>,
    pub tones: Vec<ToneDescriptor>,
}
