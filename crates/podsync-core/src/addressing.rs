//! Item addressing
//!
//! The device exposes its effect chain as a flat list of item slots. The two
//! amplifier/cabinet pairs occupy slots 0–3 (amp `a` at `2a`, its cabinet at
//! `2a + 1`) and effect pedals follow from slot 4 (pedal `p` at `p + 4`). The
//! rest of the system depends on this exact mapping.

use core::fmt;

use crate::config::DeviceLayout;

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Number of amplifier/cabinet pairs
pub const AMP_COUNT: u32 = 2;

/// Slots taken by the amplifier/cabinet pairs
pub const RESERVED_SLOTS: u32 = 2 * AMP_COUNT;

/// Wildcard set id meaning "whatever set is current on the device"
pub const CURRENT_SET: u16 = 0xFFFF;

/// Wildcard preset id meaning "whatever preset is current on the device"
pub const CURRENT_PRESET: u16 = 0xFFFF;

// ----------------------------------------------------------------------------
// Item Roles
// ----------------------------------------------------------------------------

/// Role of an item in the effect chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ItemRole {
    Amp,
    Cab,
    Pedal,
}

impl fmt::Display for ItemRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemRole::Amp => write!(f, "amp"),
            ItemRole::Cab => write!(f, "cab"),
            ItemRole::Pedal => write!(f, "pedal"),
        }
    }
}

// ----------------------------------------------------------------------------
// Item Address
// ----------------------------------------------------------------------------

/// Logical address of an item: its role plus the role-local id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ItemAddress {
    pub role: ItemRole,
    pub id: u32,
}

impl ItemAddress {
    pub const fn amp(id: u32) -> Self {
        Self {
            role: ItemRole::Amp,
            id,
        }
    }

    pub const fn cab(id: u32) -> Self {
        Self {
            role: ItemRole::Cab,
            id,
        }
    }

    pub const fn pedal(id: u32) -> Self {
        Self {
            role: ItemRole::Pedal,
            id,
        }
    }

    /// Flat slot of this address
    ///
    /// Ids outside the valid domain saturate to a slot no board ever holds,
    /// so lookups through them resolve to nothing.
    pub fn slot(&self) -> u32 {
        match self.role {
            ItemRole::Amp => self.id.saturating_mul(2),
            ItemRole::Cab => self.id.saturating_mul(2).saturating_add(1),
            ItemRole::Pedal => self.id.saturating_add(RESERVED_SLOTS),
        }
    }

    /// Inverse of [`ItemAddress::slot`]
    pub fn from_slot(slot: u32) -> Self {
        if slot < RESERVED_SLOTS {
            if slot % 2 == 0 {
                Self::amp(slot / 2)
            } else {
                Self::cab(slot / 2)
            }
        } else {
            Self::pedal(slot - RESERVED_SLOTS)
        }
    }

    /// Whether the id lies inside the domain for its role on the given layout
    pub fn is_valid(&self, layout: &DeviceLayout) -> bool {
        match self.role {
            ItemRole::Amp | ItemRole::Cab => self.id < AMP_COUNT,
            ItemRole::Pedal => self.id < u32::from(layout.pedal_count),
        }
    }
}

impl fmt::Display for ItemAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{} (slot {})", self.role, self.id, self.slot())
    }
}

/// Slot of amplifier `id`
pub fn amp_slot(id: u32) -> u32 {
    ItemAddress::amp(id).slot()
}

/// Slot of the cabinet paired with amplifier `id`
pub fn cab_slot(id: u32) -> u32 {
    ItemAddress::cab(id).slot()
}

/// Slot of pedal `id`
pub fn pedal_slot(id: u32) -> u32 {
    ItemAddress::pedal(id).slot()
}

/// Total number of item slots on the given layout
pub fn slot_count(layout: &DeviceLayout) -> u32 {
    RESERVED_SLOTS + u32::from(layout.pedal_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_slots() {
        assert_eq!(amp_slot(0), 0);
        assert_eq!(cab_slot(0), 1);
        assert_eq!(amp_slot(1), 2);
        assert_eq!(cab_slot(1), 3);
        assert_eq!(pedal_slot(0), 4);
        assert_eq!(pedal_slot(7), 11);
    }

    #[test]
    fn test_from_slot_roundtrip_on_layout() {
        let layout = DeviceLayout::default();
        for slot in 0..slot_count(&layout) {
            let address = ItemAddress::from_slot(slot);
            assert!(address.is_valid(&layout), "{}", address);
            assert_eq!(address.slot(), slot);
        }
    }

    #[test]
    fn test_out_of_domain_ids_saturate() {
        assert_eq!(ItemAddress::amp(u32::MAX).slot(), u32::MAX);
        assert!(!ItemAddress::cab(AMP_COUNT).is_valid(&DeviceLayout::default()));
    }
}
