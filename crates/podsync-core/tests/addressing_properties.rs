//! Property tests for the item addressing scheme

use proptest::prelude::*;

use podsync_core::{
    amp_slot, cab_slot, pedal_slot, slot_count, DeviceLayout, ItemAddress, ItemRole, AMP_COUNT,
};

fn valid_address(pedal_count: u8) -> impl Strategy<Value = ItemAddress> {
    prop_oneof![
        (0..AMP_COUNT).prop_map(ItemAddress::amp),
        (0..AMP_COUNT).prop_map(ItemAddress::cab),
        (0..u32::from(pedal_count.max(1))).prop_map(ItemAddress::pedal),
    ]
}

proptest! {
    #[test]
    fn slot_mapping_roundtrips(address in valid_address(32)) {
        let slot = address.slot();
        prop_assert_eq!(ItemAddress::from_slot(slot), address);
    }

    #[test]
    fn distinct_addresses_never_share_a_slot(
        a in valid_address(32),
        b in valid_address(32),
    ) {
        prop_assume!(a != b);
        prop_assert_ne!(a.slot(), b.slot());
    }

    #[test]
    fn role_slots_follow_fixed_formula(id in 0u32..1000) {
        prop_assert_eq!(amp_slot(id), 2 * id);
        prop_assert_eq!(cab_slot(id), 2 * id + 1);
        prop_assert_eq!(pedal_slot(id), id + 4);
    }

    #[test]
    fn every_slot_on_a_layout_has_one_owner(pedal_count in 0u8..64) {
        let layout = DeviceLayout { pedal_count, ..DeviceLayout::default() };
        let mut pedals = 0;
        for slot in 0..slot_count(&layout) {
            let address = ItemAddress::from_slot(slot);
            prop_assert!(address.is_valid(&layout));
            if address.role == ItemRole::Pedal {
                pedals += 1;
            }
        }
        prop_assert_eq!(pedals, u32::from(pedal_count));
    }
}
