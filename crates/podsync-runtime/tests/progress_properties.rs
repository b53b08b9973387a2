//! Property tests for scan progress reporting

mod common;

use common::{config, controller_with_pod, drain, progress_values};
use podsync_harness::SimulatedPodConfig;
use podsync_runtime::{preset_progress, set_progress};
use proptest::prelude::*;

fn scan_progress(sets: u8, presets: u8) -> (Vec<u8>, Vec<u8>) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    runtime.block_on(async {
        let (controller, _pod) =
            controller_with_pod(config(sets, presets), SimulatedPodConfig::instant());
        let mut events = controller.subscribe();

        controller.query_all_sets().await.unwrap();
        let set_steps = progress_values(&drain(&mut events));
        controller.query_all_presets().await.unwrap();
        let preset_steps = progress_values(&drain(&mut events));
        (set_steps, preset_steps)
    })
}

fn is_non_decreasing(values: &[u8]) -> bool {
    values.windows(2).all(|w| w[0] <= w[1])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_scans_report_monotonic_progress(sets in 1u8..=4, presets in 1u8..=4) {
        let (set_steps, preset_steps) = scan_progress(sets, presets);

        prop_assert_eq!(set_steps.len(), sets as usize);
        prop_assert_eq!(preset_steps.len(), sets as usize * presets as usize);
        prop_assert!(is_non_decreasing(&set_steps));
        prop_assert!(is_non_decreasing(&preset_steps));
        prop_assert_eq!(set_steps.last().copied(), Some(100));
        prop_assert_eq!(preset_steps.last().copied(), Some(100));
    }
}

proptest! {
    #[test]
    fn prop_progress_formulas_stay_in_range(sets in 1u32..=64, presets in 1u32..=128) {
        let mut last = 0;
        for set in 0..sets {
            let percent = set_progress(set, sets);
            prop_assert!(percent >= last && percent <= 100);
            last = percent;
        }
        prop_assert_eq!(last, 100);

        let mut last = 0;
        for set in 0..sets {
            for preset in 0..presets {
                let percent = preset_progress(set, preset, sets, presets);
                prop_assert!(percent >= last && percent <= 100);
                last = percent;
            }
        }
        prop_assert_eq!(last, 100);
    }
}
