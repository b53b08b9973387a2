//! End-to-end controller flows against the simulated device

mod common;

use common::{config, controller_with_pod, drain, progress_values};
use podsync_core::{
    MessageKind, PodsyncConfig, PodsyncError, StatusEvent, ValidationError, CURRENT_PRESET,
    CURRENT_SET,
};
use podsync_harness::{SimulatedPod, SimulatedPodConfig};
use podsync_runtime::ControllerBuilder;

#[tokio::test]
async fn test_preset_scan_reports_progress_per_preset() {
    let (controller, pod) = controller_with_pod(config(2, 2), SimulatedPodConfig::instant());
    let mut events = controller.subscribe();

    controller.query_all_presets().await.unwrap();

    assert_eq!(progress_values(&drain(&mut events)), vec![25, 50, 75, 100]);
    assert_eq!(
        pod.count_where(|k| matches!(k, MessageKind::PresetQuery { .. })),
        4
    );
    assert_eq!(pod.max_outstanding(), 1);

    let board = controller.board().lock().await;
    assert_eq!(board.preset_name(1, 1), Some("Preset 2-2"));
}

#[tokio::test]
async fn test_set_scan_fills_set_names() {
    let (controller, pod) = controller_with_pod(config(4, 2), SimulatedPodConfig::default());
    let mut events = controller.subscribe();

    controller.query_all_sets().await.unwrap();

    assert_eq!(progress_values(&drain(&mut events)), vec![25, 50, 75, 100]);
    assert_eq!(
        pod.kinds(),
        (0..4)
            .map(|set| MessageKind::SetQuery { set })
            .collect::<Vec<_>>()
    );
    let board = controller.board().lock().await;
    assert_eq!(board.set_name(3), Some("Set 4"));
}

#[tokio::test]
async fn test_stopped_controller_ignores_mutations() {
    let builder = ControllerBuilder::new(PodsyncConfig::testing());
    let pod = SimulatedPod::new(
        builder.board(),
        builder.completion_signal(),
        SimulatedPodConfig::instant(),
    );
    let controller = builder.transport(pod.clone()).build().unwrap();

    controller.set_amp_parameter_value(0, 5, "0.5").await.unwrap();
    controller.query_all_sets().await.unwrap();
    controller.select_preset(1, 1).await.unwrap();
    controller.settle().await;

    assert!(pod.kinds().is_empty());
    assert_eq!(controller.board().stats().acquired(), 0);
}

#[tokio::test]
async fn test_rejected_bound_releases_lock_and_sends_nothing() {
    let (controller, pod) = controller_with_pod(config(2, 2), SimulatedPodConfig::instant());

    let err = controller
        .set_pedal_board_item_parameter_value_max(3, 1, "not-a-number")
        .await
        .unwrap_err();
    controller.settle().await;

    assert!(matches!(
        err,
        PodsyncError::Validation(ValidationError::InvalidNumber { .. })
    ));
    let stats = controller.board().stats();
    assert_eq!(stats.held(), 0);
    assert_eq!(stats.acquired(), stats.released());
    assert!(pod.kinds().is_empty());
}

#[tokio::test]
async fn test_select_preset_message_order() {
    let (controller, pod) = controller_with_pod(config(2, 4), SimulatedPodConfig::instant());

    controller.select_preset(2, 1).await.unwrap();

    assert_eq!(
        pod.kinds(),
        vec![
            MessageKind::PresetQuery { preset: 2, set: 1 },
            MessageKind::SetChange { set: 1 },
            MessageKind::PresetChange { preset: 2 },
            MessageKind::PresetDefinition {
                preset: CURRENT_PRESET,
                set: CURRENT_SET
            },
        ]
    );
    assert_eq!(controller.board().lock().await.selection(), Some((1, 2)));

    let device = pod.device_state();
    assert_eq!((device.current_set, device.current_preset), (1, 2));
}

#[tokio::test]
async fn test_select_out_of_range_preset_is_rejected() {
    let (controller, pod) = controller_with_pod(config(2, 2), SimulatedPodConfig::instant());

    let err = controller.select_preset(2, 1).await.unwrap_err();

    assert!(err.is_validation());
    assert!(pod.kinds().is_empty());
    assert!(!controller.gate().is_in_flight());
}

#[tokio::test]
async fn test_init_device_syncs_everything_then_reports_done() {
    let (controller, pod) = controller_with_pod(config(2, 2), SimulatedPodConfig::instant());
    pod.set_device_selection(1, 0);
    let mut events = controller.subscribe();

    controller.init_device().await.unwrap();
    controller.settle().await;

    let seen = drain(&mut events);
    assert_eq!(seen.last(), Some(&StatusEvent::InitDone));
    assert_eq!(progress_values(&seen), vec![50, 100, 25, 50, 75, 100]);

    let kinds = pod.kinds();
    assert_eq!(kinds.len(), 2 + 4 + 2 + 1);
    assert_eq!(kinds[6], MessageKind::StatusQuerySetId);
    assert_eq!(kinds[7], MessageKind::StatusQueryPresetId);
    assert_eq!(
        kinds[8],
        MessageKind::PresetQuery {
            preset: CURRENT_PRESET,
            set: CURRENT_SET
        }
    );

    let board = controller.board().lock().await;
    assert_eq!(board.selection(), Some((1, 0)));
    assert_eq!(board.set_name(0), Some("Set 1"));
    assert_eq!(board.current_preset_name(), Some("Preset 2-1"));
}

#[tokio::test]
async fn test_save_writes_selected_slot() {
    let (controller, pod) = controller_with_pod(config(2, 2), SimulatedPodConfig::instant());
    controller.select_preset(1, 0).await.unwrap();
    pod.clear_sent();

    controller.save_preset().await.unwrap();

    assert_eq!(
        pod.kinds(),
        vec![
            MessageKind::PresetQuery {
                preset: CURRENT_PRESET,
                set: CURRENT_SET
            },
            MessageKind::SaveTrigger,
            MessageKind::PresetDefinition { preset: 1, set: 0 },
        ]
    );
    assert_eq!(pod.device_state().saved, vec![(0, 1)]);
}

#[tokio::test]
async fn test_save_without_selection_only_fetches() {
    let (controller, pod) = controller_with_pod(config(2, 2), SimulatedPodConfig::instant());

    controller.save_preset().await.unwrap();

    assert_eq!(pod.count_where(|k| *k == MessageKind::SaveTrigger), 0);
    assert!(pod.device_state().saved.is_empty());
}

#[tokio::test]
async fn test_rename_pushes_definition_and_refetches() {
    let (controller, pod) = controller_with_pod(config(2, 2), SimulatedPodConfig::instant());
    controller.select_preset(0, 1).await.unwrap();
    pod.clear_sent();
    let mut events = controller.subscribe();

    controller.set_current_preset_name("Lead").await.unwrap();
    controller.settle().await;

    let current = MessageKind::PresetQuery {
        preset: CURRENT_PRESET,
        set: CURRENT_SET,
    };
    assert_eq!(
        pod.kinds(),
        vec![
            current,
            MessageKind::PresetDefinition {
                preset: CURRENT_PRESET,
                set: CURRENT_SET
            },
            current,
        ]
    );
    assert_eq!(
        pod.device_state().preset_names.get(&(1, 0)).map(String::as_str),
        Some("Lead")
    );
    assert_eq!(
        controller.board().lock().await.preset_name(1, 0),
        Some("Lead")
    );
    assert!(drain(&mut events).contains(&StatusEvent::PresetRenamed {
        set: 1,
        preset: 0,
        name: "Lead".to_string(),
    }));
}

#[tokio::test]
async fn test_rename_rejects_bad_names_before_sending() {
    let (controller, pod) = controller_with_pod(config(2, 2), SimulatedPodConfig::instant());

    let too_long = controller
        .set_current_preset_name("a name far too long for the device")
        .await
        .unwrap_err();
    let bad_char = controller.set_current_preset_name("Lead\u{e9}").await.unwrap_err();

    assert!(matches!(
        too_long,
        PodsyncError::Validation(ValidationError::NameTooLong { .. })
    ));
    assert!(matches!(
        bad_char,
        PodsyncError::Validation(ValidationError::InvalidNameCharacter { .. })
    ));
    assert!(pod.kinds().is_empty());
}

#[tokio::test]
async fn test_position_change_sends_current_definition() {
    let (controller, pod) = controller_with_pod(config(2, 2), SimulatedPodConfig::instant());
    let mut events = controller.subscribe();

    controller
        .set_pedal_board_item_position(4, 9, 1)
        .await
        .unwrap();

    assert_eq!(
        pod.kinds(),
        vec![
            MessageKind::PresetQuery {
                preset: CURRENT_PRESET,
                set: CURRENT_SET
            },
            MessageKind::PresetDefinition {
                preset: CURRENT_PRESET,
                set: CURRENT_SET
            },
        ]
    );
    let item = controller.board().lock().await.item(4).cloned().unwrap();
    assert_eq!(item.position().pos, 9);
    assert_eq!(item.position().kind, 1);
    assert!(drain(&mut events)
        .iter()
        .any(|e| matches!(e, StatusEvent::ItemChanged { item } if item.slot() == 4)));
}

#[tokio::test]
async fn test_reload_requests_selected_preset() {
    let (controller, pod) = controller_with_pod(config(2, 2), SimulatedPodConfig::instant());

    controller.reload_preset().await.unwrap();
    assert!(pod.kinds().is_empty());

    controller.select_preset(1, 1).await.unwrap();
    pod.clear_sent();
    controller.reload_preset().await.unwrap();
    controller.settle().await;

    assert_eq!(
        pod.kinds(),
        vec![MessageKind::PresetQuery { preset: 1, set: 1 }]
    );
}
