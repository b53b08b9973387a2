//! Shared fixtures for the runtime integration tests

#![allow(dead_code)]

use podsync_core::{DeviceLayout, PodsyncConfig, StatusEvent};
use podsync_harness::{SimulatedPod, SimulatedPodConfig};
use podsync_runtime::{Controller, ControllerBuilder};
use tokio::sync::broadcast;

/// Started controller wired to a simulated device
pub fn controller_with_pod(
    config: PodsyncConfig,
    pod_config: SimulatedPodConfig,
) -> (Controller, SimulatedPod) {
    let builder = ControllerBuilder::new(config);
    let pod = SimulatedPod::new(builder.board(), builder.completion_signal(), pod_config);
    let controller = builder
        .transport(pod.clone())
        .started()
        .build()
        .expect("controller builds");
    (controller, pod)
}

/// Testing config with the given layout
pub fn config(number_set: u8, preset_per_set: u8) -> PodsyncConfig {
    PodsyncConfig::testing().with_layout(DeviceLayout::new(number_set, preset_per_set))
}

/// Everything published so far
pub fn drain(events: &mut broadcast::Receiver<StatusEvent>) -> Vec<StatusEvent> {
    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    seen
}

pub fn progress_values(events: &[StatusEvent]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|e| match e {
            StatusEvent::Progress { percent } => Some(*percent),
            _ => None,
        })
        .collect()
}
