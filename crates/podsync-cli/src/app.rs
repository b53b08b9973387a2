//! Application wiring: a started controller talking to a simulated device

use podsync_harness::SimulatedPod;
use podsync_runtime::{Controller, ControllerBuilder};
use tracing::{debug, info};

use crate::config::CliAppConfig;
use crate::error::Result;

pub struct PodsyncApp {
    config: CliAppConfig,
    controller: Controller,
    pod: SimulatedPod,
}

impl PodsyncApp {
    pub fn new(config: CliAppConfig) -> Result<Self> {
        let builder = ControllerBuilder::new(config.core.clone());
        let pod = SimulatedPod::new(
            builder.board(),
            builder.completion_signal(),
            config.device.pod_config(),
        );
        pod.set_device_selection(config.device.start_set, config.device.start_preset);
        let controller = builder.transport(pod.clone()).started().build()?;

        info!(
            sets = config.core.layout.number_set,
            presets = config.core.layout.preset_per_set,
            "Controller ready"
        );
        Ok(Self {
            config,
            controller,
            pod,
        })
    }

    pub fn config(&self) -> &CliAppConfig {
        &self.config
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn pod(&self) -> &SimulatedPod {
        &self.pod
    }

    /// Learn which set and preset the device is currently on
    pub async fn attach(&self) -> Result<()> {
        self.controller.query_current_set_id().await?;
        self.controller.query_current_preset_id().await?;
        let selection = self.controller.board().lock().await.selection();
        debug!(?selection, "Attached to device");
        Ok(())
    }

    /// Let outstanding sends and responses finish, then stop the controller
    pub async fn shutdown(&self) {
        self.controller.settle().await;
        self.pod.wait_idle().await;
        self.controller.stop();
        debug!(
            answered = self.pod.answered(),
            dropped = self.pod.dropped(),
            "Controller stopped"
        );
    }
}
