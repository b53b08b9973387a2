//! CLI configuration loading
//!
//! Layers, lowest priority first: built-in defaults, `podsync.toml` in the
//! working directory (or the file given with `--config`), then `PODSYNC_`
//! environment variables. Nested keys use a double underscore, so
//! `PODSYNC_CORE__SYNC__HANDSHAKE_TIMEOUT_MS=500` sets
//! `core.sync.handshake_timeout_ms`.

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use podsync_core::PodsyncConfig;
use podsync_harness::SimulatedPodConfig;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};

pub const DEFAULT_CONFIG_FILE: &str = "podsync.toml";
pub const ENV_PREFIX: &str = "PODSYNC_";

// ----------------------------------------------------------------------------
// CLI Application Configuration
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliAppConfig {
    /// Controller configuration
    pub core: PodsyncConfig,
    /// Behavior of the simulated device
    pub device: DeviceConfig,
}

/// Simulated device settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub latency_min_ms: u64,
    pub latency_max_ms: u64,
    /// Fraction of responses the device never sends
    pub response_loss_rate: f64,
    pub seed: u64,
    /// Selection the device starts on
    pub start_set: u8,
    pub start_preset: u8,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        let pod = SimulatedPodConfig::default();
        Self {
            latency_min_ms: pod.latency_range.0,
            latency_max_ms: pod.latency_range.1,
            response_loss_rate: pod.response_loss_rate,
            seed: pod.seed,
            start_set: 0,
            start_preset: 0,
        }
    }
}

impl DeviceConfig {
    pub fn pod_config(&self) -> SimulatedPodConfig {
        SimulatedPodConfig {
            response_loss_rate: self.response_loss_rate,
            seed: self.seed,
            ..SimulatedPodConfig::default()
        }
        .with_latency(self.latency_min_ms, self.latency_max_ms)
    }
}

// ----------------------------------------------------------------------------
// Configuration Loading Logic
// ----------------------------------------------------------------------------

impl CliAppConfig {
    /// Load from defaults, the config file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        if path.is_some() && !file.exists() {
            return Err(CliError::Config(format!(
                "config file not found: {}",
                file.display()
            )));
        }

        let figment = Self::figment()
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::extract(figment)
    }

    /// Defaults only
    pub fn figment() -> Figment {
        Figment::new().merge(Serialized::defaults(Self::default()))
    }

    pub fn extract(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.core.validate()?;
        if !(0.0..=1.0).contains(&self.device.response_loss_rate) {
            return Err(CliError::Config(format!(
                "response_loss_rate must be within [0, 1], got {}",
                self.device.response_loss_rate
            )));
        }
        if self.device.start_set >= self.core.layout.number_set
            || self.device.start_preset >= self.core.layout.preset_per_set
        {
            return Err(CliError::Config(format!(
                "start selection {}/{} is outside the device layout",
                self.device.start_set, self.device.start_preset
            )));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
