//! Centralized Configuration Management
//!
//! All configuration consumed by the controller lives here so the CLI and the
//! tests build it the same way. Every struct is `serde`-friendly so it can be
//! layered from TOML files and environment variables.

use core::time::Duration;

use crate::errors::{PodsyncError, PodsyncResult};

// ----------------------------------------------------------------------------
// Device Layout
// ----------------------------------------------------------------------------

/// Shape of the device's preset storage and effect chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DeviceLayout {
    /// Number of sets (banks) on the device
    pub number_set: u8,
    /// Number of presets inside each set
    pub preset_per_set: u8,
    /// Number of effect/pedal slots following the amp/cab pairs
    pub pedal_count: u8,
}

impl Default for DeviceLayout {
    fn default() -> Self {
        Self {
            number_set: 8,
            preset_per_set: 64,
            pedal_count: 8,
        }
    }
}

impl DeviceLayout {
    /// Create a layout with the given set/preset dimensions
    pub fn new(number_set: u8, preset_per_set: u8) -> Self {
        Self {
            number_set,
            preset_per_set,
            ..Self::default()
        }
    }

    /// Total number of presets on the device
    pub fn total_presets(&self) -> u32 {
        u32::from(self.number_set) * u32::from(self.preset_per_set)
    }

    /// Events a full device init publishes: one progress event per set and
    /// per preset, then `InitDone`
    pub fn init_event_count(&self) -> usize {
        self.total_presets() as usize + usize::from(self.number_set) + 1
    }
}

// ----------------------------------------------------------------------------
// Sync Configuration
// ----------------------------------------------------------------------------

/// Handshake behavior
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// How long a query waits for the receiver's completion signal
    pub handshake_timeout_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            handshake_timeout_ms: 2000,
        }
    }
}

impl SyncConfig {
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }
}

// ----------------------------------------------------------------------------
// Channel Configuration
// ----------------------------------------------------------------------------

/// Buffer sizes for the notification broadcast channel
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Minimum buffer size for status events (Controller → observers);
    /// the controller grows it to hold a full init without lagging
    pub event_buffer_size: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 256,
        }
    }
}

// ----------------------------------------------------------------------------
// Route Configuration
// ----------------------------------------------------------------------------

/// Channel/sub-channel addressing handed to the transport with every message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    pub channel: u8,
    pub sub_channel: u8,
}

// ----------------------------------------------------------------------------
// Unified Configuration
// ----------------------------------------------------------------------------

/// Complete controller configuration
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PodsyncConfig {
    pub layout: DeviceLayout,
    pub sync: SyncConfig,
    pub channels: ChannelConfig,
    pub route: RouteConfig,
}

impl PodsyncConfig {
    /// Capacity of the status event channel for this layout
    pub fn event_capacity(&self) -> usize {
        self.channels
            .event_buffer_size
            .max(self.layout.init_event_count())
    }

    /// Small layout and short timeouts for tests
    pub fn testing() -> Self {
        Self {
            layout: DeviceLayout {
                number_set: 2,
                preset_per_set: 2,
                pedal_count: 8,
            },
            sync: SyncConfig {
                handshake_timeout_ms: 500,
            },
            channels: ChannelConfig {
                event_buffer_size: 1024,
            },
            route: RouteConfig::default(),
        }
    }

    /// Replace the layout
    pub fn with_layout(mut self, layout: DeviceLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Replace the handshake timeout
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.sync.handshake_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Check the configuration for values the controller cannot work with
    pub fn validate(&self) -> PodsyncResult<()> {
        if self.layout.number_set == 0 {
            return Err(PodsyncError::configuration("number_set must be at least 1"));
        }
        if self.layout.preset_per_set == 0 {
            return Err(PodsyncError::configuration(
                "preset_per_set must be at least 1",
            ));
        }
        if self.sync.handshake_timeout_ms == 0 {
            return Err(PodsyncError::configuration(
                "handshake_timeout_ms must be greater than zero",
            ));
        }
        if self.channels.event_buffer_size == 0 {
            return Err(PodsyncError::configuration(
                "event_buffer_size must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PodsyncConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.layout.total_presets(), 512);
        assert_eq!(config.sync.handshake_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_event_capacity_covers_a_full_init() {
        let config = PodsyncConfig::default();
        assert_eq!(config.layout.init_event_count(), 521);
        assert_eq!(config.event_capacity(), 521);

        let mut roomy = PodsyncConfig::testing();
        roomy.channels.event_buffer_size = 4096;
        assert_eq!(roomy.event_capacity(), 4096);
    }

    #[test]
    fn test_zero_sets_rejected() {
        let config = PodsyncConfig::default().with_layout(DeviceLayout::new(0, 4));
        assert!(matches!(
            config.validate(),
            Err(PodsyncError::Configuration { .. })
        ));
    }

    #[test]
    fn test_partial_layout_falls_back_to_defaults() {
        let config: PodsyncConfig =
            serde_json::from_str(r#"{"layout":{"number_set":3}}"#).unwrap();
        assert_eq!(config.layout.number_set, 3);
        assert_eq!(config.layout.preset_per_set, 64);
        assert_eq!(config.sync, SyncConfig::default());
    }
}
