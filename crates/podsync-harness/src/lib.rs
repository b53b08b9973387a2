//! Podsync Harness
//!
//! Test doubles for driving a controller without hardware:
//! - [`RecordingTransport`]: records every outbound message, can be told to fail
//! - [`SimulatedPod`]: a transport that also plays the device, answering
//!   queries through the controller's completion signal

pub mod device;
pub mod recording;

pub use device::{DeviceState, SimulatedPod, SimulatedPodConfig};
pub use recording::{RecordingTransport, SentMessage};
