//! Podsync Runtime
//!
//! The controller engine on top of `podsync-core`:
//! - `SharedBoard`: the model behind one exclusive async lock
//! - `SyncGate`: the single-slot query/response handshake
//! - `NotificationHub`: status event fan-out
//! - `Controller`: mutations, bulk scans and preset selection
//!
//! Build a controller with [`ControllerBuilder`], wire the receiver to
//! [`ControllerBuilder::completion_signal`], then `start()` it.

pub mod board;
pub mod builder;
pub mod bulk;
pub mod controller;
pub mod mutator;
pub mod notify;
pub mod outbound;
pub mod selection;
pub mod sync_gate;
pub mod tasks;

pub use board::{BoardGuard, LockStats, SharedBoard};
pub use builder::ControllerBuilder;
pub use bulk::{preset_progress, set_progress};
pub use controller::Controller;
pub use mutator::Bound;
pub use notify::NotificationHub;
pub use outbound::{Outbound, OutboundPlan, TempoMessage};
pub use sync_gate::{CompletionSignal, SyncGate, SyncSession};
pub use tasks::TaskSet;

// Re-export core types for convenience
pub use podsync_core::{
    DeviceLayout, Message, MessageFactory, MessageKind, PodsyncConfig, PodsyncError,
    PodsyncResult, StatusEvent, ToneTarget, Transport,
};
