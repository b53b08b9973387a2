//! Podsync CLI library
//!
//! Argument parsing, layered configuration and command execution for the
//! `podsync` binary, which drives a controller against a simulated device.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use app::PodsyncApp;
pub use cli::{BoundArg, Cli, Commands};
pub use commands::CommandDispatcher;
pub use config::{CliAppConfig, DeviceConfig};
pub use error::{CliError, Result};
