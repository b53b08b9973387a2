//! Command-line interface definitions and parsing

use clap::{Parser, Subcommand, ValueEnum};
use podsync_runtime::Bound;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Sync every set and preset from the device, printing progress
    Scan,
    /// Make a preset current on the device
    Select {
        #[arg(short, long)]
        set: u8,
        #[arg(short, long)]
        preset: u8,
    },
    /// Change a parameter value, or one of its sweep bounds
    Param {
        /// Item slot (amps and cabs first, then pedals)
        #[arg(long)]
        slot: u32,
        /// Parameter id within the item
        #[arg(long)]
        pid: u32,
        /// New value; tempo parameters also accept note divisions like 1/8T
        #[arg(long, allow_hyphen_values = true)]
        value: String,
        /// Apply the value to a bound instead of the current value
        #[arg(long, value_enum)]
        bound: Option<BoundArg>,
    },
    /// Rename the current preset
    Rename { name: String },
    /// Store the current preset into its slot
    Save,
    /// Dump the current preset as JSON
    Status {
        /// Also print the encoded preset definition frame as hex
        #[arg(long)]
        frame: bool,
    },
    /// Print the effective configuration as TOML
    Config,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundArg {
    Min,
    Max,
}

impl From<BoundArg> for Bound {
    fn from(arg: BoundArg) -> Self {
        match arg {
            BoundArg::Min => Bound::Min,
            BoundArg::Max => Bound::Max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_with_bound() {
        let cli = Cli::parse_from([
            "podsync", "param", "--slot", "3", "--pid", "1", "--value", "0.2", "--bound", "max",
        ]);
        assert_eq!(
            cli.command,
            Commands::Param {
                slot: 3,
                pid: 1,
                value: "0.2".to_string(),
                bound: Some(BoundArg::Max),
            }
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["podsync", "select", "-s", "1", "-p", "2", "--verbose"]);
        assert!(cli.verbose);
        assert_eq!(cli.command, Commands::Select { set: 1, preset: 2 });
    }

    #[test]
    fn test_negative_value_is_not_a_flag() {
        let cli = Cli::parse_from(["podsync", "param", "--slot", "0", "--pid", "0", "--value", "-1"]);
        assert!(matches!(cli.command, Commands::Param { ref value, .. } if value == "-1"));
    }
}
