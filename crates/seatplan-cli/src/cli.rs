//! CLI definition using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use seatplan_types::{OutputFormat, Strategy};

#[derive(Debug, Parser)]
#[command(name = "seatplan")]
#[command(version)]
#[command(about = "Split a student roster into vehicle groups and export pickup routes")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Model name override for the llm strategy
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load roster files and list the students
    Load {
        /// Roster CSV files, in file-index order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Group a roster into vehicles
    Group {
        /// Roster CSV files, in file-index order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Grouping strategy. Uses config value if not specified.
        #[arg(long, short = 's')]
        strategy: Option<Strategy>,

        /// Students per batch. Uses config value if not specified.
        #[arg(long, short = 'b')]
        batch_size: Option<usize>,

        /// Fleet definition (TOML). Standard fleet if not specified.
        #[arg(long)]
        fleet: Option<PathBuf>,

        /// Write the plan as JSON
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Also export the plan to Excel
        #[arg(long)]
        xlsx: Option<PathBuf>,
    },

    /// Export a saved plan to Excel
    Export {
        /// Path to plan JSON file
        plan: PathBuf,

        /// Output Excel file path
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Assign students to groups by hand
    Session {
        /// Roster CSV files, in file-index order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Start from a saved plan instead of empty groups
        #[arg(long)]
        plan: Option<PathBuf>,

        /// Fleet definition (TOML). Standard fleet if not specified.
        /// A saved plan already fixes its vehicles.
        #[arg(long, conflicts_with = "plan")]
        fleet: Option<PathBuf>,
    },

    /// Show the vehicle fleet
    Fleet {
        /// Fleet definition (TOML). Standard fleet if not specified.
        #[arg(long)]
        fleet: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set default strategy (greedy, llm)
        #[arg(long)]
        set_strategy: Option<Strategy>,

        /// Set batch size
        #[arg(long)]
        set_batch_size: Option<usize>,

        /// Set model name
        #[arg(long)]
        set_model: Option<String>,

        /// Set chat-completions endpoint
        #[arg(long)]
        set_endpoint: Option<String>,

        /// Set the environment variable read for the API key
        #[arg(long)]
        set_api_key_env: Option<String>,

        /// Set route origin for files without their own route
        #[arg(long)]
        set_origin: Option<String>,

        /// Set route destination for files without their own route
        #[arg(long)]
        set_destination: Option<String>,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_fleet_conflicts_with_plan() {
        let err = Cli::try_parse_from([
            "seatplan", "session", "a.csv", "--plan", "plan.json", "--fleet", "fleet.toml",
        ])
        .err()
        .unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);

        let cli = Cli::try_parse_from(["seatplan", "session", "a.csv", "--fleet", "fleet.toml"]).unwrap();
        assert!(matches!(cli.command, Commands::Session { fleet: Some(_), plan: None, .. }));
    }

    #[test]
    fn test_manual_strategy_is_not_selectable() {
        assert!(Cli::try_parse_from(["seatplan", "group", "a.csv", "--strategy", "manual"]).is_err());
        let cli = Cli::try_parse_from(["seatplan", "group", "a.csv", "--strategy", "llm"]).unwrap();
        assert!(matches!(cli.command, Commands::Group { strategy: Some(Strategy::Llm), .. }));
    }
}
