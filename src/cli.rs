//! CLI definitions for nova.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nova_protocols::TestType;

/// nova CLI.
#[derive(Parser)]
#[command(name = "nova")]
#[command(about = "Record browser interactions and turn them into test steps")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Open a page in Chrome and record interactions until Ctrl-C
    Record {
        /// Page to start on
        url: String,

        /// Stop automatically after this many seconds
        #[arg(long)]
        duration: Option<u64>,

        /// Recording file (default: recording-<timestamp>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the test steps and per-tab action summaries of a recording
    Steps {
        /// Recording file
        file: PathBuf,
    },

    /// Print the save payload of a recording as JSON
    Export {
        /// Recording file
        file: PathBuf,

        /// Project the test belongs to
        #[arg(long, env = "NOVA_PROJECT")]
        project: Option<String>,

        /// Test name (default: "Test <date time>")
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Tag (repeatable, default: recorded)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// functional, monkey or exploratory
        #[arg(long, default_value = "exploratory")]
        test_type: TestType,
    },
}
