//! CLI argument definitions using clap
//!
//! Commands:
//! - schemerge serialize --schema <file>
//! - schemerge deserialize --schema <file>
//! - schemerge defines --schema <file> --pointer <pointer>
//! - schemerge read-only --schema <file> --pointer <pointer>
//! - schemerge validate --schema <file>
//! - schemerge serve

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// schemerge - schema-driven record merging
#[derive(Parser, Debug)]
#[command(name = "schemerge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (defaults apply when omitted)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge stdin {"data", "previousData"} into the record to persist
    Serialize {
        /// Path to schema document
        #[arg(long)]
        schema: PathBuf,
    },

    /// Keep only root keys the schema declares from stdin {"data"}
    Deserialize {
        /// Path to schema document
        #[arg(long)]
        schema: PathBuf,
    },

    /// Report whether the schema declares a property
    Defines {
        /// Path to schema document
        #[arg(long)]
        schema: PathBuf,

        /// Property pointer, e.g. "#/vehicle/plate"
        #[arg(long)]
        pointer: String,
    },

    /// Report whether a property is read-only
    ReadOnly {
        /// Path to schema document
        #[arg(long)]
        schema: PathBuf,

        /// Property pointer, e.g. "#/vehicle/plate"
        #[arg(long)]
        pointer: String,
    },

    /// Validate stdin {"data"} against the schema
    Validate {
        /// Path to schema document
        #[arg(long)]
        schema: PathBuf,
    },

    /// Start the HTTP server
    Serve,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
