//! CLI module for schemerge
//!
//! Provides command-line interface for:
//! - serialize / deserialize: one-shot record operations over stdin
//! - defines / read-only: property pointer queries
//! - validate: draft-07 validation of a stdin record
//! - serve: HTTP host

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{defines, deserialize, read_only, run, run_command, serialize, serve, validate};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, read_request_from, write_error, write_response};
