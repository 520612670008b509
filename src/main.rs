//! schemerge CLI entry point
//!
//! All logic lives in the CLI module; main only reports failures.

use schemerge::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
