//! CLI entrypoint for the Flow status build host.
//!
//! The binary delegates to [`flow_status_cli::run`], which loads
//! configuration, parses the build subcommand, and drives the status plugin
//! through the build lifecycle.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Worker threads log through stderr too, so the handle stays unlocked.
    let mut stderr = io::stderr();
    flow_status_cli::run(std::env::args_os(), &mut stderr)
}
