//! CLI argument definitions for the Flow status build host.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// Command-line interface for the Flow status build host.
#[derive(Parser, Debug)]
#[command(name = "flow-status", disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// Build mode to run.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Build modes supported by the host.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum CliCommand {
    /// Builds once, then reports the checker status.
    Run {
        /// Build command to execute between the lifecycle hooks.
        #[arg(
            value_name = "BUILD",
            num_args = 0..,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        command: Vec<String>,
    },
    /// Builds, then rebuilds whenever watched sources change.
    Watch {
        /// Directory to watch; repeat for several. Defaults to the current
        /// directory.
        #[arg(long = "path", value_name = "DIR")]
        paths: Vec<Utf8PathBuf>,
        /// Directory name whose contents never trigger a rebuild, on top of
        /// the built-in list; repeat for several. Use it for build output.
        #[arg(long = "ignore", value_name = "NAME")]
        ignored: Vec<String>,
        /// Build command to execute on every rebuild.
        #[arg(
            value_name = "BUILD",
            num_args = 0..,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        command: Vec<String>,
    },
}

impl CliCommand {
    /// Returns the build command words.
    pub(crate) fn build_command(&self) -> &[String] {
        match self {
            Self::Run { command } | Self::Watch { command, .. } => command,
        }
    }
}
