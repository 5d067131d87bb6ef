//! Shared configuration for the `flow-status` toolchain.
//!
//! Configuration is layered by `ortho_config`: built-in defaults, then a
//! configuration file (discovered automatically or named with
//! `--config-path` / `FLOW_STATUS_CONFIG_PATH`), then `FLOW_STATUS_*`
//! environment variables, then command-line flags. Boolean fields are set
//! from the command line only through [`Switch`]es, applied by
//! [`Config::load_with_switches`]. The coordinator options are passed
//! through verbatim; nothing here validates them beyond parsing.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod defaults;
mod logging;
mod switches;

pub use defaults::{
    DEFAULT_BINARY_PATH, DEFAULT_DEBOUNCE_MS, DEFAULT_LOG_FILTER, default_binary_path,
    default_log_filter, default_log_filter_string, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use switches::Switch;

/// Resolved configuration for the CLI host and the status plugin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "FLOW_STATUS")]
pub struct Config {
    /// Checker executable, optionally preceded by wrapper words such as
    /// `npx`.
    #[ortho_config(default = default_binary_path())]
    pub binary_path: String,
    /// Arguments appended to the checker server's `start` command.
    #[ortho_config(default = String::new())]
    pub extra_args: String,
    /// Restart the checker server on the first build of a session.
    #[ortho_config(default = true, skip_cli)]
    pub restart_server: bool,
    /// Suppress the success report when the checker finds no errors.
    #[ortho_config(default = false, skip_cli)]
    pub quiet_success: bool,
    /// Tracing filter expression.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Tracing output format.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Quiet period before watched file changes trigger a rebuild.
    #[ortho_config(default = DEFAULT_DEBOUNCE_MS)]
    pub debounce_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            binary_path: default_binary_path(),
            extra_args: String::new(),
            restart_server: true,
            quiet_success: false,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl Config {
    /// Checker executable.
    pub fn binary_path(&self) -> &str {
        self.binary_path.as_str()
    }

    /// Arguments for the server `start` command.
    pub fn extra_args(&self) -> &str {
        self.extra_args.as_str()
    }

    /// Whether the first build restarts the checker server.
    pub const fn restart_server(&self) -> bool {
        self.restart_server
    }

    /// Whether clean results are reported silently.
    pub const fn quiet_success(&self) -> bool {
        self.quiet_success
    }

    /// Tracing filter expression.
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Tracing output format.
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Watch-mode debounce interval.
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
