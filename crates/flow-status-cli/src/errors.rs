//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::telemetry::TelemetryError;
use crate::watch::WatchError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to start build command `{command}`: {source}")]
    SpawnBuild { command: String, source: io::Error },
    #[error(transparent)]
    Watch(#[from] WatchError),
}
