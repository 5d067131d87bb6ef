//! Command-line build host for the Flow status plugin.
//!
//! The runtime loads configuration, parses the build subcommand, and plays
//! the part of a build tool: it fires the compile-start hook, runs the build
//! command, fires `done`, and pumps checker completions so status reports
//! reach the terminal. Configuration loading is injectable so tests can run
//! the CLI without touching the process environment.

use std::ffi::OsString;
use std::io::Write;
use std::process::{Command, ExitCode, ExitStatus};

use clap::Parser;
use flow_status::Hook;
use flow_status_config::Config;
use tracing::{info, warn};

mod cli;
mod config;
mod driver;
mod errors;
mod telemetry;
mod watch;

use cli::{Cli, CliCommand};
use config::{ConfigArgumentSplit, split_config_arguments};
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
use driver::{BuildDriver, PUMP_INTERVAL, plugin_options};
pub(crate) use errors::AppError;
use watch::{SourceWatcher, WatchEvent};

const CLI_TARGET: &str = "flow_status_cli";

/// CLI flags recognised by the configuration loader that take a value.
/// Boolean switches are listed by `flow_status_config::Switch`.
///
/// MAINTENANCE: keep this list in sync with the non-boolean fields of
/// `flow_status_config::Config`.
const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--binary-path",
    "--extra-args",
    "--log-filter",
    "--log-format",
    "--debounce-ms",
];

/// Runs the CLI using the provided arguments, writing diagnostics to
/// `stderr`.
///
/// Checker banners and output go to the terminal directly. The exit code is
/// the build command's exit code.
#[must_use]
pub fn run<I, E>(args: I, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    E: Write,
{
    run_with_loader(args, stderr, &OrthoConfigLoader)
}

pub(crate) fn run_with_loader<I, E, L>(args: I, stderr: &mut E, loader: &L) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    E: Write,
    L: ConfigLoader,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);
    let cli_arguments = prepare_cli_arguments(&args, &split);

    let result = Cli::try_parse_from(cli_arguments)
        .map_err(AppError::CliUsage)
        .and_then(|cli| {
            loader
                .load(&split.config_arguments)
                .map(|config| (cli, config))
        })
        .and_then(|(cli, config)| execute(cli.command, &config));

    match result {
        Ok(exit_code) => exit_code,
        Err(AppError::CliUsage(error)) if !error.use_stderr() => {
            drop(error.print());
            ExitCode::SUCCESS
        }
        Err(error) => {
            drop(writeln!(stderr, "{error}"));
            ExitCode::FAILURE
        }
    }
}

fn prepare_cli_arguments(args: &[OsString], split: &ConfigArgumentSplit) -> Vec<OsString> {
    let mut cli_arguments: Vec<OsString> = Vec::new();
    if let Some(first) = args.first() {
        cli_arguments.push(first.clone());
    }
    cli_arguments.extend(args.iter().skip(split.command_start).cloned());
    cli_arguments
}

fn execute(command: CliCommand, config: &Config) -> Result<ExitCode, AppError> {
    telemetry::initialise(config)?;
    let build = BuildCommand::from_words(command.build_command());
    let mut driver = BuildDriver::new(plugin_options(config));

    match command {
        CliCommand::Run { .. } => run_once(&mut driver, build.as_ref()),
        CliCommand::Watch { paths, ignored, .. } => {
            let watcher = SourceWatcher::start(&paths, &ignored, config.debounce())?;
            watch(&mut driver, build.as_ref(), &watcher)
        }
    }
}

fn run_once(driver: &mut BuildDriver, build: Option<&BuildCommand>) -> Result<ExitCode, AppError> {
    let exit_code = compile(driver, Hook::Run, build)?;
    driver.drain();
    Ok(exit_code)
}

fn watch(
    driver: &mut BuildDriver,
    build: Option<&BuildCommand>,
    watcher: &SourceWatcher,
) -> Result<ExitCode, AppError> {
    compile(driver, Hook::WatchRun, build)?;

    loop {
        driver.pump();
        match watcher.next_event(PUMP_INTERVAL)? {
            Some(WatchEvent::Changed(files)) => {
                info!(target: CLI_TARGET, changed = files.len(), "sources changed, rebuilding");
                compile(driver, Hook::WatchRun, build)?;
            }
            Some(WatchEvent::Failed(error)) => {
                warn!(target: CLI_TARGET, %error, "file watcher reported an error");
            }
            None => {}
        }
    }
}

/// Runs one compilation between the compile-start hook and `done`.
///
/// `done` fires whether or not the build succeeded, mirroring build tools
/// that report compilations with errors as finished.
fn compile(
    driver: &mut BuildDriver,
    hook: Hook,
    build: Option<&BuildCommand>,
) -> Result<ExitCode, AppError> {
    driver.begin(hook);
    let exit_code = match build {
        Some(command) => exit_code_from_status(command.run()?),
        None => ExitCode::SUCCESS,
    };
    driver.finish();
    Ok(exit_code)
}

/// Build command executed with inherited standard streams.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BuildCommand {
    program: String,
    args: Vec<String>,
}

impl BuildCommand {
    fn from_words(words: &[String]) -> Option<Self> {
        let (program, args) = words.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    fn run(&self) -> Result<ExitStatus, AppError> {
        info!(target: CLI_TARGET, program = %self.program, "running build command");
        Command::new(&self.program)
            .args(&self.args)
            .status()
            .map_err(|source| AppError::SpawnBuild {
                command: self.program.clone(),
                source,
            })
    }
}

fn exit_code_from_status(status: ExitStatus) -> ExitCode {
    status
        .code()
        .and_then(|code| u8::try_from(code).ok())
        .map_or(ExitCode::FAILURE, ExitCode::from)
}
