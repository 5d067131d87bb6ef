//! Checker subcommands and the results they produce.
//!
//! The checker is driven through three subcommands: `stop` and `start` manage
//! its background server, and `status` asks the server whether the project
//! currently type-checks. An [`Invocation`] binds one of these subcommands to
//! the configured binary so a [`CommandRunner`](crate::CommandRunner) can
//! execute it without knowing anything about the checker.

use std::fmt;

use crate::options::DEFAULT_BINARY;

/// Subcommands issued against the checker binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckerCommand {
    /// Stops the background server. Fails harmlessly when none is running.
    Stop,
    /// Starts the background server.
    Start {
        /// Caller-supplied arguments appended after `start`, split on
        /// whitespace.
        extra_args: String,
    },
    /// Queries the server for the project's error status with colourised
    /// output.
    Status,
}

impl CheckerCommand {
    /// Returns the subcommand name.
    ///
    /// # Example
    ///
    /// ```
    /// use flow_status::CheckerCommand;
    ///
    /// assert_eq!(CheckerCommand::Status.name(), "status");
    /// ```
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Start { .. } => "start",
            Self::Status => "status",
        }
    }

    /// Returns the arguments passed to the checker binary.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        match self {
            Self::Stop => vec![String::from("stop")],
            Self::Start { extra_args } => std::iter::once(String::from("start"))
                .chain(extra_args.split_whitespace().map(str::to_owned))
                .collect(),
            Self::Status => ["status", "--color", "always"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    /// Returns how the command's output streams are handled.
    ///
    /// Server management output goes straight to the terminal; status output
    /// is captured so the plugin can classify and echo it.
    #[must_use]
    pub const fn output_mode(&self) -> OutputMode {
        match self {
            Self::Status => OutputMode::Captured,
            Self::Stop | Self::Start { .. } => OutputMode::Inherited,
        }
    }
}

impl fmt::Display for CheckerCommand {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

/// Treatment of a child process's standard output and error streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Streams are collected and returned in the [`CommandOutput`].
    Captured,
    /// Streams are shared with the current process; the returned output
    /// text is empty.
    Inherited,
}

/// A checker subcommand bound to the executable that runs it.
///
/// The binary path is split on whitespace: the first word names the
/// executable and any remaining words are passed ahead of the subcommand.
/// This lets callers point at wrappers such as `npx flow`. A blank binary
/// path falls back to [`DEFAULT_BINARY`].
///
/// # Example
///
/// ```
/// use flow_status::{CheckerCommand, Invocation};
///
/// let invocation = Invocation::new("npx flow", CheckerCommand::Status);
/// assert_eq!(invocation.program(), "npx");
/// assert_eq!(invocation.args(), ["flow", "status", "--color", "always"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    command: CheckerCommand,
}

impl Invocation {
    /// Binds `command` to the executable named by `binary`.
    #[must_use]
    pub fn new(binary: &str, command: CheckerCommand) -> Self {
        let mut words = binary.split_whitespace().map(str::to_owned);
        let program = words
            .next()
            .unwrap_or_else(|| String::from(DEFAULT_BINARY));
        let mut args: Vec<String> = words.collect();
        args.extend(command.args());
        Self {
            program,
            args,
            command,
        }
    }

    /// Executable to spawn.
    #[must_use]
    pub fn program(&self) -> &str {
        self.program.as_str()
    }

    /// Arguments following the executable.
    #[must_use]
    pub fn args(&self) -> &[String] {
        self.args.as_slice()
    }

    /// Checker subcommand this invocation runs.
    #[must_use]
    pub const fn command(&self) -> &CheckerCommand {
        &self.command
    }

    /// Output handling requested by the subcommand.
    #[must_use]
    pub const fn output_mode(&self) -> OutputMode {
        self.command.output_mode()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.program)?;
        for arg in &self.args {
            write!(formatter, " {arg}")?;
        }
        Ok(())
    }
}

/// Exit code and captured text of a completed checker command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    code: i32,
    stdout: String,
    stderr: String,
}

impl CommandOutput {
    /// Builds an output record.
    #[must_use]
    pub fn new(code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Process exit code. `-1` when the process was terminated by a signal.
    #[must_use]
    pub const fn code(&self) -> i32 {
        self.code
    }

    /// Captured standard output.
    #[must_use]
    pub fn stdout(&self) -> &str {
        self.stdout.as_str()
    }

    /// Captured standard error.
    #[must_use]
    pub fn stderr(&self) -> &str {
        self.stderr.as_str()
    }

    /// Returns `true` when the exit code is zero.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code == 0
    }
}
