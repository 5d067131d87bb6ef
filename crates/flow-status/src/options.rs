//! Construction options for [`StatusPlugin`](crate::StatusPlugin).
//!
//! Options are never validated. Anything left unset falls back to the
//! defaults documented on each builder method.

use std::fmt;

/// Checker executable used when no binary path is configured. Resolved via
/// `PATH`.
pub const DEFAULT_BINARY: &str = "flow";

/// Callback receiving the checker's standard output after a clean status.
pub type SuccessHandler = Box<dyn Fn(&str)>;

/// Callback receiving the checker's standard error and exit code after a
/// failed status.
pub type ErrorHandler = Box<dyn Fn(&str, i32)>;

/// Options controlling how the plugin drives the checker.
///
/// # Example
///
/// ```
/// use flow_status::PluginOptions;
///
/// let options = PluginOptions::default()
///     .with_binary_path("node_modules/.bin/flow")
///     .with_quiet_success(true)
///     .on_error(|stderr, code| eprintln!("flow exited with {code}: {stderr}"));
///
/// assert!(options.quiet_success());
/// assert!(options.restart_server());
/// ```
pub struct PluginOptions {
    extra_args: String,
    binary_path: String,
    restart_server: bool,
    quiet_success: bool,
    on_success: Option<SuccessHandler>,
    on_error: Option<ErrorHandler>,
}

impl PluginOptions {
    /// Sets arguments appended to the server `start` command. Defaults to
    /// none.
    ///
    /// The value is split on whitespace without shell parsing: quotes and
    /// escapes are passed through literally, so a single argument cannot
    /// contain a space.
    #[must_use]
    pub fn with_extra_args(mut self, extra_args: impl Into<String>) -> Self {
        self.extra_args = extra_args.into();
        self
    }

    /// Sets the checker executable. Defaults to [`DEFAULT_BINARY`].
    ///
    /// Leading words such as `npx` in `npx flow` become the program, and the
    /// rest are passed before the subcommand. The value is split on
    /// whitespace without shell parsing, so paths containing spaces are not
    /// supported.
    #[must_use]
    pub fn with_binary_path(mut self, binary_path: impl Into<String>) -> Self {
        self.binary_path = binary_path.into();
        self
    }

    /// Controls whether the first build restarts the checker server.
    /// Defaults to `true`.
    #[must_use]
    pub fn with_restart_server(mut self, restart_server: bool) -> Self {
        self.restart_server = restart_server;
        self
    }

    /// Suppresses the success report and output echo when the checker finds
    /// no errors. Defaults to `false`.
    #[must_use]
    pub fn with_quiet_success(mut self, quiet_success: bool) -> Self {
        self.quiet_success = quiet_success;
        self
    }

    /// Replaces the default success banner.
    #[must_use]
    pub fn on_success(mut self, handler: impl Fn(&str) + 'static) -> Self {
        self.on_success = Some(Box::new(handler));
        self
    }

    /// Replaces the default error banner.
    #[must_use]
    pub fn on_error(mut self, handler: impl Fn(&str, i32) + 'static) -> Self {
        self.on_error = Some(Box::new(handler));
        self
    }

    /// Arguments appended to the server `start` command.
    #[must_use]
    pub fn extra_args(&self) -> &str {
        self.extra_args.as_str()
    }

    /// Checker executable, possibly followed by wrapper arguments.
    #[must_use]
    pub fn binary_path(&self) -> &str {
        self.binary_path.as_str()
    }

    /// Whether the first build restarts the checker server.
    #[must_use]
    pub const fn restart_server(&self) -> bool {
        self.restart_server
    }

    /// Whether clean status results are reported silently.
    #[must_use]
    pub const fn quiet_success(&self) -> bool {
        self.quiet_success
    }

    pub(crate) fn success_handler(&self) -> Option<&SuccessHandler> {
        self.on_success.as_ref()
    }

    pub(crate) fn error_handler(&self) -> Option<&ErrorHandler> {
        self.on_error.as_ref()
    }
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            extra_args: String::new(),
            binary_path: String::from(DEFAULT_BINARY),
            restart_server: true,
            quiet_success: false,
            on_success: None,
            on_error: None,
        }
    }
}

impl fmt::Debug for PluginOptions {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("PluginOptions")
            .field("extra_args", &self.extra_args)
            .field("binary_path", &self.binary_path)
            .field("restart_server", &self.restart_server)
            .field("quiet_success", &self.quiet_success)
            .field("custom_on_success", &self.on_success.is_some())
            .field("custom_on_error", &self.on_error.is_some())
            .finish()
    }
}
