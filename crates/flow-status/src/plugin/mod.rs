//! Lifecycle coordination between the host build and the checker.
//!
//! [`StatusPlugin`] owns two pieces of state for one build session:
//!
//! - [`SessionState`] moves from `Uninitialised` to `Starting` on the first
//!   compile-start hook and reaches `Ready` once the server restart has
//!   completed. It never moves back, so the restart happens at most once no
//!   matter how many `run` or `watch-run` events follow.
//! - [`CheckState`] toggles between `Idle` and `Checking` around each status
//!   query. A `done` event arriving while a query is outstanding is dropped,
//!   not queued.
//!
//! Neither state is shared across threads. The plugin is driven entirely by
//! the host's hook dispatch and by runner completions delivered on the same
//! thread.

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, info};

use crate::banner;
use crate::command::{CheckerCommand, CommandOutput, Invocation};
use crate::console::Console;
use crate::hook::{BuildHost, Continuation, Hook, HookHandler};
use crate::options::PluginOptions;
use crate::runner::CommandRunner;

/// Tracing target for lifecycle coordination.
const PLUGIN_TARGET: &str = "flow_status::plugin";

/// Progress of the checker server restart for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No compile-start hook has fired yet.
    Uninitialised,
    /// The server is being stopped and started.
    Starting,
    /// The session has started; later compile-start hooks continue at once.
    Ready,
}

/// Whether a status query is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    /// No status query is running.
    Idle,
    /// A status query has been issued and has not completed.
    Checking,
}

/// Build-tool plugin that restarts the checker server once per session and
/// reports the checker's status after every build.
///
/// Cloning yields another handle to the same session.
///
/// # Example
///
/// ```
/// use flow_status::{
///     CommandOutput, CommandRunner, Completion, Hook, HookRegistry, Invocation, PluginOptions,
///     SessionState, StatusPlugin, StdConsole,
/// };
///
/// struct Clean;
///
/// impl CommandRunner for Clean {
///     fn exec(&self, _invocation: Invocation, on_complete: Completion) {
///         on_complete(CommandOutput::new(0, "No errors!", ""));
///     }
/// }
///
/// let plugin = StatusPlugin::new(
///     PluginOptions::default().with_quiet_success(true),
///     Clean,
///     StdConsole,
/// );
/// let mut host = HookRegistry::new();
/// plugin.apply(&mut host);
///
/// host.before_compile(Hook::Run, Box::new(|| {}));
/// assert_eq!(plugin.session_state(), SessionState::Ready);
/// ```
pub struct StatusPlugin<R, C> {
    coordinator: Rc<Coordinator<R, C>>,
}

struct Coordinator<R, C> {
    options: PluginOptions,
    runner: R,
    console: C,
    session: Cell<SessionState>,
    check: Cell<CheckState>,
}

impl<R, C> Clone for StatusPlugin<R, C> {
    fn clone(&self) -> Self {
        Self {
            coordinator: Rc::clone(&self.coordinator),
        }
    }
}

impl<R, C> StatusPlugin<R, C>
where
    R: CommandRunner + 'static,
    C: Console + 'static,
{
    /// Creates a plugin for a fresh session.
    #[must_use]
    pub fn new(options: PluginOptions, runner: R, console: C) -> Self {
        Self {
            coordinator: Rc::new(Coordinator {
                options,
                runner,
                console,
                session: Cell::new(SessionState::Uninitialised),
                check: Cell::new(CheckState::Idle),
            }),
        }
    }

    /// Registers the plugin's handlers with `host`.
    ///
    /// Both `run` and `watch-run` ensure the server has been started, so the
    /// restart happens whichever build mode the host uses. `done` triggers a
    /// status check.
    pub fn apply<H>(&self, host: &mut H)
    where
        H: BuildHost + ?Sized,
    {
        for hook in [Hook::Run, Hook::WatchRun] {
            let coordinator = Rc::clone(&self.coordinator);
            host.register(
                hook,
                HookHandler::before_compile(move |continuation| {
                    coordinator.ensure_server_started(continuation);
                }),
            );
        }

        let coordinator = Rc::clone(&self.coordinator);
        host.register(
            Hook::Done,
            HookHandler::after_compile(move || coordinator.check_status()),
        );
        debug!(target: PLUGIN_TARGET, "registered lifecycle hooks");
    }

    /// Restarts the checker server on the first call of the session, then
    /// invokes `continuation`.
    ///
    /// Later calls invoke `continuation` immediately. When server restarts
    /// are disabled the first call only marks the session as started.
    pub fn ensure_server_started(&self, continuation: Continuation) {
        self.coordinator.ensure_server_started(continuation);
    }

    /// Queries the checker and reports the result, unless a query is already
    /// outstanding.
    pub fn check_status(&self) {
        self.coordinator.check_status();
    }

    /// Current server session state.
    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.coordinator.session.get()
    }

    /// Current status check state.
    #[must_use]
    pub fn check_state(&self) -> CheckState {
        self.coordinator.check.get()
    }

    /// Options the plugin was built with.
    #[must_use]
    pub fn options(&self) -> &PluginOptions {
        &self.coordinator.options
    }
}

impl<R, C> Coordinator<R, C>
where
    R: CommandRunner + 'static,
    C: Console + 'static,
{
    fn invocation(&self, command: CheckerCommand) -> Invocation {
        Invocation::new(self.options.binary_path(), command)
    }

    fn ensure_server_started(self: &Rc<Self>, continuation: Continuation) {
        if self.session.get() != SessionState::Uninitialised {
            continuation();
            return;
        }

        self.session.set(SessionState::Starting);
        if !self.options.restart_server() {
            info!(
                target: PLUGIN_TARGET,
                "server restart disabled; session marked as started"
            );
            self.session.set(SessionState::Ready);
            continuation();
            return;
        }

        info!(
            target: PLUGIN_TARGET,
            binary = self.options.binary_path(),
            "restarting checker server"
        );
        let coordinator = Rc::clone(self);
        self.runner.exec(
            self.invocation(CheckerCommand::Stop),
            Box::new(move |stopped| {
                // A server that was not running fails to stop; only
                // completion matters here.
                debug!(
                    target: PLUGIN_TARGET,
                    code = stopped.code(),
                    "checker server stop finished"
                );
                coordinator.start_server(continuation);
            }),
        );
    }

    fn start_server(self: &Rc<Self>, continuation: Continuation) {
        let coordinator = Rc::clone(self);
        let start = self.invocation(CheckerCommand::Start {
            extra_args: self.options.extra_args().to_owned(),
        });
        self.runner.exec(
            start,
            Box::new(move |started| {
                debug!(
                    target: PLUGIN_TARGET,
                    code = started.code(),
                    "checker server start finished"
                );
                coordinator.session.set(SessionState::Ready);
                continuation();
            }),
        );
    }

    fn check_status(self: &Rc<Self>) {
        if self.check.get() == CheckState::Checking {
            debug!(
                target: PLUGIN_TARGET,
                "status check already in flight; dropping request"
            );
            return;
        }

        self.check.set(CheckState::Checking);
        let coordinator = Rc::clone(self);
        self.runner.exec(
            self.invocation(CheckerCommand::Status),
            Box::new(move |output| coordinator.report(&output)),
        );
    }

    fn report(&self, output: &CommandOutput) {
        let has_errors = !output.is_success();
        let quiet = self.options.quiet_success();
        info!(
            target: PLUGIN_TARGET,
            code = output.code(),
            has_errors,
            "status check finished"
        );

        if has_errors {
            match self.options.error_handler() {
                Some(on_error) => on_error(output.stderr(), output.code()),
                None => banner::failure(&self.console),
            }
        } else if !quiet {
            match self.options.success_handler() {
                Some(on_success) => on_success(output.stdout()),
                None => banner::success(&self.console),
            }
        }

        if !quiet || has_errors {
            self.console.log(output.stdout());
        }
        self.console.error(output.stderr());

        self.check.set(CheckState::Idle);
    }
}

#[cfg(test)]
mod tests;
