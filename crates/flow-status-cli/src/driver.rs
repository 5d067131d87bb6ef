//! Minimal build host driving the status plugin through the build
//! lifecycle.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use flow_status::{
    Console, Hook, HookRegistry, PluginOptions, StatusPlugin, StdConsole, ThreadedRunner,
};
use flow_status_config::Config;
use tracing::{debug, warn};

const DRIVER_TARGET: &str = "flow_status_cli::driver";

/// How long a single wait on checker completions may block.
pub(crate) const PUMP_INTERVAL: Duration = Duration::from_millis(100);

/// Converts loaded configuration into plugin options.
pub(crate) fn plugin_options(config: &Config) -> PluginOptions {
    PluginOptions::default()
        .with_binary_path(config.binary_path())
        .with_extra_args(config.extra_args())
        .with_restart_server(config.restart_server())
        .with_quiet_success(config.quiet_success())
}

/// Owns the hook registry and the runner the plugin issues commands on.
pub(crate) struct BuildDriver {
    host: HookRegistry,
    runner: Rc<ThreadedRunner>,
}

impl BuildDriver {
    /// Creates a driver whose plugin reports to the terminal.
    pub(crate) fn new(options: PluginOptions) -> Self {
        Self::with_console(options, StdConsole)
    }

    /// Creates a driver whose plugin reports to `console`.
    pub(crate) fn with_console<C>(options: PluginOptions, console: C) -> Self
    where
        C: Console + 'static,
    {
        let runner = Rc::new(ThreadedRunner::new());
        let plugin = StatusPlugin::new(options, Rc::clone(&runner), console);
        let mut host = HookRegistry::new();
        plugin.apply(&mut host);
        Self { host, runner }
    }

    /// Fires a compile-start hook and pumps completions until every handler
    /// lets the build proceed.
    pub(crate) fn begin(&mut self, hook: Hook) {
        let released = Rc::new(Cell::new(false));
        let flag = Rc::clone(&released);
        self.host
            .before_compile(hook, Box::new(move || flag.set(true)));

        while !released.get() {
            if self.runner.is_idle() {
                warn!(
                    target: DRIVER_TARGET,
                    %hook,
                    "compile-start handlers stalled with no command outstanding"
                );
                return;
            }
            self.runner.pump_timeout(PUMP_INTERVAL);
        }
        debug!(target: DRIVER_TARGET, %hook, "build may proceed");
    }

    /// Fires the `done` hook.
    pub(crate) fn finish(&mut self) {
        self.host.after_compile(Hook::Done);
    }

    /// Delivers completions that have already arrived.
    pub(crate) fn pump(&self) -> usize {
        self.runner.pump()
    }

    /// Blocks until every outstanding checker command has been reported.
    pub(crate) fn drain(&self) {
        self.runner.run_until_idle();
    }
}
