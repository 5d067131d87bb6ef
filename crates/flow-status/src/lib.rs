//! Build-tool integration for the Flow static type checker.
//!
//! The `flow-status` crate coordinates an external type checker with a host
//! build tool. A [`StatusPlugin`] binds to the host's lifecycle hooks: the
//! first build of a session restarts the checker's background server, and
//! every completed build triggers a status query whose exit code decides
//! between the success and error reports.
//!
//! # Architecture
//!
//! The plugin never talks to the operating system directly. Checker commands
//! flow through a [`CommandRunner`], output flows to a [`Console`], and hooks
//! are registered with a [`BuildHost`]. All three are injected so tests can
//! substitute recording doubles, and so the host decides on which thread
//! completions are delivered. The coordinator's state is deliberately
//! `!Send`; it lives on the host's event loop.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::rc::Rc;
//!
//! use flow_status::{Hook, HookRegistry, PluginOptions, StatusPlugin, StdConsole, ThreadedRunner};
//!
//! let runner = Rc::new(ThreadedRunner::new());
//! let plugin = StatusPlugin::new(PluginOptions::default(), Rc::clone(&runner), StdConsole);
//!
//! let mut host = HookRegistry::new();
//! plugin.apply(&mut host);
//!
//! host.before_compile(Hook::Run, Box::new(|| {}));
//! runner.run_until_idle();
//! host.after_compile(Hook::Done);
//! runner.run_until_idle();
//! ```

pub mod banner;
pub mod command;
pub mod console;
pub mod hook;
pub mod options;
pub mod plugin;
pub mod process;
pub mod runner;

#[cfg(test)]
mod tests;

pub use self::command::{CheckerCommand, CommandOutput, Invocation, OutputMode};
pub use self::console::{Console, StdConsole};
pub use self::hook::{BuildHost, Continuation, Hook, HookHandler, HookParseError, HookRegistry};
pub use self::options::{DEFAULT_BINARY, ErrorHandler, PluginOptions, SuccessHandler};
pub use self::plugin::{CheckState, SessionState, StatusPlugin};
pub use self::process::ThreadedRunner;
pub use self::runner::{CommandRunner, Completion};
