//! Process-based command execution on worker threads.
//!
//! [`ThreadedRunner`] implements [`CommandRunner`] by spawning each checker
//! command on a short-lived worker thread. Workers never touch plugin state:
//! they post the finished [`CommandOutput`] to a channel, and the owning
//! thread delivers completions when it pumps the runner. This keeps the
//! plugin confined to the host's event loop while child processes run in
//! the background.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io;
use std::process::{Command, ExitStatus};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::command::{CommandOutput, Invocation, OutputMode};
use crate::runner::{CommandRunner, Completion};

/// Tracing target for checker process operations.
const PROCESS_TARGET: &str = "flow_status::process";

/// Exit code reported when the executable could not be started, matching
/// the shell's "command not found".
pub const SPAWN_FAILURE_CODE: i32 = 127;

struct Finished {
    ticket: u64,
    output: CommandOutput,
}

/// Runs checker commands on worker threads and delivers completions on the
/// owning thread.
///
/// Completions are only invoked from [`pump`](Self::pump),
/// [`pump_timeout`](Self::pump_timeout), and
/// [`run_until_idle`](Self::run_until_idle).
///
/// # Example
///
/// ```rust,no_run
/// use flow_status::{CheckerCommand, CommandRunner, Invocation, ThreadedRunner};
///
/// let runner = ThreadedRunner::new();
/// runner.exec(
///     Invocation::new("flow", CheckerCommand::Status),
///     Box::new(|output| assert!(output.code() >= 0)),
/// );
/// runner.run_until_idle();
/// ```
pub struct ThreadedRunner {
    sender: Sender<Finished>,
    receiver: Receiver<Finished>,
    pending: RefCell<HashMap<u64, Completion>>,
    next_ticket: Cell<u64>,
}

impl ThreadedRunner {
    /// Creates a runner with no outstanding commands.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            pending: RefCell::new(HashMap::new()),
            next_ticket: Cell::new(0),
        }
    }

    /// Number of commands whose completion has not been delivered yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Returns `true` when no command is outstanding.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    /// Delivers every completion that has already arrived without blocking.
    ///
    /// Returns the number of completions delivered.
    pub fn pump(&self) -> usize {
        let mut delivered = 0;
        while let Ok(finished) = self.receiver.try_recv() {
            self.deliver(finished);
            delivered += 1;
        }
        delivered
    }

    /// Waits up to `timeout` for a completion, then drains any others that
    /// are ready.
    ///
    /// Returns immediately when the runner is idle.
    pub fn pump_timeout(&self, timeout: Duration) -> usize {
        if self.is_idle() {
            return 0;
        }
        match self.receiver.recv_timeout(timeout) {
            Ok(finished) => {
                self.deliver(finished);
                1 + self.pump()
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => 0,
        }
    }

    /// Blocks until every outstanding command, including commands issued by
    /// completions along the way, has been delivered.
    pub fn run_until_idle(&self) {
        while !self.is_idle() {
            match self.receiver.recv() {
                Ok(finished) => self.deliver(finished),
                Err(_) => break,
            }
        }
    }

    fn deliver(&self, finished: Finished) {
        let Finished { ticket, output } = finished;
        let completion = self.pending.borrow_mut().remove(&ticket);
        match completion {
            Some(on_complete) => {
                debug!(
                    target: PROCESS_TARGET,
                    ticket,
                    code = output.code(),
                    "delivering command completion"
                );
                on_complete(output);
            }
            None => warn!(
                target: PROCESS_TARGET,
                ticket,
                "completion arrived for unknown command"
            ),
        }
    }
}

impl Default for ThreadedRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for ThreadedRunner {
    fn exec(&self, invocation: Invocation, on_complete: Completion) {
        let ticket = self.next_ticket.get();
        self.next_ticket.set(ticket.wrapping_add(1));
        self.pending.borrow_mut().insert(ticket, on_complete);

        let label = invocation.to_string();
        debug!(
            target: PROCESS_TARGET,
            ticket,
            command = %label,
            "issuing checker command"
        );

        let sender = self.sender.clone();
        let worker = thread::Builder::new()
            .name(format!("flow-{}", invocation.command().name()))
            .spawn(move || {
                let output = run_to_completion(&invocation);
                // The receiver only disappears with the runner itself.
                drop(sender.send(Finished { ticket, output }));
            });

        if let Err(error) = worker {
            warn!(
                target: PROCESS_TARGET,
                ticket,
                command = %label,
                %error,
                "failed to start worker thread"
            );
            let output = CommandOutput::new(
                SPAWN_FAILURE_CODE,
                String::new(),
                format!("failed to run '{label}': {error}"),
            );
            drop(self.sender.send(Finished { ticket, output }));
        }
    }
}

/// Runs the invocation to completion on the current thread.
fn run_to_completion(invocation: &Invocation) -> CommandOutput {
    let mut command = Command::new(invocation.program());
    command.args(invocation.args());

    let result = match invocation.output_mode() {
        OutputMode::Captured => command.output().map(|output| {
            CommandOutput::new(
                exit_code(output.status),
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr),
            )
        }),
        OutputMode::Inherited => command
            .status()
            .map(|status| CommandOutput::new(exit_code(status), String::new(), String::new())),
    };

    result.unwrap_or_else(|error| spawn_failure(invocation, &error))
}

fn spawn_failure(invocation: &Invocation, error: &io::Error) -> CommandOutput {
    warn!(
        target: PROCESS_TARGET,
        program = invocation.program(),
        %error,
        "failed to spawn checker"
    );
    CommandOutput::new(
        SPAWN_FAILURE_CODE,
        String::new(),
        format!("{}: {error}", invocation.program()),
    )
}

fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}
