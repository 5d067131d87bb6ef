//! Test doubles shared by unit and behaviour tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::command::{CheckerCommand, CommandOutput, Invocation};
use crate::console::Console;
use crate::runner::{CommandRunner, Completion};

#[derive(Default)]
struct Script {
    issued: Vec<Invocation>,
    parked: VecDeque<(Invocation, Completion)>,
    deferred: bool,
    status: CommandOutput,
}

impl Script {
    fn output_for(&self, command: &CheckerCommand) -> CommandOutput {
        match command {
            CheckerCommand::Status => self.status.clone(),
            CheckerCommand::Stop | CheckerCommand::Start { .. } => CommandOutput::default(),
        }
    }
}

/// Runner that records invocations and answers from a script.
///
/// In immediate mode completions fire before `exec` returns, like a shell
/// executor in a test harness. In deferred mode they are parked until the
/// test releases them, which keeps commands observably in flight.
#[derive(Clone, Default)]
pub(crate) struct ScriptedRunner {
    script: Rc<RefCell<Script>>,
}

impl ScriptedRunner {
    pub(crate) fn immediate() -> Self {
        Self::default()
    }

    pub(crate) fn deferred() -> Self {
        let runner = Self::default();
        runner.script.borrow_mut().deferred = true;
        runner
    }

    pub(crate) fn set_status(&self, code: i32, stdout: &str, stderr: &str) {
        self.script.borrow_mut().status = CommandOutput::new(code, stdout, stderr);
    }

    pub(crate) fn issued(&self) -> Vec<Invocation> {
        self.script.borrow().issued.clone()
    }

    pub(crate) fn issued_commands(&self) -> Vec<CheckerCommand> {
        self.script
            .borrow()
            .issued
            .iter()
            .map(|invocation| invocation.command().clone())
            .collect()
    }

    pub(crate) fn outstanding(&self) -> usize {
        self.script.borrow().parked.len()
    }

    /// Completes the oldest parked command. Returns `false` when none is
    /// parked.
    pub(crate) fn complete_next(&self) -> bool {
        let next = self.script.borrow_mut().parked.pop_front();
        let Some((invocation, on_complete)) = next else {
            return false;
        };
        let output = self.script.borrow().output_for(invocation.command());
        on_complete(output);
        true
    }

    pub(crate) fn complete_all(&self) {
        while self.complete_next() {}
    }
}

impl CommandRunner for ScriptedRunner {
    fn exec(&self, invocation: Invocation, on_complete: Completion) {
        let mut script = self.script.borrow_mut();
        script.issued.push(invocation.clone());
        if script.deferred {
            script.parked.push_back((invocation, on_complete));
            return;
        }
        let output = script.output_for(invocation.command());
        drop(script);
        on_complete(output);
    }
}

/// Console capturing log and error lines.
#[derive(Clone, Default)]
pub(crate) struct RecordingConsole {
    logs: Rc<RefCell<Vec<String>>>,
    errors: Rc<RefCell<Vec<String>>>,
}

impl RecordingConsole {
    pub(crate) fn logs(&self) -> Vec<String> {
        self.logs.borrow().clone()
    }

    pub(crate) fn errors(&self) -> Vec<String> {
        self.errors.borrow().clone()
    }
}

impl Console for RecordingConsole {
    fn log(&self, text: &str) {
        self.logs.borrow_mut().push(text.to_owned());
    }

    fn error(&self, text: &str) {
        self.errors.borrow_mut().push(text.to_owned());
    }
}

/// Records calls made to custom success and error handlers.
#[derive(Clone, Default)]
pub(crate) struct HandlerLog {
    successes: Rc<RefCell<Vec<String>>>,
    failures: Rc<RefCell<Vec<(String, i32)>>>,
}

impl HandlerLog {
    pub(crate) fn successes(&self) -> Vec<String> {
        self.successes.borrow().clone()
    }

    pub(crate) fn failures(&self) -> Vec<(String, i32)> {
        self.failures.borrow().clone()
    }

    pub(crate) fn install(&self, options: crate::PluginOptions) -> crate::PluginOptions {
        let successes = Rc::clone(&self.successes);
        let failures = Rc::clone(&self.failures);
        options
            .on_success(move |stdout| successes.borrow_mut().push(stdout.to_owned()))
            .on_error(move |stderr, code| failures.borrow_mut().push((stderr.to_owned(), code)))
    }
}
