//! Unit tests for lifecycle coordination.

use std::cell::Cell;
use std::rc::Rc;

use mockall::mock;
use mockall::predicate::{eq, ne};
use rstest::{fixture, rstest};

use super::*;
use crate::hook::HookRegistry;
use crate::tests::support::{HandlerLog, RecordingConsole, ScriptedRunner};

mock! {
    Sink {}

    impl Console for Sink {
        fn log(&self, text: &str);
        fn error(&self, text: &str);
    }
}

type Plugin = StatusPlugin<ScriptedRunner, RecordingConsole>;

struct Harness {
    plugin: Plugin,
    runner: ScriptedRunner,
    console: RecordingConsole,
    host: HookRegistry,
}

impl Harness {
    fn new(options: PluginOptions, runner: ScriptedRunner) -> Self {
        let console = RecordingConsole::default();
        let plugin = StatusPlugin::new(options, runner.clone(), console.clone());
        let mut host = HookRegistry::new();
        plugin.apply(&mut host);
        Self {
            plugin,
            runner,
            console,
            host,
        }
    }

    /// Fires a compile-start hook and returns a flag set when the build may
    /// proceed.
    fn fire(&mut self, hook: Hook) -> Rc<Cell<bool>> {
        let continued = Rc::new(Cell::new(false));
        let flag = Rc::clone(&continued);
        self.host
            .before_compile(hook, Box::new(move || flag.set(true)));
        continued
    }

    fn done(&mut self) {
        self.host.after_compile(Hook::Done);
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::new(PluginOptions::default(), ScriptedRunner::immediate())
}

#[fixture]
fn deferred() -> Harness {
    Harness::new(PluginOptions::default(), ScriptedRunner::deferred())
}

#[rstest]
fn registers_three_lifecycle_hooks(harness: Harness) {
    assert_eq!(
        harness.host.registered_hooks(),
        vec![Hook::Run, Hook::WatchRun, Hook::Done]
    );
}

#[rstest]
fn restarts_server_only_on_first_run(mut harness: Harness) {
    let first = harness.fire(Hook::Run);
    assert!(first.get());
    assert_eq!(
        harness.runner.issued_commands(),
        vec![
            CheckerCommand::Stop,
            CheckerCommand::Start {
                extra_args: String::new()
            },
        ]
    );

    let second = harness.fire(Hook::Run);
    let third = harness.fire(Hook::WatchRun);
    assert!(second.get() && third.get());
    assert_eq!(harness.runner.issued_commands().len(), 2);
    assert_eq!(harness.plugin.session_state(), SessionState::Ready);
}

#[rstest]
fn watch_run_alone_starts_the_server(mut harness: Harness) {
    harness.fire(Hook::WatchRun);
    harness.fire(Hook::WatchRun);
    assert_eq!(harness.runner.issued_commands().len(), 2);
}

#[test]
fn start_receives_extra_args_and_binary_path() {
    let options = PluginOptions::default()
        .with_binary_path("/opt/flow/bin/flow")
        .with_extra_args("--lazy-mode fs");
    let mut harness = Harness::new(options, ScriptedRunner::immediate());

    harness.fire(Hook::Run);

    let issued = harness.runner.issued();
    let start = issued.get(1).expect("start issued");
    assert_eq!(start.program(), "/opt/flow/bin/flow");
    assert_eq!(start.args(), ["start", "--lazy-mode", "fs"]);
}

#[test]
fn disabled_restart_never_touches_the_server() {
    let options = PluginOptions::default().with_restart_server(false);
    let mut harness = Harness::new(options, ScriptedRunner::immediate());

    let continued: Vec<bool> = [Hook::Run, Hook::WatchRun, Hook::Run]
        .into_iter()
        .map(|hook| harness.fire(hook).get())
        .collect();

    assert_eq!(continued, [true, true, true]);
    assert!(harness.runner.issued_commands().is_empty());
    assert_eq!(harness.plugin.session_state(), SessionState::Ready);
}

#[rstest]
fn continuation_waits_for_start_to_finish(mut deferred: Harness) {
    let continued = deferred.fire(Hook::Run);
    assert_eq!(deferred.plugin.session_state(), SessionState::Starting);
    assert_eq!(deferred.runner.issued_commands(), vec![CheckerCommand::Stop]);
    assert!(!continued.get());

    assert!(deferred.runner.complete_next());
    assert_eq!(deferred.runner.issued_commands().len(), 2);
    assert!(!continued.get(), "start has not finished yet");

    assert!(deferred.runner.complete_next());
    assert!(continued.get());
    assert_eq!(deferred.plugin.session_state(), SessionState::Ready);
}

#[rstest]
fn run_during_startup_continues_without_restarting(mut deferred: Harness) {
    let first = deferred.fire(Hook::Run);
    let second = deferred.fire(Hook::WatchRun);

    assert!(!first.get());
    assert!(second.get());
    assert_eq!(deferred.runner.issued_commands(), vec![CheckerCommand::Stop]);

    deferred.runner.complete_all();
    assert!(first.get());
}

#[rstest]
fn overlapping_status_checks_are_dropped(mut deferred: Harness) {
    deferred.done();
    deferred.done();
    assert_eq!(deferred.runner.issued_commands(), vec![CheckerCommand::Status]);
    assert_eq!(deferred.plugin.check_state(), CheckState::Checking);

    deferred.runner.complete_all();
    assert_eq!(deferred.plugin.check_state(), CheckState::Idle);
    assert_eq!(deferred.runner.outstanding(), 0);

    deferred.done();
    assert_eq!(deferred.runner.issued_commands().len(), 2);
}

#[rstest]
#[case::clean(0)]
#[case::errors(2)]
fn check_state_resets_after_completion(#[case] code: i32) {
    let runner = ScriptedRunner::deferred();
    runner.set_status(code, "out", "err");
    let mut harness = Harness::new(PluginOptions::default(), runner);

    harness.done();
    harness.runner.complete_all();
    harness.done();

    assert_eq!(harness.runner.issued_commands().len(), 2);
}

#[test]
fn success_invokes_on_success_with_stdout() {
    let handlers = HandlerLog::default();
    let runner = ScriptedRunner::immediate();
    runner.set_status(0, "No errors!", "");
    let mut harness = Harness::new(handlers.install(PluginOptions::default()), runner);

    harness.done();

    assert_eq!(handlers.successes(), ["No errors!"]);
    assert!(handlers.failures().is_empty());
    assert_eq!(harness.console.logs(), ["No errors!"]);
    assert_eq!(harness.console.errors(), [""]);
}

#[test]
fn failure_invokes_on_error_with_stderr_and_code() {
    let handlers = HandlerLog::default();
    let runner = ScriptedRunner::immediate();
    runner.set_status(2, "Found 1 error", "Error: type mismatch");
    let mut harness = Harness::new(handlers.install(PluginOptions::default()), runner);

    harness.done();

    assert!(handlers.successes().is_empty());
    assert_eq!(
        handlers.failures(),
        [(String::from("Error: type mismatch"), 2)]
    );
    assert_eq!(harness.console.logs(), ["Found 1 error"]);
    assert_eq!(harness.console.errors(), ["Error: type mismatch"]);
}

#[test]
fn default_handlers_print_banners() {
    let runner = ScriptedRunner::immediate();
    let mut harness = Harness::new(PluginOptions::default(), runner.clone());

    runner.set_status(0, "No errors!", "");
    harness.done();
    assert!(
        harness
            .console
            .logs()
            .iter()
            .any(|line| line == "Everything is fine with Flow!")
    );

    runner.set_status(1, "", "boom");
    harness.done();
    assert!(harness.console.logs().iter().any(|line| line == "Flow has errors!"));
}

#[test]
fn quiet_success_suppresses_handler_and_stdout() {
    let handlers = HandlerLog::default();
    let runner = ScriptedRunner::immediate();
    runner.set_status(0, "No errors!", "");
    let options = handlers.install(PluginOptions::default().with_quiet_success(true));
    let mut harness = Harness::new(options, runner);

    harness.done();

    assert!(handlers.successes().is_empty());
    assert!(harness.console.logs().is_empty());
    assert_eq!(harness.console.errors(), [""]);
}

#[test]
fn quiet_success_still_echoes_errors() {
    let handlers = HandlerLog::default();
    let runner = ScriptedRunner::immediate();
    runner.set_status(1, "Found 3 errors", "Error: type mismatch");
    let options = handlers.install(PluginOptions::default().with_quiet_success(true));
    let mut harness = Harness::new(options, runner);

    harness.done();

    assert_eq!(handlers.failures().len(), 1);
    assert_eq!(harness.console.logs(), ["Found 3 errors"]);
    assert_eq!(harness.console.errors(), ["Error: type mismatch"]);
}

#[test]
fn quiet_success_writes_only_empty_stderr() {
    let mut console = MockSink::new();
    console.expect_log().never();
    console
        .expect_error()
        .with(eq(""))
        .times(1)
        .return_const(());

    let runner = ScriptedRunner::immediate();
    runner.set_status(0, "No errors!", "");
    let plugin = StatusPlugin::new(
        PluginOptions::default().with_quiet_success(true),
        runner,
        console,
    );

    plugin.check_status();
}

#[test]
fn failing_status_writes_banner_stdout_then_stderr() {
    let mut console = MockSink::new();
    let mut sequence = mockall::Sequence::new();
    console
        .expect_log()
        .with(ne("raw checker output"))
        .times(3)
        .in_sequence(&mut sequence)
        .return_const(());
    console
        .expect_log()
        .with(eq("raw checker output"))
        .times(1)
        .in_sequence(&mut sequence)
        .return_const(());
    console
        .expect_error()
        .with(eq("Error: type mismatch"))
        .times(1)
        .in_sequence(&mut sequence)
        .return_const(());

    let runner = ScriptedRunner::immediate();
    runner.set_status(1, "raw checker output", "Error: type mismatch");
    let plugin = StatusPlugin::new(PluginOptions::default(), runner, console);

    plugin.check_status();
}

#[rstest]
fn concrete_run_then_failed_status(mut harness: Harness) {
    harness.fire(Hook::Run);
    let issued: Vec<&str> = harness
        .runner
        .issued_commands()
        .iter()
        .map(CheckerCommand::name)
        .collect();
    assert_eq!(issued, ["stop", "start"]);

    harness
        .runner
        .set_status(1, "Found 1 error in src/index.js", "Error: type mismatch");
    harness.done();

    assert!(
        harness
            .console
            .errors()
            .contains(&String::from("Error: type mismatch"))
    );
    assert!(
        harness
            .console
            .logs()
            .contains(&String::from("Found 1 error in src/index.js"))
    );
}
