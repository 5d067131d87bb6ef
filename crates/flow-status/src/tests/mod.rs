//! Crate-level integration and BDD tests.

use crate::hook::{Hook, HookRegistry};
use crate::options::PluginOptions;
use crate::plugin::StatusPlugin;

pub(crate) mod support;

use support::{RecordingConsole, ScriptedRunner};

#[test]
fn one_shot_build_restarts_then_reports() {
    let runner = ScriptedRunner::immediate();
    runner.set_status(0, "No errors!", "");
    let console = RecordingConsole::default();
    let plugin = StatusPlugin::new(PluginOptions::default(), runner.clone(), console.clone());

    let mut host = HookRegistry::new();
    plugin.apply(&mut host);
    host.before_compile(Hook::Run, Box::new(|| {}));
    host.after_compile(Hook::Done);

    let issued: Vec<String> = runner
        .issued()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        issued,
        ["flow stop", "flow start", "flow status --color always"]
    );
    assert!(console.logs().iter().any(|line| line == "No errors!"));
    assert_eq!(console.errors(), [""]);
}
