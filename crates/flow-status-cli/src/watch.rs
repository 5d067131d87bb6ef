//! Debounced source watching for watch-mode builds.

use std::path::{Component, Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use camino::Utf8PathBuf;
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{DebounceEventResult, DebouncedEventKind, Debouncer, new_debouncer};
use thiserror::Error;
use tracing::debug;

const WATCH_TARGET: &str = "flow_status_cli::watch";

/// Directory names whose contents never trigger a rebuild.
const IGNORED_DIRS: &[&str] = &[".git", "node_modules", "target", "dist", "build"];

/// Errors raised while watching sources.
#[derive(Debug, Error)]
pub(crate) enum WatchError {
    #[error("failed to create file watcher: {0}")]
    Create(notify::Error),
    #[error("failed to watch {path}: {source}")]
    Watch {
        path: Utf8PathBuf,
        source: notify::Error,
    },
    #[error("file watcher stopped unexpectedly")]
    Disconnected,
}

/// Something the watcher observed.
#[derive(Debug)]
pub(crate) enum WatchEvent {
    /// A debounced batch of relevant file changes.
    Changed(Vec<PathBuf>),
    /// The underlying watcher reported an error; watching continues.
    Failed(String),
}

/// Watches source directories and reports debounced change batches.
pub(crate) struct SourceWatcher {
    events: Receiver<WatchEvent>,
    _debouncer: Debouncer<RecommendedWatcher>,
}

impl SourceWatcher {
    /// Starts watching `paths` recursively, or the current directory when
    /// `paths` is empty.
    ///
    /// Changes under a directory named in `ignored` or in the built-in list
    /// are dropped, so builds writing there do not retrigger themselves.
    pub(crate) fn start(
        paths: &[Utf8PathBuf],
        ignored: &[String],
        debounce: Duration,
    ) -> Result<Self, WatchError> {
        let current = [Utf8PathBuf::from(".")];
        let roots = if paths.is_empty() { &current[..] } else { paths };
        let prefixes = root_prefixes(roots);
        let ignored = ignored.to_vec();
        let (sender, events) = mpsc::channel();
        let mut debouncer = new_debouncer(debounce, move |result: DebounceEventResult| {
            let event = match result {
                Ok(batch) => {
                    let changed: Vec<PathBuf> = batch
                        .into_iter()
                        .filter(|event| event.kind == DebouncedEventKind::Any)
                        .map(|event| event.path)
                        .filter(|path| !is_ignored(path, &prefixes, &ignored))
                        .collect();
                    if changed.is_empty() {
                        return;
                    }
                    WatchEvent::Changed(changed)
                }
                Err(error) => WatchEvent::Failed(error.to_string()),
            };
            drop(sender.send(event));
        })
        .map_err(WatchError::Create)?;

        for root in roots {
            debouncer
                .watcher()
                .watch(root.as_std_path(), RecursiveMode::Recursive)
                .map_err(|source| WatchError::Watch {
                    path: root.clone(),
                    source,
                })?;
            debug!(target: WATCH_TARGET, path = %root, "watching sources");
        }

        Ok(Self {
            events,
            _debouncer: debouncer,
        })
    }

    /// Waits up to `timeout` for the next event.
    ///
    /// Returns `Ok(None)` when nothing happened in time.
    pub(crate) fn next_event(&self, timeout: Duration) -> Result<Option<WatchEvent>, WatchError> {
        match self.events.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(WatchError::Disconnected),
        }
    }
}

/// Watched roots as given and canonicalised; events may report either form.
fn root_prefixes(roots: &[Utf8PathBuf]) -> Vec<PathBuf> {
    roots
        .iter()
        .flat_map(|root| {
            let given = root.as_std_path().to_path_buf();
            let canonical = std::fs::canonicalize(&given).ok();
            std::iter::once(given).chain(canonical)
        })
        .collect()
}

/// Only components below the watched root count, so a project living under
/// a directory called `build` still triggers rebuilds.
fn is_ignored(path: &Path, roots: &[PathBuf], extra: &[String]) -> bool {
    let relative = roots
        .iter()
        .find_map(|root| path.strip_prefix(root).ok())
        .unwrap_or(path);
    relative.components().any(|component| match component {
        Component::Normal(name) => name.to_str().is_some_and(|name| {
            IGNORED_DIRS.contains(&name) || extra.iter().any(|dir| dir == name)
        }),
        _ => false,
    })
}
