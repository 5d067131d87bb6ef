//! Host build tool lifecycle hooks.
//!
//! A host exposes named hooks and invokes the handlers registered against
//! them at fixed points of a build. Handlers on the compile-start hooks
//! (`run` for one-shot builds, `watch-run` for incremental rebuilds) receive
//! a [`Continuation`] and the host waits for it before compiling. Handlers on
//! `done` fire after compilation and have nothing to continue.
//!
//! [`HookRegistry`] is a ready-made host used by the CLI driver and tests.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use thiserror::Error;

/// Callback a compile-start handler invokes to let the build proceed.
pub type Continuation = Box<dyn FnOnce()>;

/// Lifecycle hooks exposed by the host build tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    /// Start of a one-shot build.
    Run,
    /// Start of a rebuild in watch mode.
    WatchRun,
    /// Compilation finished.
    Done,
}

impl Hook {
    /// Returns the hook's canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::WatchRun => "watch-run",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Error returned when parsing a hook name fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported hook: {0}")]
pub struct HookParseError(String);

impl HookParseError {
    /// Returns the offending value that could not be parsed.
    #[must_use]
    pub fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for Hook {
    type Err = HookParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "run" => Ok(Self::Run),
            "watch-run" => Ok(Self::WatchRun),
            "done" => Ok(Self::Done),
            other => Err(HookParseError(other.to_owned())),
        }
    }
}

/// Handler registered against a hook.
pub enum HookHandler {
    /// Runs before compilation and must call its continuation.
    BeforeCompile(Box<dyn FnMut(Continuation)>),
    /// Runs after compilation.
    AfterCompile(Box<dyn FnMut()>),
}

impl HookHandler {
    /// Wraps a compile-start handler.
    #[must_use]
    pub fn before_compile(handler: impl FnMut(Continuation) + 'static) -> Self {
        Self::BeforeCompile(Box::new(handler))
    }

    /// Wraps a compile-finished handler.
    #[must_use]
    pub fn after_compile(handler: impl FnMut() + 'static) -> Self {
        Self::AfterCompile(Box::new(handler))
    }
}

impl fmt::Debug for HookHandler {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::BeforeCompile(_) => "BeforeCompile",
            Self::AfterCompile(_) => "AfterCompile",
        };
        formatter.write_str(kind)
    }
}

/// Hook registration surface of a host build tool.
pub trait BuildHost {
    /// Registers `handler` to run whenever `hook` fires.
    fn register(&mut self, hook: Hook, handler: HookHandler);
}

/// In-process host that stores handlers and fires them on request.
///
/// Handlers run in registration order.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// use flow_status::{BuildHost, Hook, HookHandler, HookRegistry};
///
/// let mut host = HookRegistry::new();
/// host.register(Hook::Run, HookHandler::before_compile(|continuation| continuation()));
///
/// let compiled = Rc::new(Cell::new(false));
/// let flag = Rc::clone(&compiled);
/// host.before_compile(Hook::Run, Box::new(move || flag.set(true)));
/// assert!(compiled.get());
/// ```
#[derive(Debug, Default)]
pub struct HookRegistry {
    handlers: Vec<(Hook, HookHandler)>,
}

impl HookRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Hooks in the order they were registered, one entry per handler.
    #[must_use]
    pub fn registered_hooks(&self) -> Vec<Hook> {
        self.handlers.iter().map(|(hook, _)| *hook).collect()
    }

    /// Fires a compile-start hook.
    ///
    /// Every compile-start handler registered for `hook` runs immediately.
    /// `continuation` runs once, after the last of them has continued, which
    /// may be long after this method returns. With no handlers registered it
    /// runs straight away.
    pub fn before_compile(&mut self, hook: Hook, continuation: Continuation) {
        let count = self
            .handlers
            .iter()
            .filter(|(registered, handler)| {
                *registered == hook && matches!(handler, HookHandler::BeforeCompile(_))
            })
            .count();

        if count == 0 {
            continuation();
            return;
        }

        let remaining = Rc::new(Cell::new(count));
        let resume = Rc::new(RefCell::new(Some(continuation)));

        for (registered, handler) in &mut self.handlers {
            if *registered != hook {
                continue;
            }
            let HookHandler::BeforeCompile(handler) = handler else {
                continue;
            };
            let remaining_for_handler = Rc::clone(&remaining);
            let resume_for_handler = Rc::clone(&resume);
            handler(Box::new(move || {
                let left = remaining_for_handler.get().saturating_sub(1);
                remaining_for_handler.set(left);
                if left == 0 {
                    let next = resume_for_handler.borrow_mut().take();
                    if let Some(next) = next {
                        next();
                    }
                }
            }));
        }
    }

    /// Fires a compile-finished hook.
    pub fn after_compile(&mut self, hook: Hook) {
        for (registered, handler) in &mut self.handlers {
            if *registered != hook {
                continue;
            }
            if let HookHandler::AfterCompile(handler) = handler {
                handler();
            }
        }
    }
}

impl BuildHost for HookRegistry {
    fn register(&mut self, hook: Hook, handler: HookHandler) {
        self.handlers.push((hook, handler));
    }
}
