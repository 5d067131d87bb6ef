//! Seam between the plugin and the processes it launches.
//!
//! Every checker command is asynchronous: [`CommandRunner::exec`] returns
//! immediately and the completion callback fires later with the command's
//! [`CommandOutput`]. The production implementation is
//! [`ThreadedRunner`](crate::ThreadedRunner); tests implement the trait to
//! record invocations and complete them on demand.

use std::rc::Rc;

use crate::command::{CommandOutput, Invocation};

/// Callback receiving the result of a finished command.
pub type Completion = Box<dyn FnOnce(CommandOutput)>;

/// Trait abstracting checker process execution for testability.
///
/// Implementations must invoke `on_complete` exactly once per call, on the
/// thread that owns the plugin. They may do so before `exec` returns.
///
/// # Example
///
/// ```
/// use flow_status::{CommandOutput, CommandRunner, Completion, Invocation};
///
/// struct AlwaysClean;
///
/// impl CommandRunner for AlwaysClean {
///     fn exec(&self, _invocation: Invocation, on_complete: Completion) {
///         on_complete(CommandOutput::new(0, "No errors!", ""));
///     }
/// }
/// ```
pub trait CommandRunner {
    /// Starts `invocation` and arranges for `on_complete` to receive its
    /// output.
    fn exec(&self, invocation: Invocation, on_complete: Completion);
}

impl<T> CommandRunner for Rc<T>
where
    T: CommandRunner + ?Sized,
{
    fn exec(&self, invocation: Invocation, on_complete: Completion) {
        (**self).exec(invocation, on_complete);
    }
}
