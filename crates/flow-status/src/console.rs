//! Text sinks for plugin output.

use std::io::{self, Write};
use std::rc::Rc;

/// Destination for the plugin's human-facing output.
///
/// `log` receives banners and the checker's standard output; `error`
/// receives the checker's standard error.
pub trait Console {
    /// Writes a line to the log sink.
    fn log(&self, text: &str);

    /// Writes a line to the error sink.
    fn error(&self, text: &str);
}

impl<T> Console for Rc<T>
where
    T: Console + ?Sized,
{
    fn log(&self, text: &str) {
        (**self).log(text);
    }

    fn error(&self, text: &str) {
        (**self).error(text);
    }
}

/// Console writing to the process's standard output and standard error.
///
/// Write failures are ignored: a closed terminal must not abort the build.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdConsole;

impl Console for StdConsole {
    fn log(&self, text: &str) {
        let mut stdout = io::stdout().lock();
        drop(writeln!(stdout, "{text}"));
    }

    fn error(&self, text: &str) {
        let mut stderr = io::stderr().lock();
        drop(writeln!(stderr, "{text}"));
    }
}
