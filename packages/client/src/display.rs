//! Where received lines end up.

use std::io::Write;

/// Output surface for everything the client shows the user.
///
/// Called from both the link task and the listener task.
pub trait DisplaySink: Send + Sync {
    fn append(&self, line: &str);
}

/// Prints lines to stdout and redraws the input prompt after each one.
pub struct StdoutSink {
    prompt: String,
}

impl StdoutSink {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

impl DisplaySink for StdoutSink {
    fn append(&self, line: &str) {
        let mut stdout = std::io::stdout().lock();
        // \r clears the half-typed prompt before the line
        writeln!(stdout, "\r{}", line).ok();
        write!(stdout, "{}", self.prompt).ok();
        stdout.flush().ok();
    }
}
