//! Interpreter configuration.
//!
//! Embedders (test harnesses, autograders, the CLI) tune how a run
//! interacts with the outside world: whether program output reaches
//! stdout, and whether `input` reads from a scripted queue instead of
//! stdin. Dispatch tracing is not configured here; it goes through the
//! `tracing` subscriber the host installs.

/// Configuration for one interpreter instance.
#[derive(Debug, Clone)]
pub struct InterpreterConfig {
    /// Echo program output to stdout. The transcript is recorded either way.
    pub console_output: bool,

    /// When set, `input` pops lines from this queue instead of reading
    /// stdin. An exhausted queue behaves like end-of-file.
    pub scripted_input: Option<Vec<String>>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            console_output: true,
            scripted_input: None,
        }
    }
}

impl InterpreterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_console_output(mut self, console_output: bool) -> Self {
        self.console_output = console_output;
        self
    }

    pub fn with_scripted_input(mut self, lines: Vec<String>) -> Self {
        self.scripted_input = Some(lines);
        self
    }
}
