//! Program I/O surface.
//!
//! The interpreter never touches stdout/stdin directly; all program
//! output and input goes through a [`Console`]. Output is written one
//! line at a time and always recorded in an in-memory transcript, so a
//! harness can run with the console muted and assert on what the program
//! printed. Input comes from a scripted queue when one was configured,
//! otherwise from stdin (one line per request, end-of-file reads as an
//! empty line).

use crate::config::InterpreterConfig;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Buffered, inspectable stdout/stdin for one interpreter run.
#[derive(Debug)]
pub struct Console {
    console_output: bool,
    scripted_input: Option<VecDeque<String>>,
    transcript: Vec<String>,
}

impl Console {
    pub fn new(config: &InterpreterConfig) -> Self {
        Self {
            console_output: config.console_output,
            scripted_input: config
                .scripted_input
                .as_ref()
                .map(|lines| lines.iter().cloned().collect()),
            transcript: Vec::new(),
        }
    }

    /// Emit one line of program output.
    pub fn output(&mut self, line: &str) {
        if self.console_output {
            println!("{}", line);
        }
        self.transcript.push(line.to_string());
    }

    /// Read one line of program input, with the trailing newline stripped.
    pub fn get_input(&mut self) -> String {
        if let Some(queue) = &mut self.scripted_input {
            return queue.pop_front().unwrap_or_default();
        }

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(_) => {
                while line.ends_with('\n') || line.ends_with('\r') {
                    line.pop();
                }
                line
            }
            Err(e) => {
                tracing::warn!("failed to read stdin: {}", e);
                String::new()
            }
        }
    }

    /// Flush pending output. Called once at program end.
    pub fn flush(&mut self) {
        if self.console_output {
            let _ = io::stdout().flush();
        }
    }

    /// Every line the program has printed so far, in order.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }
}
