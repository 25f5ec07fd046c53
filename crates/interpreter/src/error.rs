//! Interpreter diagnostics.
//!
//! Every failure an interpreted program can provoke falls into one of three
//! kinds. The first error terminates interpretation; there is no recovery.
//! Line numbers are 0-based indices into the program's line sequence and
//! are attached wherever one is known.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Diagnostic taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed line: wrong arity, illegal name, unbalanced or misaligned
    /// blocks, malformed expression.
    Syntax,
    /// Reference to an undefined variable or call of an unknown function.
    Name,
    /// Operator/operand mismatch, non-boolean condition, non-numeric
    /// `strtoint` input.
    Type,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Syntax => write!(f, "SYNTAX_ERROR"),
            ErrorKind::Name => write!(f, "NAME_ERROR"),
            ErrorKind::Type => write!(f, "TYPE_ERROR"),
        }
    }
}

/// A fatal interpreter diagnostic: kind, message, and the offending line
/// when one is known.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}{}", fmt_line(.line))]
pub struct InterpreterError {
    pub kind: ErrorKind,
    pub message: String,
    pub line: Option<usize>,
}

/// Render the ` (line N)` suffix when a line number is known.
fn fmt_line(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!(" (line {})", line),
        None => String::new(),
    }
}

impl InterpreterError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, line: Option<usize>) -> Self {
        Self {
            kind,
            message: message.into(),
            line,
        }
    }

    /// A `SYNTAX_ERROR` at the given line.
    pub fn syntax(message: impl Into<String>, line: usize) -> Self {
        Self::new(ErrorKind::Syntax, message, Some(line))
    }

    /// A `NAME_ERROR` at the given line.
    pub fn name(message: impl Into<String>, line: usize) -> Self {
        Self::new(ErrorKind::Name, message, Some(line))
    }

    /// A `TYPE_ERROR` at the given line.
    pub fn type_error(message: impl Into<String>, line: usize) -> Self {
        Self::new(ErrorKind::Type, message, Some(line))
    }
}

pub type Result<T> = std::result::Result<T, InterpreterError>;

/// Error from the file-loading entry point: either the host failed to read
/// the source file, or the program raised a diagnostic. Keeping the two
/// apart lets embedders still see the diagnostic's kind and line.
#[derive(Debug, Error)]
pub enum RunError {
    /// The source file could not be read
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The program raised an interpreter diagnostic
    #[error(transparent)]
    Interp(#[from] InterpreterError),
}
