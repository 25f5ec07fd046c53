//! Brewin interpreter library
//!
//! A line-oriented interpreter for the Brewin language: programs are a
//! sequence of text lines whose indentation delimits nested blocks
//! (function bodies, conditionals, loops), executed directly with no
//! intermediate compiled form.
//!
//! # Running a program
//!
//! ```
//! use brewin::{run_source, InterpreterConfig};
//!
//! let source = "\
//! func main
//!  assign greeting + \"hello\" \" world\"
//!  funccall print greeting
//! endfunc";
//!
//! let config = InterpreterConfig::new().with_console_output(false);
//! let interp = run_source(source, config).unwrap();
//! assert_eq!(interp.transcript(), ["hello world"]);
//! ```

pub mod builtins;
pub mod config;
pub mod error;
pub mod eval;
pub mod interpreter;
pub mod io;
pub mod keywords;
pub mod program;
pub mod tokenizer;

pub use brewin_core::Value;
pub use config::InterpreterConfig;
pub use error::{ErrorKind, InterpreterError, Result, RunError};
pub use interpreter::Interpreter;
pub use program::Program;

use std::path::Path;

/// Run a Brewin program from source text.
///
/// Returns the finished interpreter so callers can inspect the output
/// transcript and the variable store (including `result`).
pub fn run_source(source: &str, config: InterpreterConfig) -> Result<Interpreter> {
    let lines: Vec<String> = source.lines().map(str::to_string).collect();
    let mut interp = Interpreter::new(config);
    interp.run(&lines)?;
    Ok(interp)
}

/// Run a Brewin program from a source file.
///
/// I/O failures and program diagnostics stay distinguishable in the
/// returned [`RunError`]; a diagnostic keeps its kind and line number.
pub fn run_file(
    path: &Path,
    config: InterpreterConfig,
) -> std::result::Result<Interpreter, RunError> {
    let source = std::fs::read_to_string(path).map_err(|e| RunError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(run_source(&source, config)?)
}

/// Validate a program without executing it: tokenise every line, build the
/// function table, and verify `main` exists.
pub fn check_source(source: &str) -> Result<Program> {
    let lines: Vec<String> = source.lines().map(str::to_string).collect();
    Program::parse(&lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn muted() -> InterpreterConfig {
        InterpreterConfig::new().with_console_output(false)
    }

    #[test]
    fn test_run_source() {
        let interp = run_source(
            "func main\n funccall print \"ok\"\nendfunc",
            muted(),
        )
        .unwrap();
        assert_eq!(interp.transcript(), ["ok"]);
    }

    #[test]
    fn test_run_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "func main\n assign x 7\n funccall print x\nendfunc").unwrap();

        let interp = run_file(file.path(), muted()).unwrap();
        assert_eq!(interp.transcript(), ["7"]);
    }

    #[test]
    fn test_run_file_missing() {
        let err = run_file(Path::new("/no/such/file.brw"), muted()).unwrap_err();
        assert!(matches!(err, RunError::Io { .. }));
        assert!(err.to_string().contains("cannot read"));
    }

    #[test]
    fn test_run_file_keeps_diagnostic_kind_and_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "func main\n assign x + 1 \"a\"\nendfunc").unwrap();

        let err = run_file(file.path(), muted()).unwrap_err();
        match err {
            RunError::Interp(diag) => {
                assert_eq!(diag.kind, ErrorKind::Type);
                assert_eq!(diag.line, Some(1));
            }
            RunError::Io { .. } => panic!("expected an interpreter diagnostic"),
        }
    }

    #[test]
    fn test_check_source() {
        let program = check_source("func main\nendfunc\nfunc aux\nendfunc").unwrap();
        assert_eq!(program.functions.len(), 2);

        let err = check_source("func aux\nendfunc").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Name);
    }
}
