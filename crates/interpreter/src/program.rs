//! Pre-pass: per-line metadata and the function table.
//!
//! Before execution starts, every line is walked exactly once to measure
//! its indentation, tokenise it, and register function entry points. The
//! resulting tables are read-only during execution; the dispatch loop
//! addresses them by instruction pointer (a 0-based line index).

use crate::error::{ErrorKind, InterpreterError, Result};
use crate::keywords as kw;
use crate::tokenizer::{indent_of, tokenize_line};
use std::collections::HashMap;

/// One source line after the pre-pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Count of leading ASCII spaces.
    pub indent: usize,
    /// Tokenised content; empty for blank and comment-only lines.
    pub tokens: Vec<String>,
}

impl Line {
    /// First token of the line, if any.
    pub fn keyword(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }
}

/// A tokenised program plus its function table.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub lines: Vec<Line>,
    /// Function name -> line index of its `func` header.
    pub functions: HashMap<String, usize>,
}

impl Program {
    /// Run the pre-pass over a sequence of raw source lines.
    ///
    /// Registers every `func <name>` header (exactly one name is required)
    /// and verifies that a `main` function exists.
    pub fn parse(source_lines: &[String]) -> Result<Program> {
        if source_lines.is_empty() {
            return Err(InterpreterError::new(
                ErrorKind::Syntax,
                "empty program",
                None,
            ));
        }

        let mut lines = Vec::with_capacity(source_lines.len());
        let mut functions = HashMap::new();

        for (i, raw) in source_lines.iter().enumerate() {
            let tokens = tokenize_line(raw, i)?;
            if tokens.first().map(String::as_str) == Some(kw::FUNC) {
                if tokens.len() != 2 {
                    return Err(InterpreterError::syntax(
                        "func requires exactly one name",
                        i,
                    ));
                }
                let name = tokens[1].clone();
                if functions.insert(name.clone(), i).is_some() {
                    return Err(InterpreterError::syntax(
                        format!("duplicate function '{}'", name),
                        i,
                    ));
                }
            }
            lines.push(Line {
                indent: indent_of(raw),
                tokens,
            });
        }

        if !functions.contains_key(kw::MAIN) {
            return Err(InterpreterError::new(
                ErrorKind::Name,
                "no main function was found",
                None,
            ));
        }

        Ok(Program { lines, functions })
    }

    /// Line index of the `main` header. Only valid after a successful parse.
    pub fn main_line(&self) -> usize {
        self.functions[kw::MAIN]
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Scan forward from `from` (inclusive) for the first line at exactly
    /// `indent` whose leading token is one of `keywords`. Used to find the
    /// matching closer of a block opener; deeper-nested closers sit at a
    /// larger indent and are skipped.
    pub fn find_at_indent(&self, from: usize, indent: usize, keywords: &[&str]) -> Option<usize> {
        (from..self.lines.len()).find(|&i| {
            let line = &self.lines[i];
            line.indent == indent
                && line
                    .keyword()
                    .is_some_and(|first| keywords.contains(&first))
        })
    }
}
