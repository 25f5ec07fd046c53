//! Line tokenisation.
//!
//! Brewin programs are line-oriented: each line is tokenised independently
//! into whitespace-separated tokens. A double-quoted substring is atomic
//! (it may contain whitespace and escaped characters) and keeps its quotes;
//! resolution strips them later. An unquoted `#` starts a comment that runs
//! to the end of the line. Indentation is not a token; it is measured
//! separately as the count of leading ASCII spaces.

use crate::error::{InterpreterError, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Variable names: a letter followed by letters, digits, or underscores.
static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("valid regex"));

/// Returns true if `name` is a legal variable name.
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Count of leading ASCII space characters. Tabs are not spaces and end
/// the indent run.
pub fn indent_of(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ').count()
}

/// Split one source line into tokens.
///
/// The scan tracks whether it is inside a double-quoted string. Outside a
/// string, whitespace ends the current token and `#` ends the line (keeping
/// any partial token accumulated before it). Inside a string, everything is
/// kept verbatim, including the backslash of an escape sequence; a quote
/// preceded by a backslash does not close the string.
///
/// `line_num` is only used to position the unterminated-string diagnostic.
pub fn tokenize_line(line: &str, line_num: usize) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut prev_was_backslash = false;

    for ch in line.chars() {
        if in_string {
            current.push(ch);
            if ch == '"' && !prev_was_backslash {
                in_string = false;
                prev_was_backslash = false;
            } else if ch == '\\' && !prev_was_backslash {
                prev_was_backslash = true;
            } else {
                prev_was_backslash = false;
            }
        } else if ch == '"' {
            in_string = true;
            current.push(ch);
        } else if ch == '#' {
            // Comment to end of line. A token cut mid-way keeps the part
            // before the '#'.
            break;
        } else if ch.is_whitespace() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else {
            current.push(ch);
        }
    }

    if in_string {
        return Err(InterpreterError::syntax(
            "unterminated string literal",
            line_num,
        ));
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    Ok(tokens)
}
