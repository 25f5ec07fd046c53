//! Builtin functions: `print`, `input`, `strtoint`.
//!
//! Builtins are reachable only through `funccall`; they execute in place
//! at the call site instead of pushing a control frame. `input` and
//! `strtoint` deliver their result through the implicit `result` variable,
//! the same slot `return <expr>` writes.

use crate::error::{InterpreterError, Result};
use crate::eval::resolve;
use crate::io::Console;
use crate::keywords as kw;
use brewin_core::value;
use brewin_core::Value;
use std::collections::HashMap;

/// Returns true if `name` is handled by the interpreter rather than looked
/// up in the function table.
pub fn is_builtin(name: &str) -> bool {
    matches!(name, kw::PRINT | kw::INPUT | kw::STRTOINT)
}

/// Execute one builtin. `tokens` is the whole call line, starting with
/// `funccall <name>`.
pub fn call(
    tokens: &[String],
    variables: &mut HashMap<String, Value>,
    console: &mut Console,
    line: usize,
) -> Result<()> {
    match tokens[1].as_str() {
        kw::PRINT => print(tokens, variables, console, line),
        kw::INPUT => input(tokens, variables, console, line),
        kw::STRTOINT => strtoint(tokens, variables, line),
        other => Err(InterpreterError::name(
            format!("function {} is not defined", other),
            line,
        )),
    }
}

/// Resolve each argument token and concatenate the stringified values.
fn concat_args(
    args: &[String],
    variables: &HashMap<String, Value>,
    line: usize,
) -> Result<String> {
    let mut text = String::new();
    for arg in args {
        text.push_str(&resolve(arg, variables, line)?.to_string());
    }
    Ok(text)
}

fn print(
    tokens: &[String],
    variables: &HashMap<String, Value>,
    console: &mut Console,
    line: usize,
) -> Result<()> {
    if tokens.len() < 3 {
        return Err(InterpreterError::syntax(
            "print requires at least one argument",
            line,
        ));
    }
    let text = concat_args(&tokens[2..], variables, line)?;
    console.output(&text);
    Ok(())
}

fn input(
    tokens: &[String],
    variables: &mut HashMap<String, Value>,
    console: &mut Console,
    line: usize,
) -> Result<()> {
    if tokens.len() < 3 {
        return Err(InterpreterError::syntax(
            "input requires at least one prompt argument",
            line,
        ));
    }
    let prompt = concat_args(&tokens[2..], variables, line)?;
    console.output(&prompt);
    let reply = console.get_input();
    variables.insert(kw::RESULT.to_string(), Value::Str(reply));
    Ok(())
}

fn strtoint(
    tokens: &[String],
    variables: &mut HashMap<String, Value>,
    line: usize,
) -> Result<()> {
    if tokens.len() != 3 {
        return Err(InterpreterError::syntax(
            "strtoint requires exactly one argument",
            line,
        ));
    }
    let resolved = resolve(&tokens[2], variables, line)?;
    let parsed = match &resolved {
        Value::Str(s) => value::parse_int_literal(s),
        _ => None,
    };
    match parsed {
        Some(n) => {
            variables.insert(kw::RESULT.to_string(), Value::Int(n));
            Ok(())
        }
        None => Err(InterpreterError::type_error(
            "strtoint requires a numeric string",
            line,
        )),
    }
}
