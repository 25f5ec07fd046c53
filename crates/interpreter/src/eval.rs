//! Expression evaluation.
//!
//! Brewin expressions are flat token sequences in prefix Polish form with
//! binary operators only. Evaluation is a single left-to-right scan over
//! two stacks: operators on one, resolved operands on the other. A
//! reduction fires as soon as an operator has both of its operands, which
//! happens exactly when the scan reaches the end of the operator's right
//! subtree, so any fully-parenthesised prefix expression evaluates
//! correctly without building a tree.
//!
//! Both stacks are local to each call; nothing leaks between expressions.

use crate::error::{InterpreterError, Result};
use brewin_core::value;
use brewin_core::Value;
use std::collections::HashMap;

/// The binary operators, all left-to-right prefix.
pub const OPERATORS: [&str; 13] = [
    "+", "-", "*", "/", "%", "<", ">", "<=", ">=", "!=", "==", "&", "|",
];

/// Resolve a single token to a value.
///
/// Order matters and is user-observable: integer literal first, then a
/// defined variable, then a quoted string, then the boolean literals. A
/// variable may therefore shadow `True`/`False` but never a number.
pub fn resolve(
    token: &str,
    variables: &HashMap<String, Value>,
    line: usize,
) -> Result<Value> {
    if let Some(n) = value::parse_int_literal(token) {
        return Ok(Value::Int(n));
    }
    if let Some(v) = variables.get(token) {
        return Ok(v.clone());
    }
    if value::is_string_token(token) {
        return Ok(Value::Str(value::strip_quotes(token).to_string()));
    }
    if let Some(b) = value::parse_bool_literal(token) {
        return Ok(Value::Bool(b));
    }
    Err(InterpreterError::name(
        format!("variable {} is not defined", token),
        line,
    ))
}

/// Evaluate a prefix expression.
///
/// Well-formedness is checked structurally: after the scan the operator
/// stack must be empty and exactly one operand must remain.
pub fn evaluate(
    tokens: &[String],
    variables: &HashMap<String, Value>,
    line: usize,
) -> Result<Value> {
    let mut operators: Vec<&str> = Vec::new();
    let mut operands: Vec<Value> = Vec::new();

    for token in tokens {
        if OPERATORS.contains(&token.as_str()) {
            operators.push(token);
        } else {
            operands.push(resolve(token, variables, line)?);
        }
        while let Some(op) = operators.last().copied() {
            if operands.len() < 2 {
                break;
            }
            operators.pop();
            let b = operands.pop().expect("checked len");
            let a = operands.pop().expect("checked len");
            operands.push(compute(op, a, b, line)?);
        }
    }

    if !operators.is_empty() || operands.len() != 1 {
        return Err(InterpreterError::syntax("improper expression syntax", line));
    }
    Ok(operands.pop().expect("checked len"))
}

/// Apply one binary operator with strict typing: no coercions, and the two
/// operands must carry the same tag.
fn compute(op: &str, a: Value, b: Value, line: usize) -> Result<Value> {
    if a.type_name() != b.type_name() {
        return Err(InterpreterError::type_error(
            format!(
                "mismatched types '{}' and '{}'",
                a.type_name(),
                b.type_name()
            ),
            line,
        ));
    }

    // Equality is defined for every tag.
    match op {
        "==" => return Ok(Value::Bool(a == b)),
        "!=" => return Ok(Value::Bool(a != b)),
        _ => {}
    }

    let type_name = a.type_name();
    match (a, b) {
        (Value::Int(a), Value::Int(b)) => match op {
            "+" => Ok(Value::Int(a.wrapping_add(b))),
            "-" => Ok(Value::Int(a.wrapping_sub(b))),
            "*" => Ok(Value::Int(a.wrapping_mul(b))),
            "/" | "%" if b == 0 => {
                Err(InterpreterError::type_error("division by zero", line))
            }
            "/" => Ok(Value::Int(floor_div(a, b))),
            "%" => Ok(Value::Int(floor_rem(a, b))),
            "<" => Ok(Value::Bool(a < b)),
            ">" => Ok(Value::Bool(a > b)),
            "<=" => Ok(Value::Bool(a <= b)),
            ">=" => Ok(Value::Bool(a >= b)),
            _ => Err(incompatible(type_name, op, line)),
        },
        (Value::Str(a), Value::Str(b)) => match op {
            "+" => Ok(Value::Str(a + &b)),
            "<" => Ok(Value::Bool(a < b)),
            ">" => Ok(Value::Bool(a > b)),
            "<=" => Ok(Value::Bool(a <= b)),
            ">=" => Ok(Value::Bool(a >= b)),
            _ => Err(incompatible(type_name, op, line)),
        },
        (Value::Bool(a), Value::Bool(b)) => match op {
            "&" => Ok(Value::Bool(a && b)),
            "|" => Ok(Value::Bool(a || b)),
            _ => Err(incompatible(type_name, op, line)),
        },
        // Same-tag check above rules out mixed pairs.
        _ => Err(incompatible(type_name, op, line)),
    }
}

fn incompatible(type_name: &str, op: &str, line: usize) -> InterpreterError {
    InterpreterError::type_error(
        format!(
            "operands of type '{}' incompatible with operator '{}'",
            type_name, op
        ),
        line,
    )
}

/// Floor division: the quotient rounds toward negative infinity.
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a.wrapping_div(b);
    let r = a.wrapping_rem(b);
    if r != 0 && (r < 0) != (b < 0) { q - 1 } else { q }
}

/// Remainder matching floor division: the result carries the divisor's sign.
fn floor_rem(a: i64, b: i64) -> i64 {
    let r = a.wrapping_rem(b);
    if r != 0 && (r < 0) != (b < 0) { r + b } else { r }
}
