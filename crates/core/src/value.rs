//! Tagged runtime values and literal recognisers.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Integer literals: `-[1-9][0-9]*`, `0`, or `[1-9][0-9]*`.
///
/// `-0` and zero-padded forms like `007` are not literals; a token that
/// fails this pattern falls through to variable lookup.
static INT_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-[1-9][0-9]*|0|[1-9][0-9]*)$").expect("valid regex"));

/// A Brewin runtime value.
///
/// Booleans are a distinct tag, never a subtype of integers: arithmetic on
/// a `Bool` is a type error, and `True == 1` is a mismatched-type error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Integer value (64-bit signed, wrapping arithmetic)
    Int(i64),

    /// String value (quote-stripped, escapes kept verbatim)
    Str(String),

    /// Boolean value
    Bool(bool),
}

impl Value {
    /// Tag name used in diagnostics ("int", "string", "bool").
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
        }
    }
}

/// Stringification used by `print` and `input` prompts: integers in
/// base-10, booleans as `True`/`False`, strings verbatim.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
        }
    }
}

/// Returns true if `token` is a well-formed integer literal.
pub fn is_int_literal(token: &str) -> bool {
    INT_LITERAL.is_match(token)
}

/// Parse an integer literal token.
///
/// Returns `None` when the token does not match the literal grammar, or
/// when the value does not fit in an `i64`.
pub fn parse_int_literal(token: &str) -> Option<i64> {
    if !INT_LITERAL.is_match(token) {
        return None;
    }
    token.parse().ok()
}

/// Returns true if `token` has the shape of a string literal: at least two
/// characters, starting and ending with `"`.
pub fn is_string_token(token: &str) -> bool {
    token.len() >= 2 && token.starts_with('"') && token.ends_with('"')
}

/// Strip the surrounding quotes from a string token. Escape sequences in
/// the interior are left untouched.
pub fn strip_quotes(token: &str) -> &str {
    &token[1..token.len() - 1]
}

/// Parse a boolean literal (`True` or `False`, case-sensitive).
pub fn parse_bool_literal(token: &str) -> Option<bool> {
    match token {
        "True" => Some(true),
        "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_literal_accepts() {
        assert_eq!(parse_int_literal("0"), Some(0));
        assert_eq!(parse_int_literal("5"), Some(5));
        assert_eq!(parse_int_literal("120"), Some(120));
        assert_eq!(parse_int_literal("-7"), Some(-7));
        assert_eq!(
            parse_int_literal("9223372036854775807"),
            Some(i64::MAX)
        );
    }

    #[test]
    fn test_int_literal_rejects() {
        assert!(!is_int_literal("-0"));
        assert!(!is_int_literal("007"));
        assert!(!is_int_literal("1.5"));
        assert!(!is_int_literal("+3"));
        assert!(!is_int_literal(""));
        assert!(!is_int_literal("12a"));
    }

    #[test]
    fn test_int_literal_overflow() {
        // Matches the grammar but exceeds i64.
        assert!(is_int_literal("9223372036854775808"));
        assert_eq!(parse_int_literal("9223372036854775808"), None);
    }

    #[test]
    fn test_string_token_shape() {
        assert!(is_string_token("\"hi\""));
        assert!(is_string_token("\"\""));
        assert!(!is_string_token("\""));
        assert!(!is_string_token("hi"));
        assert!(!is_string_token("\"unterminated"));
    }

    #[test]
    fn test_strip_quotes_keeps_escapes() {
        assert_eq!(strip_quotes("\"hi there\""), "hi there");
        assert_eq!(strip_quotes("\"a\\\"b\""), "a\\\"b");
        assert_eq!(strip_quotes("\"\""), "");
    }

    #[test]
    fn test_bool_literal() {
        assert_eq!(parse_bool_literal("True"), Some(true));
        assert_eq!(parse_bool_literal("False"), Some(false));
        assert_eq!(parse_bool_literal("true"), None);
        assert_eq!(parse_bool_literal("TRUE"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Int(120).to_string(), "120");
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::Bool(true).to_string(), "True");
        assert_eq!(Value::Bool(false).to_string(), "False");
        assert_eq!(Value::Str("hi there".to_string()).to_string(), "hi there");
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Value::Int(1).type_name(), "int");
        assert_eq!(Value::Str(String::new()).type_name(), "string");
        assert_eq!(Value::Bool(false).type_name(), "bool");
    }
}
