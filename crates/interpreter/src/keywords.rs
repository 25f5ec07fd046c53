//! Keyword and builtin names (case-sensitive).

pub const FUNC: &str = "func";
pub const ENDFUNC: &str = "endfunc";
pub const FUNCCALL: &str = "funccall";
pub const RETURN: &str = "return";
pub const IF: &str = "if";
pub const ELSE: &str = "else";
pub const ENDIF: &str = "endif";
pub const WHILE: &str = "while";
pub const ENDWHILE: &str = "endwhile";
pub const ASSIGN: &str = "assign";

pub const PRINT: &str = "print";
pub const INPUT: &str = "input";
pub const STRTOINT: &str = "strtoint";

/// Entry point function; must exist in every program.
pub const MAIN: &str = "main";

/// The implicit return slot: `return <expr>`, `input`, and `strtoint` all
/// write here, and programs may read it like any other variable.
pub const RESULT: &str = "result";
