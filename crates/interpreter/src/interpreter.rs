//! The dispatch loop and control stack.
//!
//! Execution advances an instruction pointer over the pre-passed lines,
//! dispatching on each line's leading keyword. Open blocks (`funccall`,
//! `if`, `while`) live on an explicit control stack; closers validate the
//! top frame by kind and indent before acting. The bottom frame is always
//! the `main` activation while execution is live, and returning from
//! `main` empties the stack and stops the loop.

use crate::builtins;
use crate::config::InterpreterConfig;
use crate::error::{InterpreterError, Result};
use crate::eval::{self, evaluate};
use crate::io::Console;
use crate::keywords as kw;
use crate::program::Program;
use crate::tokenizer::is_identifier;
use brewin_core::Value;
use std::collections::HashMap;
use tracing::{debug, trace};

/// One open block on the control stack.
#[derive(Debug, Clone, PartialEq, Eq)]
enum BlockFrame {
    /// An active function call. `return_ip` is the line to resume after the
    /// matching `endfunc`; `None` for the initial `main` activation.
    Funccall {
        indent: usize,
        name: String,
        return_ip: Option<usize>,
    },
    /// An `if` block; `condition` records whether the `then` branch ran,
    /// which decides what `else` does.
    If { indent: usize, condition: bool },
    /// A `while` block. `while_ip` is the condition line; `after_endwhile_ip`
    /// is the first line past the matching `endwhile`.
    While {
        indent: usize,
        while_ip: usize,
        after_endwhile_ip: usize,
    },
}

impl BlockFrame {
    fn indent(&self) -> usize {
        match self {
            BlockFrame::Funccall { indent, .. }
            | BlockFrame::If { indent, .. }
            | BlockFrame::While { indent, .. } => *indent,
        }
    }
}

/// A Brewin interpreter: the variable store, the control stack, and the
/// console survive for the lifetime of the instance, so a harness can run
/// a program and then inspect what it printed and what `result` holds.
#[derive(Debug)]
pub struct Interpreter {
    program: Program,
    variables: HashMap<String, Value>,
    control_stack: Vec<BlockFrame>,
    console: Console,
    ip: usize,
    terminated: bool,
}

impl Interpreter {
    pub fn new(config: InterpreterConfig) -> Self {
        Self {
            program: Program::default(),
            variables: HashMap::new(),
            control_stack: Vec::new(),
            console: Console::new(&config),
            ip: 0,
            terminated: false,
        }
    }

    /// Interpret a program given as raw source lines (terminators already
    /// stripped). Runs to completion or to the first error.
    pub fn run(&mut self, source_lines: &[String]) -> Result<()> {
        self.program = Program::parse(source_lines)?;
        self.variables.clear();
        self.control_stack.clear();
        self.terminated = false;

        let main_line = self.program.main_line();
        self.control_stack.push(BlockFrame::Funccall {
            indent: self.program.lines[main_line].indent,
            name: kw::MAIN.to_string(),
            return_ip: None,
        });
        self.ip = main_line + 1;
        debug!(main_line, "starting execution");

        while !self.terminated {
            self.step()?;
            debug_assert!(self.stack_well_formed(), "control stack corrupted");
        }
        self.console.flush();
        Ok(())
    }

    /// Every line the program printed, in order.
    pub fn transcript(&self) -> &[String] {
        self.console.transcript()
    }

    /// Read a variable after (or during) a run; `result` is the implicit
    /// return slot.
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Execute the line at the current instruction pointer.
    fn step(&mut self) -> Result<()> {
        if self.ip >= self.program.len() {
            return Err(InterpreterError::new(
                crate::error::ErrorKind::Syntax,
                "instruction pointer ran past the end of the program",
                None,
            ));
        }

        let line = &self.program.lines[self.ip];
        if line.tokens.is_empty() {
            self.ip += 1;
            return Ok(());
        }
        let tokens = line.tokens.clone();
        let indent = line.indent;
        trace!(ip = self.ip, keyword = %tokens[0], "dispatch");

        match tokens[0].as_str() {
            // A `func` header reached in sequence: the body starts below.
            kw::FUNC => {
                self.ip += 1;
                Ok(())
            }
            kw::ENDFUNC => self.exec_endfunc(&tokens, indent),
            kw::FUNCCALL => self.exec_funccall(&tokens, indent),
            kw::RETURN => self.exec_return(&tokens),
            kw::IF => self.exec_if(&tokens, indent),
            kw::ELSE => self.exec_else(&tokens, indent),
            kw::ENDIF => self.exec_endif(&tokens, indent),
            kw::WHILE => self.exec_while(&tokens, indent),
            kw::ENDWHILE => self.exec_endwhile(&tokens, indent),
            kw::ASSIGN => self.exec_assign(&tokens),
            other => Err(InterpreterError::syntax(
                format!("unknown statement '{}'", other),
                self.ip,
            )),
        }
    }

    fn exec_funccall(&mut self, tokens: &[String], indent: usize) -> Result<()> {
        if tokens.len() < 2 {
            return Err(InterpreterError::syntax(
                "funccall requires a function name",
                self.ip,
            ));
        }
        let top_indent = match self.control_stack.last() {
            Some(frame) => frame.indent(),
            None => {
                return Err(InterpreterError::syntax(
                    "funccall outside of a function",
                    self.ip,
                ));
            }
        };
        if indent <= top_indent {
            return Err(InterpreterError::syntax("misaligned funccall", self.ip));
        }

        let name = tokens[1].as_str();
        if builtins::is_builtin(name) {
            builtins::call(tokens, &mut self.variables, &mut self.console, self.ip)?;
            self.ip += 1;
            return Ok(());
        }

        // Arguments past the callee name are ignored; functions take their
        // inputs from the shared variable namespace.
        let target = match self.program.functions.get(name) {
            Some(&line) => line,
            None => {
                return Err(InterpreterError::name(
                    format!("function {} is not defined", name),
                    self.ip,
                ));
            }
        };
        debug!(ip = self.ip, callee = name, target, "funccall");
        self.control_stack.push(BlockFrame::Funccall {
            indent: self.program.lines[target].indent,
            name: name.to_string(),
            return_ip: Some(self.ip + 1),
        });
        self.ip = target;
        Ok(())
    }

    fn exec_endfunc(&mut self, tokens: &[String], indent: usize) -> Result<()> {
        if tokens.len() > 1 {
            return Err(InterpreterError::syntax(
                "unexpected tokens after endfunc",
                self.ip,
            ));
        }
        match self.control_stack.last() {
            Some(BlockFrame::Funccall {
                indent: frame_indent,
                name,
                return_ip,
            }) if *frame_indent == indent => {
                if name == kw::MAIN {
                    debug!(ip = self.ip, "returning from main; terminating");
                    self.control_stack.clear();
                    self.terminated = true;
                    return Ok(());
                }
                match return_ip {
                    Some(resume) => {
                        debug!(ip = self.ip, resume, "returning from {}", name);
                        self.ip = *resume;
                        self.control_stack.pop();
                        Ok(())
                    }
                    None => Err(InterpreterError::syntax("mismatched endfunc", self.ip)),
                }
            }
            _ => Err(InterpreterError::syntax("mismatched endfunc", self.ip)),
        }
    }

    fn exec_return(&mut self, tokens: &[String]) -> Result<()> {
        if tokens.len() > 1 {
            let value = evaluate(&tokens[1..], &self.variables, self.ip)?;
            self.variables.insert(kw::RESULT.to_string(), value);
        }

        // Abandon any blocks opened inside the function body.
        while matches!(
            self.control_stack.last(),
            Some(BlockFrame::If { .. } | BlockFrame::While { .. })
        ) {
            self.control_stack.pop();
        }
        let target_indent = match self.control_stack.last() {
            Some(frame @ BlockFrame::Funccall { .. }) => frame.indent(),
            _ => {
                return Err(InterpreterError::syntax(
                    "return outside of a function",
                    self.ip,
                ));
            }
        };

        // Jump to the function's endfunc, which performs the actual return.
        // By convention it sits at the same column as the func header.
        match self
            .program
            .find_at_indent(self.ip + 1, target_indent, &[kw::ENDFUNC])
        {
            Some(line) => {
                self.ip = line;
                Ok(())
            }
            None => Err(InterpreterError::syntax(
                "missing endfunc after return",
                self.ip,
            )),
        }
    }

    fn exec_if(&mut self, tokens: &[String], indent: usize) -> Result<()> {
        if tokens.len() < 2 {
            return Err(InterpreterError::syntax("if requires a condition", self.ip));
        }
        let condition = match evaluate(&tokens[1..], &self.variables, self.ip)? {
            Value::Bool(b) => b,
            other => {
                return Err(InterpreterError::type_error(
                    format!("if condition must be a boolean, not '{}'", other.type_name()),
                    self.ip,
                ));
            }
        };
        self.control_stack.push(BlockFrame::If { indent, condition });
        if condition {
            self.ip += 1;
            return Ok(());
        }
        match self
            .program
            .find_at_indent(self.ip + 1, indent, &[kw::ELSE, kw::ENDIF])
        {
            Some(line) => {
                self.ip = line;
                Ok(())
            }
            None => Err(InterpreterError::syntax("missing endif after if", self.ip)),
        }
    }

    fn exec_else(&mut self, tokens: &[String], indent: usize) -> Result<()> {
        if tokens.len() > 1 {
            return Err(InterpreterError::syntax(
                "unexpected tokens after else",
                self.ip,
            ));
        }
        match self.control_stack.last() {
            Some(BlockFrame::If {
                indent: frame_indent,
                condition,
            }) if *frame_indent == indent => {
                if *condition {
                    // The then branch already ran; skip to the endif.
                    match self.program.find_at_indent(self.ip + 1, indent, &[kw::ENDIF]) {
                        Some(line) => {
                            self.ip = line;
                            Ok(())
                        }
                        None => Err(InterpreterError::syntax(
                            "missing endif after else",
                            self.ip,
                        )),
                    }
                } else {
                    self.ip += 1;
                    Ok(())
                }
            }
            _ => Err(InterpreterError::syntax("mismatched else", self.ip)),
        }
    }

    fn exec_endif(&mut self, tokens: &[String], indent: usize) -> Result<()> {
        if tokens.len() > 1 {
            return Err(InterpreterError::syntax(
                "unexpected tokens after endif",
                self.ip,
            ));
        }
        match self.control_stack.last() {
            Some(BlockFrame::If {
                indent: frame_indent,
                ..
            }) if *frame_indent == indent => {
                self.control_stack.pop();
                self.ip += 1;
                Ok(())
            }
            _ => Err(InterpreterError::syntax("mismatched endif", self.ip)),
        }
    }

    fn exec_while(&mut self, tokens: &[String], indent: usize) -> Result<()> {
        if tokens.len() < 2 {
            return Err(InterpreterError::syntax(
                "while requires a condition",
                self.ip,
            ));
        }

        // First visit pushes the frame; a backjump from endwhile finds its
        // own frame on top and re-evaluates the condition only.
        let revisit = matches!(
            self.control_stack.last(),
            Some(BlockFrame::While { while_ip, .. }) if *while_ip == self.ip
        );
        if !revisit {
            let endwhile_line = match self
                .program
                .find_at_indent(self.ip + 1, indent, &[kw::ENDWHILE])
            {
                Some(line) => line,
                None => {
                    return Err(InterpreterError::syntax(
                        "missing endwhile after while",
                        self.ip,
                    ));
                }
            };
            self.control_stack.push(BlockFrame::While {
                indent,
                while_ip: self.ip,
                after_endwhile_ip: endwhile_line + 1,
            });
        }

        let condition = match evaluate(&tokens[1..], &self.variables, self.ip)? {
            Value::Bool(b) => b,
            other => {
                return Err(InterpreterError::type_error(
                    format!(
                        "while condition must be a boolean, not '{}'",
                        other.type_name()
                    ),
                    self.ip,
                ));
            }
        };
        if condition {
            self.ip += 1;
            return Ok(());
        }
        match self.control_stack.pop() {
            Some(BlockFrame::While {
                after_endwhile_ip, ..
            }) => {
                self.ip = after_endwhile_ip;
                Ok(())
            }
            _ => Err(InterpreterError::syntax("mismatched while", self.ip)),
        }
    }

    fn exec_endwhile(&mut self, tokens: &[String], indent: usize) -> Result<()> {
        if tokens.len() > 1 {
            return Err(InterpreterError::syntax(
                "unexpected tokens after endwhile",
                self.ip,
            ));
        }
        match self.control_stack.last() {
            Some(BlockFrame::While {
                indent: frame_indent,
                while_ip,
                ..
            }) if *frame_indent == indent => {
                // Re-enter the condition; the frame stays until it goes false.
                self.ip = *while_ip;
                Ok(())
            }
            _ => Err(InterpreterError::syntax("mismatched endwhile", self.ip)),
        }
    }

    fn exec_assign(&mut self, tokens: &[String]) -> Result<()> {
        if tokens.len() < 3 {
            return Err(InterpreterError::syntax(
                "assign requires a variable name and a value",
                self.ip,
            ));
        }
        let name = tokens[1].as_str();
        if !is_identifier(name) {
            return Err(InterpreterError::syntax(
                "variable names must begin with a letter and consist of letters, numbers, and underscores",
                self.ip,
            ));
        }
        let value = if tokens.len() == 3 {
            eval::resolve(&tokens[2], &self.variables, self.ip)?
        } else {
            evaluate(&tokens[2..], &self.variables, self.ip)?
        };
        self.variables.insert(name.to_string(), value);
        self.ip += 1;
        Ok(())
    }

    /// Structural sanity of the control stack, checked after every step in
    /// debug builds: the bottom frame is a function activation while
    /// execution is live, the stack is empty once terminated, and every
    /// `while` frame spans a forward region bracketed by `while`/`endwhile`
    /// lines at its own indent. Only properties the dispatch loop itself
    /// guarantees are asserted; block misnesting in user programs is caught
    /// by the closers, not here.
    fn stack_well_formed(&self) -> bool {
        if self.terminated {
            return self.control_stack.is_empty();
        }
        let Some(bottom) = self.control_stack.first() else {
            return false;
        };
        if !matches!(bottom, BlockFrame::Funccall { .. }) {
            return false;
        }
        self.control_stack.iter().all(|frame| match frame {
            BlockFrame::While {
                indent,
                while_ip,
                after_endwhile_ip,
            } => {
                *while_ip < *after_endwhile_ip
                    && self.program.lines[*while_ip].keyword() == Some(kw::WHILE)
                    && self.program.lines[*while_ip].indent == *indent
                    && self.program.lines[after_endwhile_ip - 1].keyword() == Some(kw::ENDWHILE)
                    && self.program.lines[after_endwhile_ip - 1].indent == *indent
            }
            _ => true,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn run_with(source: &str, input: Option<Vec<&str>>) -> Result<Interpreter> {
        let mut config = InterpreterConfig::new().with_console_output(false);
        if let Some(lines) = input {
            config = config.with_scripted_input(lines.into_iter().map(str::to_string).collect());
        }
        let lines: Vec<String> = source.lines().map(str::to_string).collect();
        let mut interp = Interpreter::new(config);
        interp.run(&lines)?;
        Ok(interp)
    }

    fn run_ok(source: &str) -> Interpreter {
        run_with(source, None).unwrap()
    }

    fn run_err(source: &str) -> InterpreterError {
        run_with(source, None).unwrap_err()
    }

    #[test]
    fn test_factorial_via_recursion() {
        let source = "\
func main
 assign n 5
 assign f 1
 funccall fact
 funccall print f
endfunc
func fact
 if == n 0
  return
 endif
 assign f * f n
 assign n - n 1
 funccall fact
endfunc";
        assert_eq!(run_ok(source).transcript(), ["120"]);
    }

    #[test]
    fn test_nested_loops() {
        let source = "\
func main
 assign i 0
 while < i 2
  funccall print \"Outer: \" i
  assign j 3
  while > j 0
   funccall print \"Inner: \" j
   assign j - j 1
  endwhile
  funccall print \"Outer end: \" i
  assign i + i 1
 endwhile
endfunc";
        assert_eq!(
            run_ok(source).transcript(),
            [
                "Outer: 0",
                "Inner: 3",
                "Inner: 2",
                "Inner: 1",
                "Outer end: 0",
                "Outer: 1",
                "Inner: 3",
                "Inner: 2",
                "Inner: 1",
                "Outer end: 1",
            ]
        );
    }

    #[test]
    fn test_string_concat_and_compare() {
        let source = "\
func main
 assign s + \"hi\" \" there\"
 funccall print s
 assign b == s \"hi there\"
 funccall print b
endfunc";
        let interp = run_ok(source);
        assert_eq!(interp.transcript(), ["hi there", "True"]);
        assert_eq!(interp.variable("b"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_type_mismatch_carries_line() {
        let source = "\
func main
 assign x + 1 \"a\"
endfunc";
        let err = run_err(source);
        assert_eq!(err.kind, ErrorKind::Type);
        assert_eq!(err.line, Some(1));
    }

    #[test]
    fn test_mismatched_endwhile() {
        let source = "\
func main
 if True
  assign x 1
 endwhile
endfunc";
        let err = run_err(source);
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(err.message, "mismatched endwhile");
        assert_eq!(err.line, Some(3));
    }

    #[test]
    fn test_strtoint_round_trip() {
        let source = "\
func main
 assign prompt \"n? \"
 funccall input prompt
 funccall strtoint result
endfunc";
        let interp = run_with(source, Some(vec!["42"])).unwrap();
        assert_eq!(interp.variable("result"), Some(&Value::Int(42)));
    }

    #[test]
    fn test_return_value_lands_in_result() {
        let source = "\
func main
 funccall double
 funccall print result
endfunc
func double
 assign x 21
 return * x 2
endfunc";
        let interp = run_ok(source);
        assert_eq!(interp.transcript(), ["42"]);
        assert_eq!(interp.variable("result"), Some(&Value::Int(42)));
    }

    #[test]
    fn test_return_unwinds_nested_blocks() {
        let source = "\
func main
 funccall search
 funccall print result
endfunc
func search
 assign i 0
 while True
  if == i 3
   return i
  endif
  assign i + i 1
 endwhile
endfunc";
        assert_eq!(run_ok(source).transcript(), ["3"]);
    }

    #[test]
    fn test_else_branches() {
        let source = "\
func main
 if > 1 2
  funccall print \"then\"
 else
  funccall print \"else\"
 endif
 if < 1 2
  funccall print \"then2\"
 else
  funccall print \"else2\"
 endif
endfunc";
        assert_eq!(run_ok(source).transcript(), ["else", "then2"]);
    }

    #[test]
    fn test_while_false_skips_body() {
        let source = "\
func main
 while False
  funccall print \"never\"
 endwhile
 funccall print \"done\"
endfunc";
        assert_eq!(run_ok(source).transcript(), ["done"]);
    }

    #[test]
    fn test_assign_then_read_yields_value() {
        let source = "\
func main
 assign x + 2 3
 assign y x
endfunc";
        let interp = run_ok(source);
        assert_eq!(interp.variable("x"), Some(&Value::Int(5)));
        assert_eq!(interp.variable("y"), Some(&Value::Int(5)));
    }

    #[test]
    fn test_variables_are_process_global() {
        // The callee reads and writes the caller's variables directly.
        let source = "\
func main
 assign n 10
 funccall bump
 funccall print n
endfunc
func bump
 assign n + n 1
endfunc";
        assert_eq!(run_ok(source).transcript(), ["11"]);
    }

    #[test]
    fn test_comments_and_blank_lines_are_noops() {
        let source = "\
func main

 # set things up
 assign x 1 # inline comment
 funccall print x
endfunc";
        assert_eq!(run_ok(source).transcript(), ["1"]);
    }

    #[test]
    fn test_unknown_function_call() {
        let source = "\
func main
 funccall nosuch
endfunc";
        let err = run_err(source);
        assert_eq!(err.kind, ErrorKind::Name);
        assert_eq!(err.message, "function nosuch is not defined");
        assert_eq!(err.line, Some(1));
    }

    #[test]
    fn test_undefined_variable() {
        let source = "\
func main
 assign x + y 1
endfunc";
        let err = run_err(source);
        assert_eq!(err.kind, ErrorKind::Name);
        assert_eq!(err.message, "variable y is not defined");
    }

    #[test]
    fn test_misaligned_funccall() {
        // The call sits at the same column as the func header.
        let source = "\
func main
funccall print \"x\"
endfunc";
        let err = run_err(source);
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(err.message, "misaligned funccall");
    }

    #[test]
    fn test_if_condition_must_be_boolean() {
        let source = "\
func main
 if + 1 2
 endif
endfunc";
        let err = run_err(source);
        assert_eq!(err.kind, ErrorKind::Type);
        assert_eq!(err.line, Some(1));
    }

    #[test]
    fn test_while_condition_must_be_boolean() {
        let source = "\
func main
 while \"yes\"
 endwhile
endfunc";
        assert_eq!(run_err(source).kind, ErrorKind::Type);
    }

    #[test]
    fn test_assign_rejects_bad_name() {
        let source = "\
func main
 assign 2x 5
endfunc";
        assert_eq!(run_err(source).kind, ErrorKind::Syntax);
    }

    #[test]
    fn test_mismatched_endif_at_wrong_indent() {
        let source = "\
func main
 if True
   endif
 endif
endfunc";
        // The first endif sits deeper than its if and does not match.
        let err = run_err(source);
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(err.message, "mismatched endif");
        assert_eq!(err.line, Some(2));
    }

    #[test]
    fn test_unknown_statement() {
        let source = "\
func main
 frobnicate x
endfunc";
        assert_eq!(run_err(source).kind, ErrorKind::Syntax);
    }

    #[test]
    fn test_extra_tokens_after_closer() {
        let source = "\
func main
 if True
 endif now
endfunc";
        let err = run_err(source);
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(err.message, "unexpected tokens after endif");
    }

    #[test]
    fn test_extra_funccall_arguments_are_ignored() {
        let source = "\
func main
 assign n 1
 funccall bump these args are ignored
 funccall print n
endfunc
func bump
 assign n + n 1
endfunc";
        assert_eq!(run_ok(source).transcript(), ["2"]);
    }

    #[test]
    fn test_input_prompt_concatenation() {
        let source = "\
func main
 assign who \"name\"
 funccall input \"your \" who \"? \"
 funccall print \"hello \" result
endfunc";
        let interp = run_with(source, Some(vec!["ada"])).unwrap();
        assert_eq!(interp.transcript(), ["your name? ", "hello ada"]);
    }

    #[test]
    fn test_stringified_int_survives_strtoint() {
        // strtoint composed with stringification is the identity.
        let source = "\
func main
 assign n -37
 funccall input \"echo \" n
 funccall strtoint result
endfunc";
        let interp = run_with(source, Some(vec!["-37"])).unwrap();
        assert_eq!(interp.variable("result"), Some(&Value::Int(-37)));
    }

    #[test]
    fn test_else_without_if_is_mismatched() {
        let source = "\
func main
 else
endfunc";
        let err = run_err(source);
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(err.message, "mismatched else");
    }

    #[test]
    fn test_missing_endwhile_is_rejected() {
        let source = "\
func main
 while True
endfunc";
        let err = run_err(source);
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(err.message, "missing endwhile after while");
    }
}
