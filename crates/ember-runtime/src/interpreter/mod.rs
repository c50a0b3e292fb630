//! AST interpreter (tree-walking)
//!
//! Direct AST evaluation against an environment chain.
//! Supports:
//! - Statement execution (`let`, `return`, expression and block statements)
//! - Expression evaluation (literals, prefix/infix operators, `if`, indexing)
//! - Closures, calls and builtins
//!
//! Evaluation never fails out-of-band: faults are `Value::Error` and
//! `return` is `Value::ReturnValue`, both threaded through ordinary results.
//! Blocks stop on either and pass it up unchanged; the program and function
//! boundaries unwrap `ReturnValue`.

mod expr;
mod stmt;

use crate::ast::Node;
use crate::environment::Env;
use crate::value::Value;

pub use ember_config::DEFAULT_MAX_CALL_DEPTH;

/// Interpreter state
pub struct Interpreter {
    /// Number of function calls currently on the stack
    pub(super) call_depth: usize,
    pub(super) max_call_depth: usize,
}

impl Interpreter {
    /// Create a new interpreter
    pub fn new() -> Self {
        Self {
            call_depth: 0,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    /// Limit how deeply function calls may nest
    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    pub fn max_call_depth(&self) -> usize {
        self.max_call_depth
    }

    /// Evaluate any node in `env`, producing exactly one value
    ///
    /// A top-level `return` yields the returned value itself.
    pub fn eval<'a>(&mut self, node: impl Into<Node<'a>>, env: &Env) -> Value {
        let value = match node.into() {
            Node::Program(program) => self.eval_program(program, env),
            Node::Statement(statement) => self.eval_statement(statement, env),
            Node::Expression(expression) => self.eval_expression(expression, env),
        };
        unwrap_return_value(value)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

pub(super) fn unwrap_return_value(value: Value) -> Value {
    match value {
        Value::ReturnValue(inner) => *inner,
        other => other,
    }
}
