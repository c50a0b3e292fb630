//! Shared test utilities
//!
//! Helpers for Ember integration tests to reduce boilerplate.

#![allow(dead_code)]

use ember_runtime::ast::Program;
use ember_runtime::{Diagnostic, Ember, Environment, Interpreter, Lexer, ParseError, Parser, Value};

// Re-export testing utilities
pub use pretty_assertions::{assert_eq, assert_ne};

/// Parse source, returning the program and raw syntax errors
pub fn parse(source: &str) -> (Program, Vec<ParseError>) {
    Parser::new(Lexer::new(source)).parse()
}

/// Parse source that must be free of syntax errors
pub fn parse_ok(source: &str) -> Program {
    let (program, errors) = parse(source);
    assert!(errors.is_empty(), "parser errors for {:?}: {:?}", source, errors);
    program
}

/// Parse source and return its error messages
pub fn parse_errors(source: &str) -> Vec<String> {
    parse(source).1.iter().map(|e| e.to_string()).collect()
}

/// Evaluate source in a fresh environment with the default interpreter
pub fn eval(source: &str) -> Value {
    eval_with(Interpreter::new(), source)
}

/// Evaluate source in a fresh environment with the given interpreter
pub fn eval_with(mut interpreter: Interpreter, source: &str) -> Value {
    let program = parse_ok(source);
    interpreter.eval(&program, &Environment::new())
}

/// Assert that source code evaluates to an integer
///
/// # Example
/// ```
/// assert_eval_integer("1 + 2", 3);
/// ```
pub fn assert_eval_integer(source: &str, expected: i64) {
    match eval(source) {
        Value::Integer(n) => assert_eq!(n, expected, "for {:?}", source),
        other => panic!("Expected Integer({}) for {:?}, got {:?}", expected, source, other),
    }
}

/// Assert that source code evaluates to a boolean
pub fn assert_eval_bool(source: &str, expected: bool) {
    match eval(source) {
        Value::Boolean(b) => assert_eq!(b, expected, "for {:?}", source),
        other => panic!("Expected Boolean({}) for {:?}, got {:?}", expected, source, other),
    }
}

/// Assert that source code evaluates to a string
pub fn assert_eval_string(source: &str, expected: &str) {
    match eval(source) {
        Value::String(s) => assert_eq!(s.as_ref(), expected, "for {:?}", source),
        other => panic!("Expected String({:?}) for {:?}, got {:?}", expected, source, other),
    }
}

/// Assert that source code evaluates to null
pub fn assert_eval_null(source: &str) {
    match eval(source) {
        Value::Null => {}
        other => panic!("Expected Null for {:?}, got {:?}", source, other),
    }
}

/// Assert that evaluation produces an error value with the given message
///
/// # Example
/// ```
/// assert_eval_error("-true", "unknown operator: -BOOLEAN");
/// ```
pub fn assert_eval_error(source: &str, expected_message: &str) {
    match eval(source) {
        Value::Error(error) => assert_eq!(error.to_string(), expected_message, "for {:?}", source),
        other => panic!("Expected error {:?} for {:?}, got {:?}", expected_message, source, other),
    }
}

/// Evaluate through the embedding facade and return the diagnostics
pub fn runtime_diagnostics(source: &str) -> Vec<Diagnostic> {
    match Ember::new().eval(source) {
        Err(diagnostics) => diagnostics,
        Ok(value) => panic!("Expected diagnostics for {:?}, got {:?}", source, value),
    }
}
