//! Runtime value representation
//!
//! - Integers, Booleans, Null: immediate values. `TRUE`, `FALSE` and `NULL`
//!   are the only instances the evaluator produces, so equality on them is a
//!   tag comparison.
//! - Strings, Arrays: immutable, reference-counted (`Rc`)
//! - Functions: closures pairing a function literal with its defining scope
//! - ReturnValue, Error: control-flow signals threaded through evaluation

use crate::ast::{BlockStatement, FunctionLiteral, Identifier};
use crate::builtins::Builtin;
use crate::diagnostic::{error_codes, Diagnostic};
use crate::environment::Env;
use crate::span::Span;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// The shared `true`
pub const TRUE: Value = Value::Boolean(true);
/// The shared `false`
pub const FALSE: Value = Value::Boolean(false);
/// The shared `null`
pub const NULL: Value = Value::Null;

/// Runtime value
#[derive(Debug, Clone)]
pub enum Value {
    /// 64-bit signed integer
    Integer(i64),
    /// Boolean value
    Boolean(bool),
    /// Absence of a value
    Null,
    /// Immutable string
    String(Rc<str>),
    /// Immutable array
    Array(Rc<Vec<Value>>),
    /// User-defined function with its captured environment
    Function(Rc<Closure>),
    /// Native function
    Builtin(Builtin),
    /// In-flight `return`; unwrapped at the nearest function or program boundary
    ReturnValue(Box<Value>),
    /// Evaluation fault; short-circuits every enclosing statement sequence
    Error(RuntimeError),
}

/// Type tag of a value, as shown in error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Integer,
    Boolean,
    Null,
    String,
    Array,
    Function,
    Builtin,
    ReturnValue,
    Error,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Integer => "INTEGER",
            ValueKind::Boolean => "BOOLEAN",
            ValueKind::Null => "NULL",
            ValueKind::String => "STRING",
            ValueKind::Array => "ARRAY",
            ValueKind::Function => "FUNCTION",
            ValueKind::Builtin => "BUILTIN",
            ValueKind::ReturnValue => "RETURN_VALUE",
            ValueKind::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// A function literal closed over the environment it was evaluated in
pub struct Closure {
    pub function: Rc<FunctionLiteral>,
    pub env: Env,
}

impl Closure {
    pub fn parameters(&self) -> &[Identifier] {
        &self.function.parameters
    }

    pub fn body(&self) -> &BlockStatement {
        &self.function.body
    }
}

// The captured environment usually contains this closure.
impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<&str> = self.parameters().iter().map(|p| p.value.as_str()).collect();
        f.debug_struct("Closure")
            .field("parameters", &params)
            .finish_non_exhaustive()
    }
}

impl Value {
    /// Canonical boolean singleton for `b`
    pub fn from_bool(b: bool) -> Value {
        if b {
            TRUE
        } else {
            FALSE
        }
    }

    /// Create a string value
    pub fn string(s: impl AsRef<str>) -> Value {
        Value::String(Rc::from(s.as_ref()))
    }

    /// Create an array value
    pub fn array(elements: Vec<Value>) -> Value {
        Value::Array(Rc::new(elements))
    }

    /// Type tag of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Integer(_) => ValueKind::Integer,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Null => ValueKind::Null,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Function(_) => ValueKind::Function,
            Value::Builtin(_) => ValueKind::Builtin,
            Value::ReturnValue(_) => ValueKind::ReturnValue,
            Value::Error(_) => ValueKind::Error,
        }
    }

    /// Only `null` and `false` are falsy
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Boolean(false))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Identity comparison backing `==` and `!=` on non-integer operands
    ///
    /// Booleans and null compare by tag since only the singletons exist;
    /// reference kinds compare by allocation.
    pub fn is_identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::String(a), Value::String(b)) => Rc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            _ => false,
        }
    }
}

/// Structural equality for inspecting results; functions compare by identity
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::ReturnValue(a), Value::ReturnValue(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Null => write!(f, "null"),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(elements) => {
                write!(f, "[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Value::Function(closure) => write!(f, "{}", closure.function),
            Value::Builtin(builtin) => write!(f, "builtin {}", builtin.name()),
            Value::ReturnValue(inner) => write!(f, "{}", inner),
            Value::Error(error) => write!(f, "ERROR: {}", error),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::from_bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<RuntimeError> for Value {
    fn from(error: RuntimeError) -> Self {
        Value::Error(error)
    }
}

/// Evaluation fault carried by [`Value::Error`]
///
/// `Display` yields the user-facing message; the span points at the node
/// whose evaluation failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// Prefix operator applied to an unsupported operand
    #[error("unknown operator: {operator}{right}")]
    UnknownPrefixOperator {
        operator: String,
        right: ValueKind,
        span: Span,
    },
    /// Infix operator not defined for operands of the same kind
    #[error("unknown operator: {left} {operator} {right}")]
    UnknownInfixOperator {
        left: ValueKind,
        operator: String,
        right: ValueKind,
        span: Span,
    },
    /// Infix operator applied to operands of different kinds
    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        left: ValueKind,
        operator: String,
        right: ValueKind,
        span: Span,
    },
    #[error("identifier not found: {name}")]
    IdentifierNotFound { name: String, span: Span },
    #[error("not a function: {kind}")]
    NotAFunction { kind: ValueKind, span: Span },
    #[error("division by zero")]
    DivisionByZero { span: Span },
    #[error("wrong number of arguments: want={want}, got={got}")]
    WrongArgumentCount { want: usize, got: usize, span: Span },
    #[error("index operator not supported: {kind}")]
    IndexNotSupported { kind: ValueKind, span: Span },
    #[error("maximum call depth of {max_depth} exceeded")]
    CallDepthExceeded { max_depth: usize, span: Span },
    /// Builtin called with an argument of the wrong kind
    #[error("argument to `{builtin}` not supported, got {kind}")]
    BuiltinArgument {
        builtin: &'static str,
        kind: ValueKind,
        span: Span,
    },
}

impl RuntimeError {
    /// Source location of the failing node
    pub fn span(&self) -> Span {
        match self {
            RuntimeError::UnknownPrefixOperator { span, .. }
            | RuntimeError::UnknownInfixOperator { span, .. }
            | RuntimeError::TypeMismatch { span, .. }
            | RuntimeError::IdentifierNotFound { span, .. }
            | RuntimeError::NotAFunction { span, .. }
            | RuntimeError::DivisionByZero { span }
            | RuntimeError::WrongArgumentCount { span, .. }
            | RuntimeError::IndexNotSupported { span, .. }
            | RuntimeError::CallDepthExceeded { span, .. }
            | RuntimeError::BuiltinArgument { span, .. } => *span,
        }
    }

    /// Stable diagnostic code
    pub fn code(&self) -> &'static str {
        match self {
            RuntimeError::UnknownPrefixOperator { .. }
            | RuntimeError::UnknownInfixOperator { .. } => error_codes::UNKNOWN_OPERATOR,
            RuntimeError::TypeMismatch { .. } => error_codes::TYPE_MISMATCH,
            RuntimeError::IdentifierNotFound { .. } => error_codes::IDENTIFIER_NOT_FOUND,
            RuntimeError::NotAFunction { .. } => error_codes::NOT_A_FUNCTION,
            RuntimeError::DivisionByZero { .. } => error_codes::DIVISION_BY_ZERO,
            RuntimeError::WrongArgumentCount { .. } => error_codes::WRONG_ARGUMENT_COUNT,
            RuntimeError::IndexNotSupported { .. } => error_codes::INDEX_NOT_SUPPORTED,
            RuntimeError::CallDepthExceeded { .. } => error_codes::CALL_DEPTH_EXCEEDED,
            RuntimeError::BuiltinArgument { .. } => error_codes::BUILTIN_ARGUMENT,
        }
    }

    /// Convert to a diagnostic (source location is resolved by the caller)
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error_with_code(self.code(), self.to_string(), self.span());
        let diag = match self {
            RuntimeError::TypeMismatch { left, right, .. } => {
                diag.with_label(format!("{} and {} cannot be combined", left, right))
            }
            RuntimeError::IdentifierNotFound { .. } => diag.with_label("not bound in this scope"),
            RuntimeError::NotAFunction { kind, .. } => {
                diag.with_label(format!("this is {}, not a function", kind))
            }
            RuntimeError::CallDepthExceeded { .. } => diag
                .with_label("call nested too deeply")
                .with_note("recursion with no reachable base case never terminates"),
            _ => diag,
        };
        match error_codes::help_for(self.code()) {
            Some(help) => diag.with_help(help),
            None => diag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_error_diagnostic() {
        let err = RuntimeError::DivisionByZero { span: Span::new(2, 7) };
        let diag = err.to_diagnostic();
        assert_eq!(diag.code, error_codes::DIVISION_BY_ZERO);
        assert_eq!(diag.message, "division by zero");
        assert_eq!(diag.span, Span::new(2, 7));
        assert!(diag.help.is_some());
    }

    #[test]
    fn test_prefix_and_infix_share_code() {
        let prefix = RuntimeError::UnknownPrefixOperator {
            operator: "-".to_string(),
            right: ValueKind::Boolean,
            span: Span::dummy(),
        };
        assert_eq!(prefix.code(), error_codes::UNKNOWN_OPERATOR);
        assert_eq!(prefix.to_string(), "unknown operator: -BOOLEAN");
    }

    #[test]
    fn test_truthiness() {
        assert!(!NULL.is_truthy());
        assert!(!FALSE.is_truthy());
        assert!(TRUE.is_truthy());
        assert!(Value::Integer(0).is_truthy());
        assert!(Value::string("").is_truthy());
        assert!(Value::array(vec![]).is_truthy());
    }

    #[test]
    fn test_from_bool_returns_singletons() {
        assert!(Value::from_bool(true).is_identical(&TRUE));
        assert!(Value::from_bool(false).is_identical(&FALSE));
        assert!(!Value::from_bool(false).is_identical(&NULL));
    }

    #[test]
    fn test_identity_of_reference_kinds() {
        let a = Value::string("hi");
        let b = Value::string("hi");
        assert!(!a.is_identical(&b));
        assert!(a.is_identical(&a.clone()));
        // Structural equality still holds
        assert_eq!(a, b);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Value::Integer(1).kind().to_string(), "INTEGER");
        assert_eq!(TRUE.kind().to_string(), "BOOLEAN");
        assert_eq!(NULL.kind().to_string(), "NULL");
        assert_eq!(Value::array(vec![]).kind().to_string(), "ARRAY");
        assert_eq!(
            Value::ReturnValue(Box::new(NULL)).kind().to_string(),
            "RETURN_VALUE"
        );
    }

    #[test]
    fn test_display() {
        let array = Value::array(vec![Value::Integer(1), Value::string("two"), TRUE]);
        assert_eq!(array.to_string(), "[1, two, true]");
        assert_eq!(NULL.to_string(), "null");

        let error = Value::Error(RuntimeError::DivisionByZero {
            span: Span::dummy(),
        });
        assert_eq!(error.to_string(), "ERROR: division by zero");
    }

    #[test]
    fn test_error_messages() {
        let err = RuntimeError::TypeMismatch {
            left: ValueKind::Integer,
            operator: "+".to_string(),
            right: ValueKind::Boolean,
            span: Span::new(2, 3),
        };
        assert_eq!(err.to_string(), "type mismatch: INTEGER + BOOLEAN");
        assert_eq!(err.span(), Span::new(2, 3));

        let err = RuntimeError::UnknownPrefixOperator {
            operator: "-".to_string(),
            right: ValueKind::Boolean,
            span: Span::dummy(),
        };
        assert_eq!(err.to_string(), "unknown operator: -BOOLEAN");
    }
}
