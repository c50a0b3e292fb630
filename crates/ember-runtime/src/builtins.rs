//! Builtin functions
//!
//! Builtins resolve after the environment chain, so a `let` binding of the
//! same name shadows them.

use crate::span::Span;
use crate::value::{RuntimeError, Value};

/// Native function callable from Ember code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// `len(x)`: byte length of a string or element count of an array
    Len,
}

impl Builtin {
    /// Resolve a builtin by name
    pub fn lookup(name: &str) -> Option<Builtin> {
        match name {
            "len" => Some(Builtin::Len),
            _ => None,
        }
    }

    /// Name the builtin is bound to
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Len => "len",
        }
    }

    /// Call the builtin
    ///
    /// `call_span` is the span of the call expression, used for error reporting.
    pub fn call(&self, args: &[Value], call_span: Span) -> Result<Value, RuntimeError> {
        match self {
            Builtin::Len => {
                if args.len() != 1 {
                    return Err(RuntimeError::WrongArgumentCount {
                        want: 1,
                        got: args.len(),
                        span: call_span,
                    });
                }
                len(&args[0], call_span)
            }
        }
    }
}

fn len(value: &Value, span: Span) -> Result<Value, RuntimeError> {
    let length = match value {
        Value::String(s) => s.len(),
        Value::Array(elements) => elements.len(),
        other => {
            return Err(RuntimeError::BuiltinArgument {
                builtin: "len",
                kind: other.kind(),
                span,
            })
        }
    };
    Ok(Value::Integer(length as i64))
}
