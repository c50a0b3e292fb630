//! Ember Runtime - Core language implementation
//!
//! This library provides the complete Ember language runtime:
//! - Lexical analysis into a pull-based token stream
//! - Pratt parsing with extensible prefix/infix dispatch tables
//! - Tree-walking evaluation with closures over an environment chain
//! - Structured diagnostics for syntax and runtime faults

/// Ember runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Public API modules
pub mod ast;
pub mod builtins;
pub mod diagnostic;
pub mod environment;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod runtime;
pub mod span;
pub mod token;
pub mod value;

// Re-export commonly used types
pub use ast::{Node, Program, VersionedProgram, AST_VERSION};
pub use builtins::Builtin;
pub use diagnostic::formatter::{ColorMode, DiagnosticFormatter};
pub use diagnostic::{error_codes, Diagnostic, DiagnosticLevel, DIAG_VERSION};
pub use environment::{Env, Environment};
pub use interpreter::Interpreter;
pub use lexer::{Lexer, TokenSource};
pub use parser::{ParseError, Parser, Precedence};
pub use runtime::{Ember, RuntimeResult};
pub use span::Span;
pub use token::{Token, TokenKind};
pub use value::{Closure, RuntimeError, Value, ValueKind, FALSE, NULL, TRUE};
