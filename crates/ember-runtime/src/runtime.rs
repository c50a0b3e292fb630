//! Ember runtime API for embedding

use crate::ast::Program;
use crate::diagnostic::formatter::{ColorMode, DiagnosticFormatter};
use crate::diagnostic::{error_codes, Diagnostic};
use crate::environment::{Env, Environment};
use crate::interpreter::Interpreter;
use crate::lexer::Lexer;
use crate::parser::{Parser, DEFAULT_MAX_PARSE_DEPTH};
use crate::span::Span;
use crate::value::Value;
use ember_config::{Config, DiagnosticFormat};
use std::cell::RefCell;
use std::path::Path;

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, Vec<Diagnostic>>;

/// Ember runtime instance
///
/// Provides a high-level API for embedding Ember in host applications.
/// Bindings made by one `eval` are visible to the next.
///
/// # Examples
///
/// ```
/// use ember_runtime::{Ember, Value};
///
/// let runtime = Ember::new();
/// runtime.eval("let double = fn(x) { x * 2 };").unwrap();
/// assert_eq!(runtime.eval("double(21)").unwrap(), Value::Integer(42));
/// ```
pub struct Ember {
    /// Interpreter for executing code (using interior mutability)
    interpreter: RefCell<Interpreter>,
    /// Global scope shared by every evaluation
    globals: Env,
    max_parse_depth: usize,
    color: ColorMode,
    format: DiagnosticFormat,
}

impl Ember {
    /// Create a runtime with default limits
    pub fn new() -> Self {
        Self {
            interpreter: RefCell::new(Interpreter::new()),
            globals: Environment::new(),
            max_parse_depth: DEFAULT_MAX_PARSE_DEPTH,
            color: ColorMode::Auto,
            format: DiagnosticFormat::Human,
        }
    }

    /// Create a runtime using limits and diagnostic settings from `config`
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ember_config::ConfigLoader;
    /// use ember_runtime::Ember;
    /// use std::path::Path;
    ///
    /// let config = ConfigLoader::new().load_from_directory(Path::new(".")).unwrap();
    /// let runtime = Ember::with_config(&config);
    /// ```
    pub fn with_config(config: &Config) -> Self {
        Self {
            interpreter: RefCell::new(
                Interpreter::new().with_max_call_depth(config.max_call_depth()),
            ),
            globals: Environment::new(),
            max_parse_depth: config.max_parse_depth(),
            color: config.color().into(),
            format: config.format(),
        }
    }

    /// Parse source into a program plus syntax diagnostics
    ///
    /// The program holds every statement that parsed cleanly, even when
    /// diagnostics are returned.
    pub fn parse(&self, source: &str) -> (Program, Vec<Diagnostic>) {
        let mut parser = Parser::new(Lexer::new(source)).with_max_depth(self.max_parse_depth);
        let (program, errors) = parser.parse();
        let diagnostics = errors
            .iter()
            .map(|e| e.to_diagnostic().with_source(source))
            .collect();
        (program, diagnostics)
    }

    /// Evaluate Ember source code in the global scope
    ///
    /// Returns the value of the last statement, or diagnostics if parsing or
    /// evaluation failed. Nothing is evaluated when there are syntax errors.
    ///
    /// # Examples
    ///
    /// ```
    /// use ember_runtime::Ember;
    ///
    /// let runtime = Ember::new();
    /// let err = runtime.eval("5 + true;").unwrap_err();
    /// assert_eq!(err[0].message, "type mismatch: INTEGER + BOOLEAN");
    /// ```
    pub fn eval(&self, source: &str) -> RuntimeResult<Value> {
        let (program, diagnostics) = self.parse(source);
        if !diagnostics.is_empty() {
            return Err(diagnostics);
        }

        let mut interpreter = self.interpreter.borrow_mut();
        match interpreter.eval(&program, &self.globals) {
            Value::Error(error) => Err(vec![error.to_diagnostic().with_source(source)]),
            value => Ok(value),
        }
    }

    /// Evaluate an Ember source file
    ///
    /// Diagnostics carry the file path.
    pub fn eval_file(&self, path: impl AsRef<Path>) -> RuntimeResult<Value> {
        let path = path.as_ref();
        let file = path.display().to_string();
        let source = std::fs::read_to_string(path).map_err(|e| {
            vec![Diagnostic::error_with_code(
                error_codes::FILE_READ_ERROR,
                format!("failed to read {}: {}", file, e),
                Span::dummy(),
            )
            .with_file(file.as_str())]
        })?;

        self.eval(&source).map_err(|diagnostics| {
            diagnostics
                .into_iter()
                .map(|d| d.with_file(file.as_str()))
                .collect()
        })
    }

    /// Look up a global binding
    pub fn get_global(&self, name: &str) -> Option<Value> {
        self.globals.borrow().get(name)
    }

    /// Bind a global that later evaluations can see
    pub fn set_global(&self, name: &str, value: Value) {
        self.globals.borrow_mut().set(name, value);
    }

    /// Render diagnostics in the configured format, without colors
    pub fn render_diagnostics(&self, diagnostics: &[Diagnostic]) -> String {
        match self.format {
            DiagnosticFormat::Human => {
                let formatter = DiagnosticFormatter::plain();
                diagnostics
                    .iter()
                    .map(|d| formatter.format_to_string(d))
                    .collect()
            }
            DiagnosticFormat::Json => diagnostics
                .iter()
                .filter_map(|d| d.to_json_compact().ok())
                .map(|line| line + "\n")
                .collect(),
        }
    }

    /// Write diagnostics to stderr in the configured format and color mode
    pub fn emit_diagnostics(&self, diagnostics: &[Diagnostic]) {
        match self.format {
            DiagnosticFormat::Human => DiagnosticFormatter::new(self.color).emit_all(diagnostics),
            DiagnosticFormat::Json => eprint!("{}", self.render_diagnostics(diagnostics)),
        }
    }
}

impl Default for Ember {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Ember {
    fn drop(&mut self) {
        // Global closures capture the global scope itself
        Environment::release(&self.globals);
    }
}
