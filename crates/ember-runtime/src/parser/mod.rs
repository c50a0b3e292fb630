//! Parsing (tokens to AST)
//!
//! The parser pulls tokens from a [`TokenSource`] and builds a [`Program`].
//! Expressions use Pratt parsing driven by two dispatch tables indexed by
//! [`TokenKind`]: prefix functions (tokens that can start an expression) and
//! infix functions (tokens that join a left operand to what follows). New
//! expression forms are added with [`Parser::register_prefix`] and
//! [`Parser::register_infix`] without touching the precedence loop.
//!
//! Errors are accumulated rather than thrown; a [`Program`] is always returned.
//! A statement whose required parts failed to parse is left out of the tree.

mod expr;
mod stmt;

use crate::ast::{Expression, Program};
use crate::diagnostic::{error_codes, Diagnostic};
use crate::lexer::TokenSource;
use crate::span::Span;
use crate::token::{Token, TokenKind};
use thiserror::Error;

pub use ember_config::DEFAULT_MAX_PARSE_DEPTH;

/// Parses an expression that starts at the current token
pub type PrefixParseFn<S> = fn(&mut Parser<S>) -> Option<Expression>;

/// Parses the rest of an expression whose operator is the current token
pub type InfixParseFn<S> = fn(&mut Parser<S>, Expression) -> Option<Expression>;

/// Operator precedence levels for Pratt parsing, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precedence {
    Lowest,
    Equals,      // == !=
    LessGreater, // < >
    Sum,         // + -
    Product,     // * /
    Prefix,      // -x !x
    Call,        // f(x)
    Index,       // a[i]
}

/// Syntax error recorded while parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A specific token was required next
    #[error("expected next token to be {expected}, got {found}")]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
        span: Span,
    },
    /// The token cannot start an expression
    #[error("no prefix parse function for {kind}")]
    NoPrefixParseFn { kind: TokenKind, span: Span },
    /// Integer literal outside the i64 range
    #[error("could not parse \"{literal}\" as integer")]
    InvalidInteger { literal: String, span: Span },
    /// Expression nested deeper than the configured limit
    #[error("expression nesting exceeds maximum depth of {max_depth}")]
    NestingTooDeep { max_depth: usize, span: Span },
}

impl ParseError {
    /// Span of the offending token
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. }
            | ParseError::NoPrefixParseFn { span, .. }
            | ParseError::InvalidInteger { span, .. }
            | ParseError::NestingTooDeep { span, .. } => *span,
        }
    }

    /// Stable diagnostic code
    pub fn code(&self) -> &'static str {
        match self {
            ParseError::UnexpectedToken { .. } => error_codes::UNEXPECTED_TOKEN,
            ParseError::NoPrefixParseFn { .. } => error_codes::NO_PREFIX_PARSE_FN,
            ParseError::InvalidInteger { .. } => error_codes::INVALID_INTEGER,
            ParseError::NestingTooDeep { .. } => error_codes::NESTING_TOO_DEEP,
        }
    }

    /// Convert to a diagnostic (source location is resolved by the caller)
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error_with_code(self.code(), self.to_string(), self.span());
        match self {
            ParseError::UnexpectedToken { expected, .. } => {
                diag.with_label(format!("expected {}", expected))
            }
            ParseError::NoPrefixParseFn { .. } => diag
                .with_label("expression expected here")
                .with_help("check for a missing operand or a stray token"),
            ParseError::InvalidInteger { .. } => diag
                .with_label("out of range")
                .with_note("integers are 64-bit signed"),
            ParseError::NestingTooDeep { .. } => diag
                .with_label("nested too deeply")
                .with_help("simplify the expression or raise `parser.max_depth` in ember.toml"),
        }
    }
}

/// Pratt parser over any token source
pub struct Parser<S: TokenSource> {
    source: S,
    cur_token: Token,
    peek_token: Token,
    errors: Vec<ParseError>,
    prefix_parse_fns: [Option<PrefixParseFn<S>>; TokenKind::COUNT],
    infix_parse_fns: [Option<InfixParseFn<S>>; TokenKind::COUNT],
    precedences: [Precedence; TokenKind::COUNT],
    /// Current `parse_expression` recursion depth
    depth: usize,
    max_depth: usize,
}

impl<S: TokenSource> Parser<S> {
    /// Create a parser with the default expression forms registered
    pub fn new(source: S) -> Self {
        let mut parser = Self {
            source,
            cur_token: Token::eof(Span::dummy()),
            peek_token: Token::eof(Span::dummy()),
            errors: Vec::new(),
            prefix_parse_fns: [None; TokenKind::COUNT],
            infix_parse_fns: [None; TokenKind::COUNT],
            precedences: [Precedence::Lowest; TokenKind::COUNT],
            depth: 0,
            max_depth: DEFAULT_MAX_PARSE_DEPTH,
        };

        parser.register_defaults();

        // Fill cur_token and peek_token
        parser.next_token();
        parser.next_token();

        parser
    }

    /// Limit how deeply expressions may nest
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Register the parse function for expressions starting with `kind`
    pub fn register_prefix(&mut self, kind: TokenKind, f: PrefixParseFn<S>) {
        self.prefix_parse_fns[kind.index()] = Some(f);
    }

    /// Register the parse function for `kind` used as an infix operator
    pub fn register_infix(&mut self, kind: TokenKind, precedence: Precedence, f: InfixParseFn<S>) {
        self.infix_parse_fns[kind.index()] = Some(f);
        self.precedences[kind.index()] = precedence;
    }

    /// Parse the whole token stream
    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();

        while !self.cur_token_is(TokenKind::Eof) {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.next_token();
        }

        Program { statements }
    }

    /// Parse the whole token stream, returning the program and all syntax errors
    pub fn parse(&mut self) -> (Program, Vec<ParseError>) {
        let program = self.parse_program();
        (program, std::mem::take(&mut self.errors))
    }

    /// Syntax errors recorded so far
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    // === Token navigation ===

    /// Advance one token
    pub fn next_token(&mut self) {
        let next = self.source.next_token();
        self.cur_token = std::mem::replace(&mut self.peek_token, next);
    }

    pub fn cur_token(&self) -> &Token {
        &self.cur_token
    }

    pub fn peek_token(&self) -> &Token {
        &self.peek_token
    }

    pub fn cur_token_is(&self, kind: TokenKind) -> bool {
        self.cur_token.kind == kind
    }

    pub fn peek_token_is(&self, kind: TokenKind) -> bool {
        self.peek_token.kind == kind
    }

    /// Advance if the next token is `kind`, otherwise record an error
    pub fn expect_peek(&mut self, kind: TokenKind) -> bool {
        if self.peek_token_is(kind) {
            self.next_token();
            true
        } else {
            self.peek_error(kind);
            false
        }
    }

    pub fn peek_precedence(&self) -> Precedence {
        self.precedences[self.peek_token.kind.index()]
    }

    pub fn cur_precedence(&self) -> Precedence {
        self.precedences[self.cur_token.kind.index()]
    }

    // === Errors ===

    fn peek_error(&mut self, expected: TokenKind) {
        self.errors.push(ParseError::UnexpectedToken {
            expected,
            found: self.peek_token.kind,
            span: self.peek_token.span,
        });
    }

    fn no_prefix_parse_fn_error(&mut self) {
        self.errors.push(ParseError::NoPrefixParseFn {
            kind: self.cur_token.kind,
            span: self.cur_token.span,
        });
    }
}
