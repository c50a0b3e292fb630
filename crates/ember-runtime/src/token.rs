//! Token types for lexical analysis
//!
//! Defines all token types recognized by the Ember lexer and consumed by the parser.

use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token produced by a [`TokenSource`](crate::lexer::TokenSource)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The source text of this token (string literals are unquoted)
    pub literal: String,
    /// Source location
    pub span: Span,
}

impl Token {
    /// Create a new token
    pub fn new(kind: TokenKind, literal: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            literal: literal.into(),
            span,
        }
    }

    /// Create a token with no source location
    ///
    /// Useful for driving the parser from hand-built token streams.
    pub fn synthetic(kind: TokenKind, literal: impl Into<String>) -> Self {
        Self::new(kind, literal, Span::dummy())
    }

    /// The end-of-file token
    pub fn eof(span: Span) -> Self {
        Self::new(TokenKind::Eof, "", span)
    }
}

/// Classification of token types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // Special
    /// Character the lexer does not recognize
    Illegal,
    /// End of file
    Eof,

    // Literals
    /// Identifier
    Ident,
    /// Integer literal (42)
    Int,
    /// String literal ("hello")
    String,

    // Operators
    /// `=` (binding)
    Assign,
    /// `+`
    Plus,
    /// `-` (subtraction or negation)
    Minus,
    /// `!` (logical not)
    Bang,
    /// `*`
    Asterisk,
    /// `/`
    Slash,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `==`
    Eq,
    /// `!=`
    NotEq,

    // Delimiters
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,

    // Keywords
    /// `fn` keyword (function literal)
    Function,
    /// `let` keyword
    Let,
    /// `true` keyword
    True,
    /// `false` keyword
    False,
    /// `if` keyword
    If,
    /// `else` keyword
    Else,
    /// `return` keyword
    Return,
}

impl TokenKind {
    /// Number of token kinds, used to size the parser's dispatch tables
    pub const COUNT: usize = TokenKind::Return as usize + 1;

    /// Every token kind, in declaration order
    pub const ALL: [TokenKind; TokenKind::COUNT] = [
        TokenKind::Illegal,
        TokenKind::Eof,
        TokenKind::Ident,
        TokenKind::Int,
        TokenKind::String,
        TokenKind::Assign,
        TokenKind::Plus,
        TokenKind::Minus,
        TokenKind::Bang,
        TokenKind::Asterisk,
        TokenKind::Slash,
        TokenKind::Lt,
        TokenKind::Gt,
        TokenKind::Eq,
        TokenKind::NotEq,
        TokenKind::Comma,
        TokenKind::Semicolon,
        TokenKind::LParen,
        TokenKind::RParen,
        TokenKind::LBrace,
        TokenKind::RBrace,
        TokenKind::LBracket,
        TokenKind::RBracket,
        TokenKind::Function,
        TokenKind::Let,
        TokenKind::True,
        TokenKind::False,
        TokenKind::If,
        TokenKind::Else,
        TokenKind::Return,
    ];

    /// Dense index in `0..COUNT`
    pub fn index(self) -> usize {
        self as usize
    }

    /// Resolve an identifier to its keyword kind, or `Ident`
    pub fn lookup_ident(ident: &str) -> TokenKind {
        match ident {
            "fn" => TokenKind::Function,
            "let" => TokenKind::Let,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "return" => TokenKind::Return,
            _ => TokenKind::Ident,
        }
    }

    /// Get the string representation of this token kind
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Eof => "EOF",
            TokenKind::Ident => "IDENT",
            TokenKind::Int => "INT",
            TokenKind::String => "STRING",
            TokenKind::Assign => "=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Bang => "!",
            TokenKind::Asterisk => "*",
            TokenKind::Slash => "/",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Eq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Function => "FUNCTION",
            TokenKind::Let => "LET",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
            TokenKind::Return => "RETURN",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
