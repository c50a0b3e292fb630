//! Lexical analysis (tokenization)
//!
//! The lexer converts Ember source code into a stream of tokens with byte-offset
//! spans. It never fails: characters it does not recognize become
//! [`TokenKind::Illegal`] tokens and are reported by the parser.

use crate::span::Span;
use crate::token::{Token, TokenKind};

mod literals;

/// Pull-based token stream consumed by the parser
///
/// Implementations must keep returning an `Eof` token once the input is
/// exhausted.
pub trait TokenSource {
    /// Produce the next token
    fn next_token(&mut self) -> Token;
}

/// Lexer state for tokenizing source code
pub struct Lexer {
    /// Original source code
    pub(super) source: String,
    /// Byte offset of the next unread character
    pub(super) current: usize,
    /// Byte offset where the current token starts
    pub(super) start: usize,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            current: 0,
            start: 0,
        }
    }

    /// Tokenize the whole source, including the trailing `Eof`
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            let token = self.scan_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        tokens
    }

    /// Scan the next token
    fn scan_token(&mut self) -> Token {
        self.skip_whitespace();

        self.start = self.current;

        if self.is_at_end() {
            return Token::eof(Span::new(self.current, self.current));
        }

        let c = self.advance();

        match c {
            // Single-character tokens
            '+' => self.make_token(TokenKind::Plus, "+"),
            '-' => self.make_token(TokenKind::Minus, "-"),
            '*' => self.make_token(TokenKind::Asterisk, "*"),
            '/' => self.make_token(TokenKind::Slash, "/"),
            '<' => self.make_token(TokenKind::Lt, "<"),
            '>' => self.make_token(TokenKind::Gt, ">"),
            ',' => self.make_token(TokenKind::Comma, ","),
            ';' => self.make_token(TokenKind::Semicolon, ";"),
            '(' => self.make_token(TokenKind::LParen, "("),
            ')' => self.make_token(TokenKind::RParen, ")"),
            '{' => self.make_token(TokenKind::LBrace, "{"),
            '}' => self.make_token(TokenKind::RBrace, "}"),
            '[' => self.make_token(TokenKind::LBracket, "["),
            ']' => self.make_token(TokenKind::RBracket, "]"),

            // Two-character tokens
            '=' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::Eq, "==")
                } else {
                    self.make_token(TokenKind::Assign, "=")
                }
            }
            '!' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::NotEq, "!=")
                } else {
                    self.make_token(TokenKind::Bang, "!")
                }
            }

            '"' => self.string(),

            c if c.is_ascii_digit() => self.number(),

            c if c.is_ascii_alphabetic() || c == '_' => self.identifier(),

            _ => {
                let text = self.lexeme().to_string();
                self.make_token(TokenKind::Illegal, &text)
            }
        }
    }

    /// Skip whitespace between tokens
    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.peek().is_whitespace() {
            self.advance();
        }
    }

    // === Character navigation ===

    /// Advance to next character and return it
    pub(super) fn advance(&mut self) -> char {
        let c = self.peek();
        self.current += c.len_utf8();
        c
    }

    /// Peek at current character without advancing
    pub(super) fn peek(&self) -> char {
        self.source[self.current..].chars().next().unwrap_or('\0')
    }

    /// Check if current character matches expected, and advance if so
    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.peek() != expected {
            false
        } else {
            self.advance();
            true
        }
    }

    /// Check if we've reached the end of source
    pub(super) fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    /// Source text of the token scanned so far
    pub(super) fn lexeme(&self) -> &str {
        &self.source[self.start..self.current]
    }

    /// Create a token spanning from the token start to the current position
    pub(super) fn make_token(&self, kind: TokenKind, literal: &str) -> Token {
        Token::new(kind, literal, Span::new(self.start, self.current))
    }
}

impl TokenSource for Lexer {
    fn next_token(&mut self) -> Token {
        self.scan_token()
    }
}

/// Pre-tokenized input, e.g. a hand-built token vector
impl TokenSource for std::vec::IntoIter<Token> {
    fn next_token(&mut self) -> Token {
        self.next().unwrap_or_else(|| Token::eof(Span::dummy()))
    }
}
