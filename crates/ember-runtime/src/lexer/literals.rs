//! Literal scanning for the lexer

use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

impl Lexer {
    /// Scan a string literal (opening quote already consumed)
    ///
    /// Supports `\n`, `\t`, `\"` and `\\`; any other escape is kept verbatim.
    /// A string that runs into end of input becomes an `Illegal` token.
    pub(super) fn string(&mut self) -> Token {
        let mut value = String::new();

        while !self.is_at_end() && self.peek() != '"' {
            let c = self.advance();
            if c != '\\' || self.is_at_end() {
                value.push(c);
                continue;
            }

            match self.advance() {
                'n' => value.push('\n'),
                't' => value.push('\t'),
                '"' => value.push('"'),
                '\\' => value.push('\\'),
                other => {
                    value.push('\\');
                    value.push(other);
                }
            }
        }

        if self.is_at_end() {
            let text = self.lexeme().to_string();
            return self.make_token(TokenKind::Illegal, &text);
        }

        self.advance(); // Closing "
        self.make_token(TokenKind::String, &value)
    }

    /// Scan a decimal integer literal
    ///
    /// Range checking happens in the parser so oversized literals are reported
    /// as parse errors.
    pub(super) fn number(&mut self) -> Token {
        while !self.is_at_end() && self.peek().is_ascii_digit() {
            self.advance();
        }

        let literal = self.lexeme().to_string();
        self.make_token(TokenKind::Int, &literal)
    }

    /// Scan an identifier or keyword
    pub(super) fn identifier(&mut self) -> Token {
        while !self.is_at_end() {
            let c = self.peek();
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let literal = self.lexeme().to_string();
        let kind = TokenKind::lookup_ident(&literal);
        self.make_token(kind, &literal)
    }
}
