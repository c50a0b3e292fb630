//! Statement parsing

use crate::ast::*;
use crate::lexer::TokenSource;
use crate::parser::{Parser, Precedence};
use crate::token::TokenKind;

impl<S: TokenSource> Parser<S> {
    /// Parse the statement starting at the current token
    ///
    /// On return the current token is the last token of the statement.
    pub(super) fn parse_statement(&mut self) -> Option<Statement> {
        match self.cur_token.kind {
            TokenKind::Let => self.parse_let_statement().map(Statement::Let),
            TokenKind::Return => self.parse_return_statement().map(Statement::Return),
            _ => self
                .parse_expression_statement()
                .map(Statement::Expression),
        }
    }

    /// `let <ident> = <expr> [;]`
    fn parse_let_statement(&mut self) -> Option<LetStatement> {
        let token = self.cur_token.clone();

        if !self.expect_peek(TokenKind::Ident) {
            return None;
        }
        let name = Identifier {
            token: self.cur_token.clone(),
            value: self.cur_token.literal.clone(),
        };

        if !self.expect_peek(TokenKind::Assign) {
            return None;
        }
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest);
        self.skip_optional_semicolon();

        Some(LetStatement {
            token,
            name,
            value: value?,
        })
    }

    /// `return <expr> [;]`
    ///
    /// Only a `;` is consumed after the value; anything else is left for the
    /// enclosing block or program.
    fn parse_return_statement(&mut self) -> Option<ReturnStatement> {
        let token = self.cur_token.clone();
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest);
        self.skip_optional_semicolon();

        Some(ReturnStatement {
            token,
            value: value?,
        })
    }

    fn parse_expression_statement(&mut self) -> Option<ExpressionStatement> {
        let token = self.cur_token.clone();

        let expression = self.parse_expression(Precedence::Lowest);
        self.skip_optional_semicolon();

        Some(ExpressionStatement {
            token,
            expression: expression?,
        })
    }

    /// Parse statements up to the closing `}`
    ///
    /// Expects the current token to be `{`. Hitting end of input first yields
    /// the statements read so far.
    pub(super) fn parse_block_statement(&mut self) -> BlockStatement {
        let token = self.cur_token.clone();
        let mut statements = Vec::new();

        self.next_token();

        while !self.cur_token_is(TokenKind::RBrace) && !self.cur_token_is(TokenKind::Eof) {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.next_token();
        }

        BlockStatement { token, statements }
    }

    /// The statement terminator is optional
    fn skip_optional_semicolon(&mut self) {
        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }
    }
}
