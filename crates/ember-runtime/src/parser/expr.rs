//! Expression parsing (Pratt parsing)

use crate::ast::*;
use crate::lexer::TokenSource;
use crate::parser::{ParseError, Parser, Precedence};
use crate::token::TokenKind;
use std::rc::Rc;

impl<S: TokenSource> Parser<S> {
    /// Populate the dispatch tables with the built-in expression forms
    pub(super) fn register_defaults(&mut self) {
        self.register_prefix(TokenKind::Ident, Self::parse_identifier);
        self.register_prefix(TokenKind::Int, Self::parse_integer_literal);
        self.register_prefix(TokenKind::String, Self::parse_string_literal);
        self.register_prefix(TokenKind::True, Self::parse_boolean);
        self.register_prefix(TokenKind::False, Self::parse_boolean);
        self.register_prefix(TokenKind::Bang, Self::parse_prefix_expression);
        self.register_prefix(TokenKind::Minus, Self::parse_prefix_expression);
        self.register_prefix(TokenKind::LParen, Self::parse_grouped_expression);
        self.register_prefix(TokenKind::If, Self::parse_if_expression);
        self.register_prefix(TokenKind::Function, Self::parse_function_literal);
        self.register_prefix(TokenKind::LBracket, Self::parse_array_literal);

        for (kind, precedence) in [
            (TokenKind::Eq, Precedence::Equals),
            (TokenKind::NotEq, Precedence::Equals),
            (TokenKind::Lt, Precedence::LessGreater),
            (TokenKind::Gt, Precedence::LessGreater),
            (TokenKind::Plus, Precedence::Sum),
            (TokenKind::Minus, Precedence::Sum),
            (TokenKind::Asterisk, Precedence::Product),
            (TokenKind::Slash, Precedence::Product),
        ] {
            self.register_infix(kind, precedence, Self::parse_infix_expression);
        }
        self.register_infix(TokenKind::LParen, Precedence::Call, Self::parse_call_expression);
        self.register_infix(TokenKind::LBracket, Precedence::Index, Self::parse_index_expression);
    }

    /// Parse an expression binding tighter than `precedence`
    ///
    /// Starts at the current token and leaves the current token on the last
    /// token of the expression.
    pub fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        if self.depth >= self.max_depth {
            self.errors.push(ParseError::NestingTooDeep {
                max_depth: self.max_depth,
                span: self.cur_token.span,
            });
            return None;
        }

        self.depth += 1;
        let expression = self.parse_precedence(precedence);
        self.depth -= 1;
        expression
    }

    fn parse_precedence(&mut self, precedence: Precedence) -> Option<Expression> {
        let Some(prefix) = self.prefix_parse_fns[self.cur_token.kind.index()] else {
            self.no_prefix_parse_fn_error();
            return None;
        };
        let left = prefix(self)?;

        let entry_depth = self.depth;
        let expression = self.parse_infix_chain(precedence, left);
        self.depth = entry_depth;
        expression
    }

    /// Fold infix operators onto `left` while they bind tighter than `precedence`
    ///
    /// Each application nests `left` one level deeper, so it counts against
    /// the nesting limit like a recursive `parse_expression` does.
    fn parse_infix_chain(&mut self, precedence: Precedence, mut left: Expression) -> Option<Expression> {
        while !self.peek_token_is(TokenKind::Semicolon) && precedence < self.peek_precedence() {
            let Some(infix) = self.infix_parse_fns[self.peek_token.kind.index()] else {
                return Some(left);
            };
            if self.depth >= self.max_depth {
                self.errors.push(ParseError::NestingTooDeep {
                    max_depth: self.max_depth,
                    span: self.peek_token.span,
                });
                return None;
            }
            self.depth += 1;
            self.next_token();
            left = infix(self, left)?;
        }

        Some(left)
    }

    // === Prefix forms ===

    fn parse_identifier(&mut self) -> Option<Expression> {
        Some(Expression::Identifier(self.cur_identifier()))
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();
        match token.literal.parse::<i64>() {
            Ok(value) => Some(Expression::Integer(IntegerLiteral { token, value })),
            Err(_) => {
                self.errors.push(ParseError::InvalidInteger {
                    literal: token.literal,
                    span: token.span,
                });
                None
            }
        }
    }

    fn parse_string_literal(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();
        let value = token.literal.clone();
        Some(Expression::String(StringLiteral { token, value }))
    }

    fn parse_boolean(&mut self) -> Option<Expression> {
        Some(Expression::Boolean(BooleanLiteral {
            token: self.cur_token.clone(),
            value: self.cur_token_is(TokenKind::True),
        }))
    }

    /// `-x` and `!x`; the operand binds at `Prefix` precedence
    pub fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();
        let operator = token.literal.clone();

        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;

        Some(Expression::Prefix(PrefixExpression {
            token,
            operator,
            right: Box::new(right),
        }))
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();

        let expression = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }

        Some(expression)
    }

    /// `if (<cond>) { ... } [else { ... }]`
    fn parse_if_expression(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();

        if !self.expect_peek(TokenKind::LParen) {
            return None;
        }
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenKind::RParen) || !self.expect_peek(TokenKind::LBrace) {
            return None;
        }
        let consequence = self.parse_block_statement();

        let alternative = if self.peek_token_is(TokenKind::Else) {
            self.next_token();
            if !self.expect_peek(TokenKind::LBrace) {
                return None;
            }
            Some(self.parse_block_statement())
        } else {
            None
        };

        Some(Expression::If(IfExpression {
            token,
            condition: Box::new(condition),
            consequence,
            alternative,
        }))
    }

    /// `fn(<params>) { ... }`
    fn parse_function_literal(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();

        if !self.expect_peek(TokenKind::LParen) {
            return None;
        }
        let parameters = self.parse_function_parameters()?;

        if !self.expect_peek(TokenKind::LBrace) {
            return None;
        }
        let body = self.parse_block_statement();

        Some(Expression::Function(Rc::new(FunctionLiteral {
            token,
            parameters,
            body,
        })))
    }

    /// Comma-separated identifiers up to `)`; the current token is `(`
    fn parse_function_parameters(&mut self) -> Option<Vec<Identifier>> {
        let mut identifiers = Vec::new();

        if self.peek_token_is(TokenKind::RParen) {
            self.next_token();
            return Some(identifiers);
        }

        if !self.expect_peek(TokenKind::Ident) {
            return None;
        }
        identifiers.push(self.cur_identifier());

        while self.peek_token_is(TokenKind::Comma) {
            self.next_token();
            if !self.expect_peek(TokenKind::Ident) {
                return None;
            }
            identifiers.push(self.cur_identifier());
        }

        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }

        Some(identifiers)
    }

    fn parse_array_literal(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();
        let elements = self.parse_expression_list(TokenKind::RBracket)?;
        Some(Expression::Array(ArrayLiteral { token, elements }))
    }

    // === Infix forms ===

    /// Binary operator; the right operand binds at the operator's own
    /// precedence, making equal-precedence chains left-associative
    pub fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.cur_token.clone();
        let operator = token.literal.clone();
        let precedence = self.cur_precedence();

        self.next_token();
        let right = self.parse_expression(precedence)?;

        Some(Expression::Infix(InfixExpression {
            token,
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }))
    }

    fn parse_call_expression(&mut self, callee: Expression) -> Option<Expression> {
        let token = self.cur_token.clone();
        let arguments = self.parse_expression_list(TokenKind::RParen)?;

        Some(Expression::Call(CallExpression {
            token,
            callee: Box::new(callee),
            arguments,
        }))
    }

    fn parse_index_expression(&mut self, collection: Expression) -> Option<Expression> {
        let token = self.cur_token.clone();

        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RBracket) {
            return None;
        }

        Some(Expression::Index(IndexExpression {
            token,
            collection: Box::new(collection),
            index: Box::new(index),
        }))
    }

    // === Helpers ===

    /// Comma-separated expressions up to `end`, shared by call arguments and
    /// array elements. The current token is the opening delimiter.
    pub fn parse_expression_list(&mut self, end: TokenKind) -> Option<Vec<Expression>> {
        let mut list = Vec::new();

        if self.peek_token_is(end) {
            self.next_token();
            return Some(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_token_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        if !self.expect_peek(end) {
            return None;
        }

        Some(list)
    }

    fn cur_identifier(&self) -> Identifier {
        Identifier {
            token: self.cur_token.clone(),
            value: self.cur_token.literal.clone(),
        }
    }
}
