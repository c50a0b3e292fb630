//! Statement execution

use crate::ast::{BlockStatement, Program, Statement};
use crate::environment::Env;
use crate::interpreter::Interpreter;
use crate::value::{Value, NULL};

impl Interpreter {
    /// Run statements in order; a `return` ends the program with its value,
    /// an error ends it with the error
    pub(super) fn eval_program(&mut self, program: &Program, env: &Env) -> Value {
        let mut result = NULL;

        for statement in &program.statements {
            match self.eval_statement(statement, env) {
                Value::ReturnValue(value) => return *value,
                error @ Value::Error(_) => return error,
                value => result = value,
            }
        }

        result
    }

    /// Like [`Interpreter::eval_program`] but a `ReturnValue` is passed up
    /// still wrapped, so it reaches the enclosing function boundary
    pub(super) fn eval_block(&mut self, block: &BlockStatement, env: &Env) -> Value {
        let mut result = NULL;

        for statement in &block.statements {
            result = self.eval_statement(statement, env);
            if matches!(result, Value::ReturnValue(_) | Value::Error(_)) {
                return result;
            }
        }

        result
    }

    pub(super) fn eval_statement(&mut self, statement: &Statement, env: &Env) -> Value {
        match statement {
            Statement::Let(let_stmt) => {
                let value = self.eval_expression(&let_stmt.value, env);
                if value.is_error() {
                    return value;
                }
                env.borrow_mut().set(let_stmt.name.value.as_str(), value);
                NULL
            }
            Statement::Return(ret) => {
                let value = self.eval_expression(&ret.value, env);
                if value.is_error() {
                    return value;
                }
                Value::ReturnValue(Box::new(value))
            }
            Statement::Expression(stmt) => self.eval_expression(&stmt.expression, env),
            Statement::Block(block) => self.eval_block(block, env),
        }
    }
}
