//! Expression evaluation

use crate::ast::{CallExpression, Expression, Identifier, IfExpression, IndexExpression};
use crate::builtins::Builtin;
use crate::environment::{release_frame, Env, Environment};
use crate::interpreter::{unwrap_return_value, Interpreter};
use crate::span::Span;
use crate::value::{Closure, RuntimeError, Value, ValueKind, NULL};
use std::rc::Rc;

impl Interpreter {
    pub(super) fn eval_expression(&mut self, expr: &Expression, env: &Env) -> Value {
        match expr {
            Expression::Integer(lit) => Value::Integer(lit.value),
            Expression::Boolean(lit) => Value::from_bool(lit.value),
            Expression::String(lit) => Value::string(&lit.value),
            Expression::Identifier(ident) => eval_identifier(ident, env),
            Expression::Prefix(prefix) => {
                let right = self.eval_expression(&prefix.right, env);
                if right.is_error() {
                    return right;
                }
                eval_prefix_expression(&prefix.operator, right, prefix.token.span)
            }
            Expression::Infix(infix) => {
                let left = self.eval_expression(&infix.left, env);
                if left.is_error() {
                    return left;
                }
                let right = self.eval_expression(&infix.right, env);
                if right.is_error() {
                    return right;
                }
                eval_infix_expression(&infix.operator, left, right, infix.token.span)
            }
            Expression::If(if_expr) => self.eval_if_expression(if_expr, env),
            Expression::Function(function) => Value::Function(Rc::new(Closure {
                function: Rc::clone(function),
                env: Rc::clone(env),
            })),
            Expression::Call(call) => self.eval_call_expression(call, env),
            Expression::Array(array) => match self.eval_expressions(&array.elements, env) {
                Ok(elements) => Value::array(elements),
                Err(error) => error,
            },
            Expression::Index(index) => self.eval_index_expression(index, env),
        }
    }

    fn eval_if_expression(&mut self, if_expr: &IfExpression, env: &Env) -> Value {
        let condition = self.eval_expression(&if_expr.condition, env);
        if condition.is_error() {
            return condition;
        }

        if condition.is_truthy() {
            self.eval_block(&if_expr.consequence, env)
        } else if let Some(alternative) = &if_expr.alternative {
            self.eval_block(alternative, env)
        } else {
            NULL
        }
    }

    fn eval_call_expression(&mut self, call: &CallExpression, env: &Env) -> Value {
        let callee = self.eval_expression(&call.callee, env);
        if callee.is_error() {
            return callee;
        }

        match self.eval_expressions(&call.arguments, env) {
            Ok(args) => self.apply_function(&callee, args, call.token.span),
            Err(error) => error,
        }
    }

    /// Call a function or builtin value with already-evaluated arguments
    ///
    /// `span` locates the call for error reporting.
    pub fn apply_function(&mut self, callee: &Value, args: Vec<Value>, span: Span) -> Value {
        match callee {
            Value::Function(closure) => self.call_closure(closure, args, span),
            Value::Builtin(builtin) => call_builtin(*builtin, &args, span),
            other => RuntimeError::NotAFunction {
                kind: other.kind(),
                span,
            }
            .into(),
        }
    }

    fn call_closure(&mut self, closure: &Closure, args: Vec<Value>, span: Span) -> Value {
        let parameters = closure.parameters();
        if args.len() != parameters.len() {
            return RuntimeError::WrongArgumentCount {
                want: parameters.len(),
                got: args.len(),
                span,
            }
            .into();
        }
        if self.call_depth >= self.max_call_depth {
            return RuntimeError::CallDepthExceeded {
                max_depth: self.max_call_depth,
                span,
            }
            .into();
        }

        let call_env = Environment::new_enclosed(&closure.env);
        {
            let mut scope = call_env.borrow_mut();
            for (param, arg) in parameters.iter().zip(args) {
                scope.set(param.value.as_str(), arg);
            }
        }

        self.call_depth += 1;
        let result = self.eval_block(closure.body(), &call_env);
        self.call_depth -= 1;

        release_frame(&call_env, &result);
        unwrap_return_value(result)
    }

    fn eval_index_expression(&mut self, index: &IndexExpression, env: &Env) -> Value {
        let collection = self.eval_expression(&index.collection, env);
        if collection.is_error() {
            return collection;
        }
        let position = self.eval_expression(&index.index, env);
        if position.is_error() {
            return position;
        }

        match (&collection, &position) {
            (Value::Array(elements), Value::Integer(i)) => usize::try_from(*i)
                .ok()
                .and_then(|i| elements.get(i))
                .cloned()
                .unwrap_or(NULL),
            _ => RuntimeError::IndexNotSupported {
                kind: collection.kind(),
                span: index.token.span,
            }
            .into(),
        }
    }

    /// Evaluate left to right, stopping at the first error
    fn eval_expressions(&mut self, exprs: &[Expression], env: &Env) -> Result<Vec<Value>, Value> {
        let mut values = Vec::with_capacity(exprs.len());
        for expr in exprs {
            let value = self.eval_expression(expr, env);
            if value.is_error() {
                return Err(value);
            }
            values.push(value);
        }
        Ok(values)
    }
}

/// Environment chain first, then builtins
fn eval_identifier(ident: &Identifier, env: &Env) -> Value {
    if let Some(value) = env.borrow().get(&ident.value) {
        return value;
    }
    if let Some(builtin) = Builtin::lookup(&ident.value) {
        return Value::Builtin(builtin);
    }
    RuntimeError::IdentifierNotFound {
        name: ident.value.clone(),
        span: ident.token.span,
    }
    .into()
}

fn call_builtin(builtin: Builtin, args: &[Value], span: Span) -> Value {
    match builtin.call(args, span) {
        Ok(value) => value,
        Err(error) => Value::Error(error),
    }
}

fn eval_prefix_expression(operator: &str, right: Value, span: Span) -> Value {
    match operator {
        "!" => Value::from_bool(!right.is_truthy()),
        "-" => match right {
            Value::Integer(value) => Value::Integer(value.wrapping_neg()),
            other => unknown_prefix(operator, other.kind(), span),
        },
        _ => unknown_prefix(operator, right.kind(), span),
    }
}

fn unknown_prefix(operator: &str, right: ValueKind, span: Span) -> Value {
    RuntimeError::UnknownPrefixOperator {
        operator: operator.to_string(),
        right,
        span,
    }
    .into()
}

/// Integers use the arithmetic table and strings compare by content. Any
/// other `==`/`!=` is identity, which is exact for the boolean and null
/// singletons.
fn eval_infix_expression(operator: &str, left: Value, right: Value, span: Span) -> Value {
    match (&left, &right) {
        (Value::Integer(l), Value::Integer(r)) => eval_integer_infix(operator, *l, *r, span),
        (Value::String(l), Value::String(r)) => eval_string_infix(operator, l, r, span),
        _ if operator == "==" => Value::from_bool(left.is_identical(&right)),
        _ if operator == "!=" => Value::from_bool(!left.is_identical(&right)),
        _ if left.kind() != right.kind() => RuntimeError::TypeMismatch {
            left: left.kind(),
            operator: operator.to_string(),
            right: right.kind(),
            span,
        }
        .into(),
        _ => unknown_infix(left.kind(), operator, right.kind(), span),
    }
}

fn eval_integer_infix(operator: &str, left: i64, right: i64, span: Span) -> Value {
    match operator {
        "+" => Value::Integer(left.wrapping_add(right)),
        "-" => Value::Integer(left.wrapping_sub(right)),
        "*" => Value::Integer(left.wrapping_mul(right)),
        "/" if right == 0 => RuntimeError::DivisionByZero { span }.into(),
        "/" => Value::Integer(left.wrapping_div(right)),
        "<" => Value::from_bool(left < right),
        ">" => Value::from_bool(left > right),
        "==" => Value::from_bool(left == right),
        "!=" => Value::from_bool(left != right),
        _ => unknown_infix(ValueKind::Integer, operator, ValueKind::Integer, span),
    }
}

fn eval_string_infix(operator: &str, left: &Rc<str>, right: &Rc<str>, span: Span) -> Value {
    match operator {
        "+" => Value::string(format!("{}{}", left, right)),
        "==" => Value::from_bool(left == right),
        "!=" => Value::from_bool(left != right),
        _ => unknown_infix(ValueKind::String, operator, ValueKind::String, span),
    }
}

fn unknown_infix(left: ValueKind, operator: &str, right: ValueKind, span: Span) -> Value {
    RuntimeError::UnknownInfixOperator {
        left,
        operator: operator.to_string(),
        right,
        span,
    }
    .into()
}
