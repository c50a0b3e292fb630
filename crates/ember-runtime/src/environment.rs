//! Lexical environments
//!
//! Scopes form a parent-linked chain. Each call gets a fresh scope enclosed by
//! the callee's captured one; closures keep their defining scope alive through
//! shared ownership.
//!
//! A closure bound by `let` in the scope it captured forms an `Rc` cycle with
//! that scope. Cycles are broken when a scope's lifetime ends:
//! [`release_frame`] runs as each call returns, and [`Environment::release`]
//! clears a root scope its owner is done with.

use crate::value::Value;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared handle to a scope
pub type Env = Rc<RefCell<Environment>>;

/// Creation order of scopes; a scope only ever refers to older ones
/// unless a value created after it is bound into it.
static NEXT_SERIAL: AtomicU64 = AtomicU64::new(0);

/// A single scope of name bindings
pub struct Environment {
    store: HashMap<String, Value>,
    outer: Option<Env>,
    serial: u64,
}

impl Environment {
    /// Create a fresh top-level scope
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> Env {
        Self::with_outer(None)
    }

    /// Create a scope whose lookups fall back to `outer`
    pub fn new_enclosed(outer: &Env) -> Env {
        Self::with_outer(Some(Rc::clone(outer)))
    }

    fn with_outer(outer: Option<Env>) -> Env {
        Rc::new(RefCell::new(Environment {
            store: HashMap::new(),
            outer,
            serial: NEXT_SERIAL.fetch_add(1, Ordering::Relaxed),
        }))
    }

    /// Look up a name, walking outward through enclosing scopes
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.store.get(name) {
            return Some(value.clone());
        }
        if let Some(outer) = &self.outer {
            return outer.borrow().get(name);
        }
        None
    }

    /// Bind a name in this scope, shadowing any outer binding
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.store.insert(name.into(), value);
    }

    /// Drop every binding of `scope` and of the scopes created after it
    /// that those bindings reach
    ///
    /// For a root scope whose owner is finished with it. Closures still held
    /// elsewhere that captured one of these scopes see it empty afterwards.
    pub fn release(scope: &Env) {
        let floor = scope.borrow().serial;
        let mut garbage = ScopeWalk::new(floor);
        garbage.push(scope);
        garbage.walk();
        garbage.clear_all();
    }
}

/// Break the cycles left behind by a finished call
///
/// Only `result` leaves a call, so every scope created during the call that
/// `result` cannot reach is unreachable from outside and can be emptied.
pub(crate) fn release_frame(scope: &Env, result: &Value) {
    let floor = scope.borrow().serial;

    let mut kept = ScopeWalk::new(floor);
    kept.visit_value(result);
    kept.walk();
    if kept.seen.contains(&Rc::as_ptr(scope)) {
        return;
    }

    let mut garbage = ScopeWalk::new(floor);
    garbage.seen = kept.seen;
    garbage.push(scope);
    garbage.walk();
    garbage.clear_all();
}

/// Scopes no older than `floor` reachable through closures and `outer` links
struct ScopeWalk {
    floor: u64,
    seen: HashSet<*const RefCell<Environment>>,
    pending: Vec<Env>,
    found: Vec<Env>,
}

impl ScopeWalk {
    fn new(floor: u64) -> Self {
        Self {
            floor,
            seen: HashSet::new(),
            pending: Vec::new(),
            found: Vec::new(),
        }
    }

    fn push(&mut self, scope: &Env) {
        if scope.borrow().serial < self.floor {
            return;
        }
        if self.seen.insert(Rc::as_ptr(scope)) {
            self.pending.push(Rc::clone(scope));
        }
    }

    fn visit_value(&mut self, value: &Value) {
        match value {
            Value::Function(closure) => self.push(&closure.env),
            Value::Array(elements) => elements.iter().for_each(|e| self.visit_value(e)),
            Value::ReturnValue(inner) => self.visit_value(inner),
            _ => {}
        }
    }

    fn walk(&mut self) {
        while let Some(scope) = self.pending.pop() {
            {
                let bindings = scope.borrow();
                for value in bindings.store.values() {
                    self.visit_value(value);
                }
                if let Some(outer) = &bindings.outer {
                    self.push(outer);
                }
            }
            self.found.push(scope);
        }
    }

    fn clear_all(self) {
        for scope in &self.found {
            // Bindings drop outside the borrow; their closures may hold `scope`
            let bindings = std::mem::take(&mut scope.borrow_mut().store);
            drop(bindings);
        }
    }
}

// Bindings may hold closures that capture this very scope, so the derived
// Debug would recurse forever.
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.store.keys().collect();
        names.sort();
        f.debug_struct("Environment")
            .field("names", &names)
            .field("has_outer", &self.outer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BlockStatement, FunctionLiteral};
    use crate::token::{Token, TokenKind};
    use crate::value::{Closure, NULL};

    fn closure_over(env: &Env) -> Value {
        let function = FunctionLiteral {
            token: Token::synthetic(TokenKind::Function, "fn"),
            parameters: Vec::new(),
            body: BlockStatement {
                token: Token::synthetic(TokenKind::LBrace, "{"),
                statements: Vec::new(),
            },
        };
        Value::Function(Rc::new(Closure {
            function: Rc::new(function),
            env: Rc::clone(env),
        }))
    }

    #[test]
    fn test_lookup_walks_outward() {
        let global = Environment::new();
        global.borrow_mut().set("x", Value::Integer(1));

        let inner = Environment::new_enclosed(&global);
        inner.borrow_mut().set("y", Value::Integer(2));

        assert_eq!(inner.borrow().get("x"), Some(Value::Integer(1)));
        assert_eq!(inner.borrow().get("y"), Some(Value::Integer(2)));
        assert_eq!(global.borrow().get("y"), None);
    }

    #[test]
    fn test_inner_binding_shadows_outer() {
        let global = Environment::new();
        global.borrow_mut().set("x", Value::Integer(1));

        let inner = Environment::new_enclosed(&global);
        inner.borrow_mut().set("x", Value::Integer(99));

        assert_eq!(inner.borrow().get("x"), Some(Value::Integer(99)));
        assert_eq!(global.borrow().get("x"), Some(Value::Integer(1)));
    }

    #[test]
    fn test_debug_lists_names() {
        let env = Environment::new();
        env.borrow_mut().set("b", Value::Null);
        env.borrow_mut().set("a", Value::Null);
        let rendered = format!("{:?}", env.borrow());
        assert!(rendered.contains("[\"a\", \"b\"]"));
    }

    #[test]
    fn test_release_breaks_self_capture() {
        let env = Environment::new();
        let f = closure_over(&env);
        env.borrow_mut().set("f", f);
        let weak = Rc::downgrade(&env);

        Environment::release(&env);
        drop(env);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_release_frame_keeps_escaping_scope() {
        let outer = Environment::new();
        let frame = Environment::new_enclosed(&outer);
        let returned = closure_over(&frame);
        frame.borrow_mut().set("x", Value::Integer(7));
        frame.borrow_mut().set("self_ref", closure_over(&frame));

        release_frame(&frame, &returned);
        assert_eq!(frame.borrow().get("x"), Some(Value::Integer(7)));
    }

    #[test]
    fn test_release_frame_clears_unreachable_scope() {
        let outer = Environment::new();
        let frame = Environment::new_enclosed(&outer);
        frame.borrow_mut().set("g", closure_over(&frame));
        let weak = Rc::downgrade(&frame);

        release_frame(&frame, &Value::Integer(1));
        drop(frame);
        assert!(weak.upgrade().is_none());
        // The emptied frame no longer pins its outer scope
        assert_eq!(Rc::strong_count(&outer), 1);
    }

    #[test]
    fn test_release_frame_leaves_older_scopes_alone() {
        let outer = Environment::new();
        outer.borrow_mut().set("keep", Value::Integer(1));
        let frame = Environment::new_enclosed(&outer);
        frame.borrow_mut().set("h", closure_over(&outer));

        release_frame(&frame, &NULL);
        assert_eq!(outer.borrow().get("keep"), Some(Value::Integer(1)));
    }
}
