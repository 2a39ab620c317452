use crate::object::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/*
A mapping from name to `Value`, plus an optional reference to an outer
environment, forming the lexical scope chain. Lookup walks `outer` until
found; `set` always writes into the current (innermost) scope. A new
environment is created per function call, and a closure keeps a *shared*
reference to the environment present when its `FunctionLiteral` was
evaluated (that's what makes closures work, and it's why this can't just be
an owned parent pointer the way a single-threaded tree walker without
closures could get away with): `Rc<RefCell<..>>` lets two different call
frames' environments (the captured one and the fresh enclosing one) stay
alive and mutable independently of the call stack that created them.

A closure stored into its own defining environment (`let rec = fn() { rec() };`)
creates an `Rc` reference cycle: `rec`'s value is a `Function` whose
`closed_env` is the very environment that holds `rec`. This implementation
tolerates the cycle rather than breaking it with a weak link, environments
are cheap, process/top-level-evaluation-lifetime garbage, and the Go
original this was ported from leans on a tracing GC that has the same
property.
*/
#[derive(Clone)]
pub struct Environment(Rc<RefCell<Inner>>);

struct Inner {
    store: HashMap<String, Value>,
    outer: Option<Environment>,
}

impl Environment {
    pub fn new_global() -> Self {
        Environment(Rc::new(RefCell::new(Inner {
            store: HashMap::new(),
            outer: None,
        })))
    }

    pub fn new_enclosed(outer: &Environment) -> Self {
        Environment(Rc::new(RefCell::new(Inner {
            store: HashMap::new(),
            outer: Some(outer.clone()),
        })))
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        let inner = self.0.borrow();
        if let Some(value) = inner.store.get(name) {
            return Some(value.clone());
        }
        inner.outer.as_ref().and_then(|outer| outer.get(name))
    }

    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.0.borrow_mut().store.insert(name.into(), value);
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Values held in scope may themselves be closures over this very
        // environment (see module docs); printing the store's contents
        // could recurse through that cycle, so only the shape is shown.
        f.debug_struct("Environment")
            .field("bindings", &self.0.borrow().store.len())
            .field("has_outer", &self.0.borrow().outer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_writes_into_innermost_scope() {
        let outer = Environment::new_global();
        outer.set("x", Value::Integer(1));

        let inner = Environment::new_enclosed(&outer);
        inner.set("x", Value::Integer(2));

        assert!(matches!(inner.get("x"), Some(Value::Integer(2))));
        assert!(matches!(outer.get("x"), Some(Value::Integer(1))));
    }

    #[test]
    fn lookup_walks_outer_chain() {
        let outer = Environment::new_global();
        outer.set("y", Value::Integer(42));

        let inner = Environment::new_enclosed(&outer);
        assert!(matches!(inner.get("y"), Some(Value::Integer(42))));
    }

    #[test]
    fn missing_name_resolves_to_none_at_the_root() {
        let env = Environment::new_global();
        assert!(env.get("nope").is_none());
    }

    #[test]
    fn cloned_environment_shares_the_same_scope() {
        let env = Environment::new_global();
        let alias = env.clone();
        alias.set("shared", Value::Integer(7));
        assert!(matches!(env.get("shared"), Some(Value::Integer(7))));
    }
}
