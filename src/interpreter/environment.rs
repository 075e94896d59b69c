use std::{cell::RefCell, fmt, rc::Rc};

use rustc_hash::FxHashMap;

use crate::interpreter::value::core::Value;

/// One scope record: its own bindings plus a link to the enclosing scope.
#[derive(Default)]
struct Scope {
    store: FxHashMap<String, Value>,
    outer: Option<Environment>,
}

/// A shared handle to a chain of scopes.
///
/// Cloning the handle does not copy the bindings: closures that capture an
/// environment observe later assignments to it, and every clone writes to the
/// same records.
///
/// A new scope is created per function call, per block body, and per `for`
/// loop; lookups walk outward to the global scope.
#[derive(Clone, Default)]
pub struct Environment(Rc<RefCell<Scope>>);

impl Environment {
    /// Creates an empty global scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty scope whose lookups fall back to `outer`.
    #[must_use]
    pub fn enclosed(outer: &Self) -> Self {
        Self(Rc::new(RefCell::new(Scope { store: FxHashMap::default(),
                                          outer: Some(outer.clone()), })))
    }

    /// Looks `name` up in this scope, then in each enclosing scope.
    ///
    /// # Example
    /// ```
    /// use ember::interpreter::{environment::Environment, value::core::Value};
    ///
    /// let global = Environment::new();
    /// global.define("x", Value::Integer(1));
    ///
    /// let inner = Environment::enclosed(&global);
    /// assert_eq!(inner.get("x"), Some(Value::Integer(1)));
    /// assert_eq!(inner.get("y"), None);
    /// ```
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        let scope = self.0.borrow();
        match scope.store.get(name) {
            Some(value) => Some(value.clone()),
            None => scope.outer.as_ref()?.get(name),
        }
    }

    /// Binds `name` in this scope, shadowing any outer binding.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.0.borrow_mut().store.insert(name.into(), value);
    }

    /// Rebinds `name` in the nearest scope that already defines it.
    ///
    /// # Returns
    /// `false` if no scope in the chain defines `name`; nothing is created in
    /// that case.
    pub fn assign(&self, name: &str, value: Value) -> bool {
        let mut scope = self.0.borrow_mut();
        if let Some(slot) = scope.store.get_mut(name) {
            *slot = value;
            return true;
        }
        match &scope.outer {
            Some(outer) => outer.assign(name, value),
            None => false,
        }
    }

    /// Returns `true` if `name` is bound in this scope itself.
    #[must_use]
    pub fn contains_local(&self, name: &str) -> bool {
        self.0.borrow().store.contains_key(name)
    }
}

impl fmt::Debug for Environment {
    /// Lists the names of each scope, innermost first. Values are omitted
    /// because closures stored in a scope refer back to it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut scopes = Vec::new();
        let mut current = Some(self.clone());
        while let Some(env) = current {
            let scope = env.0.borrow();
            let mut names: Vec<String> = scope.store.keys().cloned().collect();
            names.sort_unstable();
            scopes.push(names);
            current = scope.outer.clone();
        }
        f.debug_tuple("Environment").field(&scopes).finish()
    }
}
