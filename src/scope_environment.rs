//! Chained variable scopes used while executing a program.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Display;
use std::rc::Rc;

use crate::program_execution::Value;

/// Raised when a name is read, or assigned below the global scope, without
/// being bound anywhere in the chain.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct UndefinedVariable {
    pub var_name: String,
}

impl Display for UndefinedVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "Undefined variable {}", self.var_name);
    }
}

/// One link of the scope chain. Scopes are shared through `Rc`: a scope lives
/// as long as the call that created it or any closure that captured it.
#[derive(Default)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates the global scope.
    pub fn new_root() -> Rc<Environment> {
        return Rc::new(Environment::default());
    }

    /// Creates a child scope whose parent is `self`.
    pub fn extend(self: &Rc<Self>) -> Rc<Environment> {
        return Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(Rc::clone(self)),
        });
    }

    pub fn is_root(&self) -> bool {
        return self.parent.is_none();
    }

    /// Finds the nearest scope in the chain that binds `var_name` directly.
    pub fn lookup(self: &Rc<Self>, var_name: &str) -> Option<Rc<Environment>> {
        let mut scope = Some(Rc::clone(self));

        while let Some(current) = scope {
            if current.bindings.borrow().contains_key(var_name) {
                return Some(current);
            }
            scope = current.parent.clone();
        }

        return None;
    }

    /// Reads `var_name`, walking from this scope up to the root.
    pub fn get(&self, var_name: &str) -> Result<Value, UndefinedVariable> {
        let mut scope: Option<&Environment> = Some(self);

        while let Some(current) = scope {
            if let Some(value) = current.bindings.borrow().get(var_name) {
                return Ok(value.clone());
            }
            scope = current.parent.as_deref();
        }

        return Err(UndefinedVariable {
            var_name: String::from(var_name),
        });
    }

    /// Assigns to the nearest existing binding of `var_name`. An unbound name
    /// is declared on the spot only when `self` is the root scope; anywhere
    /// else it is an error.
    pub fn set(self: &Rc<Self>, var_name: &str, value: Value) -> Result<Value, UndefinedVariable> {
        match self.lookup(var_name) {
            Some(scope) => {
                scope
                    .bindings
                    .borrow_mut()
                    .insert(String::from(var_name), value.clone());
            }

            None if !self.is_root() => {
                return Err(UndefinedVariable {
                    var_name: String::from(var_name),
                });
            }

            None => {
                self.def(var_name, value.clone());
            }
        }

        return Ok(value);
    }

    /// Creates or overwrites a binding in this scope only.
    pub fn def(&self, var_name: &str, value: Value) -> Value {
        self.bindings
            .borrow_mut()
            .insert(String::from(var_name), value.clone());
        return value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test if reads walk up the chain and nearer bindings shadow outer ones.
    #[test]
    fn test_get_walks_chain() {
        let global_env = Environment::new_root();
        global_env.def("a", Value::Number(1.0));
        global_env.def("b", Value::Number(2.0));

        let child_env = global_env.extend();
        child_env.def("b", Value::Number(20.0));
        let grandchild_env = child_env.extend();

        assert_eq!(grandchild_env.get("a"), Ok(Value::Number(1.0)));
        assert_eq!(grandchild_env.get("b"), Ok(Value::Number(20.0)));
        assert_eq!(global_env.get("b"), Ok(Value::Number(2.0)));
        assert_eq!(
            grandchild_env.get("c"),
            Err(UndefinedVariable {
                var_name: String::from("c"),
            })
        );
    }

    // Test if lookup returns the scope holding the binding.
    #[test]
    fn test_lookup() {
        let global_env = Environment::new_root();
        global_env.def("a", Value::Number(1.0));
        let child_env = global_env.extend();

        let found = child_env.lookup("a").expect("Expected to find a.");

        assert!(Rc::ptr_eq(&found, &global_env));
        assert!(child_env.lookup("missing").is_none());
    }

    // Test if set mutates the nearest existing binding, visible through
    // every scope sharing it.
    #[test]
    fn test_set_existing_binding() {
        let global_env = Environment::new_root();
        global_env.def("counter", Value::Number(0.0));
        let child_env = global_env.extend();
        let sibling_env = global_env.extend();

        child_env
            .set("counter", Value::Number(5.0))
            .expect("Unable to set counter.");

        assert_eq!(sibling_env.get("counter"), Ok(Value::Number(5.0)));
        assert!(child_env.bindings.borrow().is_empty());
    }

    // Test if unbound names are declared by assignment only at the root.
    #[test]
    fn test_set_unbound_asymmetry() {
        let global_env = Environment::new_root();
        let child_env = global_env.extend();

        assert_eq!(
            global_env.set("y", Value::Number(3.0)),
            Ok(Value::Number(3.0))
        );
        assert_eq!(global_env.get("y"), Ok(Value::Number(3.0)));

        assert_eq!(
            child_env.set("z", Value::Number(4.0)),
            Err(UndefinedVariable {
                var_name: String::from("z"),
            })
        );
        assert!(global_env.get("z").is_err());
    }

    // Test if def only ever touches the current scope.
    #[test]
    fn test_def_is_local() {
        let global_env = Environment::new_root();
        global_env.def("x", Value::Number(1.0));
        let child_env = global_env.extend();

        child_env.def("x", Value::False);

        assert_eq!(child_env.get("x"), Ok(Value::False));
        assert_eq!(global_env.get("x"), Ok(Value::Number(1.0)));
    }
}
