//! Host functions seeded into the global scope before a program runs.

use std::fmt::Debug;
use std::rc::Rc;

use crate::program_execution::Value;

type PrimitiveFn = dyn Fn(&[Value]) -> Result<Value, String>;

/// A named host function callable from programs.
#[derive(Clone)]
pub struct Primitive {
    pub name: String,
    func: Rc<PrimitiveFn>,
}

impl Primitive {
    pub fn new<F>(name: &str, func: F) -> Primitive
    where
        F: Fn(&[Value]) -> Result<Value, String> + 'static,
    {
        return Primitive {
            name: String::from(name),
            func: Rc::new(func),
        };
    }

    pub fn call(&self, actual_args: &[Value]) -> Result<Value, String> {
        return (self.func)(actual_args);
    }

    pub fn same_function(&self, other: &Primitive) -> bool {
        return Rc::ptr_eq(&self.func, &other.func);
    }
}

impl Debug for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return f.debug_struct("Primitive").field("name", &self.name).finish();
    }
}

/// The initial bindings of the global scope, in installation order.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    entries: Vec<(String, Value)>,
}

impl Bindings {
    pub fn empty() -> Bindings {
        return Bindings::default();
    }

    /// `add` plus a `print` that writes to standard output.
    pub fn standard() -> Bindings {
        let mut bindings = Bindings::empty();
        bindings.define_primitive(add());
        bindings.define_primitive(print_with(|line| println!("{}", line)));
        return bindings;
    }

    /// Adds a binding, replacing any earlier one with the same name.
    pub fn define(&mut self, name: &str, value: Value) {
        self.entries.retain(|(existing_name, _)| existing_name != name);
        self.entries.push((String::from(name), value));
    }

    pub fn define_primitive(&mut self, primitive: Primitive) {
        let name = primitive.name.clone();
        self.define(&name, Value::Primitive(primitive));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        return self
            .entries
            .iter()
            .map(|(name, value)| (name.as_str(), value));
    }
}

/// Binary numeric addition.
pub fn add() -> Primitive {
    return Primitive::new("add", |actual_args| match actual_args {
        [Value::Number(a), Value::Number(b)] => Ok(Value::Number(a + b)),
        [_, _] => Err(String::from("expects two numbers")),
        _ => Err(format!(
            "expects 2 arguments, received {}",
            actual_args.len()
        )),
    });
}

/// Display routine: hands the space-separated display form of its arguments
/// to `emit` and returns its first argument.
pub fn print_with<E>(emit: E) -> Primitive
where
    E: Fn(&str) + 'static,
{
    return Primitive::new("print", move |actual_args| {
        let rendered: Vec<String> = actual_args.iter().map(|value| value.to_string()).collect();
        emit(rendered.join(" ").as_str());

        return Ok(actual_args.first().cloned().unwrap_or(Value::False));
    });
}
