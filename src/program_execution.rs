//! Executes parsed programs by walking the tree against a chain of scopes.

use std::fmt::{Debug, Display};
use std::rc::Rc;

use crate::character_source::Position;
use crate::primitives::{Bindings, Primitive};
use crate::program_representation::{ExprNode, FnDef, Program};
use crate::scope_environment::Environment;
use crate::MAX_EVAL_DEPTH;

/// A lambda together with the scope it was defined in.
#[derive(Clone)]
pub struct Closure {
    pub fn_def: Rc<FnDef>,
    pub env: Rc<Environment>,
}

impl Debug for Closure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return f
            .debug_struct("Closure")
            .field("fn_def", &self.fn_def)
            .finish_non_exhaustive();
    }
}

/// Runtime values.
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    /// Bound to missing arguments, and the result of an empty program.
    False,
    Closure(Closure),
    Primitive(Primitive),
}

// Functions compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => return a == b,
            (Value::False, Value::False) => return true,
            (Value::Closure(a), Value::Closure(b)) => {
                return Rc::ptr_eq(&a.fn_def, &b.fn_def) && Rc::ptr_eq(&a.env, &b.env);
            }
            (Value::Primitive(a), Value::Primitive(b)) => return a.same_function(b),
            _ => return false,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(value) => return write!(f, "{}", value),
            Value::False => return write!(f, "false"),
            Value::Closure(closure) => return write!(f, "{}", closure.fn_def),
            Value::Primitive(primitive) => return write!(f, "<primitive {}>", primitive.name),
        }
    }
}

/// Errors raised while executing a program.
#[derive(Debug, PartialEq, Clone)]
pub enum EvalError {
    UndefinedVariable {
        var_name: String,
        position: Position,
    },
    InvalidInvocation {
        callee: String,
        position: Option<Position>,
    },
    PrimitiveFailed {
        name: String,
        message: String,
        position: Option<Position>,
    },
    RecursionLimit {
        position: Option<Position>,
    },
}

fn fmt_position(position: &Option<Position>) -> String {
    match position {
        Some(position) => return format!(" {}", position),
        None => return String::new(),
    }
}

/// Display trait implementation for EvalError.
impl Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UndefinedVariable { var_name, position } => {
                return write!(f, "Undefined variable {} {}", var_name, position);
            }

            Self::InvalidInvocation { callee, position } => {
                return write!(
                    f,
                    "Cannot invoke non-function value {}{}",
                    callee,
                    fmt_position(position)
                );
            }

            Self::PrimitiveFailed {
                name,
                message,
                position,
            } => {
                return write!(f, "{} {}{}", name, message, fmt_position(position));
            }

            Self::RecursionLimit { position } => {
                return write!(
                    f,
                    "Evaluation nested more than {} levels deep{}",
                    MAX_EVAL_DEPTH,
                    fmt_position(position)
                );
            }
        }
    }
}

/// Configuration for a single evaluation run.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// Installed into the global scope before the program starts.
    pub bindings: Bindings,
    /// Trace every invocation to standard error.
    pub verbose: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        return EvalConfig {
            bindings: Bindings::standard(),
            verbose: false,
        };
    }
}

fn expr_position(expr: &ExprNode) -> Option<Position> {
    match expr {
        ExprNode::Var(variable) => return Some(variable.position),
        ExprNode::Assign { target, .. } => return Some(target.position),
        ExprNode::FnApp { callee, .. } => return expr_position(callee),
        _ => return None,
    }
}

struct Evaluator {
    verbose: bool,
}

impl Evaluator {
    // `depth` counts enclosing expressions plus closure calls in progress.
    fn eval_expr(
        &self,
        expr: &ExprNode,
        env: &Rc<Environment>,
        depth: usize,
    ) -> Result<Value, EvalError> {
        if depth >= MAX_EVAL_DEPTH {
            return Err(EvalError::RecursionLimit {
                position: expr_position(expr),
            });
        }

        match expr {
            ExprNode::Number { value } => {
                return Ok(Value::Number(*value));
            }

            ExprNode::Var(variable) => {
                return env
                    .get(&variable.var_name)
                    .map_err(|undefined| EvalError::UndefinedVariable {
                        var_name: undefined.var_name,
                        position: variable.position,
                    });
            }

            ExprNode::Assign { target, value } => {
                let value = self.eval_expr(value, env, depth + 1)?;

                return env
                    .set(&target.var_name, value)
                    .map_err(|undefined| EvalError::UndefinedVariable {
                        var_name: undefined.var_name,
                        position: target.position,
                    });
            }

            // The body is not evaluated until the closure is applied.
            ExprNode::FnDef(fn_def) => {
                return Ok(Value::Closure(Closure {
                    fn_def: Rc::clone(fn_def),
                    env: Rc::clone(env),
                }));
            }

            ExprNode::FnApp {
                callee,
                actual_args,
            } => {
                let callee_value = self.eval_expr(callee, env, depth + 1)?;

                let mut arg_values = Vec::with_capacity(actual_args.len());
                for actual_arg in actual_args {
                    arg_values.push(self.eval_expr(actual_arg, env, depth + 1)?);
                }

                return self.apply(callee_value, arg_values, expr_position(callee), depth + 1);
            }
        }
    }

    fn apply(
        &self,
        callee_value: Value,
        arg_values: Vec<Value>,
        position: Option<Position>,
        depth: usize,
    ) -> Result<Value, EvalError> {
        if self.verbose {
            let rendered: Vec<String> = arg_values.iter().map(|value| value.to_string()).collect();
            eprintln!("Applying {} to [{}]", callee_value, rendered.join(", "));
        }

        match callee_value {
            Value::Closure(closure) => {
                let call_env = closure.env.extend();

                // Missing arguments are bound to False, surplus ones dropped.
                let mut arg_values = arg_values.into_iter();
                for formal_param in &closure.fn_def.formal_params {
                    call_env.def(formal_param, arg_values.next().unwrap_or(Value::False));
                }

                let result = self.eval_expr(&closure.fn_def.fn_body, &call_env, depth)?;

                if self.verbose {
                    eprintln!("Returned {}", result);
                }

                return Ok(result);
            }

            Value::Primitive(primitive) => {
                return primitive
                    .call(&arg_values)
                    .map_err(|message| EvalError::PrimitiveFailed {
                        name: primitive.name.clone(),
                        message,
                        position,
                    });
            }

            other => {
                return Err(EvalError::InvalidInvocation {
                    callee: other.to_string(),
                    position,
                });
            }
        }
    }
}

/// Execute every expression of `program` in order against `env`. Returns
/// the value of the last one, or `Value::False` for an empty program.
pub fn execute_program(
    program: &Program,
    env: &Rc<Environment>,
    verbose: bool,
) -> Result<Value, EvalError> {
    let evaluator = Evaluator { verbose };
    let mut result = Value::False;

    for expr in &program.body {
        result = evaluator.eval_expr(expr, env, 0)?;
    }

    return Ok(result);
}

/// Builds a fresh global scope from `config.bindings` and executes `program`
/// in it.
pub fn evaluate_program(program: &Program, config: &EvalConfig) -> Result<Value, EvalError> {
    let global_env = Environment::new_root();

    for (name, value) in config.bindings.iter() {
        global_env.def(name, value.clone());
    }

    return execute_program(program, &global_env, config.verbose);
}
