//! Data structures to represent parsed programs, and their display form.

use std::fmt::Display;
use std::rc::Rc;

use crate::character_source::Position;

/// A reference to a name, remembered with where it was written.
#[derive(Debug, PartialEq, Clone)]
pub struct Variable {
    pub var_name: String,
    pub position: Position,
}

/// A lambda: its formal parameters and single body expression.
///
/// Held behind an `Rc` in the tree so that closures can keep the definition
/// alive independently of the `Program` it was parsed into.
#[derive(Debug, PartialEq)]
pub struct FnDef {
    pub formal_params: Vec<String>,
    pub fn_body: ExprNode,
}

/// Represents an expression.
#[derive(Debug, PartialEq, Clone)]
pub enum ExprNode {
    Number {
        value: f64,
    },
    Var(Variable),
    FnDef(Rc<FnDef>),
    FnApp {
        callee: Box<ExprNode>,
        actual_args: Vec<ExprNode>,
    },
    Assign {
        target: Variable,
        value: Box<ExprNode>,
    },
}

/// Represents a whole program: the top-level expressions in source order.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Program {
    pub body: Vec<ExprNode>,
}

impl Display for FnDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "λ")?;

        for (idx, formal_param) in self.formal_params.iter().enumerate() {
            if idx > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", formal_param)?;
        }

        return write!(f, ". {}", self.fn_body);
    }
}

impl Display for ExprNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExprNode::Number { value } => {
                return write!(f, "{}", value);
            }

            ExprNode::Var(variable) => {
                return write!(f, "{}", variable.var_name);
            }

            ExprNode::FnDef(fn_def) => {
                return write!(f, "{}", fn_def);
            }

            // Applications are always parenthesized in the surface syntax.
            ExprNode::FnApp {
                callee,
                actual_args,
            } => {
                write!(f, "({}", callee)?;
                for actual_arg in actual_args {
                    write!(f, " {}", actual_arg)?;
                }
                return write!(f, ")");
            }

            ExprNode::Assign { target, value } => {
                return write!(f, "{} = {}", target.var_name, value);
            }
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let statements: Vec<String> = self.body.iter().map(|expr| expr.to_string()).collect();
        return write!(f, "{}", statements.join(";\n"));
    }
}
