//! Code to configure and run the interpreter on an input source code file.

use std::fs;

use clap::{Parser, ValueEnum};

use crate::lexical_analysis::run_lexical_analysis;
use crate::program_execution::{evaluate_program, EvalConfig, EvalError};
use crate::recursive_descent_parsing::{parse_recursive_descent, ParseError};

/// What the interpreter should print once it is done.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emit {
    /// The value of the last expression.
    Value,
    /// One line per token.
    Tokens,
    /// The parsed program.
    Ast,
}

/// Config for the interpreter. Instantiate via `InterpreterConfig::parse()`.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct InterpreterConfig {
    /// The input filepath to run on.
    #[arg(short, long)]
    pub src_filepath: String,

    /// Which stage's output to print.
    #[arg(short, long, value_enum, default_value_t = Emit::Value)]
    pub emit: Emit,

    /// Trace every function invocation to standard error.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Errors that may be thrown when running the interpreter.
#[derive(Debug)]
pub enum RunError {
    InputFileError(std::io::Error),
    ParseError(ParseError),
    EvalError(EvalError),
}

/// Display trait implementation for RunError.
impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InputFileError(io_err) => {
                return write!(f, "Input file error: {}", io_err);
            }

            Self::ParseError(parse_error) => {
                return write!(f, "Parse error: {}", parse_error);
            }

            Self::EvalError(eval_error) => {
                return write!(f, "Evaluation error: {}", eval_error);
            }
        }
    }
}

/// Type conversions for errors.
impl From<std::io::Error> for RunError {
    fn from(value: std::io::Error) -> Self {
        return Self::InputFileError(value);
    }
}

impl From<ParseError> for RunError {
    fn from(value: ParseError) -> Self {
        return Self::ParseError(value);
    }
}

impl From<EvalError> for RunError {
    fn from(value: EvalError) -> Self {
        return Self::EvalError(value);
    }
}

/// Runs the pipeline on `program_string` and renders the requested output.
pub fn run_source(
    program_string: &str,
    emit: Emit,
    eval_config: &EvalConfig,
) -> Result<String, RunError> {
    match emit {
        Emit::Tokens => {
            let tokens = run_lexical_analysis(program_string).map_err(ParseError::from)?;
            let lines: Vec<String> = tokens
                .iter()
                .map(|token| {
                    format!(
                        "{} {:?} {:?}",
                        token.position, token.token_class, token.token_text
                    )
                })
                .collect();
            return Ok(lines.join("\n"));
        }

        Emit::Ast => {
            let program = parse_recursive_descent(program_string)?;
            return Ok(program.to_string());
        }

        Emit::Value => {
            let program = parse_recursive_descent(program_string)?;
            let value = evaluate_program(&program, eval_config)?;
            return Ok(value.to_string());
        }
    }
}

/// Run the interpreter (i.e. the lexer, parser, and evaluator) given an
/// interpreter config, with the standard `add` and `print` bindings.
pub fn run_interpreter(config: &InterpreterConfig) -> Result<String, RunError> {
    // Read the input file into a string.
    let program_string = fs::read_to_string(&config.src_filepath)?;

    let eval_config = EvalConfig {
        verbose: config.verbose,
        ..EvalConfig::default()
    };

    return run_source(program_string.as_str(), config.emit, &eval_config);
}
