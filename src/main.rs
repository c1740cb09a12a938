//! Run a given lambda calculus program and print the result to standard
//! output.
//!
//! Example usage:
//!
//!     cargo run -- \
//!         --src-filepath test_programs/curried_add.lc

use std::process::ExitCode;

use clap::Parser;
use lambda_scope::end_to_end::{run_interpreter, InterpreterConfig};

fn main() -> ExitCode {
    let interpreter_config = InterpreterConfig::parse();

    let interpreter_result = run_interpreter(&interpreter_config);

    match interpreter_result {
        Ok(execution_result) => {
            println!("{}", execution_result);
            return ExitCode::SUCCESS;
        }

        Err(run_error) => {
            eprintln!("{}", run_error);
            return ExitCode::FAILURE;
        }
    }
}
