//! This crate contains a front-end and tree-walking evaluator for a small
//! lambda-calculus dialect with numbers, closures and lexical assignment.

pub mod character_source;
pub mod end_to_end;
pub mod lexical_analysis;
pub mod primitives;
pub mod program_execution;
pub mod program_representation;
pub mod recursive_descent_parsing;
pub mod scope_environment;

/// Maximum nesting of lambdas and applications the parser accepts. Deeper
/// input is rejected with `ParseError::NestingTooDeep` instead of exhausting
/// the stack.
pub const MAX_PARSE_DEPTH: usize = 256;

/// Maximum depth of nested evaluation, counting both nested expressions and
/// closure calls. Must stay above `MAX_PARSE_DEPTH` so that any program that
/// parses can evaluate its own nesting.
pub const MAX_EVAL_DEPTH: usize = 384;
