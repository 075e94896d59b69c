//! # ember
//!
//! ember is a small, dynamically typed scripting language with a tree-walking
//! interpreter. Source text is tokenized, parsed by a Pratt parser into a
//! syntax tree, and evaluated directly over that tree.
//!
//! The language has integers, floats, strings, booleans, null, arrays,
//! hashes, first-class closures, enums, and file imports. Errors raised by a
//! script are ordinary values that stop evaluation when they reach the top
//! level.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

use std::io::Write;

use crate::{
    config::Config,
    error::{Error, ParseErrors},
    interpreter::{
        evaluator::core::Evaluator,
        parser::core::parse_program,
        resolver::{Diagnostic, resolve},
        value::core::Value,
    },
};

/// Defines the structure of parsed code.
///
/// This module declares the `Statement` and `Expr` enums that represent the
/// syntactic structure of source code as a tree, together with the `Visitor`
/// trait every pass over the tree implements.
///
/// # Responsibilities
/// - Defines statement and expression types for all language constructs.
/// - Attaches source positions to nodes for error reporting.
/// - Renders nodes back to a canonical, fully parenthesized form.
pub mod ast;
/// Host configuration handed to the evaluator.
///
/// Script arguments, the import root, the call depth limit, the random seed,
/// and registered plugins.
pub mod config;
/// Provides unified error types for parsing and evaluation.
///
/// # Responsibilities
/// - Defines the positioned parse errors the parser accumulates.
/// - Defines the fatal runtime conditions that end a run.
/// - Combines both into the crate-level `Error`.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// This module ties together lexing, parsing, resolution, evaluation, and
/// the value model.
pub mod interpreter;
/// General utilities for numeric conversion, hashing, and stack growth.
pub mod util;

/// Parses and evaluates `source`, printing through standard output.
///
/// # Returns
/// The value of the program: the last statement's value, the value of a
/// top-level `return`, or the error value that stopped it.
///
/// # Errors
/// `Error::Parse` with every parse error if the source does not parse;
/// nothing is evaluated in that case. `Error::Runtime` if evaluation ends on
/// a fatal condition such as `exit` or exhausting the call depth.
///
/// # Examples
/// ```
/// use ember::{config::Config, interpreter::value::core::Value, run_source};
///
/// let value = run_source("var x = 2; x * 21", Config::default()).unwrap();
/// assert_eq!(value, Value::Integer(42));
///
/// // An unknown variable is an error value, not an `Err`.
/// let value = run_source("y + 1", Config::default()).unwrap();
/// assert!(value.is_error());
///
/// // Syntax errors are reported before anything runs.
/// assert!(run_source("var = 1;", Config::default()).is_err());
/// ```
pub fn run_source(source: &str, config: Config) -> Result<Value, Error> {
    run_with_output(source, config, Box::new(std::io::stdout()))
}

/// Like [`run_source`], with `puts` writing to `out`.
pub fn run_with_output(source: &str, config: Config, out: Box<dyn Write>) -> Result<Value, Error> {
    let (program, errors) = parse_program(source);
    if !errors.is_empty() {
        return Err(ParseErrors(errors).into());
    }

    let mut evaluator = Evaluator::with_output(config, out);
    Ok(evaluator.eval_program(&program)?)
}

/// Parses `source` and runs the resolver over it without evaluating.
///
/// # Errors
/// The parse errors, if any.
///
/// # Examples
/// ```
/// use ember::check_source;
///
/// let diagnostics = check_source("var a = a;").unwrap();
/// assert_eq!(diagnostics.len(), 1);
/// ```
pub fn check_source(source: &str) -> Result<Vec<Diagnostic>, ParseErrors> {
    let (program, errors) = parse_program(source);
    if !errors.is_empty() {
        return Err(ParseErrors(errors));
    }
    Ok(resolve(&program))
}
