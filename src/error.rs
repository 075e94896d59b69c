/// Parsing errors.
///
/// Defines every error the parser can record while building the tree. Parse
/// errors accumulate; the parser keeps going after each one.
pub mod parse_error;
/// Host-level evaluation failures.
///
/// Errors inside a script are ordinary values (`Value::Error`). The types here
/// are the few conditions that end a run outright, such as exhausting the call
/// depth or the script calling `exit`.
pub mod runtime_error;

pub use parse_error::{ParseError, ParseErrors};
pub use runtime_error::RuntimeError;
use thiserror::Error;

/// Any failure that stops a run before a result value is produced.
#[derive(Debug, Error)]
pub enum Error {
    /// The source did not parse; evaluation never started.
    #[error(transparent)]
    Parse(#[from] ParseErrors),
    /// Evaluation stopped on a fatal condition.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
