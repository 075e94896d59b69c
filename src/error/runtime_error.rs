use thiserror::Error;

/// Conditions that end evaluation immediately.
///
/// These travel on the `Err` side of `EvalResult`, bypassing the in-language
/// error values entirely.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Function calls nested deeper than the configured limit.
    #[error("stack overflow: maximum call depth of {depth} exceeded")]
    StackOverflow {
        /// The configured maximum depth.
        depth: usize,
    },
    /// The script called `exit`.
    #[error("program exited with status {code}")]
    Exit {
        /// The requested process status.
        code: i32,
    },
    /// Writing program output failed.
    #[error("failed to write program output: {0}")]
    Output(#[from] std::io::Error),
}
