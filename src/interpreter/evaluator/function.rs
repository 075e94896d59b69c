/// Builtin function implementations.
///
/// The native functions every program can call without defining them:
/// collection helpers, output, time, randomness, process access, plugins.
pub mod builtin;

/// Function call evaluation.
///
/// Contains the builtin registry, arity checking, and the application of
/// user-defined closures.
pub mod core;
