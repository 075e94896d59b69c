/// Binary operator evaluation logic.
///
/// Handles arithmetic with integer/float coercion, comparisons, string
/// concatenation, equality across kinds, and the eager logical operators.
pub mod binary;

/// Unary operator evaluation logic.
///
/// Implements prefix negation and logical NOT, and the postfix increment and
/// decrement of variables.
pub mod unary;

/// Core evaluation logic.
///
/// Contains the evaluator itself, its visitor implementation, and the
/// handling of blocks, scopes, and control-flow signals.
pub mod core;

/// Statement evaluation.
///
/// Variable declarations, assignments, `return`, `break`, `delete`, and enum
/// declarations.
pub mod statement;

/// Index reads and writes on arrays and hashes.
pub mod index;

/// Evaluation of for-loop expressions.
///
/// Manages the loop scope, the condition and update clauses, and the `break`
/// and `return` signals raised by the body.
pub mod for_loop;

/// Evaluation of `import` expressions.
pub mod import;

/// Utility functions for evaluation.
///
/// Provides helpers and reusable routines shared by evaluation logic.
pub mod utils;

/// Function evaluation.
///
/// Handles user-defined and built-in function calls, argument checking, and
/// return value computation.
pub mod function;
