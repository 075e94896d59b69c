/// Core parsing logic.
///
/// Contains the program entry point, the precedence table, the Pratt loop,
/// and error recovery.
pub mod core;

/// Prefix parse functions.
///
/// Literals, grouping, prefix operators, and the keyword-led expressions:
/// `if`, `for`, `function`, and `import`.
pub mod unary;

/// Infix parse functions.
///
/// Binary operators, assignment, the ternary and elvis operators, postfix
/// updates, calls, indexing, method calls, and enum scope access.
pub mod binary;

/// Block parsing.
///
/// Parses brace-delimited statement sequences used by function bodies,
/// conditionals, and loops.
pub mod block;

/// Statement parsing.
///
/// `var`, `return`, `break`, `delete`, `enum`, assignments, and expression
/// statements.
pub mod statement;

/// Utility functions for the parser.
///
/// Token inspection, expectation helpers, and comma-separated lists.
pub mod utils;
