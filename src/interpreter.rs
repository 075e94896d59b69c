/// The environment module implements lexical scopes.
///
/// Scopes are shared, mutable records linked to their enclosing scope. Every
/// closure holds a handle to the scope it was created in, so assignments
/// through one handle are visible through all of them.
pub mod environment;
/// The evaluator module executes AST nodes and computes results.
///
/// The evaluator walks the tree, evaluates expressions and statements, and
/// produces values. Script errors are values that travel through the same
/// channel as ordinary results; only a few host-level conditions abort a run.
///
/// # Responsibilities
/// - Evaluates every node kind through a single `Visitor` implementation.
/// - Manages scopes, closures, control-flow signals, and imports.
/// - Hosts the builtin function registry.
pub mod evaluator;
/// The lexer module tokenizes source code for further parsing.
///
/// The lexer reads the raw source text and produces a stream of tokens for
/// literals, identifiers, keywords, operators, and delimiters, each with its
/// source position. Unrecognized input becomes an illegal token rather than
/// an error, so the parser can report it in context.
///
/// # Responsibilities
/// - Converts the input character stream into tokens with line and offset.
/// - Handles integer, hex, float, and string literals and comments.
/// - Always terminates the stream with an end-of-file token.
pub mod lexer;
/// The parser module builds the abstract syntax tree (AST) from tokens.
///
/// A Pratt parser: every token kind may have a prefix parse function and an
/// infix parse function, and a precedence table decides how far an
/// expression extends.
///
/// # Responsibilities
/// - Converts tokens into statements and expressions.
/// - Accumulates positioned errors and recovers at statement boundaries.
pub mod parser;
/// An advisory static pass over the tree.
///
/// Reports reads of a variable inside its own initializer. Evaluation does
/// not depend on it.
pub mod resolver;
/// The value module defines the runtime data types for evaluation.
///
/// # Responsibilities
/// - Defines the `Value` enum and all supported value variants.
/// - Implements truthiness, equality, hashing, copying, and rendering.
/// - Provides per-kind object methods and host plugins.
pub mod value;
