use std::fmt;

use thiserror::Error;

use crate::{ast::Position, interpreter::lexer::TokenKind};

/// Represents all errors that can occur during parsing.
///
/// Every variant renders as `<description> at [Line: L, Offset: O]`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A specific token was required but another one was found.
    #[error("expected next token to be {expected}, got {found} instead at {position}")]
    UnexpectedToken {
        /// The token that was required.
        expected: TokenKind,
        /// The token actually encountered.
        found:    TokenKind,
        /// Where it was encountered.
        position: Position,
    },
    /// No expression can start with this token.
    #[error("no prefix parse function for {token} found at {position}")]
    NoPrefixParse {
        /// The offending token.
        token:    TokenKind,
        /// Where it was encountered.
        position: Position,
    },
    /// The lexer could not make sense of the input here.
    #[error("illegal token {literal} at {position}")]
    IllegalToken {
        /// The unrecognised text.
        literal:  String,
        /// Where it was encountered.
        position: Position,
    },
    /// An integer literal overflowed or was malformed.
    #[error("could not parse {literal} as integer at {position}")]
    InvalidInteger {
        /// The literal text.
        literal:  String,
        /// Where the literal starts.
        position: Position,
    },
    /// A float literal was malformed.
    #[error("could not parse {literal} as float at {position}")]
    InvalidFloat {
        /// The literal text.
        literal:  String,
        /// Where the literal starts.
        position: Position,
    },
    /// The same branch name appears twice in one enum.
    #[error("duplicate enum branch {name}::{branch} at {position}")]
    DuplicateEnumBranch {
        /// The enum's name.
        name:     String,
        /// The repeated branch.
        branch:   String,
        /// Position of the second occurrence.
        position: Position,
    },
    /// The left side of `=` is neither a name nor an index expression.
    #[error("invalid assignment target {target} at {position}")]
    InvalidAssignmentTarget {
        /// The rendered target expression.
        target:   String,
        /// Position of the assignment operator.
        position: Position,
    },
    /// `delete` was applied to something other than `a[i]`.
    #[error("delete expects an index expression, got {target} at {position}")]
    InvalidDeleteTarget {
        /// The rendered target expression.
        target:   String,
        /// Position of the `delete` keyword.
        position: Position,
    },
    /// An operator that needs a plain name got some other expression.
    #[error("{operator} expects an identifier, got {target} at {position}")]
    ExpectedIdentifier {
        /// The operator, e.g. `++` or `::`.
        operator: String,
        /// The rendered operand.
        target:   String,
        /// Position of the operator.
        position: Position,
    },
    /// A function parameter list is malformed.
    #[error("invalid parameter {parameter} at {position}")]
    InvalidParameter {
        /// The rendered parameter.
        parameter: String,
        /// Where it starts.
        position:  Position,
    },
    /// A required parameter follows one with a default value.
    #[error("required parameter {name} follows a defaulted parameter at {position}")]
    RequiredAfterDefault {
        /// The required parameter.
        name:     String,
        /// Where it starts.
        position: Position,
    },
}

impl ParseError {
    /// The source position the error refers to.
    #[must_use]
    pub const fn position(&self) -> Position {
        match self {
            Self::UnexpectedToken { position, .. }
            | Self::NoPrefixParse { position, .. }
            | Self::IllegalToken { position, .. }
            | Self::InvalidInteger { position, .. }
            | Self::InvalidFloat { position, .. }
            | Self::DuplicateEnumBranch { position, .. }
            | Self::InvalidAssignmentTarget { position, .. }
            | Self::InvalidDeleteTarget { position, .. }
            | Self::ExpectedIdentifier { position, .. }
            | Self::InvalidParameter { position, .. }
            | Self::RequiredAfterDefault { position, .. } => *position,
        }
    }
}

/// The full list of errors recorded for one source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrors(pub Vec<ParseError>);

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}
