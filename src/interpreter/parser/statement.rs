use std::iter::Peekable;

use crate::{
    ast::{Expr, Statement},
    error::ParseError,
    interpreter::{
        lexer::{Token, TokenKind},
        parser::{
            core::{ParseResult, Precedence, parse_expression},
            utils::{eat, expect, parse_identifier, peek_kind, peek_position},
        },
    },
};

/// Parses a single statement, including an optional trailing `;`.
///
/// A statement may be one of:
/// - a variable declaration (`var`),
/// - a `return` or `break`,
/// - a `delete` of an indexed element,
/// - an `enum` declaration,
/// - an assignment,
/// - an expression used as a statement.
///
/// # Parameters
/// - `tokens`: Token iterator positioned at the first token of the statement.
///
/// # Returns
/// A parsed [`Statement`] node.
pub fn parse_statement<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Statement>
    where I: Iterator<Item = &'a Token> + Clone
{
    let statement = match peek_kind(tokens) {
        TokenKind::Var => parse_var(tokens)?,
        TokenKind::Return => parse_return(tokens)?,
        TokenKind::Break => {
            let position = peek_position(tokens);
            tokens.next();
            Statement::Break { position }
        },
        TokenKind::Delete => parse_delete(tokens)?,
        TokenKind::Enum => parse_enum(tokens)?,
        _ => parse_expression_statement(tokens)?,
    };

    eat(tokens, TokenKind::Semicolon);
    Ok(statement)
}

/// Parses `var <identifier> = <expression>`.
///
/// Does not consume a trailing `;`, so `for` loop initializers can reuse it.
///
/// # Errors
/// Returns a `ParseError` if the name or `=` is missing, or the initializer
/// is malformed.
pub fn parse_var<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Statement>
    where I: Iterator<Item = &'a Token> + Clone
{
    let position = expect(tokens, TokenKind::Var)?.position();
    let name = parse_identifier(tokens)?;
    expect(tokens, TokenKind::Assign)?;
    let value = parse_expression(tokens, Precedence::Lowest)?;

    Ok(Statement::Var { name,
                        value,
                        position })
}

/// Parses an expression statement.
///
/// A top-level assignment expression becomes [`Statement::Assignment`];
/// everything else is wrapped in [`Statement::Expression`].
pub fn parse_expression_statement<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Statement>
    where I: Iterator<Item = &'a Token> + Clone
{
    let position = peek_position(tokens);
    let expr = parse_expression(tokens, Precedence::Lowest)?;

    Ok(match expr {
        Expr::Assign(assignment) => Statement::Assignment(assignment),
        expr => Statement::Expression { expr, position },
    })
}

/// Parses `return` with an optional value.
///
/// The value is absent when the keyword is directly followed by `;`, `}`, or
/// the end of input.
fn parse_return<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Statement>
    where I: Iterator<Item = &'a Token> + Clone
{
    let position = expect(tokens, TokenKind::Return)?.position();
    let value = match peek_kind(tokens) {
        TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof => None,
        _ => Some(parse_expression(tokens, Precedence::Lowest)?),
    };

    Ok(Statement::Return { value, position })
}

/// Parses `delete <container>[<key>]`.
///
/// # Errors
/// `InvalidDeleteTarget` if the operand is not an index expression.
fn parse_delete<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Statement>
    where I: Iterator<Item = &'a Token> + Clone
{
    let position = expect(tokens, TokenKind::Delete)?.position();
    let target = parse_expression(tokens, Precedence::Lowest)?;

    if !matches!(target, Expr::Index { .. }) {
        return Err(ParseError::InvalidDeleteTarget { target: target.to_string(),
                                                     position });
    }

    Ok(Statement::Delete { target, position })
}

/// Parses an enum declaration.
///
/// Syntax:
/// ```text
///     enum Name {
///         case A: <expression>;
///         case B: <expression>;
///     }
/// ```
/// Semicolons between branches are optional.
///
/// # Errors
/// `DuplicateEnumBranch` if a branch name repeats.
fn parse_enum<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Statement>
    where I: Iterator<Item = &'a Token> + Clone
{
    let position = expect(tokens, TokenKind::Enum)?.position();
    let name = parse_identifier(tokens)?;
    expect(tokens, TokenKind::LBrace)?;

    let mut branches: Vec<(String, Expr)> = Vec::new();
    while !eat(tokens, TokenKind::RBrace) {
        expect(tokens, TokenKind::Case)?;
        let branch_position = peek_position(tokens);
        let branch = parse_identifier(tokens)?;
        if branches.iter().any(|(existing, _)| *existing == branch) {
            return Err(ParseError::DuplicateEnumBranch { name,
                                                         branch,
                                                         position: branch_position });
        }
        expect(tokens, TokenKind::Colon)?;
        let value = parse_expression(tokens, Precedence::Lowest)?;
        eat(tokens, TokenKind::Semicolon);
        branches.push((branch, value));
    }

    Ok(Statement::Enum { name,
                         branches,
                         position })
}
