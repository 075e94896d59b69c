use std::iter::Peekable;

use crate::{
    ast::Block,
    interpreter::{
        lexer::{Token, TokenKind},
        parser::{
            core::ParseResult,
            statement::parse_statement,
            utils::{eat, expect, peek_kind, skip_semicolons, unexpected},
        },
    },
};

/// Parses a block delimited by braces.
///
/// A block consists of zero or more statements, optionally separated by
/// semicolons. Parsing continues until the closing `}`.
///
/// Grammar: `block := "{" statement* "}"`
///
/// # Parameters
/// - `tokens`: Token stream positioned at the opening brace.
///
/// # Returns
/// The block, positioned at its opening brace.
///
/// # Errors
/// Returns a `ParseError` if the opening brace is missing, a statement fails
/// to parse, or the input ends before the closing brace.
pub fn parse_block<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Block>
    where I: Iterator<Item = &'a Token> + Clone
{
    let position = expect(tokens, TokenKind::LBrace)?.position();
    let mut statements = Vec::new();

    loop {
        skip_semicolons(tokens);
        if eat(tokens, TokenKind::RBrace) {
            break;
        }
        if peek_kind(tokens) == TokenKind::Eof {
            return Err(unexpected(tokens, TokenKind::RBrace));
        }
        statements.push(parse_statement(tokens)?);
    }

    Ok(Block { statements, position })
}
