use std::iter::Peekable;

use crate::{
    ast::Position,
    error::ParseError,
    interpreter::{
        lexer::{Token, TokenKind},
        parser::core::ParseResult,
    },
};

/// Returns the kind of the next token without consuming it.
///
/// An exhausted stream reads as [`TokenKind::Eof`].
pub(in crate::interpreter::parser) fn peek_kind<'a, I>(tokens: &mut Peekable<I>) -> TokenKind
    where I: Iterator<Item = &'a Token>
{
    tokens.peek().map_or(TokenKind::Eof, |token| token.kind)
}

/// Returns the position of the next token without consuming it.
pub(in crate::interpreter::parser) fn peek_position<'a, I>(tokens: &mut Peekable<I>) -> Position
    where I: Iterator<Item = &'a Token>
{
    tokens.peek().map_or_else(Position::default, |token| token.position())
}

/// Consumes the next token if it has the given kind.
///
/// # Returns
/// `true` if a token was consumed.
pub(in crate::interpreter::parser) fn eat<'a, I>(tokens: &mut Peekable<I>, kind: TokenKind) -> bool
    where I: Iterator<Item = &'a Token>
{
    tokens.next_if(|token| token.kind == kind).is_some()
}

/// Consumes the next token, which must have the given kind.
///
/// The offending token is left in the stream on failure so that recovery can
/// see it.
///
/// # Errors
/// `UnexpectedToken` naming both kinds, or `IllegalToken` when the lexer
/// could not make sense of the input.
pub(in crate::interpreter::parser) fn expect<'a, I>(tokens: &mut Peekable<I>,
                                                    expected: TokenKind)
                                                    -> ParseResult<&'a Token>
    where I: Iterator<Item = &'a Token>
{
    if let Some(token) = tokens.next_if(|token| token.kind == expected) {
        return Ok(token);
    }
    Err(unexpected(tokens, expected))
}

/// Builds the error for a missing `expected` token.
pub(in crate::interpreter::parser) fn unexpected<'a, I>(tokens: &mut Peekable<I>,
                                                        expected: TokenKind)
                                                        -> ParseError
    where I: Iterator<Item = &'a Token>
{
    match tokens.peek() {
        Some(token) if token.kind == TokenKind::Illegal => {
            ParseError::IllegalToken { literal:  token.literal.clone(),
                                       position: token.position(), }
        },
        Some(token) => ParseError::UnexpectedToken { expected,
                                                     found: token.kind,
                                                     position: token.position() },
        None => ParseError::UnexpectedToken { expected,
                                              found: TokenKind::Eof,
                                              position: Position::default() },
    }
}

/// Parses a plain identifier and returns its name.
///
/// # Errors
/// Returns a `ParseError` if the next token is not an identifier.
pub(in crate::interpreter::parser) fn parse_identifier<'a, I>(tokens: &mut Peekable<I>)
                                                              -> ParseResult<String>
    where I: Iterator<Item = &'a Token>
{
    expect(tokens, TokenKind::Ident).map(|token| token.literal.clone())
}

/// Parses a comma-separated list of items until a closing token.
///
/// Shared by array literals, hash literals, argument lists, and parameter
/// lists. An immediately encountered closing token produces an empty list;
/// a trailing comma before the closing token is accepted.
///
/// Grammar (simplified): `list := item ("," item)* ","?`
///
/// # Parameters
/// - `tokens`: Token iterator positioned at the first item or closing token.
/// - `parse_item`: Function used to parse each list element.
/// - `closing`: The token kind that terminates the list.
///
/// # Returns
/// The parsed items. The closing token is consumed.
///
/// # Errors
/// Returns a `ParseError` if an item fails to parse or an element is followed
/// by anything other than `,` or the closing token.
pub(in crate::interpreter::parser) fn parse_comma_separated<'a, I, T>(
    tokens: &mut Peekable<I>,
    mut parse_item: impl FnMut(&mut Peekable<I>) -> ParseResult<T>,
    closing: TokenKind)
    -> ParseResult<Vec<T>>
    where I: Iterator<Item = &'a Token> + Clone
{
    let mut items = Vec::new();
    while !eat(tokens, closing) {
        items.push(parse_item(tokens)?);
        if !eat(tokens, TokenKind::Comma) {
            expect(tokens, closing)?;
            break;
        }
    }
    Ok(items)
}

/// Skips any number of `;` tokens.
pub(in crate::interpreter::parser) fn skip_semicolons<'a, I>(tokens: &mut Peekable<I>)
    where I: Iterator<Item = &'a Token>
{
    while eat(tokens, TokenKind::Semicolon) {}
}

/// Discards tokens after an error until a statement boundary.
///
/// Stops after the next `;`, or before the next `}` or the end of input.
pub(in crate::interpreter::parser) fn synchronize<'a, I>(tokens: &mut Peekable<I>)
    where I: Iterator<Item = &'a Token>
{
    loop {
        match peek_kind(tokens) {
            TokenKind::Semicolon => {
                tokens.next();
                return;
            },
            TokenKind::RBrace | TokenKind::Eof => return,
            _ => {
                tokens.next();
            },
        }
    }
}
