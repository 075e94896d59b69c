use std::{iter::Peekable, rc::Rc};

use crate::{
    ast::{Block, Expr, FunctionLiteral, Parameter, Position, PrefixOperator, Statement},
    error::ParseError,
    interpreter::{
        lexer::{Token, TokenKind},
        parser::{
            block::parse_block,
            core::{ParseResult, Precedence, parse_expression},
            statement::{parse_expression_statement, parse_var},
            utils::{eat, expect, parse_comma_separated, peek_kind, peek_position},
        },
    },
};

/// Parses the expression that starts at the next token.
///
/// Dispatches on the token kind: literals, identifiers, prefix operators,
/// grouping, array and hash literals, and the keyword-led expressions.
///
/// The token is left in the stream when no expression can start with it, so
/// that error recovery can decide how far to skip.
///
/// # Errors
/// - `NoPrefixParse` if no expression can start with the next token.
/// - `IllegalToken` for input the lexer could not recognise.
/// - Any error from the sub-parsers.
pub fn parse_prefix<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Token> + Clone
{
    let Some(&token) = tokens.peek() else {
        return Err(ParseError::NoPrefixParse { token:    TokenKind::Eof,
                                               position: peek_position(tokens), });
    };
    let position = token.position();

    let expr = match token.kind {
        TokenKind::Illegal => {
            return Err(ParseError::IllegalToken { literal: token.literal.clone(),
                                                  position });
        },
        TokenKind::Int => Expr::Integer { value: parse_integer(token)?,
                                          position },
        TokenKind::Float => Expr::Float { value: parse_float(token)?,
                                          position },
        TokenKind::Str => Expr::Str { value: token.literal.clone(),
                                      position },
        TokenKind::True | TokenKind::False => Expr::Boolean { value: token.kind == TokenKind::True,
                                                              position },
        TokenKind::Null => Expr::Null { position },
        TokenKind::Ident => Expr::Identifier { name: token.literal.clone(),
                                               position },
        TokenKind::Minus | TokenKind::Bang => {
            tokens.next();
            let op = if token.kind == TokenKind::Minus {
                PrefixOperator::Negate
            } else {
                PrefixOperator::Not
            };
            let right = parse_expression(tokens, Precedence::Prefix)?;
            return Ok(Expr::Prefix { op,
                                     right: Box::new(right),
                                     position });
        },
        TokenKind::LParen => {
            tokens.next();
            let expr = parse_expression(tokens, Precedence::Lowest)?;
            expect(tokens, TokenKind::RParen)?;
            return Ok(expr);
        },
        TokenKind::LBracket => {
            tokens.next();
            let elements = parse_comma_separated(tokens,
                                                 |t| parse_expression(t, Precedence::Lowest),
                                                 TokenKind::RBracket)?;
            return Ok(Expr::Array { elements, position });
        },
        TokenKind::LBrace => {
            tokens.next();
            return parse_hash_literal(tokens, position);
        },
        TokenKind::If => {
            tokens.next();
            return parse_if(tokens, position);
        },
        TokenKind::For => {
            tokens.next();
            return parse_for(tokens, position);
        },
        TokenKind::Function => {
            tokens.next();
            return parse_function_literal(tokens, position);
        },
        TokenKind::Import => {
            tokens.next();
            let path = parse_expression(tokens, Precedence::Prefix)?;
            return Ok(Expr::Import { path: Box::new(path),
                                     position });
        },
        kind => return Err(ParseError::NoPrefixParse { token: kind, position }),
    };

    tokens.next();
    Ok(expr)
}

/// Converts an integer literal, decimal or `0x` hexadecimal.
fn parse_integer(token: &Token) -> ParseResult<i64> {
    let literal = token.literal.as_str();
    let parsed = match literal.strip_prefix("0x").or_else(|| literal.strip_prefix("0X")) {
        Some(digits) => i64::from_str_radix(digits, 16),
        None => literal.parse(),
    };
    parsed.map_err(|_| ParseError::InvalidInteger { literal:  token.literal.clone(),
                                                    position: token.position(), })
}

/// Converts a float literal. Literals that overflow to infinity are rejected.
fn parse_float(token: &Token) -> ParseResult<f64> {
    token.literal
         .parse::<f64>()
         .ok()
         .filter(|value| value.is_finite())
         .ok_or_else(|| ParseError::InvalidFloat { literal:  token.literal.clone(),
                                                   position: token.position(), })
}

/// Parses the pairs of a hash literal after its opening `{`.
///
/// Grammar: `hash := "{" (expression ":" expression ("," expression ":"
/// expression)*)? "}"`
fn parse_hash_literal<'a, I>(tokens: &mut Peekable<I>, position: Position)
                             -> ParseResult<Expr>
    where I: Iterator<Item = &'a Token> + Clone
{
    let pairs = parse_comma_separated(tokens,
                                      |t| {
                                          let key = parse_expression(t, Precedence::Lowest)?;
                                          expect(t, TokenKind::Colon)?;
                                          let value = parse_expression(t, Precedence::Lowest)?;
                                          Ok((key, value))
                                      },
                                      TokenKind::RBrace)?;
    Ok(Expr::Hash { pairs, position })
}

/// Parses an `if` expression with optional `else` and chained `else if`.
///
/// Syntax:
/// ```text
///     if <condition> { ... }
///     else if <condition> { ... }
///     else { ... }
/// ```
/// Parentheses around the condition are ordinary grouping. A chained
/// `else if` is stored as an alternative block holding the nested `if`.
///
/// # Parameters
/// - `tokens`: Token stream positioned after the `if` keyword.
/// - `position`: Position of the `if` token.
///
/// # Returns
/// An `Expr::If` node representing the full conditional expression.
pub fn parse_if<'a, I>(tokens: &mut Peekable<I>, position: Position) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Token> + Clone
{
    let condition = parse_expression(tokens, Precedence::Lowest)?;
    let consequence = parse_block(tokens)?;

    let alternative = if eat(tokens, TokenKind::Else) {
        if peek_kind(tokens) == TokenKind::If {
            let nested_position = peek_position(tokens);
            tokens.next();
            let nested = parse_if(tokens, nested_position)?;
            Some(Block { statements: vec![Statement::Expression { expr:     nested,
                                                                  position: nested_position, }],
                         position:   nested_position, })
        } else {
            Some(parse_block(tokens)?)
        }
    } else {
        None
    };

    Ok(Expr::If { condition: Box::new(condition),
                  consequence,
                  alternative,
                  position })
}

/// Parses a C-style `for` loop.
///
/// Syntax: `for (<init>; <condition>; <update>) { ... }`, where each of the
/// three clauses may be empty. The initializer is a `var` declaration or an
/// expression.
fn parse_for<'a, I>(tokens: &mut Peekable<I>, position: Position) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Token> + Clone
{
    expect(tokens, TokenKind::LParen)?;

    let initializer = match peek_kind(tokens) {
        TokenKind::Semicolon => None,
        TokenKind::Var => Some(Box::new(parse_var(tokens)?)),
        _ => Some(Box::new(parse_expression_statement(tokens)?)),
    };
    expect(tokens, TokenKind::Semicolon)?;

    let condition = match peek_kind(tokens) {
        TokenKind::Semicolon => None,
        _ => Some(Box::new(parse_expression(tokens, Precedence::Lowest)?)),
    };
    expect(tokens, TokenKind::Semicolon)?;

    let update = match peek_kind(tokens) {
        TokenKind::RParen => None,
        _ => Some(Box::new(parse_expression(tokens, Precedence::Lowest)?)),
    };
    expect(tokens, TokenKind::RParen)?;

    let body = parse_block(tokens)?;

    Ok(Expr::For { initializer,
                   condition,
                   update,
                   body,
                   position })
}

/// Parses a function literal after the `function` keyword.
///
/// Syntax: `function [name](a, b = default, ...) { ... }`. Once a parameter
/// has a default, every following parameter must have one too.
///
/// # Errors
/// - `InvalidParameter` if a parameter is not an identifier.
/// - `RequiredAfterDefault` if a required parameter follows a defaulted one.
fn parse_function_literal<'a, I>(tokens: &mut Peekable<I>, position: Position)
                                 -> ParseResult<Expr>
    where I: Iterator<Item = &'a Token> + Clone
{
    let name = tokens.next_if(|token| token.kind == TokenKind::Ident)
                     .map(|token| token.literal.clone());

    expect(tokens, TokenKind::LParen)?;
    let parameters = parse_comma_separated(tokens, parse_parameter, TokenKind::RParen)?;

    let mut seen_default = false;
    for parameter in &parameters {
        match parameter {
            (Parameter::Defaulted { .. }, _) => seen_default = true,
            (Parameter::Required(name), position) if seen_default => {
                return Err(ParseError::RequiredAfterDefault { name:     name.clone(),
                                                              position: *position, });
            },
            _ => {},
        }
    }

    let body = parse_block(tokens)?;
    let parameters = parameters.into_iter().map(|(parameter, _)| parameter).collect();

    Ok(Expr::Function { literal: Rc::new(FunctionLiteral { name,
                                                           parameters,
                                                           body }),
                        position })
}

/// Parses one parameter, remembering where it starts.
fn parse_parameter<'a, I>(tokens: &mut Peekable<I>)
                          -> ParseResult<(Parameter, Position)>
    where I: Iterator<Item = &'a Token> + Clone
{
    let position = peek_position(tokens);
    let Some(token) = tokens.next_if(|token| token.kind == TokenKind::Ident) else {
        let parameter = tokens.peek()
                              .map_or_else(|| TokenKind::Eof.to_string(), |t| t.literal.clone());
        return Err(ParseError::InvalidParameter { parameter, position });
    };
    let name = token.literal.clone();

    if eat(tokens, TokenKind::Assign) {
        let default = parse_expression(tokens, Precedence::Assign)?;
        return Ok((Parameter::Defaulted { name, default }, position));
    }
    Ok((Parameter::Required(name), position))
}
