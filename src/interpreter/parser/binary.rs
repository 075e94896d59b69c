use std::iter::Peekable;

use crate::{
    ast::{Assignment, Expr, InfixOperator, PostfixOperator, Position},
    error::ParseError,
    interpreter::{
        lexer::{Token, TokenKind},
        parser::{
            core::{ParseResult, Precedence, parse_expression},
            utils::{expect, parse_comma_separated, parse_identifier},
        },
    },
};

/// Extends `left` with the infix construct that starts at the next token.
///
/// Called by the Pratt loop only when the next token has an infix
/// precedence, so every kind reaching the final arm is a bug in the table.
///
/// # Parameters
/// - `tokens`: Token stream positioned at the operator.
/// - `left`: The already parsed left operand.
///
/// # Returns
/// The combined expression.
pub fn parse_infix<'a, I>(tokens: &mut Peekable<I>, left: Expr) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Token> + Clone
{
    let Some(token) = tokens.next() else {
        return Ok(left);
    };
    let position = token.position();
    let precedence = Precedence::of(token.kind);

    if let Some(op) = token_to_infix_operator(token.kind) {
        let right = parse_expression(tokens, precedence.right_operand())?;
        return Ok(Expr::Infix { left: Box::new(left),
                                op,
                                right: Box::new(right),
                                position });
    }

    match token.kind {
        TokenKind::Assign
        | TokenKind::PlusAssign
        | TokenKind::MinusAssign
        | TokenKind::StarAssign
        | TokenKind::SlashAssign => parse_assignment(tokens, left, token.kind, position),
        TokenKind::Question => {
            let consequence = parse_expression(tokens, Precedence::Lowest)?;
            expect(tokens, TokenKind::Colon)?;
            let alternative = parse_expression(tokens, precedence.right_operand())?;
            Ok(Expr::Ternary { condition: Box::new(left),
                               consequence: Box::new(consequence),
                               alternative: Box::new(alternative),
                               position })
        },
        TokenKind::Elvis => {
            let right = parse_expression(tokens, precedence.right_operand())?;
            Ok(Expr::Elvis { left: Box::new(left),
                             right: Box::new(right),
                             position })
        },
        TokenKind::Increment | TokenKind::Decrement => {
            let op = if token.kind == TokenKind::Increment {
                PostfixOperator::Increment
            } else {
                PostfixOperator::Decrement
            };
            let name = require_identifier(left, &op.to_string(), position)?;
            Ok(Expr::Postfix { op, name, position })
        },
        TokenKind::LParen => {
            let arguments = parse_arguments(tokens)?;
            Ok(Expr::Call { function: Box::new(left),
                            arguments,
                            position })
        },
        TokenKind::LBracket => {
            let index = parse_expression(tokens, Precedence::Lowest)?;
            expect(tokens, TokenKind::RBracket)?;
            Ok(Expr::Index { left: Box::new(left),
                             index: Box::new(index),
                             position })
        },
        TokenKind::Dot => {
            let method = parse_identifier(tokens)?;
            expect(tokens, TokenKind::LParen)?;
            let arguments = parse_arguments(tokens)?;
            Ok(Expr::MethodCall { receiver: Box::new(left),
                                  method,
                                  arguments,
                                  position })
        },
        TokenKind::DoubleColon => {
            let name = require_identifier(left, "::", position)?;
            let branch = parse_identifier(tokens)?;
            Ok(Expr::ScopeAccess { name,
                                   branch,
                                   position })
        },
        kind => Err(ParseError::NoPrefixParse { token: kind, position }),
    }
}

/// Maps a token to the binary operator it denotes, if any.
///
/// Assignment forms are not included: they build [`Expr::Assign`] nodes.
#[must_use]
pub const fn token_to_infix_operator(kind: TokenKind) -> Option<InfixOperator> {
    use InfixOperator as Op;

    Some(match kind {
        TokenKind::Plus => Op::Add,
        TokenKind::Minus => Op::Sub,
        TokenKind::Star => Op::Mul,
        TokenKind::Slash => Op::Div,
        TokenKind::Percent => Op::Mod,
        TokenKind::StarStar => Op::Pow,
        TokenKind::Less => Op::Less,
        TokenKind::Greater => Op::Greater,
        TokenKind::LessEqual => Op::LessEqual,
        TokenKind::GreaterEqual => Op::GreaterEqual,
        TokenKind::Equal => Op::Equal,
        TokenKind::NotEqual => Op::NotEqual,
        TokenKind::And => Op::And,
        TokenKind::Or => Op::Or,
        _ => return None,
    })
}

/// Parses the right side of `=` or a compound assignment.
///
/// The target must be a plain name or an index expression. Assignment is
/// right associative: `a = b = 1` assigns `1` to `b`, then to `a`.
///
/// # Errors
/// `InvalidAssignmentTarget` for any other left side.
fn parse_assignment<'a, I>(tokens: &mut Peekable<I>,
                           target: Expr,
                           kind: TokenKind,
                           position: Position)
                           -> ParseResult<Expr>
    where I: Iterator<Item = &'a Token> + Clone
{
    if !matches!(target, Expr::Identifier { .. } | Expr::Index { .. }) {
        return Err(ParseError::InvalidAssignmentTarget { target: target.to_string(),
                                                         position });
    }

    let op = match kind {
        TokenKind::PlusAssign => Some(InfixOperator::Add),
        TokenKind::MinusAssign => Some(InfixOperator::Sub),
        TokenKind::StarAssign => Some(InfixOperator::Mul),
        TokenKind::SlashAssign => Some(InfixOperator::Div),
        _ => None,
    };

    let value = parse_expression(tokens, Precedence::Assign.right_operand())?;

    Ok(Expr::Assign(Assignment { target: Box::new(target),
                                 op,
                                 value: Box::new(value),
                                 position }))
}

/// Parses call arguments after the opening `(`.
fn parse_arguments<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Vec<Expr>>
    where I: Iterator<Item = &'a Token> + Clone
{
    parse_comma_separated(tokens, |t| parse_expression(t, Precedence::Lowest), TokenKind::RParen)
}

/// Unwraps the name of an identifier operand.
///
/// # Errors
/// `ExpectedIdentifier` if `expr` is anything else.
fn require_identifier(expr: Expr, operator: &str, position: Position) -> ParseResult<String> {
    match expr {
        Expr::Identifier { name, .. } => Ok(name),
        other => Err(ParseError::ExpectedIdentifier { operator: operator.to_string(),
                                                      target: other.to_string(),
                                                      position }),
    }
}
