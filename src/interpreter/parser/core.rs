use std::iter::Peekable;

use tracing::debug;

use crate::{
    ast::{Expr, Program},
    error::ParseError,
    interpreter::{
        lexer::{Token, TokenKind, tokenize},
        parser::{
            binary::parse_infix,
            statement::parse_statement,
            unary::parse_prefix,
            utils::{peek_kind, skip_semicolons, synchronize},
        },
    },
    util::stack::ensure_sufficient_stack,
};

pub type ParseResult<T> = Result<T, ParseError>;

/// Binding power of an operator token, lowest first.
///
/// An infix operator continues the current expression only while its
/// precedence is strictly greater than the level the caller is parsing at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    /// `= += -= *= /=`, right associative.
    Assign,
    /// `? :` and `?:`, right associative.
    Ternary,
    LogicalOr,
    LogicalAnd,
    Equals,
    LessGreater,
    Sum,
    Product,
    /// `**`, right associative.
    Power,
    Prefix,
    Postfix,
    /// `(`, `.`, `::`
    Call,
    Index,
}

impl Precedence {
    /// The precedence of `kind` in infix position.
    #[must_use]
    pub const fn of(kind: TokenKind) -> Self {
        use TokenKind as T;

        match kind {
            T::Assign | T::PlusAssign | T::MinusAssign | T::StarAssign | T::SlashAssign => {
                Self::Assign
            },
            T::Question | T::Elvis => Self::Ternary,
            T::Or => Self::LogicalOr,
            T::And => Self::LogicalAnd,
            T::Equal | T::NotEqual => Self::Equals,
            T::Less | T::Greater | T::LessEqual | T::GreaterEqual => Self::LessGreater,
            T::Plus | T::Minus => Self::Sum,
            T::Star | T::Slash | T::Percent => Self::Product,
            T::StarStar => Self::Power,
            T::Increment | T::Decrement => Self::Postfix,
            T::LParen | T::Dot | T::DoubleColon => Self::Call,
            T::LBracket => Self::Index,
            _ => Self::Lowest,
        }
    }

    /// The level at which the right operand of an operator at this level is
    /// parsed.
    ///
    /// Right-associative levels bind their right operand one level lower, so
    /// that an operator of the same level nests to the right.
    #[must_use]
    pub const fn right_operand(self) -> Self {
        match self {
            Self::Assign => Self::Lowest,
            Self::Ternary => Self::Assign,
            Self::Power => Self::Product,
            other => other,
        }
    }
}

/// Parses a complete source text.
///
/// Parsing never stops at the first error: each failing statement is recorded
/// and the parser resynchronises after the next `;` (or before the next `}`
/// or the end of input) and continues.
///
/// # Parameters
/// - `source`: The program text.
///
/// # Returns
/// The statements that parsed successfully and every error encountered, in
/// source order.
///
/// # Example
/// ```
/// use ember::interpreter::parser::core::parse_program;
///
/// let (program, errors) = parse_program("var x = 1 + 2 * 3;");
/// assert!(errors.is_empty());
/// assert_eq!(program.to_string(), "var x = (1 + (2 * 3));");
/// ```
#[must_use]
pub fn parse_program(source: &str) -> (Program, Vec<ParseError>) {
    let tokens = tokenize(source);
    let mut tokens = tokens.iter().peekable();
    let mut statements = Vec::new();
    let mut errors = Vec::new();
    let mut recovering = false;

    loop {
        skip_semicolons(&mut tokens);
        match peek_kind(&mut tokens) {
            TokenKind::Eof => break,
            // The closing brace of a block abandoned by an earlier error.
            TokenKind::RBrace if recovering => {
                tokens.next();
                continue;
            },
            _ => {},
        }

        match parse_statement(&mut tokens) {
            Ok(statement) => {
                statements.push(statement);
                recovering = false;
            },
            Err(error) => {
                errors.push(error);
                synchronize(&mut tokens);
                recovering = true;
            },
        }
    }

    if !errors.is_empty() {
        debug!(count = errors.len(), "parse finished with errors");
    }

    (Program { statements }, errors)
}

/// Parses an expression whose operators all bind tighter than `precedence`.
///
/// This is the Pratt loop: a prefix parse function produces the left operand,
/// then infix parse functions extend it while the next operator binds
/// tighter than the current level.
///
/// # Parameters
/// - `tokens`: Token stream positioned at the first token of the expression.
/// - `precedence`: The level the caller is parsing at; `Lowest` for a full
///   expression.
///
/// # Returns
/// The parsed expression node.
///
/// Nesting depth is limited only by memory: the stack is grown on demand.
pub fn parse_expression<'a, I>(tokens: &mut Peekable<I>, precedence: Precedence) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Token> + Clone
{
    ensure_sufficient_stack(|| {
        let mut left = parse_prefix(tokens)?;

        while precedence < Precedence::of(peek_kind(tokens)) {
            left = parse_infix(tokens, left)?;
        }

        Ok(left)
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn render(source: &str) -> String {
        let (program, errors) = parse_program(source);
        assert!(errors.is_empty(), "unexpected errors for {source:?}: {errors:?}");
        program.to_string()
    }

    fn first_error(source: &str) -> String {
        let (_, errors) = parse_program(source);
        errors.first()
              .map(ToString::to_string)
              .unwrap_or_else(|| panic!("expected an error for {source:?}"))
    }

    #[test]
    fn binary_operator_precedence() {
        let cases = [("a + b * c", "(a + (b * c))"),
                     ("a * b + c", "((a * b) + c)"),
                     ("a + b - c", "((a + b) - c)"),
                     ("a * b / c % d", "(((a * b) / c) % d)"),
                     ("-a * b", "((-a) * b)"),
                     ("!-a", "(!(-a))"),
                     ("a < b == c > d", "((a < b) == (c > d))"),
                     ("a <= b != c >= d", "((a <= b) != (c >= d))"),
                     ("a || b && c", "(a || (b && c))"),
                     ("a && b == c", "(a && (b == c))"),
                     ("1 + 2.5", "(1 + 2.5)"),
                     ("(a + b) * c", "((a + b) * c)")];

        for (source, expected) in cases {
            assert_eq!(render(source), expected, "source: {source}");
        }
    }

    #[test]
    fn right_associative_levels() {
        assert_eq!(render("a ** b ** c"), "(a ** (b ** c))");
        assert_eq!(render("a * b ** c"), "(a * (b ** c))");
        assert_eq!(render("a = b = 1"), "(a = (b = 1));");
        assert_eq!(render("a += b -= 1"), "(a += (b -= 1));");
        assert_eq!(render("c ? a : b ? d : e"), "(c ? a : (b ? d : e))");
        assert_eq!(render("a ?: b ?: c"), "(a ?: (b ?: c))");
        assert_eq!(render("x = c ? 1 : 2"), "(x = (c ? 1 : 2));");
    }

    #[test]
    fn postfix_call_and_index_bind_tightest() {
        let cases = [("add(a, b * c)[1]", "(add(a, (b * c))[1])"),
                     ("a * [1, 2][b]", "(a * ([1, 2][b]))"),
                     ("x++ + 1", "((x++) + 1)"),
                     ("-x--", "(-(x--))"),
                     ("a.len() + 1", "(a.len() + 1)"),
                     ("s.split(\",\")[0]", "(s.split(\",\")[0])"),
                     ("Color::Red == x", "(Color::Red == x)"),
                     ("f(1)(2)", "f(1)(2)")];

        for (source, expected) in cases {
            assert_eq!(render(source), expected, "source: {source}");
        }
    }

    #[test]
    fn statements_render_canonically() {
        assert_eq!(render("var x = 0x1F;"), "var x = 31;");
        assert_eq!(render("return;"), "return;");
        assert_eq!(render("return x + 1"), "return (x + 1);");
        assert_eq!(render("break"), "break;");
        assert_eq!(render("delete a[0]"), "delete (a[0]);");
        assert_eq!(render("a[1] = 2"), "((a[1]) = 2);");
        assert_eq!(render("enum Color { case Red: 1; case Green: 2 }"),
                   "enum Color { case Red: 1; case Green: 2; }");
        assert_eq!(render("var h = {\"a\": 1, 2: [3]}"), "var h = {\"a\": 1, 2: [3]};");
    }

    #[test]
    fn functions_and_control_flow_are_expressions() {
        assert_eq!(render("function add(a, b = 1) { return a + b; }"),
                   "function add(a, b = 1) { return (a + b); }");
        assert_eq!(render("if (x > 1) { 1 } else if x { 2 } else { 3 }"),
                   "if (x > 1) { 1 } else { if x { 2 } else { 3 } }");
        assert_eq!(render("for (var i = 0; i < 3; i++) { puts(i) }"),
                   "for (var i = 0; (i < 3); (i++)) { puts(i) }");
        assert_eq!(render("for (;;) { break }"), "for (; ; ) { break; }");
        assert_eq!(render("import \"lib.em\""), "import \"lib.em\"");
    }

    #[test]
    fn reports_positions() {
        assert_eq!(first_error("var = 5;"),
                   "expected next token to be IDENT, got = instead at [Line: 1, Offset: 5]");
        assert_eq!(first_error("var x 5;"),
                   "expected next token to be =, got INT instead at [Line: 1, Offset: 7]");
        assert_eq!(first_error("+;"), "no prefix parse function for + found at [Line: 1, Offset: 1]");
        assert_eq!(first_error("var x = 1;\n  @"), "illegal token @ at [Line: 2, Offset: 3]");
        assert_eq!(first_error("99999999999999999999"),
                   "could not parse 99999999999999999999 as integer at [Line: 1, Offset: 1]");
        assert_eq!(first_error("enum E { case A: 1; case A: 2; }"),
                   "duplicate enum branch E::A at [Line: 1, Offset: 26]");
        assert_eq!(first_error("function(a = 1, b) {}"),
                   "required parameter b follows a defaulted parameter at [Line: 1, Offset: 17]");
        assert_eq!(first_error("delete x;"),
                   "delete expects an index expression, got x at [Line: 1, Offset: 1]");
        assert_eq!(first_error("1 = 2"), "invalid assignment target 1 at [Line: 1, Offset: 3]");
        assert_eq!(first_error("5++"), "++ expects an identifier, got 5 at [Line: 1, Offset: 2]");
    }

    #[test]
    fn recovers_after_errors() {
        let (program, errors) = parse_program("var = 1; var y = 2; y");
        assert_eq!(errors.len(), 1);
        assert_eq!(program.to_string(), "var y = 2;y");

        let (program, errors) = parse_program("function f() { var x = ; }\nvar y = 2;");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(),
                   "no prefix parse function for ; found at [Line: 1, Offset: 24]");
        assert_eq!(program.to_string(), "var y = 2;");

        let (_, errors) = parse_program("var a = ; var b = ; var c = 3;");
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn deeply_nested_groups() {
        let depth = 50_000;
        let source = format!("{}1 + 2{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(render(&source), "(1 + 2)");
    }

    #[test]
    fn unterminated_input_reports_eof() {
        assert_eq!(first_error("f(1, 2"),
                   "expected next token to be ), got EOF instead at [Line: 1, Offset: 7]");
        assert_eq!(first_error("if (x) { 1"),
                   "expected next token to be }, got EOF instead at [Line: 1, Offset: 11]");
    }
}
