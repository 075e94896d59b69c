use std::fmt;

use logos::Logos;

use crate::ast::Position;

/// The kind of a lexical token.
///
/// Literal kinds (`Int`, `Float`, `Str`, `Ident`) carry their text in
/// [`Token::literal`]; numeric conversion is left to the parser so that a
/// malformed literal becomes a parse error instead of a lexing failure.
///
/// Keywords are not matched by the generated automaton. Identifiers are looked
/// up in [`KEYWORDS`] after scanning.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(extras = LexerExtras)]
pub enum TokenKind {
    /// Floating-point literals such as `3.14` or `2.1e-10`.
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+")]
    Float,
    /// Integer literals, decimal (`42`) or hexadecimal (`0x2A`).
    #[regex(r"[0-9]+")]
    #[regex(r"0[xX][0-9a-fA-F]+")]
    Int,
    /// String literals delimited by `"`.
    #[token("\"", lex_string)]
    Str,
    /// Identifiers such as `x` or `make_counter`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    /// `var`
    Var,
    /// `function`
    Function,
    /// `return`
    Return,
    /// `break`
    Break,
    /// `delete`
    Delete,
    /// `enum`
    Enum,
    /// `case`
    Case,
    /// `if`
    If,
    /// `else`
    Else,
    /// `for`
    For,
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,
    /// `import`
    Import,

    /// `=`
    #[token("=")]
    Assign,
    /// `+=`
    #[token("+=")]
    PlusAssign,
    /// `-=`
    #[token("-=")]
    MinusAssign,
    /// `*=`
    #[token("*=")]
    StarAssign,
    /// `/=`
    #[token("/=")]
    SlashAssign,
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `**`
    #[token("**")]
    StarStar,
    /// `/`
    #[token("/")]
    Slash,
    /// `%`
    #[token("%")]
    Percent,
    /// `!`
    #[token("!")]
    Bang,
    /// `++`
    #[token("++")]
    Increment,
    /// `--`
    #[token("--")]
    Decrement,
    /// `==`
    #[token("==")]
    Equal,
    /// `!=`
    #[token("!=")]
    NotEqual,
    /// `<`
    #[token("<")]
    Less,
    /// `>`
    #[token(">")]
    Greater,
    /// `<=`
    #[token("<=")]
    LessEqual,
    /// `>=`
    #[token(">=")]
    GreaterEqual,
    /// `&&`
    #[token("&&")]
    And,
    /// `||`
    #[token("||")]
    Or,
    /// `?`
    #[token("?")]
    Question,
    /// `?:`
    #[token("?:")]
    Elvis,

    /// `,`
    #[token(",")]
    Comma,
    /// `;`
    #[token(";")]
    Semicolon,
    /// `:`
    #[token(":")]
    Colon,
    /// `::`
    #[token("::")]
    DoubleColon,
    /// `.`
    #[token(".")]
    Dot,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,

    /// `// line comments`
    #[token("//", line_comment)]
    LineComment,
    /// `/* block comments */`
    #[token("/*", block_comment)]
    BlockComment,
    /// Line breaks; they only advance the position counters.
    #[token("\n", |lex| {
        lex.extras.line += 1;
        lex.extras.line_start = lex.span().end;
        logos::Skip
    })]
    NewLine,
    /// Spaces, tabs, carriage returns and feeds.
    #[regex(r"[ \t\r\f]+", logos::skip)]
    Ignored,

    /// A character sequence the lexer does not recognise.
    Illegal,
    /// End of input.
    Eof,
}

/// Fixed keyword table consulted for every scanned identifier.
pub const KEYWORDS: &[(&str, TokenKind)] = &[("var", TokenKind::Var),
                                              ("function", TokenKind::Function),
                                              ("return", TokenKind::Return),
                                              ("break", TokenKind::Break),
                                              ("delete", TokenKind::Delete),
                                              ("enum", TokenKind::Enum),
                                              ("case", TokenKind::Case),
                                              ("if", TokenKind::If),
                                              ("else", TokenKind::Else),
                                              ("for", TokenKind::For),
                                              ("true", TokenKind::True),
                                              ("false", TokenKind::False),
                                              ("null", TokenKind::Null),
                                              ("import", TokenKind::Import)];

impl TokenKind {
    /// Resolves an identifier to a keyword kind, if it is one.
    ///
    /// # Example
    /// ```
    /// use ember::interpreter::lexer::TokenKind;
    ///
    /// assert_eq!(TokenKind::keyword("enum"), Some(TokenKind::Enum));
    /// assert_eq!(TokenKind::keyword("enumerate"), None);
    /// ```
    #[must_use]
    pub fn keyword(ident: &str) -> Option<Self> {
        KEYWORDS.iter()
                .find(|(name, _)| *name == ident)
                .map(|(_, kind)| *kind)
    }

    /// Canonical source text (or class name) used in diagnostics.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Float => "FLOAT",
            Self::Int => "INT",
            Self::Str => "STRING",
            Self::Ident => "IDENT",
            Self::Var => "var",
            Self::Function => "function",
            Self::Return => "return",
            Self::Break => "break",
            Self::Delete => "delete",
            Self::Enum => "enum",
            Self::Case => "case",
            Self::If => "if",
            Self::Else => "else",
            Self::For => "for",
            Self::True => "true",
            Self::False => "false",
            Self::Null => "null",
            Self::Import => "import",
            Self::Assign => "=",
            Self::PlusAssign => "+=",
            Self::MinusAssign => "-=",
            Self::StarAssign => "*=",
            Self::SlashAssign => "/=",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::StarStar => "**",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Bang => "!",
            Self::Increment => "++",
            Self::Decrement => "--",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::And => "&&",
            Self::Or => "||",
            Self::Question => "?",
            Self::Elvis => "?:",
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::Colon => ":",
            Self::DoubleColon => "::",
            Self::Dot => ".",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::LineComment => "//",
            Self::BlockComment => "/*",
            Self::NewLine => "NEWLINE",
            Self::Ignored => "WHITESPACE",
            Self::Illegal => "ILLEGAL",
            Self::Eof => "EOF",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A lexical token together with its source position.
///
/// `line` is 1-based. `column` is the 1-based byte offset of the token's first
/// character within its line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// What kind of token this is.
    pub kind:    TokenKind,
    /// The source text of the token. For strings, the contents without
    /// quotes.
    pub literal: String,
    /// Line the token starts on.
    pub line:    usize,
    /// Offset of the token within its line.
    pub column:  usize,
}

impl Token {
    /// Where the token starts.
    #[must_use]
    pub const fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

/// Position counters carried by the lexer while scanning.
#[derive(Debug)]
pub struct LexerExtras {
    /// The current line number.
    pub line:       usize,
    /// Byte index where the current line starts.
    pub line_start: usize,
}

impl Default for LexerExtras {
    fn default() -> Self {
        Self { line:       1,
               line_start: 0, }
    }
}

impl LexerExtras {
    /// Accounts for every line break inside `text`, which starts at byte
    /// `offset` of the source.
    fn advance_over(&mut self, text: &str, offset: usize) {
        for (i, _) in text.match_indices('\n') {
            self.line += 1;
            self.line_start = offset + i + 1;
        }
    }
}

/// Single-pass tokenizer producing [`Token`]s on demand.
///
/// Lexing never fails: unknown characters and unterminated strings come out as
/// [`TokenKind::Illegal`] tokens and the parser decides what to do with them.
/// Once the input is exhausted every call yields an `Eof` token.
pub struct Lexer<'a> {
    inner:  logos::Lexer<'a, TokenKind>,
    source: &'a str,
    done:   bool,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over `source`.
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self { inner: TokenKind::lexer_with_extras(source, LexerExtras::default()),
               source,
               done: false }
    }

    /// Produces the next token.
    ///
    /// # Example
    /// ```
    /// use ember::interpreter::lexer::{Lexer, TokenKind};
    ///
    /// let mut lexer = Lexer::new("var x = 5;");
    /// assert_eq!(lexer.next_token().kind, TokenKind::Var);
    /// assert_eq!(lexer.next_token().literal, "x");
    /// ```
    pub fn next_token(&mut self) -> Token {
        let Some(result) = self.inner.next() else {
            return self.eof();
        };

        let span = self.inner.span();
        let slice = self.inner.slice();
        let line = self.inner.extras.line;
        let column = span.start - self.inner.extras.line_start + 1;

        let (kind, literal) = match result {
            Ok(TokenKind::Str) => (TokenKind::Str, slice[1..slice.len() - 1].to_string()),
            Ok(TokenKind::Ident) => {
                (TokenKind::keyword(slice).unwrap_or(TokenKind::Ident), slice.to_string())
            },
            Ok(kind) => (kind, slice.to_string()),
            Err(()) => (TokenKind::Illegal, slice.to_string()),
        };

        if kind == TokenKind::Str {
            self.inner.extras.advance_over(slice, span.start);
        }

        Token { kind,
                literal,
                line,
                column }
    }

    fn eof(&mut self) -> Token {
        self.done = true;
        Token { kind:    TokenKind::Eof,
                literal: String::new(),
                line:    self.inner.extras.line,
                column:  self.source.len() - self.inner.extras.line_start + 1, }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    /// Yields tokens up to and including the first `Eof`.
    fn next(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }
        Some(self.next_token())
    }
}

/// Collects every token of `source`, ending with `Eof`.
#[must_use]
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).collect()
}

fn lex_string(lex: &mut logos::Lexer<TokenKind>) -> bool {
    match lex.remainder().find('"') {
        Some(end) => {
            lex.bump(end + 1);
            true
        },
        None => false,
    }
}

fn line_comment(lex: &mut logos::Lexer<TokenKind>) -> logos::Skip {
    let remainder = lex.remainder();
    let len = remainder.find('\n').unwrap_or(remainder.len());
    lex.bump(len);
    logos::Skip
}

fn block_comment(lex: &mut logos::Lexer<TokenKind>) -> logos::Skip {
    let remainder = lex.remainder();
    let len = remainder.find("*/").map_or(remainder.len(), |end| end + 2);
    let offset = lex.span().end;
    lex.extras.advance_over(&remainder[..len], offset);
    lex.bump(len);
    logos::Skip
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn canonical_forms_lex_back_to_their_kind() {
        let cases = [("42", TokenKind::Int),
                     ("0x1F", TokenKind::Int),
                     ("3.25", TokenKind::Float),
                     ("1e5", TokenKind::Float),
                     ("2.5E-3", TokenKind::Float),
                     ("name_1", TokenKind::Ident),
                     ("=", TokenKind::Assign),
                     ("+=", TokenKind::PlusAssign),
                     ("-=", TokenKind::MinusAssign),
                     ("*=", TokenKind::StarAssign),
                     ("/=", TokenKind::SlashAssign),
                     ("+", TokenKind::Plus),
                     ("-", TokenKind::Minus),
                     ("*", TokenKind::Star),
                     ("**", TokenKind::StarStar),
                     ("/", TokenKind::Slash),
                     ("%", TokenKind::Percent),
                     ("!", TokenKind::Bang),
                     ("++", TokenKind::Increment),
                     ("--", TokenKind::Decrement),
                     ("==", TokenKind::Equal),
                     ("!=", TokenKind::NotEqual),
                     ("<", TokenKind::Less),
                     (">", TokenKind::Greater),
                     ("<=", TokenKind::LessEqual),
                     (">=", TokenKind::GreaterEqual),
                     ("&&", TokenKind::And),
                     ("||", TokenKind::Or),
                     ("?", TokenKind::Question),
                     ("?:", TokenKind::Elvis),
                     (",", TokenKind::Comma),
                     (";", TokenKind::Semicolon),
                     (":", TokenKind::Colon),
                     ("::", TokenKind::DoubleColon),
                     (".", TokenKind::Dot),
                     ("(", TokenKind::LParen),
                     (")", TokenKind::RParen),
                     ("{", TokenKind::LBrace),
                     ("}", TokenKind::RBrace),
                     ("[", TokenKind::LBracket),
                     ("]", TokenKind::RBracket)];

        for (text, kind) in cases {
            let tokens = tokenize(text);
            assert_eq!(tokens[0],
                       Token { kind,
                               literal: text.to_string(),
                               line: 1,
                               column: 1 },
                       "lexing {text:?}");
            assert_eq!(tokens[1].kind, TokenKind::Eof);
        }

        for (word, kind) in KEYWORDS {
            let token = &tokenize(word)[0];
            assert_eq!((token.kind, token.literal.as_str()), (*kind, *word));
        }
    }

    #[test]
    fn strings_keep_raw_contents() {
        let tokens = tokenize(r#""hello \n world" "ünï""#);
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(tokens[0].literal, r"hello \n world");
        assert_eq!(tokens[1].literal, "ünï");
    }

    #[test]
    fn positions_track_lines_and_offsets() {
        let tokens = tokenize("var x = 5;\n  x = x + 1;");
        let positions: Vec<_> = tokens.iter()
                                      .map(|t| (t.literal.as_str(), t.line, t.column))
                                      .collect();
        assert_eq!(positions,
                   vec![("var", 1, 1),
                        ("x", 1, 5),
                        ("=", 1, 7),
                        ("5", 1, 9),
                        (";", 1, 10),
                        ("x", 2, 3),
                        ("=", 2, 5),
                        ("x", 2, 7),
                        ("+", 2, 9),
                        ("1", 2, 11),
                        (";", 2, 12),
                        ("", 2, 13)]);
    }

    #[test]
    fn comments_are_skipped_and_counted() {
        let tokens = tokenize("// heading\n/* two\nlines */ a /* inline */ b");
        assert_eq!(tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
                   vec![TokenKind::Ident, TokenKind::Ident, TokenKind::Eof]);
        assert_eq!((tokens[0].line, tokens[0].column), (3, 10));
        assert_eq!((tokens[1].line, tokens[1].column), (3, 25));
    }

    #[test]
    fn multiline_string_moves_following_tokens() {
        let tokens = tokenize("\"a\nb\" c");
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].literal.as_str(), tokens[1].line, tokens[1].column),
                   ("c", 2, 4));
    }

    #[test]
    fn illegal_characters_do_not_stop_lexing() {
        assert_eq!(kinds("a @ b"),
                   vec![TokenKind::Ident, TokenKind::Illegal, TokenKind::Ident, TokenKind::Eof]);
        assert_eq!(kinds("\"open")[0], TokenKind::Illegal);
    }

    #[test]
    fn dot_after_integer_is_a_method_call() {
        assert_eq!(kinds("1.abs()"),
                   vec![TokenKind::Int,
                        TokenKind::Dot,
                        TokenKind::Ident,
                        TokenKind::LParen,
                        TokenKind::RParen,
                        TokenKind::Eof]);
    }

    #[test]
    fn eof_repeats() {
        let mut lexer = Lexer::new("");
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }
}
