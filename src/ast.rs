use std::{fmt, rc::Rc};

/// A location in source text.
///
/// Rendered as `[Line: L, Offset: O]`, the format every positional diagnostic
/// uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// 1-based line number.
    pub line:   usize,
    /// 1-based offset within the line.
    pub column: usize,
}

impl Position {
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Line: {}, Offset: {}]", self.line, self.column)
    }
}

/// A parsed source file: the root of the tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    /// Top-level statements in source order.
    pub statements: Vec<Statement>,
}

/// A brace-delimited sequence of statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Statements inside the braces.
    pub statements: Vec<Statement>,
    /// Position of the opening brace.
    pub position:   Position,
}

/// The target, operator and value of an assignment.
///
/// Shared by [`Statement::Assignment`] and [`Expr::Assign`]; `op` is set for
/// compound forms such as `x += 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// An [`Expr::Identifier`] or an [`Expr::Index`].
    pub target:   Box<Expr>,
    /// The arithmetic operator of a compound assignment.
    pub op:       Option<InfixOperator>,
    /// The assigned expression.
    pub value:    Box<Expr>,
    /// Position of the assignment operator.
    pub position: Position,
}

/// A function parameter.
///
/// Defaulted parameters are distinguished from required ones by variant; the
/// call site counts both kinds to validate arity.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    /// `name`
    Required(String),
    /// `name = default`
    Defaulted {
        /// The parameter name.
        name:    String,
        /// Evaluated in the call scope when the argument is omitted.
        default: Expr,
    },
}

impl Parameter {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Required(name) | Self::Defaulted { name, .. } => name,
        }
    }
}

/// A function literal, shared between the tree and every closure created
/// from it.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLiteral {
    /// Set for `function name(...) {}`; evaluating it binds the name.
    pub name:       Option<String>,
    /// Required and defaulted parameters, in order.
    pub parameters: Vec<Parameter>,
    /// The function body.
    pub body:       Block,
}

/// Statements: program-level effects.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `var name = value;`
    Var {
        /// The declared name.
        name:     String,
        /// Its initializer.
        value:    Expr,
        /// Position of the `var` keyword.
        position: Position,
    },
    /// `target = value;` or a compound assignment.
    Assignment(Assignment),
    /// `return value;`
    Return {
        /// The returned expression, if any.
        value:    Option<Expr>,
        /// Position of the `return` keyword.
        position: Position,
    },
    /// `break;`
    Break {
        /// Position of the `break` keyword.
        position: Position,
    },
    /// `delete container[key];`
    Delete {
        /// An [`Expr::Index`] naming the element to remove.
        target:   Expr,
        /// Position of the `delete` keyword.
        position: Position,
    },
    /// `enum Name { case A: value; ... }`
    Enum {
        /// The enum's name.
        name:     String,
        /// Branch names with their value expressions, in declaration order.
        branches: Vec<(String, Expr)>,
        /// Position of the `enum` keyword.
        position: Position,
    },
    /// An expression evaluated for its value or effects.
    Expression {
        /// The expression.
        expr:     Expr,
        /// Position of its first token.
        position: Position,
    },
}

/// Expressions: value-producing nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `42`
    Integer {
        /// The literal value.
        value:    i64,
        /// Position in the source code.
        position: Position,
    },
    /// `3.5`
    Float {
        /// The literal value.
        value:    f64,
        /// Position in the source code.
        position: Position,
    },
    /// `"text"`
    Str {
        /// The literal contents.
        value:    String,
        /// Position in the source code.
        position: Position,
    },
    /// `true` / `false`
    Boolean {
        /// The literal value.
        value:    bool,
        /// Position in the source code.
        position: Position,
    },
    /// `null`
    Null {
        /// Position in the source code.
        position: Position,
    },
    /// A variable reference.
    Identifier {
        /// The referenced name.
        name:     String,
        /// Position in the source code.
        position: Position,
    },
    /// `-x`, `!x`
    Prefix {
        /// The operator.
        op:       PrefixOperator,
        /// The operand.
        right:    Box<Self>,
        /// Position of the operator.
        position: Position,
    },
    /// `a + b`, `a && b`, ...
    Infix {
        /// Left operand.
        left:     Box<Self>,
        /// The operator.
        op:       InfixOperator,
        /// Right operand.
        right:    Box<Self>,
        /// Position of the operator.
        position: Position,
    },
    /// `x++`, `x--`
    Postfix {
        /// The operator.
        op:       PostfixOperator,
        /// The variable being updated.
        name:     String,
        /// Position of the operator.
        position: Position,
    },
    /// `a = b` used as an expression.
    Assign(Assignment),
    /// `f(a, b)`
    Call {
        /// The callee.
        function:  Box<Self>,
        /// Argument expressions.
        arguments: Vec<Self>,
        /// Position of the opening parenthesis.
        position:  Position,
    },
    /// `a[i]`
    Index {
        /// The indexed value.
        left:     Box<Self>,
        /// The index or key.
        index:    Box<Self>,
        /// Position of the opening bracket.
        position: Position,
    },
    /// `[a, b, c]`
    Array {
        /// Element expressions.
        elements: Vec<Self>,
        /// Position of the opening bracket.
        position: Position,
    },
    /// `{k: v, ...}`
    Hash {
        /// Key/value expression pairs in source order.
        pairs:    Vec<(Self, Self)>,
        /// Position of the opening brace.
        position: Position,
    },
    /// `if (c) { ... } else { ... }`
    If {
        /// The condition.
        condition:   Box<Self>,
        /// Evaluated when the condition is truthy.
        consequence: Block,
        /// Evaluated otherwise; `else if` chains nest here.
        alternative: Option<Block>,
        /// Position of the `if` keyword.
        position:    Position,
    },
    /// `c ? a : b`
    Ternary {
        /// The condition.
        condition:   Box<Self>,
        /// Value when the condition is truthy.
        consequence: Box<Self>,
        /// Value otherwise.
        alternative: Box<Self>,
        /// Position of the `?`.
        position:    Position,
    },
    /// `a ?: b`
    Elvis {
        /// Returned when truthy.
        left:     Box<Self>,
        /// Fallback.
        right:    Box<Self>,
        /// Position of the `?:`.
        position: Position,
    },
    /// `for (init; condition; update) { body }`
    For {
        /// Runs once before the loop.
        initializer: Option<Box<Statement>>,
        /// Missing means loop forever.
        condition:   Option<Box<Self>>,
        /// Runs after every pass of the body.
        update:      Option<Box<Self>>,
        /// Loop body.
        body:        Block,
        /// Position of the `for` keyword.
        position:    Position,
    },
    /// `function name(params) { body }`
    Function {
        /// The literal, shared with the closures it creates.
        literal:  Rc<FunctionLiteral>,
        /// Position of the `function` keyword.
        position: Position,
    },
    /// `value.method(args)`
    MethodCall {
        /// The receiving value.
        receiver:  Box<Self>,
        /// The method name.
        method:    String,
        /// Argument expressions.
        arguments: Vec<Self>,
        /// Position of the dot.
        position:  Position,
    },
    /// `Name::Branch`
    ScopeAccess {
        /// The enum binding.
        name:     String,
        /// The branch being read.
        branch:   String,
        /// Position of the `::`.
        position: Position,
    },
    /// `import "file"`
    Import {
        /// Evaluates to the file name.
        path:     Box<Self>,
        /// Position of the `import` keyword.
        position: Position,
    },
}

impl Expr {
    /// Gets the source position from `self`.
    ///
    /// ## Example
    /// ```
    /// use ember::ast::{Expr, Position};
    ///
    /// let expr = Expr::Identifier { name:     "x".to_string(),
    ///                               position: Position::new(5, 2), };
    ///
    /// assert_eq!(expr.position().line, 5);
    /// ```
    #[must_use]
    pub const fn position(&self) -> Position {
        match self {
            Self::Integer { position, .. }
            | Self::Float { position, .. }
            | Self::Str { position, .. }
            | Self::Boolean { position, .. }
            | Self::Null { position }
            | Self::Identifier { position, .. }
            | Self::Prefix { position, .. }
            | Self::Infix { position, .. }
            | Self::Postfix { position, .. }
            | Self::Assign(Assignment { position, .. })
            | Self::Call { position, .. }
            | Self::Index { position, .. }
            | Self::Array { position, .. }
            | Self::Hash { position, .. }
            | Self::If { position, .. }
            | Self::Ternary { position, .. }
            | Self::Elvis { position, .. }
            | Self::For { position, .. }
            | Self::Function { position, .. }
            | Self::MethodCall { position, .. }
            | Self::ScopeAccess { position, .. }
            | Self::Import { position, .. } => *position,
        }
    }
}

/// Prefix operators.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PrefixOperator {
    /// Arithmetic negation (`-x`).
    Negate,
    /// Logical NOT (`!x`).
    Not,
}

/// Postfix operators; both rebind their variable.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PostfixOperator {
    /// `x++`
    Increment,
    /// `x--`
    Decrement,
}

/// Binary operators.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InfixOperator {
    /// Addition or concatenation (`+`)
    Add,
    /// Subtraction (`-`)
    Sub,
    /// Multiplication (`*`)
    Mul,
    /// Division (`/`)
    Div,
    /// Remainder (`%`)
    Mod,
    /// Exponentiation (`**`)
    Pow,
    /// Less than (`<`)
    Less,
    /// Greater than (`>`)
    Greater,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Equal to (`==`)
    Equal,
    /// Not equal to (`!=`)
    NotEqual,
    /// Logical and (`&&`)
    And,
    /// Logical or (`||`)
    Or,
}

impl fmt::Display for PrefixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
                        Self::Negate => "-",
                        Self::Not => "!",
                    })
    }
}

impl fmt::Display for PostfixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
                        Self::Increment => "++",
                        Self::Decrement => "--",
                    })
    }
}

impl fmt::Display for InfixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use InfixOperator::{
            Add, And, Div, Equal, Greater, GreaterEqual, Less, LessEqual, Mod, Mul, NotEqual, Or,
            Pow, Sub,
        };
        let operator = match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
            Pow => "**",
            Less => "<",
            Greater => ">",
            LessEqual => "<=",
            GreaterEqual => ">=",
            Equal => "==",
            NotEqual => "!=",
            And => "&&",
            Or => "||",
        };
        write!(f, "{operator}")
    }
}

/// A pass over the tree.
///
/// Each node family accepts a visitor and dispatches to the matching method,
/// so new passes (the evaluator, the resolver) are added without touching the
/// node types.
pub trait Visitor {
    /// What visiting a node produces.
    type Output;

    /// Visits one statement.
    fn visit_statement(&mut self, statement: &Statement) -> Self::Output;

    /// Visits one expression.
    fn visit_expression(&mut self, expr: &Expr) -> Self::Output;
}

impl Statement {
    /// Double-dispatches to [`Visitor::visit_statement`].
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::Output {
        visitor.visit_statement(self)
    }
}

impl Expr {
    /// Double-dispatches to [`Visitor::visit_expression`].
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::Output {
        visitor.visit_expression(self)
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            write!(f, "{statement}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{ ")?;
        for statement in &self.statements {
            write!(f, "{statement} ")?;
        }
        f.write_str("}")
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            Some(op) => write!(f, "({} {op}= {})", self.target, self.value),
            None => write!(f, "({} = {})", self.target, self.value),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required(name) => f.write_str(name),
            Self::Defaulted { name, default } => write!(f, "{name} = {default}"),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Var { name, value, .. } => write!(f, "var {name} = {value};"),
            Self::Assignment(assignment) => write!(f, "{assignment};"),
            Self::Return { value: Some(value),
                           .. } => write!(f, "return {value};"),
            Self::Return { value: None, .. } => f.write_str("return;"),
            Self::Break { .. } => f.write_str("break;"),
            Self::Delete { target, .. } => write!(f, "delete {target};"),
            Self::Enum { name, branches, .. } => {
                write!(f, "enum {name} {{ ")?;
                for (branch, value) in branches {
                    write!(f, "case {branch}: {value}; ")?;
                }
                f.write_str("}")
            },
            Self::Expression { expr, .. } => write!(f, "{expr}"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer { value, .. } => write!(f, "{value}"),
            Self::Float { value, .. } => write!(f, "{value:?}"),
            Self::Str { value, .. } => write!(f, "\"{value}\""),
            Self::Boolean { value, .. } => write!(f, "{value}"),
            Self::Null { .. } => f.write_str("null"),
            Self::Identifier { name, .. } => f.write_str(name),
            Self::Prefix { op, right, .. } => write!(f, "({op}{right})"),
            Self::Infix { left, op, right, .. } => write!(f, "({left} {op} {right})"),
            Self::Postfix { op, name, .. } => write!(f, "({name}{op})"),
            Self::Assign(assignment) => write!(f, "{assignment}"),
            Self::Call { function,
                         arguments,
                         .. } => {
                write!(f, "{function}(")?;
                write_joined(f, arguments)?;
                f.write_str(")")
            },
            Self::Index { left, index, .. } => write!(f, "({left}[{index}])"),
            Self::Array { elements, .. } => {
                f.write_str("[")?;
                write_joined(f, elements)?;
                f.write_str("]")
            },
            Self::Hash { pairs, .. } => {
                f.write_str("{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            },
            Self::If { condition,
                       consequence,
                       alternative,
                       .. } => {
                write!(f, "if {condition} {consequence}")?;
                if let Some(alternative) = alternative {
                    write!(f, " else {alternative}")?;
                }
                Ok(())
            },
            Self::Ternary { condition,
                            consequence,
                            alternative,
                            .. } => write!(f, "({condition} ? {consequence} : {alternative})"),
            Self::Elvis { left, right, .. } => write!(f, "({left} ?: {right})"),
            Self::For { initializer,
                        condition,
                        update,
                        body,
                        .. } => {
                f.write_str("for (")?;
                if let Some(initializer) = initializer {
                    write!(f, "{}", initializer.to_string().trim_end_matches(';'))?;
                }
                f.write_str("; ")?;
                if let Some(condition) = condition {
                    write!(f, "{condition}")?;
                }
                f.write_str("; ")?;
                if let Some(update) = update {
                    write!(f, "{update}")?;
                }
                write!(f, ") {body}")
            },
            Self::Function { literal, .. } => {
                f.write_str("function")?;
                if let Some(name) = &literal.name {
                    write!(f, " {name}")?;
                }
                f.write_str("(")?;
                write_joined(f, &literal.parameters)?;
                write!(f, ") {}", literal.body)
            },
            Self::MethodCall { receiver,
                               method,
                               arguments,
                               .. } => {
                write!(f, "{receiver}.{method}(")?;
                write_joined(f, arguments)?;
                f.write_str(")")
            },
            Self::ScopeAccess { name, branch, .. } => write!(f, "{name}::{branch}"),
            Self::Import { path, .. } => write!(f, "import {path}"),
        }
    }
}
