use std::fmt;

use rustc_hash::FxHashMap;

use crate::{
    ast::{Block, Expr, Parameter, Position, Program, Statement, Visitor},
    interpreter::evaluator::function::core::BUILTIN_FUNCTIONS,
};

/// What the resolver found wrong with a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The variable is read inside its own initializer.
    SelfReference,
    /// A script binding hides the builtin of the same name.
    ShadowsBuiltin,
}

/// A problem found by the resolver. Resolution never blocks evaluation; the
/// findings are advisory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind:     DiagnosticKind,
    /// The offending name.
    pub name:     String,
    /// Where it was read or bound.
    pub position: Position,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DiagnosticKind::SelfReference => {
                write!(f, "cannot read {} in its own initializer at {}", self.name, self.position)
            },
            DiagnosticKind::ShadowsBuiltin => {
                write!(f, "{} shadows the builtin function {} at {}",
                       self.name, self.name, self.position)
            },
        }
    }
}

/// A static pass over the tree that tracks declarations scope by scope.
///
/// Each scope maps a name to whether its initializer has finished. A `var`
/// declares its name before the initializer is resolved and marks it
/// initialized afterwards, so a read of the name in between is reported.
/// Redeclaring a name that is already initialized in the same scope is
/// fine: the initializer then reads the earlier binding.
#[derive(Debug, Default)]
pub struct Resolver {
    scopes:      Vec<FxHashMap<String, bool>>,
    diagnostics: Vec<Diagnostic>,
}

/// Resolves a whole program.
///
/// # Example
/// ```
/// use ember::interpreter::{parser::core::parse_program, resolver::resolve};
///
/// let (program, _) = parse_program("var a = 1; var b = b + a;");
/// let diagnostics = resolve(&program);
///
/// assert_eq!(diagnostics.len(), 1);
/// assert_eq!(diagnostics[0].to_string(),
///            "cannot read b in its own initializer at [Line: 1, Offset: 20]");
/// ```
#[must_use]
pub fn resolve(program: &Program) -> Vec<Diagnostic> {
    let mut resolver = Resolver::default();
    resolver.with_scope(|r| {
                for statement in &program.statements {
                    statement.accept(r);
                }
            });
    resolver.diagnostics
}

impl Resolver {
    fn with_scope(&mut self, f: impl FnOnce(&mut Self)) {
        self.scopes.push(FxHashMap::default());
        f(self);
        self.scopes.pop();
    }

    fn declare(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.entry(name.to_string()).or_insert(false);
        }
    }

    fn define(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), true);
        }
    }

    fn read(&mut self, name: &str, position: Position) {
        if let Some(scope) = self.scopes.last()
           && scope.get(name) == Some(&false)
        {
            self.diagnostics.push(Diagnostic { kind: DiagnosticKind::SelfReference,
                                               name: name.to_string(),
                                               position });
        }
    }

    /// Reports a binding that hides a builtin; lookups of the name reach
    /// the binding first.
    fn bind(&mut self, name: &str, position: Position) {
        if BUILTIN_FUNCTIONS.contains(&name) {
            self.diagnostics.push(Diagnostic { kind: DiagnosticKind::ShadowsBuiltin,
                                               name: name.to_string(),
                                               position });
        }
    }

    fn resolve_block(&mut self, block: &Block) {
        self.with_scope(|r| {
                for statement in &block.statements {
                    statement.accept(r);
                }
            });
    }
}

impl Visitor for Resolver {
    type Output = ();

    fn visit_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Var { name, value, position } => {
                self.bind(name, *position);
                self.declare(name);
                value.accept(self);
                self.define(name);
            },
            Statement::Assignment(assignment) => {
                assignment.target.accept(self);
                assignment.value.accept(self);
            },
            Statement::Return { value, .. } => {
                if let Some(value) = value {
                    value.accept(self);
                }
            },
            Statement::Break { .. } => {},
            Statement::Delete { target, .. } => target.accept(self),
            Statement::Enum { name,
                              branches,
                              position, } => {
                for (_, value) in branches {
                    value.accept(self);
                }
                self.bind(name, *position);
                self.define(name);
            },
            Statement::Expression { expr, .. } => expr.accept(self),
        }
    }

    fn visit_expression(&mut self, expr: &Expr) {
        match expr {
            Expr::Integer { .. }
            | Expr::Float { .. }
            | Expr::Str { .. }
            | Expr::Boolean { .. }
            | Expr::Null { .. } => {},
            Expr::Identifier { name, position }
            | Expr::Postfix { name, position, .. }
            | Expr::ScopeAccess { name, position, .. } => self.read(name, *position),
            Expr::Prefix { right, .. } => right.accept(self),
            Expr::Infix { left, right, .. } | Expr::Elvis { left, right, .. } => {
                left.accept(self);
                right.accept(self);
            },
            Expr::Assign(assignment) => {
                assignment.target.accept(self);
                assignment.value.accept(self);
            },
            Expr::Call { function,
                         arguments,
                         .. } => {
                function.accept(self);
                for argument in arguments {
                    argument.accept(self);
                }
            },
            Expr::Index { left, index, .. } => {
                left.accept(self);
                index.accept(self);
            },
            Expr::Array { elements, .. } => {
                for element in elements {
                    element.accept(self);
                }
            },
            Expr::Hash { pairs, .. } => {
                for (key, value) in pairs {
                    key.accept(self);
                    value.accept(self);
                }
            },
            Expr::If { condition,
                       consequence,
                       alternative,
                       .. } => {
                condition.accept(self);
                self.resolve_block(consequence);
                if let Some(alternative) = alternative {
                    self.resolve_block(alternative);
                }
            },
            Expr::Ternary { condition,
                            consequence,
                            alternative,
                            .. } => {
                condition.accept(self);
                consequence.accept(self);
                alternative.accept(self);
            },
            Expr::For { initializer,
                        condition,
                        update,
                        body,
                        .. } => self.with_scope(|r| {
                                        if let Some(initializer) = initializer {
                                            initializer.accept(r);
                                        }
                                        if let Some(condition) = condition {
                                            condition.accept(r);
                                        }
                                        if let Some(update) = update {
                                            update.accept(r);
                                        }
                                        r.resolve_block(body);
                                    }),
            Expr::Function { literal, position } => {
                if let Some(name) = &literal.name {
                    self.bind(name, *position);
                    self.define(name);
                }
                self.with_scope(|r| {
                        for parameter in &literal.parameters {
                            if let Parameter::Defaulted { default, .. } = parameter {
                                default.accept(r);
                            }
                            r.bind(parameter.name(), *position);
                            r.define(parameter.name());
                        }
                        for statement in &literal.body.statements {
                            statement.accept(r);
                        }
                    });
            },
            Expr::MethodCall { receiver,
                               arguments,
                               .. } => {
                receiver.accept(self);
                for argument in arguments {
                    argument.accept(self);
                }
            },
            Expr::Import { path, .. } => path.accept(self),
        }
    }
}
