use std::{
    io::{self, Write},
    path::PathBuf,
    rc::Rc,
};

use rand::{SeedableRng, rngs::StdRng};

use crate::{
    ast::{Block, Expr, Program, Statement, Visitor},
    config::Config,
    error::RuntimeError,
    interpreter::{
        environment::Environment,
        evaluator::{binary::eval_infix, function::core::lookup_builtin, utils::try_value},
        value::{
            core::{Function, Value},
            hash_key::HashObject,
        },
    },
    util::stack::ensure_sufficient_stack,
};

/// Result type used by the evaluator.
///
/// Errors inside a script are [`Value::Error`] values on the `Ok` side. The
/// `Err` side is reserved for conditions that end the run: exceeding the
/// call depth, `exit`, or a failing output sink.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// The tree-walking evaluator.
///
/// Holds the current scope, the host configuration, the output sink used by
/// `puts`, the random number generator, and the bookkeeping for call depth
/// and in-progress imports.
///
/// ## Usage
///
/// An `Evaluator` is created once per program run. Bindings made by one call
/// to [`Evaluator::eval_program`] remain visible to the next, which is how a
/// host can feed a program in pieces.
///
/// ```
/// use ember::{
///     config::Config,
///     interpreter::{evaluator::core::Evaluator, parser::core::parse_program, value::core::Value},
/// };
///
/// let mut evaluator = Evaluator::with_output(Config::default(), Box::new(std::io::sink()));
///
/// let (program, _) = parse_program("var x = 20;");
/// evaluator.eval_program(&program).unwrap();
///
/// let (program, _) = parse_program("x + 1");
/// assert_eq!(evaluator.eval_program(&program).unwrap(), Value::Integer(21));
/// ```
pub struct Evaluator {
    /// The innermost scope of the code being evaluated.
    pub(crate) env:     Environment,
    /// Host settings: arguments, import root, limits, plugins.
    pub(crate) config:  Config,
    /// Where `puts` writes.
    pub(crate) out:     Box<dyn Write>,
    /// Source for `rand`.
    pub(crate) rng:     StdRng,
    /// Number of user function calls currently active.
    pub(crate) depth:   usize,
    /// Files being imported, outermost first.
    pub(crate) imports: Vec<PathBuf>,
}

impl Evaluator {
    /// Creates an evaluator that prints to standard output.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_output(config, Box::new(io::stdout()))
    }

    /// Creates an evaluator that prints to `out`.
    #[must_use]
    pub fn with_output(config: Config, out: Box<dyn Write>) -> Self {
        let rng = config.seed
                        .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self { env: Environment::new(),
               config,
               out,
               rng,
               depth: 0,
               imports: Vec::new() }
    }

    /// The global scope (or the current scope while evaluating).
    #[must_use]
    pub const fn environment(&self) -> &Environment {
        &self.env
    }

    /// Evaluates a program in the global scope.
    ///
    /// Statements run in order until one produces an error or a top-level
    /// `return`. A `return` ends the program with its value; a stray `break`
    /// ends it with `null`.
    ///
    /// # Returns
    /// The value of the last statement, the returned value, or the first
    /// error value.
    ///
    /// # Errors
    /// Fatal conditions only; see [`RuntimeError`].
    pub fn eval_program(&mut self, program: &Program) -> EvalResult<Value> {
        let mut result = Value::Null;
        for statement in &program.statements {
            result = statement.accept(self)?;
            match result {
                Value::ReturnValue(value) => return Ok(*value),
                Value::Break => return Ok(Value::Null),
                Value::Error(_) => return Ok(result),
                _ => {},
            }
        }
        Ok(result)
    }

    /// Runs `f` with `env` as the current scope, restoring the previous scope
    /// afterwards, including when `f` fails.
    pub(crate) fn with_env<T>(&mut self, env: Environment, f: impl FnOnce(&mut Self) -> T) -> T {
        let previous = std::mem::replace(&mut self.env, env);
        let result = f(self);
        self.env = previous;
        result
    }

    /// Evaluates a block in a fresh scope enclosing the current one.
    pub(crate) fn eval_block(&mut self, block: &Block) -> EvalResult<Value> {
        let scope = Environment::enclosed(&self.env);
        self.with_env(scope, |this| this.eval_statements(&block.statements))
    }

    /// Evaluates statements in the current scope.
    ///
    /// Stops at the first error, `return`, or `break` and yields that signal
    /// unchanged; otherwise yields the value of the last statement, or
    /// `null` for an empty list.
    pub(crate) fn eval_statements(&mut self, statements: &[Statement]) -> EvalResult<Value> {
        let mut result = Value::Null;
        for statement in statements {
            result = statement.accept(self)?;
            if result.is_signal() {
                break;
            }
        }
        Ok(result)
    }

    /// Resolves a name: the scope chain first, then the builtin registry.
    pub(crate) fn lookup(&self, name: &str) -> Value {
        if let Some(value) = self.env.get(name) {
            return value;
        }
        lookup_builtin(name).map_or_else(|| Value::error(format!("identifier not found: {name}")),
                                         Value::Builtin)
    }

    /// Evaluates an expression.
    ///
    /// The evaluator dispatches based on expression variant; each composite
    /// form checks its operands and propagates the first error or signal.
    fn eval_expression(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Integer { value, .. } => Ok(Value::Integer(*value)),
            Expr::Float { value, .. } => Ok(Value::Float(*value)),
            Expr::Str { value, .. } => Ok(Value::from(value.as_str())),
            Expr::Boolean { value, .. } => Ok(Value::Boolean(*value)),
            Expr::Null { .. } => Ok(Value::Null),
            Expr::Identifier { name, .. } => Ok(self.lookup(name)),
            Expr::Prefix { op, right, .. } => {
                let right = try_value!(self, right);
                Ok(Self::eval_prefix(*op, &right))
            },
            Expr::Infix { left, op, right, .. } => {
                let left = try_value!(self, left);
                let right = try_value!(self, right);
                Ok(eval_infix(*op, &left, &right))
            },
            Expr::Postfix { op, name, .. } => Ok(self.eval_postfix(*op, name)),
            Expr::Assign(assignment) => self.eval_assignment(assignment),
            Expr::Call { function,
                         arguments,
                         .. } => self.eval_call(function, arguments),
            Expr::Index { left, index, .. } => self.eval_index(left, index),
            Expr::Array { elements, .. } => Ok(match self.eval_expressions(elements)? {
                                                   Ok(values) => values.into(),
                                                   Err(signal) => signal,
                                               }),
            Expr::Hash { pairs, .. } => self.eval_hash_literal(pairs),
            Expr::If { condition,
                       consequence,
                       alternative,
                       .. } => {
                let condition = try_value!(self, condition);
                if condition.is_truthy() {
                    self.eval_block(consequence)
                } else {
                    alternative.as_ref()
                               .map_or(Ok(Value::Null), |block| self.eval_block(block))
                }
            },
            Expr::Ternary { condition,
                            consequence,
                            alternative,
                            .. } => {
                let condition = try_value!(self, condition);
                if condition.is_truthy() {
                    consequence.accept(self)
                } else {
                    alternative.accept(self)
                }
            },
            Expr::Elvis { left, right, .. } => {
                let left = try_value!(self, left);
                if left.is_truthy() {
                    Ok(left)
                } else {
                    right.accept(self)
                }
            },
            Expr::For { initializer,
                        condition,
                        update,
                        body,
                        .. } => self.eval_for(initializer.as_deref(),
                                              condition.as_deref(),
                                              update.as_deref(),
                                              body),
            Expr::Function { literal, .. } => {
                let closure = Value::Function(Rc::new(Function { literal: Rc::clone(literal),
                                                                 env:     self.env.clone(), }));
                if let Some(name) = &literal.name {
                    self.env.define(name.as_str(), closure.clone());
                }
                Ok(closure)
            },
            Expr::MethodCall { receiver,
                               method,
                               arguments,
                               .. } => {
                let receiver = try_value!(self, receiver);
                Ok(match self.eval_expressions(arguments)? {
                       Ok(args) => receiver.call_method(method, &args),
                       Err(signal) => signal,
                   })
            },
            Expr::ScopeAccess { name, branch, .. } => Ok(self.eval_scope_access(name, branch)),
            Expr::Import { path, .. } => self.eval_import(path),
        }
    }

    /// Builds a hash from literal pairs. Keys must be hashable.
    fn eval_hash_literal(&mut self, pairs: &[(Expr, Expr)]) -> EvalResult<Value> {
        let mut hash = HashObject::default();
        for (key, value) in pairs {
            let key = try_value!(self, key);
            if key.hash_key().is_none() {
                return Ok(Value::error(format!("unusable as hash key: {}", key.type_name())));
            }
            let value = try_value!(self, value);
            hash.insert(key, value);
        }
        Ok(hash.into())
    }

    /// Reads `Name::Branch`.
    fn eval_scope_access(&self, name: &str, branch: &str) -> Value {
        match self.lookup(name) {
            Value::Enum(e) => {
                e.get(branch)
                 .cloned()
                 .unwrap_or_else(|| Value::error(format!("enum {name} has no case {branch}")))
            },
            error @ Value::Error(_) => error,
            _ => Value::error(format!("{name} is not an enum")),
        }
    }
}

impl Visitor for Evaluator {
    type Output = EvalResult<Value>;

    fn visit_statement(&mut self, statement: &Statement) -> EvalResult<Value> {
        self.eval_statement(statement)
    }

    fn visit_expression(&mut self, expr: &Expr) -> EvalResult<Value> {
        ensure_sufficient_stack(|| self.eval_expression(expr))
    }
}
