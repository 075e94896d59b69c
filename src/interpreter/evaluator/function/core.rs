use std::{fmt, rc::Rc};

use tracing::trace;

use crate::{
    ast::{Expr, Parameter},
    error::RuntimeError,
    interpreter::{
        environment::Environment,
        evaluator::{
            core::{EvalResult, Evaluator},
            function::builtin,
            utils::try_value,
        },
        value::core::{Function, Value},
    },
};

/// Type alias for builtin function handlers.
///
/// A builtin receives the evaluator, for output, randomness and host
/// settings, and a slice of evaluated argument values. Script-level failures
/// are returned as [`Value::Error`].
pub type BuiltinFn = fn(&mut Evaluator, &[Value]) -> EvalResult<Value>;

/// Specifies the allowed number of arguments for a builtin.
///
/// - `Exact(n)` means the builtin must receive exactly `n` arguments.
/// - `OneOf(slice)` means the builtin accepts any arity listed in `slice`.
/// - `Any` accepts every argument count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    OneOf(&'static [usize]),
    Any,
}

impl Arity {
    /// Tests whether the given argument count satisfies this arity constraint.
    #[must_use]
    pub fn check(self, n: usize) -> bool {
        match self {
            Self::Exact(m) => n == m,
            Self::OneOf(counts) => counts.contains(&n),
            Self::Any => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "{n}"),
            Self::OneOf(counts) => {
                let counts: Vec<String> = counts.iter().map(ToString::to_string).collect();
                f.write_str(&counts.join(" or "))
            },
            Self::Any => f.write_str("any number"),
        }
    }
}

/// An entry of the builtin registry, as held by [`Value::Builtin`].
#[derive(Clone, Copy)]
pub struct Builtin {
    /// The name scripts call it by.
    pub name:  &'static str,
    /// Accepted argument counts.
    pub arity: Arity,
    /// The implementation.
    pub func:  BuiltinFn,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builtin")
         .field("name", &self.name)
         .field("arity", &self.arity)
         .finish_non_exhaustive()
    }
}

/// Defines builtin functions by generating a lookup table and a name list.
///
/// Each entry provides:
/// - a string name,
/// - an arity specification,
/// - a function pointer implementing the builtin.
///
/// The macro produces:
/// - `BUILTIN_TABLE` (static table for lookup),
/// - `BUILTIN_FUNCTIONS` (public list of builtin names).
macro_rules! builtin_functions {
    (
        $(
            $name:literal => {
                arity: $arity:expr,
                func: $func:expr $(,)?
            }
        ),* $(,)?
    ) => {
        static BUILTIN_TABLE: &[Builtin] = &[
            $(
                Builtin { name: $name, arity: $arity, func: $func },
            )*
        ];
        pub const BUILTIN_FUNCTIONS: &[&str] = &[
            $($name,)*
        ];
    };
}

builtin_functions! {
    "len"    => { arity: Arity::Exact(1), func: builtin::len },
    "first"  => { arity: Arity::Exact(1), func: builtin::first },
    "last"   => { arity: Arity::Exact(1), func: builtin::last },
    "rest"   => { arity: Arity::Exact(1), func: builtin::rest },
    "push"   => { arity: Arity::Exact(2), func: builtin::push },
    "puts"   => { arity: Arity::Any, func: builtin::puts },
    "time"   => { arity: Arity::Exact(0), func: builtin::time },
    "rand"   => { arity: Arity::OneOf(&[0, 1]), func: builtin::random },
    "args"   => { arity: Arity::Exact(0), func: builtin::args },
    "exit"   => { arity: Arity::OneOf(&[0, 1]), func: builtin::exit },
    "plugin" => { arity: Arity::Exact(1), func: builtin::plugin },
    "type"   => { arity: Arity::Exact(1), func: builtin::type_of },
}

/// Finds a builtin by name.
///
/// # Example
/// ```
/// use ember::interpreter::evaluator::function::core::{BUILTIN_FUNCTIONS, lookup_builtin};
///
/// assert!(lookup_builtin("len").is_some());
/// assert!(lookup_builtin("nope").is_none());
/// assert!(BUILTIN_FUNCTIONS.contains(&"puts"));
/// ```
#[must_use]
pub fn lookup_builtin(name: &str) -> Option<Builtin> {
    BUILTIN_TABLE.iter().find(|b| b.name == name).copied()
}

impl Evaluator {
    /// Evaluates a call expression.
    ///
    /// The callee is evaluated first, then the arguments left to right; the
    /// first error among them is the result of the call.
    pub(crate) fn eval_call(&mut self, function: &Expr, arguments: &[Expr]) -> EvalResult<Value> {
        let callee = try_value!(self, function);
        match self.eval_expressions(arguments)? {
            Ok(args) => self.apply_function(&callee, &args),
            Err(signal) => Ok(signal),
        }
    }

    /// Applies a function value to evaluated arguments.
    ///
    /// # Errors
    /// Fatal conditions raised by the callee, such as exceeding the call
    /// depth or `exit`.
    pub(crate) fn apply_function(&mut self, callee: &Value, args: &[Value]) -> EvalResult<Value> {
        match callee {
            Value::Function(function) => self.call_closure(function, args),
            Value::Builtin(builtin) => {
                if !builtin.arity.check(args.len()) {
                    return Ok(Value::error(format!("wrong number of arguments to {}: expected {}, got {}",
                                                   builtin.name,
                                                   builtin.arity,
                                                   args.len())));
                }
                (builtin.func)(self, args)
            },
            other => Ok(Value::error(format!("not a function: {}", other.type_name()))),
        }
    }

    /// Executes a user-defined function.
    ///
    /// The call scope encloses the scope the function was defined in, not
    /// the caller's. Omitted trailing arguments take their parameter
    /// defaults, which are evaluated in the call scope so they can refer to
    /// earlier parameters.
    ///
    /// # Returns
    /// The value passed to `return`, or the value of the body's last
    /// statement.
    ///
    /// # Errors
    /// `StackOverflow` when the call would exceed the configured depth.
    fn call_closure(&mut self, function: &Rc<Function>, args: &[Value]) -> EvalResult<Value> {
        let parameters = &function.literal.parameters;
        let required = parameters.iter()
                                 .filter(|p| matches!(p, Parameter::Required(_)))
                                 .count();
        if args.len() < required || args.len() > parameters.len() {
            let expected = if required == parameters.len() {
                required.to_string()
            } else {
                format!("{required} to {}", parameters.len())
            };
            return Ok(Value::error(format!("wrong number of arguments: expected {expected}, got {}",
                                           args.len())));
        }

        let limit = self.config.max_call_depth;
        if self.depth >= limit {
            return Err(RuntimeError::StackOverflow { depth: limit });
        }

        trace!(function = function.literal.name.as_deref().unwrap_or("<anonymous>"),
               depth = self.depth + 1,
               "call");

        let scope = Environment::enclosed(&function.env);
        self.depth += 1;
        let result = self.with_env(scope, |this| {
                             for (i, parameter) in parameters.iter().enumerate() {
                                 let value = match (args.get(i), parameter) {
                                     (Some(arg), _) => arg.clone(),
                                     (None, Parameter::Defaulted { default, .. }) => {
                                         try_value!(this, default)
                                     },
                                     (None, Parameter::Required(_)) => Value::Null,
                                 };
                                 this.env.define(parameter.name(), value);
                             }
                             this.eval_statements(&function.literal.body.statements)
                         });
        self.depth -= 1;

        Ok(match result? {
               Value::ReturnValue(value) => *value,
               Value::Break => Value::Null,
               other => other,
           })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{config::Config, interpreter::parser::core::parse_program};

    fn run(config: Config, source: &str) -> EvalResult<Value> {
        let (program, errors) = parse_program(source);
        assert!(errors.is_empty(), "parse errors: {errors:?}");
        let mut evaluator = Evaluator::with_output(config, Box::new(std::io::sink()));
        evaluator.eval_program(&program)
    }

    fn eval(source: &str) -> Value {
        run(Config::default(), source).unwrap()
    }

    #[test]
    fn arity_display() {
        assert_eq!(Arity::Exact(2).to_string(), "2");
        assert_eq!(Arity::OneOf(&[0, 1]).to_string(), "0 or 1");
        assert!(Arity::Any.check(7));
        assert!(!Arity::OneOf(&[0, 1]).check(2));
    }

    #[test]
    fn implicit_and_explicit_returns() {
        assert_eq!(eval("function add(a, b) { a + b } add(2, 3)"), Value::Integer(5));
        assert_eq!(eval("var f = function(x) { return x * 2; 99 }; f(4)"), Value::Integer(8));
        assert_eq!(eval("function f() {} f()"), Value::Null);
    }

    #[test]
    fn defaults_fill_omitted_arguments() {
        let source = "function greet(name, greeting = \"hello\", mark = greeting + \"!\") {
                          greeting + \", \" + name + mark
                      }";
        assert_eq!(eval(&format!("{source} greet(\"ember\")")),
                   Value::from("hello, emberhello!"));
        assert_eq!(eval(&format!("{source} greet(\"ember\", \"hi\", \"?\")")),
                   Value::from("hi, ember?"));
    }

    #[test]
    fn arity_errors() {
        assert_eq!(eval("function f(a) { a } f()"),
                   Value::error("wrong number of arguments: expected 1, got 0"));
        assert_eq!(eval("function f(a, b = 1) { a } f(1, 2, 3)"),
                   Value::error("wrong number of arguments: expected 1 to 2, got 3"));
        assert_eq!(eval("len(1, 2)"),
                   Value::error("wrong number of arguments to len: expected 1, got 2"));
    }

    #[test]
    fn only_functions_are_callable() {
        assert_eq!(eval("var x = 1; x()"), Value::error("not a function: INTEGER"));
        assert_eq!(eval("f(1)"), Value::error("identifier not found: f"));
        assert_eq!(eval("function f(a) { a } f(missing)"),
                   Value::error("identifier not found: missing"));
    }

    #[test]
    fn closures_use_their_defining_scope() {
        let source = "function make_adder(n) { function(x) { x + n } }
                      var n = 100;
                      var add2 = make_adder(2);
                      add2(1)";
        assert_eq!(eval(source), Value::Integer(3));
    }

    #[test]
    fn recursion() {
        let source = "function fib(n) { if (n < 2) { return n; } fib(n - 1) + fib(n - 2) }
                      fib(15)";
        assert_eq!(eval(source), Value::Integer(610));
    }

    #[test]
    fn runaway_recursion_is_fatal() {
        let config = Config::default().with_max_call_depth(50);
        let result = run(config, "function f(n) { f(n + 1) } f(0)");
        assert!(matches!(result, Err(RuntimeError::StackOverflow { depth: 50 })));
    }

    #[test]
    fn depth_is_released_after_calls() {
        let config = Config::default().with_max_call_depth(10);
        let source = "function down(n) { if (n > 0) { down(n - 1) } }
                      for (var i = 0; i < 5; i++) { down(8) }
                      \"done\"";
        assert_eq!(run(config, source).unwrap(), Value::from("done"));
    }
}
