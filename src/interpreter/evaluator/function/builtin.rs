use std::{
    io::Write,
    rc::Rc,
    time::{SystemTime, UNIX_EPOCH},
};

use rand::Rng;
use tracing::debug;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::{EvalResult, Evaluator},
        value::core::Value,
    },
    util::num::len_to_i64,
};

/// Error value for an argument of the wrong kind.
fn expected(name: &str, kind: &str, got: &Value) -> Value {
    Value::error(format!("argument to {name} must be {kind}, got {}", got.type_name()))
}

/// Returns the length of a string (in characters), array, or hash.
///
/// # Example
/// ```
/// use ember::{
///     config::Config,
///     interpreter::{evaluator::{core::Evaluator, function::builtin::len}, value::core::Value},
/// };
///
/// let mut evaluator = Evaluator::with_output(Config::default(), Box::new(std::io::sink()));
/// let n = len(&mut evaluator, &[Value::from("héllo")]).unwrap();
///
/// assert_eq!(n, Value::Integer(5));
/// ```
pub fn len(_: &mut Evaluator, args: &[Value]) -> EvalResult<Value> {
    Ok(match &args[0] {
        Value::Str(s) => Value::Integer(len_to_i64(s.chars().count())),
        Value::Array(items) => Value::Integer(len_to_i64(items.borrow().len())),
        Value::Hash(hash) => Value::Integer(len_to_i64(hash.borrow().len())),
        other => Value::error(format!("argument to len not supported, got {}", other.type_name())),
    })
}

/// Returns a copy of the first element of an array, or `null` if it is
/// empty.
pub fn first(_: &mut Evaluator, args: &[Value]) -> EvalResult<Value> {
    Ok(match &args[0] {
        Value::Array(items) => items.borrow().first().map_or(Value::Null, Value::deep_copy),
        other => expected("first", "ARRAY", other),
    })
}

/// Returns a copy of the last element of an array, or `null` if it is
/// empty.
pub fn last(_: &mut Evaluator, args: &[Value]) -> EvalResult<Value> {
    Ok(match &args[0] {
        Value::Array(items) => items.borrow().last().map_or(Value::Null, Value::deep_copy),
        other => expected("last", "ARRAY", other),
    })
}

/// Returns a copy of every element but the first, or `null` for an empty
/// array.
pub fn rest(_: &mut Evaluator, args: &[Value]) -> EvalResult<Value> {
    Ok(match &args[0] {
        Value::Array(items) => {
            let items = items.borrow();
            match items.split_first() {
                Some((_, tail)) => tail.iter().map(Value::deep_copy).collect::<Vec<_>>().into(),
                None => Value::Null,
            }
        },
        other => expected("rest", "ARRAY", other),
    })
}

/// Returns a new array holding copies of the elements of the first argument
/// followed by the second argument. The input array is left untouched; use
/// the `.push` method to append in place.
pub fn push(_: &mut Evaluator, args: &[Value]) -> EvalResult<Value> {
    Ok(match &args[0] {
        Value::Array(items) => {
            let mut copy: Vec<Value> = items.borrow().iter().map(Value::deep_copy).collect();
            copy.push(args[1].deep_copy());
            copy.into()
        },
        other => expected("push", "ARRAY", other),
    })
}

/// Writes each argument on its own line to the evaluator's output.
///
/// # Errors
/// `Output` if the sink cannot be written.
pub fn puts(evaluator: &mut Evaluator, args: &[Value]) -> EvalResult<Value> {
    for arg in args {
        writeln!(evaluator.out, "{arg}")?;
    }
    evaluator.out.flush()?;
    Ok(Value::Null)
}

/// Seconds since the Unix epoch.
pub fn time(_: &mut Evaluator, _: &[Value]) -> EvalResult<Value> {
    let seconds = SystemTime::now().duration_since(UNIX_EPOCH)
                                   .map(|elapsed| elapsed.as_secs())
                                   .unwrap_or_default();
    Ok(Value::Integer(i64::try_from(seconds).unwrap_or(i64::MAX)))
}

/// `rand()` yields a float in `[0, 1)`; `rand(n)` an integer in `[0, n)`.
pub fn random(evaluator: &mut Evaluator, args: &[Value]) -> EvalResult<Value> {
    Ok(match args.first() {
        None => Value::Float(evaluator.rng.r#gen::<f64>()),
        Some(Value::Integer(n)) if *n > 0 => Value::Integer(evaluator.rng.gen_range(0..*n)),
        Some(Value::Integer(n)) => Value::error(format!("argument to rand must be positive, got {n}")),
        Some(other) => expected("rand", "INTEGER", other),
    })
}

/// The command line arguments passed to the script.
pub fn args(evaluator: &mut Evaluator, _: &[Value]) -> EvalResult<Value> {
    Ok(evaluator.config
                .args
                .iter()
                .map(|arg| Value::from(arg.as_str()))
                .collect::<Vec<_>>()
                .into())
}

/// Ends the program with the given status, 0 by default.
///
/// # Errors
/// Always `Exit` for valid arguments; the host decides what exiting means.
pub fn exit(_: &mut Evaluator, args: &[Value]) -> EvalResult<Value> {
    let code = match args.first() {
        None => 0,
        Some(Value::Integer(n)) => match i32::try_from(*n) {
            Ok(code) => code,
            Err(_) => return Ok(Value::error(format!("exit status out of range: {n}"))),
        },
        Some(other) => return Ok(expected("exit", "INTEGER", other)),
    };
    Err(RuntimeError::Exit { code })
}

/// Loads a plugin registered with the host configuration.
pub fn plugin(evaluator: &mut Evaluator, args: &[Value]) -> EvalResult<Value> {
    let Value::Str(name) = &args[0] else {
        return Ok(expected("plugin", "STRING", &args[0]));
    };
    Ok(match evaluator.config.plugins.get(&**name) {
        Some(plugin) => {
            debug!(plugin = %name, "loading plugin");
            Value::Plugin(Rc::clone(plugin))
        },
        None => Value::error(format!("plugin not found: {name}")),
    })
}

/// The kind tag of a value, e.g. `"INTEGER"`.
pub fn type_of(_: &mut Evaluator, args: &[Value]) -> EvalResult<Value> {
    Ok(Value::from(args[0].type_name()))
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, io};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        config::Config,
        interpreter::{parser::core::parse_program, value::plugin::Plugin},
    };

    #[derive(Clone, Default)]
    struct Captured(Rc<RefCell<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn run(config: Config, source: &str) -> (EvalResult<Value>, String) {
        let (program, errors) = parse_program(source);
        assert!(errors.is_empty(), "parse errors: {errors:?}");
        let out = Captured::default();
        let mut evaluator = Evaluator::with_output(config, Box::new(out.clone()));
        let result = evaluator.eval_program(&program);
        let printed = String::from_utf8(out.0.borrow().clone()).unwrap();
        (result, printed)
    }

    fn eval(source: &str) -> Value {
        run(Config::default(), source).0.unwrap()
    }

    #[test]
    fn len_counts_characters_and_entries() {
        assert_eq!(eval("len(\"\")"), Value::Integer(0));
        assert_eq!(eval("len(\"four\")"), Value::Integer(4));
        assert_eq!(eval("len([1, 2, 3])"), Value::Integer(3));
        assert_eq!(eval("len({\"a\": 1})"), Value::Integer(1));
        assert_eq!(eval("len(1)"), Value::error("argument to len not supported, got INTEGER"));
    }

    #[test]
    fn sequence_helpers() {
        assert_eq!(eval("first([1, 2, 3])"), Value::Integer(1));
        assert_eq!(eval("last([1, 2, 3])"), Value::Integer(3));
        assert_eq!(eval("rest([1, 2, 3])").to_string(), "[2, 3]");
        assert_eq!(eval("first([])"), Value::Null);
        assert_eq!(eval("rest([])"), Value::Null);
        assert_eq!(eval("push([1], 2)").to_string(), "[1, 2]");
        assert_eq!(eval("first(1)"), Value::error("argument to first must be ARRAY, got INTEGER"));
    }

    #[test]
    fn helpers_never_alias_their_input() {
        assert_eq!(eval("var a = [[0, 1]]; var b = first(a); b[0] = b[0] + 1; a[0][0]"),
                   Value::Integer(0));
        assert_eq!(eval("var a = [1]; var b = push(a, 2); b[0] = 9; [a, b]").to_string(),
                   "[[1], [9, 2]]");
        assert_eq!(eval("var a = [[1], [2]]; var r = rest(a); r[0][0] = 5; a").to_string(),
                   "[[1], [2]]");
    }

    #[test]
    fn puts_writes_lines() {
        let (result, printed) = run(Config::default(), "puts(\"a\", 1, [\"b\"]); puts()");
        assert_eq!(result.unwrap(), Value::Null);
        assert_eq!(printed, "a\n1\n[\"b\"]\n");
    }

    #[test]
    fn seeded_rand_is_reproducible() {
        let source = "[rand(), rand(100), rand(100)]";
        let (first, _) = run(Config::default().with_seed(42), source);
        let (second, _) = run(Config::default().with_seed(42), source);
        assert_eq!(first.unwrap(), second.unwrap());

        assert_eq!(eval("var r = rand(3); r >= 0 && r < 3"), Value::Boolean(true));
        assert_eq!(eval("var r = rand(); r >= 0 && r < 1"), Value::Boolean(true));
        assert_eq!(eval("rand(0)"), Value::error("argument to rand must be positive, got 0"));
    }

    #[test]
    fn args_come_from_the_config() {
        let config = Config::default().with_args(vec!["in.txt".into(), "-v".into()]);
        assert_eq!(run(config, "args()").0.unwrap().to_string(), r#"["in.txt", "-v"]"#);
        assert_eq!(eval("args()").to_string(), "[]");
    }

    #[test]
    fn exit_is_fatal() {
        let (result, printed) = run(Config::default(), "puts(1); exit(3); puts(2)");
        assert!(matches!(result, Err(RuntimeError::Exit { code: 3 })));
        assert_eq!(printed, "1\n");
        assert!(matches!(run(Config::default(), "exit()").0, Err(RuntimeError::Exit { code: 0 })));
    }

    #[test]
    fn plugins_resolve_through_the_config() {
        fn square(args: &[Value]) -> Value {
            match args {
                [Value::Integer(n)] => Value::Integer(n * n),
                _ => Value::error("square expects one integer"),
            }
        }

        let config = Config::default().with_plugin(Plugin::new("math").with_function("square", square));
        assert_eq!(run(config, "plugin(\"math\").square(7)").0.unwrap(), Value::Integer(49));
        assert_eq!(eval("plugin(\"math\")"), Value::error("plugin not found: math"));
    }

    #[test]
    fn type_names() {
        assert_eq!(eval("type(1)"), Value::from("INTEGER"));
        assert_eq!(eval("type(len)"), Value::from("BUILTIN"));
        assert_eq!(eval("type(function() {})"), Value::from("FUNCTION"));
    }

    #[test]
    fn time_is_after_2020() {
        assert!(matches!(eval("time()"), Value::Integer(t) if t > 1_577_836_800));
    }
}
