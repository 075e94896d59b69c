use crate::{
    ast::{Block, Expr, Statement},
    interpreter::{
        environment::Environment,
        evaluator::core::{EvalResult, Evaluator},
        value::core::Value,
    },
};

impl Evaluator {
    /// Evaluates `for (initializer; condition; update) { body }`.
    ///
    /// The initializer runs once in a scope of its own, so loop variables do
    /// not leak. A missing condition loops until `break` or `return`.
    ///
    /// # Returns
    /// The value of the body's last pass, `null` if the loop ended with
    /// `break` or never ran, or the signal that ended the loop (a `return`
    /// or an error).
    pub(crate) fn eval_for(&mut self,
                           initializer: Option<&Statement>,
                           condition: Option<&Expr>,
                           update: Option<&Expr>,
                           body: &Block)
                           -> EvalResult<Value> {
        let scope = Environment::enclosed(&self.env);
        self.with_env(scope, |this| {
                if let Some(initializer) = initializer {
                    let value = initializer.accept(this)?;
                    if value.is_signal() {
                        return Ok(value);
                    }
                }

                let mut result = Value::Null;
                loop {
                    if let Some(condition) = condition {
                        let value = condition.accept(this)?;
                        if value.is_signal() {
                            return Ok(value);
                        }
                        if !value.is_truthy() {
                            break;
                        }
                    }

                    result = this.eval_block(body)?;
                    match result {
                        Value::Break => return Ok(Value::Null),
                        Value::ReturnValue(_) | Value::Error(_) => return Ok(result),
                        _ => {},
                    }

                    if let Some(update) = update {
                        let value = update.accept(this)?;
                        if value.is_signal() {
                            return Ok(value);
                        }
                    }
                }
                Ok(result)
            })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{config::Config, interpreter::parser::core::parse_program};

    fn eval(source: &str) -> Value {
        let (program, errors) = parse_program(source);
        assert!(errors.is_empty(), "parse errors: {errors:?}");
        let mut evaluator = Evaluator::with_output(Config::default(), Box::new(std::io::sink()));
        evaluator.eval_program(&program).unwrap()
    }

    #[test]
    fn counts_and_accumulates() {
        assert_eq!(eval("var sum = 0; for (var i = 1; i <= 10; i++) { sum += i; } sum"),
                   Value::Integer(55));
    }

    #[test]
    fn yields_the_last_body_value() {
        assert_eq!(eval("for (var i = 0; i < 3; i++) { i * 10 }"), Value::Integer(20));
        assert_eq!(eval("for (var i = 0; i < 0; i++) { i }"), Value::Null);
    }

    #[test]
    fn loop_variables_stay_inside() {
        assert_eq!(eval("for (var i = 0; i < 3; i++) {} i"),
                   Value::error("identifier not found: i"));
    }

    #[test]
    fn break_ends_only_the_innermost_loop() {
        let source = "var hits = 0;
                      for (var i = 0; i < 3; i++) {
                          for (;;) { hits++; break; }
                      }
                      hits";
        assert_eq!(eval(source), Value::Integer(3));
        assert_eq!(eval("for (;;) { break; }"), Value::Null);
    }

    #[test]
    fn return_passes_through_loops() {
        let source = "function find(xs, target) {
                          for (var i = 0; i < len(xs); i++) {
                              if (xs[i] == target) { return i; }
                          }
                          return -1;
                      };
                      [find([4, 5, 6], 6), find([4, 5, 6], 7)]";
        assert_eq!(eval(source).to_string(), "[2, -1]");
    }

    #[test]
    fn errors_stop_the_loop() {
        assert_eq!(eval("for (var i = 0; i < 3; i++) { missing }"),
                   Value::error("identifier not found: missing"));
        assert_eq!(eval("for (var i = 0; nope; i++) { 1 }"),
                   Value::error("identifier not found: nope"));
    }
}
