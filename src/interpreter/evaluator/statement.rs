use std::rc::Rc;

use crate::{
    ast::{Assignment, Expr, Statement},
    interpreter::{
        evaluator::{
            binary::eval_infix,
            core::{EvalResult, Evaluator},
            utils::try_value,
        },
        value::core::{EnumValue, Value},
    },
};

impl Evaluator {
    /// Evaluates one statement.
    ///
    /// Declarations and deletions yield `null`; assignments yield the stored
    /// value; `return` and `break` yield their signals.
    pub(crate) fn eval_statement(&mut self, statement: &Statement) -> EvalResult<Value> {
        match statement {
            Statement::Var { name, value, .. } => {
                let value = try_value!(self, value);
                self.env.define(name.as_str(), value);
                Ok(Value::Null)
            },
            Statement::Assignment(assignment) => self.eval_assignment(assignment),
            Statement::Return { value, .. } => {
                let value = match value {
                    Some(expr) => try_value!(self, expr),
                    None => Value::Null,
                };
                Ok(Value::ReturnValue(Box::new(value)))
            },
            Statement::Break { .. } => Ok(Value::Break),
            Statement::Delete { target, .. } => self.eval_delete(target),
            Statement::Enum { name, branches, .. } => self.eval_enum(name, branches),
            Statement::Expression { expr, .. } => expr.accept(self),
        }
    }

    /// Evaluates `target = value` and the compound forms.
    ///
    /// A compound assignment reads the current value first and combines it
    /// with the right-hand side as the matching binary operator would.
    ///
    /// # Returns
    /// The value that was stored, or an error value if the target does not
    /// exist or the combination fails.
    pub(crate) fn eval_assignment(&mut self, assignment: &Assignment) -> EvalResult<Value> {
        match assignment.target.as_ref() {
            Expr::Identifier { name, .. } => {
                let Some(current) = self.env.get(name) else {
                    return Ok(Value::error(format!("identifier not found: {name}")));
                };
                let value = try_value!(self, assignment.value);
                let value = match assignment.op {
                    Some(op) => eval_infix(op, &current, &value),
                    None => value,
                };
                if value.is_error() {
                    return Ok(value);
                }
                self.env.assign(name, value.clone());
                Ok(value)
            },
            Expr::Index { left, index, .. } => {
                self.eval_index_assignment(left, index, assignment.op, &assignment.value)
            },
            other => Ok(Value::error(format!("invalid assignment target: {other}"))),
        }
    }

    /// Evaluates every branch and binds the resulting enum.
    fn eval_enum(&mut self, name: &str, branches: &[(String, Expr)]) -> EvalResult<Value> {
        let mut values = Vec::with_capacity(branches.len());
        for (branch, expr) in branches {
            let value = try_value!(self, expr);
            values.push((branch.clone(), value));
        }
        let value = EnumValue { name:     name.to_string(),
                                branches: values, };
        self.env.define(name, Value::Enum(Rc::new(value)));
        Ok(Value::Null)
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
    fn var_declares_and_yields_null() {
        assert_eq!(eval("var x = 5;"), Value::Null);
        assert_eq!(eval("var x = 5; var x = x * 2; x"), Value::Integer(10));
    }

    #[test]
    fn assignment_requires_an_existing_binding() {
        assert_eq!(eval("y = 1;"), Value::error("identifier not found: y"));
        assert_eq!(eval("var y = 0; y = 1"), Value::Integer(1));
    }

    #[test]
    fn assignment_is_an_expression() {
        assert_eq!(eval("var a = 0; var b = 0; a = b = 3; a + b"), Value::Integer(6));
    }

    #[test]
    fn compound_assignment() {
        assert_eq!(eval("var x = 10; x += 5; x -= 3; x *= 2; x"), Value::Integer(24));
        assert_eq!(eval("var x = 7; x /= 2; x"), Value::Float(3.5));
        assert_eq!(eval("var s = \"a\"; s += \"b\"; s"), Value::from("ab"));
        assert_eq!(eval("var x = 1; x += \"b\"; x"), Value::error("type mismatch: INTEGER + STRING"));
    }

    #[test]
    fn return_and_break_signals() {
        assert_eq!(eval("function f() { return; } f()"), Value::Null);
        assert_eq!(eval("break; 5"), Value::Null);
    }

    #[test]
    fn enum_branches_are_evaluated_once() {
        assert_eq!(eval("var n = 0; enum E { case A: n++; case B: n++ } [E::A, E::B, n]").to_string(),
                   "[0, 1, 2]");
        assert_eq!(eval("enum E { case A: missing }"),
                   Value::error("identifier not found: missing"));
    }
}
