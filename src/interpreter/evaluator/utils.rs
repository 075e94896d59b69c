use crate::{
    ast::Expr,
    interpreter::{
        evaluator::core::{EvalResult, Evaluator},
        value::core::Value,
    },
};

/// Evaluates a node and returns early from the enclosing function when the
/// result is an error, a `return`, or a `break`.
///
/// The enclosing function must return `EvalResult<Value>`.
macro_rules! try_value {
    ($evaluator:expr, $node:expr) => {{
        let value = $node.accept($evaluator)?;
        if value.is_signal() {
            return Ok(value);
        }
        value
    }};
}

pub(crate) use try_value;

impl Evaluator {
    /// Evaluates expressions left to right.
    ///
    /// # Returns
    /// `Ok(values)` when every expression produced an ordinary value, or
    /// `Err(signal)` carrying the first error or control-flow signal
    /// unchanged. Later expressions are not evaluated after a signal.
    pub(crate) fn eval_expressions(&mut self, exprs: &[Expr]) -> EvalResult<Result<Vec<Value>, Value>> {
        let mut values = Vec::with_capacity(exprs.len());
        for expr in exprs {
            let value = expr.accept(self)?;
            if value.is_signal() {
                return Ok(Err(value));
            }
            values.push(value);
        }
        Ok(Ok(values))
    }
}
