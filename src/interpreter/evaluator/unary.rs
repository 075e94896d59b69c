use crate::{
    ast::{PostfixOperator, PrefixOperator},
    interpreter::{evaluator::core::Evaluator, value::core::Value},
};

impl Evaluator {
    /// Applies a prefix operator to an evaluated operand.
    ///
    /// `-` negates integers and floats; `!` inverts truthiness and accepts
    /// any value.
    pub(crate) fn eval_prefix(op: PrefixOperator, right: &Value) -> Value {
        match (op, right) {
            (PrefixOperator::Not, value) => Value::Boolean(!value.is_truthy()),
            (PrefixOperator::Negate, Value::Integer(n)) => {
                n.checked_neg()
                 .map_or_else(|| Value::error(format!("integer overflow: -{n}")), Value::Integer)
            },
            (PrefixOperator::Negate, Value::Float(x)) => Value::Float(-x),
            (PrefixOperator::Negate, other) => {
                Value::error(format!("unknown operator: -{}", other.type_name()))
            },
        }
    }

    /// Evaluates `name++` or `name--`.
    ///
    /// The variable is rebound to its successor or predecessor wherever it
    /// is defined in the scope chain.
    ///
    /// # Returns
    /// The value held before the update.
    pub(crate) fn eval_postfix(&mut self, op: PostfixOperator, name: &str) -> Value {
        let Some(current) = self.env.get(name) else {
            return Value::error(format!("identifier not found: {name}"));
        };
        let updated = match (op, &current) {
            (PostfixOperator::Increment, Value::Integer(n)) => n.checked_add(1).map(Value::Integer),
            (PostfixOperator::Decrement, Value::Integer(n)) => n.checked_sub(1).map(Value::Integer),
            (PostfixOperator::Increment, Value::Float(x)) => Some(Value::Float(x + 1.0)),
            (PostfixOperator::Decrement, Value::Float(x)) => Some(Value::Float(x - 1.0)),
            (_, other) => {
                return Value::error(format!("unknown operator: {}{op}", other.type_name()));
            },
        };
        match updated {
            Some(value) => {
                self.env.assign(name, value);
                current
            },
            None => Value::error(format!("integer overflow: {name}{op}")),
        }
    }
}
