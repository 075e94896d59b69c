use crate::{
    ast::{Expr, InfixOperator},
    interpreter::{
        evaluator::{
            binary::eval_infix,
            core::{EvalResult, Evaluator},
            utils::try_value,
        },
        value::{core::Value, methods::hashable},
    },
    util::num::i64_to_index,
};

impl Evaluator {
    /// Evaluates `left[index]`.
    pub(crate) fn eval_index(&mut self, left: &Expr, index: &Expr) -> EvalResult<Value> {
        let container = try_value!(self, left);
        let index = try_value!(self, index);
        Ok(index_value(&container, &index))
    }

    /// Evaluates `left[index] = value` and its compound forms.
    ///
    /// The container, the index and the right-hand side are evaluated in
    /// that order before anything is written. Arrays accept indices up to
    /// their length, where writing appends; hashes insert or overwrite.
    ///
    /// # Returns
    /// The stored value.
    pub(crate) fn eval_index_assignment(&mut self,
                                        left: &Expr,
                                        index: &Expr,
                                        op: Option<InfixOperator>,
                                        value: &Expr)
                                        -> EvalResult<Value> {
        let container = try_value!(self, left);
        let index = try_value!(self, index);
        let value = try_value!(self, value);
        let value = match op {
            Some(op) => {
                let current = index_value(&container, &index);
                if current.is_error() {
                    return Ok(current);
                }
                eval_infix(op, &current, &value)
            },
            None => value,
        };
        if value.is_error() {
            return Ok(value);
        }

        match (&container, &index) {
            (Value::Array(items), Value::Integer(i)) => {
                let mut items = items.borrow_mut();
                let len = items.len();
                match i64_to_index(*i) {
                    Some(slot) if slot < len => items[slot] = value.clone(),
                    Some(slot) if slot == len => items.push(value.clone()),
                    _ => return Ok(Value::error(format!("index out of range: {i} (length {len})"))),
                }
            },
            (Value::Array(_), other) => {
                return Ok(Value::error(format!("array index must be INTEGER, got {}",
                                               other.type_name())));
            },
            (Value::Hash(hash), key) => {
                if let Err(message) = hashable(key) {
                    return Ok(Value::Error(message));
                }
                hash.borrow_mut().insert(key.clone(), value.clone());
            },
            (other, _) => {
                return Ok(Value::error(format!("index assignment not supported: {}",
                                               other.type_name())));
            },
        }
        Ok(value)
    }

    /// Evaluates `delete name[index]`.
    ///
    /// The container must be a variable bound to an array or hash; deleting
    /// from a temporary such as a literal or a call result is an error.
    /// Removing an array element shifts the following elements down.
    /// Deleting a missing hash key does nothing.
    pub(crate) fn eval_delete(&mut self, target: &Expr) -> EvalResult<Value> {
        let Expr::Index { left, index, .. } = target else {
            return Ok(Value::error(format!("cannot delete {target}")));
        };
        if !matches!(**left, Expr::Identifier { .. }) {
            return Ok(Value::error(format!("delete target must be an identifier, got {left}")));
        }
        let container = try_value!(self, left);
        let index = try_value!(self, index);

        Ok(match (&container, &index) {
            (Value::Array(items), Value::Integer(i)) => {
                let mut items = items.borrow_mut();
                let len = items.len();
                match i64_to_index(*i).filter(|&slot| slot < len) {
                    Some(slot) => {
                        items.remove(slot);
                        Value::Null
                    },
                    None => Value::error(format!("index out of range: {i} (length {len})")),
                }
            },
            (Value::Array(_), other) => {
                Value::error(format!("array index must be INTEGER, got {}", other.type_name()))
            },
            (Value::Hash(hash), key) => match hashable(key) {
                Ok(key) => {
                    hash.borrow_mut().remove(&key);
                    Value::Null
                },
                Err(message) => Value::Error(message),
            },
            (other, _) => Value::error(format!("delete not supported: {}", other.type_name())),
        })
    }
}

/// Reads one element of an array or hash.
///
/// Out-of-range array indices and missing hash keys yield `null`.
///
/// # Example
/// ```
/// use ember::interpreter::{evaluator::index::index_value, value::core::Value};
///
/// let array = Value::from(vec![Value::Integer(10), Value::Integer(20)]);
/// assert_eq!(index_value(&array, &Value::Integer(1)), Value::Integer(20));
/// assert_eq!(index_value(&array, &Value::Integer(5)), Value::Null);
/// assert_eq!(index_value(&array, &Value::Integer(-1)), Value::Null);
/// ```
#[must_use]
pub fn index_value(container: &Value, index: &Value) -> Value {
    match (container, index) {
        (Value::Array(items), Value::Integer(i)) => {
            i64_to_index(*i).and_then(|slot| items.borrow().get(slot).cloned())
                            .unwrap_or(Value::Null)
        },
        (Value::Array(_), other) => {
            Value::error(format!("array index must be INTEGER, got {}", other.type_name()))
        },
        (Value::Hash(hash), key) => match hashable(key) {
            Ok(key) => hash.borrow()
                           .get(&key)
                           .map_or(Value::Null, |pair| pair.value.clone()),
            Err(message) => Value::Error(message),
        },
        (other, _) => Value::error(format!("index operator not supported: {}", other.type_name())),
    }
}
