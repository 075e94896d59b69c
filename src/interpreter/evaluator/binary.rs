use crate::{
    ast::InfixOperator,
    interpreter::value::core::Value,
    util::num::promote,
};

/// Applies a binary operator to two evaluated operands.
///
/// Dispatch is by operand kinds:
/// - `&&` and `||` accept any operands and combine their truthiness; both
///   sides have already been evaluated.
/// - Integer with integer stays integer, except for `/` when the division is
///   not exact and `**` with a negative exponent, which yield floats.
/// - Any float operand promotes both operands to float.
/// - Strings support `+` (concatenation) and equality.
/// - `==` and `!=` work across all kinds; values of different kinds are
///   unequal.
///
/// Everything else is an error value: `type mismatch: <L> <op> <R>` when the
/// kinds differ, `unknown operator: <L> <op> <R>` when they agree.
///
/// # Example
/// ```
/// use ember::{
///     ast::InfixOperator,
///     interpreter::{evaluator::binary::eval_infix, value::core::Value},
/// };
///
/// let exact = eval_infix(InfixOperator::Div, &Value::Integer(4), &Value::Integer(2));
/// assert_eq!(exact, Value::Integer(2));
///
/// let inexact = eval_infix(InfixOperator::Div, &Value::Integer(5), &Value::Integer(2));
/// assert_eq!(inexact, Value::Float(2.5));
/// ```
#[must_use]
pub fn eval_infix(op: InfixOperator, left: &Value, right: &Value) -> Value {
    use InfixOperator::{And, Equal, NotEqual, Or};

    match (op, left, right) {
        (And, ..) => Value::Boolean(left.is_truthy() && right.is_truthy()),
        (Or, ..) => Value::Boolean(left.is_truthy() || right.is_truthy()),
        (_, Value::Integer(a), Value::Integer(b)) => eval_integer_infix(op, *a, *b),
        (_, Value::Integer(a), Value::Float(b)) => eval_float_infix(op, promote(*a), *b),
        (_, Value::Float(a), Value::Integer(b)) => eval_float_infix(op, *a, promote(*b)),
        (_, Value::Float(a), Value::Float(b)) => eval_float_infix(op, *a, *b),
        (_, Value::Str(a), Value::Str(b)) => eval_string_infix(op, a, b, left, right),
        (Equal, ..) => Value::Boolean(left.equals(right)),
        (NotEqual, ..) => Value::Boolean(!left.equals(right)),
        _ if left.type_name() != right.type_name() => mismatch(op, left, right),
        _ => unknown_operator(op, left, right),
    }
}

/// Integer arithmetic with overflow and division-by-zero checks.
fn eval_integer_infix(op: InfixOperator, a: i64, b: i64) -> Value {
    use InfixOperator::{
        Add, And, Div, Equal, Greater, GreaterEqual, Less, LessEqual, Mod, Mul, NotEqual, Or, Pow,
        Sub,
    };

    let checked = match op {
        Add => a.checked_add(b),
        Sub => a.checked_sub(b),
        Mul => a.checked_mul(b),
        Div if b == 0 => return Value::error("division by zero"),
        // `MIN / -1` has no remainder to test and overflows either way.
        Div => match a.checked_rem(b) {
            Some(0) => a.checked_div(b),
            Some(_) => return Value::Float(promote(a) / promote(b)),
            None => None,
        },
        Mod if b == 0 => return Value::error("division by zero"),
        Mod => a.checked_rem(b),
        Pow if b < 0 => return Value::Float(promote(a).powf(promote(b))),
        Pow => match u32::try_from(b) {
            Ok(exp) => a.checked_pow(exp),
            Err(_) if a == 0 || a == 1 => Some(a),
            Err(_) if a == -1 => Some(if b % 2 == 0 { 1 } else { -1 }),
            Err(_) => None,
        },
        Less => return Value::Boolean(a < b),
        Greater => return Value::Boolean(a > b),
        LessEqual => return Value::Boolean(a <= b),
        GreaterEqual => return Value::Boolean(a >= b),
        Equal => return Value::Boolean(a == b),
        NotEqual => return Value::Boolean(a != b),
        And | Or => return Value::Boolean(true),
    };

    checked.map_or_else(|| Value::error(format!("integer overflow: {a} {op} {b}")),
                        Value::Integer)
}

/// Float arithmetic. Division by zero follows IEEE 754 and yields an
/// infinity or NaN.
#[allow(clippy::float_cmp)]
fn eval_float_infix(op: InfixOperator, a: f64, b: f64) -> Value {
    use InfixOperator::{
        Add, And, Div, Equal, Greater, GreaterEqual, Less, LessEqual, Mod, Mul, NotEqual, Or, Pow,
        Sub,
    };

    match op {
        Add => Value::Float(a + b),
        Sub => Value::Float(a - b),
        Mul => Value::Float(a * b),
        Div => Value::Float(a / b),
        Mod => Value::Float(a % b),
        Pow => Value::Float(a.powf(b)),
        Less => Value::Boolean(a < b),
        Greater => Value::Boolean(a > b),
        LessEqual => Value::Boolean(a <= b),
        GreaterEqual => Value::Boolean(a >= b),
        Equal => Value::Boolean(a == b),
        NotEqual => Value::Boolean(a != b),
        And | Or => Value::Boolean(true),
    }
}

fn eval_string_infix(op: InfixOperator, a: &str, b: &str, left: &Value, right: &Value) -> Value {
    match op {
        InfixOperator::Add => Value::from(format!("{a}{b}")),
        InfixOperator::Equal => Value::Boolean(a == b),
        InfixOperator::NotEqual => Value::Boolean(a != b),
        _ => unknown_operator(op, left, right),
    }
}

fn mismatch(op: InfixOperator, left: &Value, right: &Value) -> Value {
    Value::error(format!("type mismatch: {} {op} {}", left.type_name(), right.type_name()))
}

fn unknown_operator(op: InfixOperator, left: &Value, right: &Value) -> Value {
    Value::error(format!("unknown operator: {} {op} {}", left.type_name(), right.type_name()))
}
