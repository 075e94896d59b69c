use std::{cell::RefCell, fmt, rc::Rc};

use crate::{
    ast::FunctionLiteral,
    interpreter::{
        environment::Environment,
        evaluator::function::core::Builtin,
        value::{
            hash_key::{HashKey, HashObject},
            plugin::Plugin,
        },
    },
    util::{
        num::{format_float, promote},
        stack::ensure_sufficient_stack,
    },
};

/// Shared, mutable array storage. Cloning the handle aliases the array.
pub type ArrayRef = Rc<RefCell<Vec<Value>>>;
/// Shared, mutable hash storage. Cloning the handle aliases the hash.
pub type HashRef = Rc<RefCell<HashObject>>;

/// Represents a runtime value in the interpreter.
///
/// Scalars are copied on assignment; arrays and hashes are reference types,
/// so assigning or passing one creates an alias.
///
/// `ReturnValue` and `Break` are control-flow signals. They travel through
/// the same channel as ordinary results but are consumed by the nearest
/// enclosing function or loop and never reach user code.
#[derive(Debug, Clone)]
pub enum Value {
    /// A 64-bit signed integer.
    Integer(i64),
    /// A double precision float.
    Float(f64),
    /// An immutable string.
    Str(Rc<str>),
    /// `true` or `false`.
    Boolean(bool),
    /// The absence of a value.
    Null,
    /// An ordered, mutable sequence.
    Array(ArrayRef),
    /// A mutable map from hashable keys to values.
    Hash(HashRef),
    /// A user-defined function with its captured scope.
    Function(Rc<Function>),
    /// A native function from the builtin registry.
    Builtin(Builtin),
    /// An evaluation error travelling towards the top level.
    Error(String),
    /// A `return` in flight.
    ReturnValue(Box<Self>),
    /// A `break` in flight.
    Break,
    /// A declared enum: branch names mapped to values.
    Enum(Rc<EnumValue>),
    /// A host-registered method table.
    Plugin(Rc<Plugin>),
}

/// A closure: a function literal plus the scope it was created in.
#[derive(Debug)]
pub struct Function {
    /// Parameters and body, shared with the syntax tree.
    pub literal: Rc<FunctionLiteral>,
    /// The defining scope; calls enclose this, not the caller's scope.
    pub env:     Environment,
}

/// The value bound by an `enum` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    /// The declared name.
    pub name:     String,
    /// Branches in declaration order.
    pub branches: Vec<(String, Value)>,
}

impl EnumValue {
    /// Looks up a branch value by name.
    #[must_use]
    pub fn get(&self, branch: &str) -> Option<&Value> {
        self.branches
            .iter()
            .find(|(name, _)| name == branch)
            .map(|(_, value)| value)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.into())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v.into())
    }
}

impl From<Vec<Self>> for Value {
    fn from(v: Vec<Self>) -> Self {
        Self::Array(Rc::new(RefCell::new(v)))
    }
}

impl From<HashObject> for Value {
    fn from(v: HashObject) -> Self {
        Self::Hash(Rc::new(RefCell::new(v)))
    }
}

impl Value {
    /// Builds an error value.
    ///
    /// # Example
    /// ```
    /// use ember::interpreter::value::core::Value;
    ///
    /// let err = Value::error("identifier not found: x");
    /// assert!(err.is_error());
    /// assert_eq!(err.to_string(), "ERROR: identifier not found: x");
    /// ```
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    /// Returns `true` for [`Value::Error`].
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Returns `true` for values that stop a block early: returns, breaks,
    /// and errors.
    #[must_use]
    pub const fn is_signal(&self) -> bool {
        matches!(self, Self::ReturnValue(_) | Self::Break | Self::Error(_))
    }

    /// The kind tag used in diagnostics, e.g. `INTEGER`.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "INTEGER",
            Self::Float(_) => "FLOAT",
            Self::Str(_) => "STRING",
            Self::Boolean(_) => "BOOLEAN",
            Self::Null => "NULL",
            Self::Array(_) => "ARRAY",
            Self::Hash(_) => "HASH",
            Self::Function(_) => "FUNCTION",
            Self::Builtin(_) => "BUILTIN",
            Self::Error(_) => "ERROR",
            Self::ReturnValue(_) => "RETURN_VALUE",
            Self::Break => "BREAK",
            Self::Enum(_) => "ENUM",
            Self::Plugin(_) => "PLUGIN",
        }
    }

    /// Converts any value to a boolean for use in conditions.
    ///
    /// Only `null` and `false` are falsy. Zero, empty strings, empty arrays
    /// and empty hashes are all truthy.
    ///
    /// # Example
    /// ```
    /// use ember::interpreter::value::core::Value;
    ///
    /// assert!(Value::Integer(0).is_truthy());
    /// assert!(Value::from(Vec::new()).is_truthy());
    /// assert!(!Value::Null.is_truthy());
    /// ```
    #[must_use]
    pub const fn is_truthy(&self) -> bool {
        !matches!(self, Self::Null | Self::Boolean(false))
    }

    /// The canonical hash key of this value, or `None` if it is not hashable.
    #[must_use]
    pub fn hash_key(&self) -> Option<HashKey> {
        HashKey::of(self)
    }

    /// Recursively copies arrays and hashes so the result shares no storage
    /// with `self`.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        match self {
            Self::Array(items) => items.borrow()
                                       .iter()
                                       .map(Self::deep_copy)
                                       .collect::<Vec<_>>()
                                       .into(),
            Self::Hash(hash) => {
                let mut copy = HashObject::default();
                for pair in hash.borrow().iter() {
                    copy.insert(pair.key.deep_copy(), pair.value.deep_copy());
                }
                copy.into()
            },
            other => other.clone(),
        }
    }

    /// Language-level equality as used by `==`.
    ///
    /// Integers and floats compare numerically. Arrays and hashes compare
    /// element by element. Functions, enums and plugins compare by identity.
    /// Values of unrelated kinds are never equal.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Integer(a), Self::Float(b)) | (Self::Float(b), Self::Integer(a)) => {
                promote(*a) == *b
            },
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Null, Self::Null) => true,
            (Self::Array(a), Self::Array(b)) => {
                Rc::ptr_eq(a, b) || {
                    let (a, b) = (a.borrow(), b.borrow());
                    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equals(y))
                }
            },
            (Self::Hash(a), Self::Hash(b)) => Rc::ptr_eq(a, b) || a.borrow().equals(&b.borrow()),
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Builtin(a), Self::Builtin(b)) => a.name == b.name,
            (Self::Enum(a), Self::Enum(b)) => Rc::ptr_eq(a, b),
            (Self::Plugin(a), Self::Plugin(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Renders the value the way it appears inside a collection: strings are
    /// quoted, everything else uses [`fmt::Display`].
    #[must_use]
    pub fn inspect(&self) -> String {
        match self {
            Self::Str(s) => format!("\"{s}\""),
            other => other.to_string(),
        }
    }
}

impl PartialEq for Value {
    /// Strict structural equality: unlike [`Value::equals`], an integer never
    /// equals a float and errors compare by message.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Integer(_), Self::Float(_)) | (Self::Float(_), Self::Integer(_)) => false,
            (Self::Error(a), Self::Error(b)) => a == b,
            (Self::ReturnValue(a), Self::ReturnValue(b)) => a == b,
            (Self::Break, Self::Break) => true,
            _ => self.equals(other),
        }
    }
}

impl Value {
    /// Writes `self` with collections that are still being written tracked
    /// in `open`. An array or hash nested inside itself renders as `[...]`
    /// or `{...}`.
    fn render(&self, f: &mut fmt::Formatter<'_>, open: &mut Vec<*const ()>) -> fmt::Result {
        ensure_sufficient_stack(|| match self {
            Self::Array(items) => {
                let id = Rc::as_ptr(items).cast::<()>();
                if open.contains(&id) {
                    return f.write_str("[...]");
                }
                open.push(id);
                f.write_str("[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.render_element(f, open)?;
                }
                open.pop();
                f.write_str("]")
            },
            Self::Hash(hash) => {
                let id = Rc::as_ptr(hash).cast::<()>();
                if open.contains(&id) {
                    return f.write_str("{...}");
                }
                open.push(id);
                f.write_str("{")?;
                for (i, pair) in hash.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    pair.key.render_element(f, open)?;
                    f.write_str(": ")?;
                    pair.value.render_element(f, open)?;
                }
                open.pop();
                f.write_str("}")
            },
            Self::ReturnValue(value) => value.render(f, open),
            scalar => scalar.render_scalar(f),
        })
    }

    /// Like [`Value::render`], with strings quoted as in [`Value::inspect`].
    fn render_element(&self, f: &mut fmt::Formatter<'_>, open: &mut Vec<*const ()>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "\"{s}\""),
            other => other.render(f, open),
        }
    }

    fn render_scalar(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => f.write_str(&format_float(*x)),
            Self::Str(s) => f.write_str(s),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Null => f.write_str("null"),
            Self::Function(function) => {
                let literal = &function.literal;
                let params: Vec<String> =
                    literal.parameters.iter().map(ToString::to_string).collect();
                match &literal.name {
                    Some(name) => write!(f, "function {name}({})", params.join(", ")),
                    None => write!(f, "function({})", params.join(", ")),
                }
            },
            Self::Builtin(builtin) => write!(f, "builtin function {}", builtin.name),
            Self::Error(message) => write!(f, "ERROR: {message}"),
            Self::Break => f.write_str("break"),
            Self::Enum(e) => write!(f, "enum {}", e.name),
            Self::Plugin(plugin) => write!(f, "plugin {}", plugin.name()),
            Self::Array(_) | Self::Hash(_) | Self::ReturnValue(_) => self.render(f, &mut Vec::new()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, &mut Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn empty_hash() -> Value {
        HashObject::default().into()
    }

    #[test]
    fn only_null_and_false_are_falsy() {
        let truthy = [Value::Integer(0),
                      Value::Float(0.0),
                      Value::from(""),
                      Value::from(Vec::new()),
                      empty_hash(),
                      Value::Boolean(true),
                      Value::error("boom")];
        for value in &truthy {
            assert!(value.is_truthy(), "{value} should be truthy");
        }
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
    }

    #[test]
    fn numeric_equality_crosses_kinds() {
        assert!(Value::Integer(2).equals(&Value::Float(2.0)));
        assert_ne!(Value::Integer(2), Value::Float(2.0));
        assert!(!Value::Integer(2).equals(&Value::from("2")));
    }

    #[test]
    fn deep_copy_detaches_nested_arrays() {
        let inner = Value::from(vec![Value::Integer(0), Value::Integer(1)]);
        let outer = Value::from(vec![inner.clone()]);
        let copy = outer.deep_copy();

        if let Value::Array(items) = &copy
           && let Value::Array(nested) = &items.borrow()[0]
        {
            nested.borrow_mut()[0] = Value::Integer(9);
        }

        assert_eq!(inner.to_string(), "[0, 1]");
        assert_eq!(copy.to_string(), "[[9, 1]]");
    }

    #[test]
    fn display_marks_self_containing_collections() {
        let items: ArrayRef = Rc::new(RefCell::new(vec![Value::Integer(0)]));
        items.borrow_mut().push(Value::Array(Rc::clone(&items)));
        assert_eq!(Value::Array(Rc::clone(&items)).to_string(), "[0, [...]]");
        items.borrow_mut().clear();

        let mut hash = HashObject::default();
        hash.insert("self".into(), Value::Null);
        let hash: HashRef = Rc::new(RefCell::new(hash));
        hash.borrow_mut().insert("self".into(), Value::Hash(Rc::clone(&hash)));
        assert_eq!(Value::Hash(Rc::clone(&hash)).to_string(), r#"{"self": {...}}"#);
        hash.borrow_mut().remove(&HashKey::of(&"self".into()).unwrap());
    }

    #[test]
    fn display_of_a_shared_sibling_is_not_a_cycle() {
        let inner = Value::from(vec![Value::Integer(1)]);
        let outer = Value::from(vec![inner.clone(), inner]);
        assert_eq!(outer.to_string(), "[[1], [1]]");
    }

    #[test]
    fn display_of_deep_nesting() {
        let mut value = Value::Integer(7);
        for _ in 0..100_000 {
            value = Value::from(vec![value]);
        }
        let rendered = value.to_string();
        assert_eq!(rendered.len(), 200_001);
        assert!(rendered.starts_with("[[[") && rendered.contains("[7]"));

        // Take the nest apart from the outside so dropping it stays shallow.
        let mut current = Some(value);
        while let Some(Value::Array(items)) = current.take() {
            current = items.borrow_mut().pop();
        }
    }

    #[test]
    fn display_quotes_nested_strings_only() {
        let array = Value::from(vec![Value::from("a"), Value::Float(2.0), Value::Null]);
        assert_eq!(array.to_string(), r#"["a", 2.0, null]"#);
        assert_eq!(Value::from("a").to_string(), "a");
    }
}
