use std::cell::RefCell;

use crate::{
    interpreter::value::{
        core::{EnumValue, Value},
        hash_key::{HashKey, HashObject},
        plugin::Plugin,
    },
    util::num::{f64_to_i64_saturating, format_float, len_to_i64, promote},
};

/// Result of a method call before it is folded into a [`Value`]. The error
/// side is the message of the resulting error value.
pub type MethodResult = Result<Value, String>;

/// A value kind that answers dot calls such as `"a".upper()`.
///
/// Each kind owns its method table. Unknown names produce
/// `undefined method <name> for <KIND>`; wrong argument counts produce
/// `wrong number of arguments to <KIND>.<name>: expected N, got M`.
pub trait MethodReceiver {
    /// The kind tag used in diagnostics.
    const KIND: &'static str;

    /// Invokes `method` on `self` with already evaluated arguments.
    ///
    /// # Errors
    /// The message of the error value to produce.
    fn call_method(&self, method: &str, args: &[Value]) -> MethodResult;

    /// The message for a method this kind does not have.
    fn undefined(method: &str) -> String {
        format!("undefined method {method} for {}", Self::KIND)
    }

    /// Checks the argument count of `method`.
    ///
    /// # Errors
    /// The arity message if `args` does not have exactly `expected` elements.
    fn arity(method: &str, args: &[Value], expected: usize) -> Result<(), String> {
        if args.len() == expected {
            return Ok(());
        }
        Err(format!("wrong number of arguments to {}.{method}: expected {expected}, got {}",
                    Self::KIND,
                    args.len()))
    }

    /// Extracts a string argument.
    ///
    /// # Errors
    /// A type message if `value` is not a string.
    fn str_arg<'v>(method: &str, value: &'v Value) -> Result<&'v str, String> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(format!("wrong argument type to {}.{method}: expected STRING, got {}",
                                 Self::KIND,
                                 other.type_name())),
        }
    }
}

impl MethodReceiver for str {
    const KIND: &'static str = "STRING";

    fn call_method(&self, method: &str, args: &[Value]) -> MethodResult {
        let result = match method {
            "len" => {
                Self::arity(method, args, 0)?;
                Value::Integer(len_to_i64(self.chars().count()))
            },
            "upper" => {
                Self::arity(method, args, 0)?;
                self.to_uppercase().into()
            },
            "lower" => {
                Self::arity(method, args, 0)?;
                self.to_lowercase().into()
            },
            "trim" => {
                Self::arity(method, args, 0)?;
                self.trim().into()
            },
            "split" => {
                Self::arity(method, args, 1)?;
                let separator = Self::str_arg(method, &args[0])?;
                let parts: Vec<Value> = if separator.is_empty() {
                    self.chars().map(|c| Value::from(c.to_string())).collect()
                } else {
                    self.split(separator).map(Value::from).collect()
                };
                parts.into()
            },
            "contains" | "starts_with" | "ends_with" => {
                Self::arity(method, args, 1)?;
                let needle = Self::str_arg(method, &args[0])?;
                Value::Boolean(match method {
                                   "contains" => self.contains(needle),
                                   "starts_with" => self.starts_with(needle),
                                   _ => self.ends_with(needle),
                               })
            },
            "replace" => {
                Self::arity(method, args, 2)?;
                let from = Self::str_arg(method, &args[0])?;
                let to = Self::str_arg(method, &args[1])?;
                self.replace(from, to).into()
            },
            _ => return Err(Self::undefined(method)),
        };
        Ok(result)
    }
}

impl MethodReceiver for i64 {
    const KIND: &'static str = "INTEGER";

    fn call_method(&self, method: &str, args: &[Value]) -> MethodResult {
        if !matches!(method, "abs" | "float" | "str") {
            return Err(Self::undefined(method));
        }
        Self::arity(method, args, 0)?;
        match method {
            "abs" => self.checked_abs()
                         .map(Value::Integer)
                         .ok_or_else(|| format!("integer overflow: abs({self})")),
            "float" => Ok(Value::Float(promote(*self))),
            _ => Ok(self.to_string().into()),
        }
    }
}

impl MethodReceiver for f64 {
    const KIND: &'static str = "FLOAT";

    fn call_method(&self, method: &str, args: &[Value]) -> MethodResult {
        if !matches!(method, "abs" | "floor" | "ceil" | "round" | "int" | "str") {
            return Err(Self::undefined(method));
        }
        Self::arity(method, args, 0)?;
        match method {
            "abs" => Ok(Value::Float(self.abs())),
            "floor" => Ok(Value::Float(self.floor())),
            "ceil" => Ok(Value::Float(self.ceil())),
            "round" => Ok(Value::Float(self.round())),
            "int" if self.is_finite() => Ok(Value::Integer(f64_to_i64_saturating(*self))),
            "int" => Err(format!("cannot convert {self} to INTEGER")),
            _ => Ok(format_float(*self).into()),
        }
    }
}

impl MethodReceiver for bool {
    const KIND: &'static str = "BOOLEAN";

    fn call_method(&self, method: &str, args: &[Value]) -> MethodResult {
        match method {
            "str" => {
                Self::arity(method, args, 0)?;
                Ok(self.to_string().into())
            },
            _ => Err(Self::undefined(method)),
        }
    }
}

/// Array methods. `push` and `pop` mutate the array in place, so every alias
/// observes the change; `reverse` returns a new array.
impl MethodReceiver for RefCell<Vec<Value>> {
    const KIND: &'static str = "ARRAY";

    fn call_method(&self, method: &str, args: &[Value]) -> MethodResult {
        let result = match method {
            "len" => {
                Self::arity(method, args, 0)?;
                Value::Integer(len_to_i64(self.borrow().len()))
            },
            "push" => {
                Self::arity(method, args, 1)?;
                self.borrow_mut().push(args[0].clone());
                Value::Null
            },
            "pop" => {
                Self::arity(method, args, 0)?;
                self.borrow_mut().pop().unwrap_or(Value::Null)
            },
            "contains" => {
                Self::arity(method, args, 1)?;
                Value::Boolean(self.borrow().iter().any(|item| item.equals(&args[0])))
            },
            "join" => {
                Self::arity(method, args, 1)?;
                let separator = Self::str_arg(method, &args[0])?;
                let parts: Vec<String> = self.borrow().iter().map(ToString::to_string).collect();
                parts.join(separator).into()
            },
            "reverse" => {
                Self::arity(method, args, 0)?;
                self.borrow().iter().rev().cloned().collect::<Vec<_>>().into()
            },
            _ => return Err(Self::undefined(method)),
        };
        Ok(result)
    }
}

impl MethodReceiver for RefCell<HashObject> {
    const KIND: &'static str = "HASH";

    fn call_method(&self, method: &str, args: &[Value]) -> MethodResult {
        let result = match method {
            "keys" => {
                Self::arity(method, args, 0)?;
                self.borrow().keys().into()
            },
            "values" => {
                Self::arity(method, args, 0)?;
                self.borrow().values().into()
            },
            "len" => {
                Self::arity(method, args, 0)?;
                Value::Integer(len_to_i64(self.borrow().len()))
            },
            "has" => {
                Self::arity(method, args, 1)?;
                let key = hashable(&args[0])?;
                Value::Boolean(self.borrow().get(&key).is_some())
            },
            "remove" => {
                Self::arity(method, args, 1)?;
                let key = hashable(&args[0])?;
                self.borrow_mut()
                    .remove(&key)
                    .map_or(Value::Null, |pair| pair.value)
            },
            _ => return Err(Self::undefined(method)),
        };
        Ok(result)
    }
}

impl MethodReceiver for EnumValue {
    const KIND: &'static str = "ENUM";

    fn call_method(&self, method: &str, args: &[Value]) -> MethodResult {
        let result = match method {
            "names" => {
                Self::arity(method, args, 0)?;
                self.branches
                    .iter()
                    .map(|(name, _)| Value::from(name.as_str()))
                    .collect::<Vec<_>>()
                    .into()
            },
            "values" => {
                Self::arity(method, args, 0)?;
                self.branches
                    .iter()
                    .map(|(_, value)| value.clone())
                    .collect::<Vec<_>>()
                    .into()
            },
            "has" => {
                Self::arity(method, args, 1)?;
                let name = Self::str_arg(method, &args[0])?;
                Value::Boolean(self.get(name).is_some())
            },
            _ => return Err(Self::undefined(method)),
        };
        Ok(result)
    }
}

/// Plugins answer exactly the functions they registered.
impl MethodReceiver for Plugin {
    const KIND: &'static str = "PLUGIN";

    fn call_method(&self, method: &str, args: &[Value]) -> MethodResult {
        self.function(method)
            .map(|function| function(args))
            .ok_or_else(|| Self::undefined(method))
    }
}

/// The hash key of `value`, or the error message for unhashable kinds.
///
/// # Errors
/// `unusable as hash key: <KIND>`.
pub fn hashable(value: &Value) -> Result<HashKey, String> {
    value.hash_key()
         .ok_or_else(|| format!("unusable as hash key: {}", value.type_name()))
}

impl Value {
    /// Dispatches a dot call to the receiver's method table.
    ///
    /// Failures come back as [`Value::Error`].
    ///
    /// # Example
    /// ```
    /// use ember::interpreter::value::core::Value;
    ///
    /// let upper = Value::from("ember").call_method("upper", &[]);
    /// assert_eq!(upper, Value::from("EMBER"));
    ///
    /// let missing = Value::Integer(1).call_method("upper", &[]);
    /// assert_eq!(missing.to_string(), "ERROR: undefined method upper for INTEGER");
    /// ```
    #[must_use]
    pub fn call_method(&self, method: &str, args: &[Value]) -> Self {
        let result = match self {
            Self::Str(s) => s.as_ref().call_method(method, args),
            Self::Integer(n) => n.call_method(method, args),
            Self::Float(x) => x.call_method(method, args),
            Self::Boolean(b) => b.call_method(method, args),
            Self::Array(items) => items.as_ref().call_method(method, args),
            Self::Hash(hash) => hash.as_ref().call_method(method, args),
            Self::Enum(e) => e.as_ref().call_method(method, args),
            Self::Plugin(plugin) => plugin.as_ref().call_method(method, args),
            other => Err(format!("undefined method {method} for {}", other.type_name())),
        };
        result.unwrap_or_else(Value::Error)
    }
}
