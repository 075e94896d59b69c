/// Hash keys and the hash map behind `Value::Hash`.
///
/// Defines `HashKey`, the canonical hashable form of a value, and
/// `HashObject`, an insertion-ordered map from hash keys to key/value pairs.
pub mod hash_key;
/// Per-kind object methods.
///
/// Implements the `MethodReceiver` capability behind dot calls such as
/// `"a".upper()` or `[1, 2].len()`.
pub mod methods;
/// Host-registered native method tables.
pub mod plugin;

pub mod core;
