use indexmap::{IndexMap, map::Values};
use rustc_hash::FxBuildHasher;

use crate::{
    interpreter::value::core::Value,
    util::hash::{float_hash, fnv1a},
};

/// The kind half of a [`HashKey`]; keys of different kinds never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashKind {
    Integer,
    Float,
    Str,
    Boolean,
}

/// The canonical hashable form of a value.
///
/// Two values with equal keys address the same hash slot. Integers hash to
/// their bit pattern, booleans to 0 or 1, strings to their FNV-1a digest, and
/// floats to the digest of their 10-place decimal rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    pub kind: HashKind,
    pub hash: u64,
}

impl HashKey {
    /// Computes the key for `value`, or `None` for unhashable kinds.
    ///
    /// # Example
    /// ```
    /// use ember::interpreter::value::{core::Value, hash_key::HashKey};
    ///
    /// let a = HashKey::of(&Value::from("name"));
    /// let b = HashKey::of(&Value::from("name"));
    /// assert_eq!(a, b);
    /// assert!(HashKey::of(&Value::Null).is_none());
    /// ```
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn of(value: &Value) -> Option<Self> {
        let (kind, hash) = match value {
            Value::Integer(n) => (HashKind::Integer, *n as u64),
            Value::Boolean(b) => (HashKind::Boolean, u64::from(*b)),
            Value::Str(s) => (HashKind::Str, fnv1a(s.as_bytes())),
            Value::Float(x) => (HashKind::Float, float_hash(*x)),
            _ => return None,
        };
        Some(Self { kind, hash })
    }
}

/// One entry of a [`HashObject`]: the original key value and its value.
#[derive(Debug, Clone)]
pub struct HashPair {
    pub key:   Value,
    pub value: Value,
}

/// An insertion-ordered map keyed by [`HashKey`].
///
/// Iteration, `keys()` and `values()` follow first-insertion order;
/// overwriting a key keeps its slot and removing a key keeps the order of
/// the rest.
#[derive(Debug, Clone, Default)]
pub struct HashObject {
    entries: IndexMap<HashKey, HashPair, FxBuildHasher>,
}

impl HashObject {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up the entry for `key`.
    #[must_use]
    pub fn get(&self, key: &HashKey) -> Option<&HashPair> {
        self.entries.get(key)
    }

    /// Inserts or overwrites the entry for `key`.
    ///
    /// # Returns
    /// `false` when `key` is not hashable and nothing was stored.
    pub fn insert(&mut self, key: Value, value: Value) -> bool {
        let Some(hash) = key.hash_key() else {
            return false;
        };
        self.entries.insert(hash, HashPair { key, value });
        true
    }

    /// Removes the entry for `key`, returning it if present.
    pub fn remove(&mut self, key: &HashKey) -> Option<HashPair> {
        self.entries.shift_remove(key)
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> Values<'_, HashKey, HashPair> {
        self.entries.values()
    }

    #[must_use]
    pub fn keys(&self) -> Vec<Value> {
        self.iter().map(|pair| pair.key.clone()).collect()
    }

    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        self.iter().map(|pair| pair.value.clone()).collect()
    }

    /// Order-insensitive structural equality.
    #[must_use]
    pub fn equals(&self, other: &Self) -> bool {
        self.len() == other.len()
        && self.entries.iter().all(|(key, pair)| {
                                  other.get(key)
                                       .is_some_and(|theirs| theirs.value.equals(&pair.value))
                              })
    }
}

impl<'a> IntoIterator for &'a HashObject {
    type Item = &'a HashPair;
    type IntoIter = Values<'a, HashKey, HashPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn key(value: &Value) -> HashKey {
        HashKey::of(value).unwrap()
    }

    #[test]
    fn kinds_do_not_collide() {
        assert_ne!(key(&Value::Integer(1)), key(&Value::Boolean(true)));
        assert_ne!(key(&Value::Integer(1)), key(&Value::Float(1.0)));
        assert_eq!(key(&Value::Float(0.1 + 0.2)), key(&Value::Float(0.3)));
    }

    #[test]
    fn unhashable_kinds_have_no_key() {
        assert!(HashKey::of(&Value::from(vec![Value::Integer(1)])).is_none());
        assert!(HashKey::of(&Value::Null).is_none());
        assert!(HashKey::of(&HashObject::default().into()).is_none());
    }

    #[test]
    fn insertion_order_survives_overwrite_and_remove() {
        let mut hash = HashObject::default();
        hash.insert("a".into(), Value::Integer(1));
        hash.insert("b".into(), Value::Integer(2));
        hash.insert("c".into(), Value::Integer(3));
        hash.insert("a".into(), Value::Integer(10));

        let removed = hash.remove(&key(&"b".into())).unwrap();
        assert_eq!(removed.value, Value::Integer(2));

        assert_eq!(hash.keys(), vec![Value::from("a"), Value::from("c")]);
        assert_eq!(hash.values(), vec![Value::Integer(10), Value::Integer(3)]);
        assert_eq!(hash.get(&key(&"c".into())).unwrap().value, Value::Integer(3));
    }

    #[test]
    fn removing_the_first_key_keeps_the_rest_in_order() {
        let mut hash = HashObject::default();
        for (name, n) in [("x", 1), ("y", 2), ("z", 3)] {
            hash.insert(name.into(), Value::Integer(n));
        }

        assert!(hash.remove(&key(&"x".into())).is_some());
        assert!(hash.remove(&key(&"x".into())).is_none());
        hash.insert("x".into(), Value::Integer(4));

        assert_eq!(hash.keys(), vec![Value::from("y"), Value::from("z"), Value::from("x")]);
        assert_eq!(hash.get(&key(&"z".into())).unwrap().value, Value::Integer(3));
    }

    #[test]
    fn rejects_unhashable_keys() {
        let mut hash = HashObject::default();
        assert!(!hash.insert(Value::Null, Value::Integer(1)));
        assert!(hash.is_empty());
    }
}
