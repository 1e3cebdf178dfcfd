//! The fact store shared by rules during a firing session.
//!
//! A [`Facts`] store maps unique names to [`Value`]s and iterates in
//! insertion order. It is backed by persistent maps, so cloning a store to
//! take a snapshot is O(1).

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::value::{FromValue, Value};

// =============================================================================
// Fact
// =============================================================================

/// A named value in the fact store.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fact {
    name: Arc<str>,
    value: Value,
}

impl Fact {
    /// Creates a new fact.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns the fact name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the fact value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fact{{name='{}', value={}}}", self.name, self.value)
    }
}

// =============================================================================
// Facts
// =============================================================================

/// Ordered mapping of fact name to value.
///
/// `put` on an existing name overwrites the value in place and keeps the
/// fact's original position in iteration order.
#[derive(Clone, Default)]
pub struct Facts {
    /// Facts keyed by insertion sequence number.
    entries: im::OrdMap<u64, Fact>,
    /// Name to sequence number.
    index: im::HashMap<Arc<str>, u64>,
    /// Next sequence number to assign.
    next_seq: u64,
}

impl Facts {
    /// Creates an empty fact store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fact, replacing any fact with the same name.
    ///
    /// Returns the previous value if one was replaced.
    pub fn put(&mut self, name: impl Into<Arc<str>>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();

        if let Some(&seq) = self.index.get(&name) {
            let previous = self
                .entries
                .insert(seq, Fact { name, value })
                .map(|old| old.value);
            return previous;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(Arc::clone(&name), seq);
        self.entries.insert(seq, Fact { name, value });
        None
    }

    /// Adds an opaque host object as a fact.
    pub fn put_object<T: Any + Send + Sync>(
        &mut self,
        name: impl Into<Arc<str>>,
        value: T,
    ) -> Option<Value> {
        self.put(name, Value::object(value))
    }

    /// Returns the value of the named fact.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.get_fact(name).map(Fact::value)
    }

    /// Returns the named fact.
    #[must_use]
    pub fn get_fact(&self, name: &str) -> Option<&Fact> {
        self.index
            .get(name)
            .and_then(|seq| self.entries.get(seq))
    }

    /// Returns the named fact converted to `T`, or `None` if absent.
    ///
    /// # Errors
    /// Returns a type mismatch error if the fact exists with another type.
    pub fn get_as<T: FromValue>(&self, name: &str) -> Result<Option<T>> {
        self.get(name).map(T::from_value).transpose()
    }

    /// Returns the named fact converted to `T`.
    ///
    /// # Errors
    /// Returns a missing fact error if the fact is absent, or a type
    /// mismatch error if it has another type.
    pub fn require<T: FromValue>(&self, name: &str) -> Result<T> {
        let value = self.get(name).ok_or_else(|| Error::missing_fact(name))?;
        T::from_value(value)
    }

    /// Returns the named fact converted to `T`, or `default` if absent.
    ///
    /// # Errors
    /// Returns a type mismatch error if the fact exists with another type.
    pub fn get_or_default<T: FromValue>(&self, name: &str, default: T) -> Result<T> {
        Ok(self.get_as(name)?.unwrap_or(default))
    }

    /// Borrows an opaque host object stored under `name` as `T`.
    #[must_use]
    pub fn get_object<T: Any>(&self, name: &str) -> Option<&T> {
        self.get(name).and_then(Value::as_object::<T>)
    }

    /// Removes the named fact, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let seq = self.index.remove(name)?;
        self.entries.remove(&seq).map(|fact| fact.value)
    }

    /// Returns true if a fact with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Returns the number of facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every fact.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Iterates over facts in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Fact> {
        self.entries.values()
    }

    /// Iterates over fact names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.iter().map(Fact::name)
    }

    /// Returns a snapshot of the store as a name-keyed map.
    #[must_use]
    pub fn as_map(&self) -> im::OrdMap<Arc<str>, Value> {
        self.entries
            .values()
            .map(|fact| (Arc::clone(&fact.name), fact.value.clone()))
            .collect()
    }
}

impl PartialEq for Facts {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for Facts {}

impl<'a> IntoIterator for &'a Facts {
    type Item = &'a Fact;
    type IntoIter = Box<dyn Iterator<Item = &'a Fact> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl<K: Into<Arc<str>>, V: Into<Value>> Extend<(K, V)> for Facts {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.put(name, value);
        }
    }
}

impl<K: Into<Arc<str>>, V: Into<Value>> FromIterator<(K, V)> for Facts {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut facts = Self::new();
        facts.extend(iter);
        facts
    }
}

impl fmt::Debug for Facts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|fact| (fact.name(), fact.value())))
            .finish()
    }
}

impl fmt::Display for Facts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, fact) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{fact}")?;
        }
        write!(f, "]")
    }
}
