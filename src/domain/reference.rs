// Copyright (c) 2025 - Cowboy AI, Inc.
//! Typed Soft References
//!
//! A record points at another record by name. `Ref<T>` keeps the wire
//! representation (a bare string) while recording the target type, so every
//! place that must follow a rename or a delete is visible to the compiler.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Soft reference to a record of type `T`, by name
pub struct Ref<T> {
    name: String,
    _target: PhantomData<fn() -> T>,
}

impl<T> Ref<T> {
    /// Create a reference to the record named `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            _target: PhantomData,
        }
    }

    /// Referenced name
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Check if this reference points at `name`
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }
}

// Derives would put bounds on `T`; the target type is only a marker.
impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self::new(self.name.clone())
    }
}

impl<T> PartialEq for Ref<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<T> Eq for Ref<T> {}

impl<T> Hash for Ref<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl<T> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ref({:?})", self.name)
    }
}

impl<T> fmt::Display for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl<T> From<&str> for Ref<T> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<T> From<String> for Ref<T> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<T> Serialize for Ref<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

impl<'de, T> Deserialize<'de> for Ref<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// A field holding zero or more soft references
///
/// The reference cascade only ever talks to fields through this trait, so a
/// single function renames or clears every edge regardless of its shape.
pub trait RefSlot {
    /// Rewrite references to `old` as `new`, returning how many changed
    fn rename(&mut self, old: &str, new: &str) -> usize;

    /// Drop references to `name`, returning how many were dropped
    fn clear(&mut self, name: &str) -> usize;

    /// Names currently referenced
    fn names(&self) -> Vec<&str>;
}

impl<T> RefSlot for Option<Ref<T>> {
    fn rename(&mut self, old: &str, new: &str) -> usize {
        match self {
            Some(reference) if reference.is(old) => {
                *reference = Ref::new(new);
                1
            }
            _ => 0,
        }
    }

    fn clear(&mut self, name: &str) -> usize {
        if self.as_ref().is_some_and(|r| r.is(name)) {
            *self = None;
            1
        } else {
            0
        }
    }

    fn names(&self) -> Vec<&str> {
        self.iter().map(Ref::as_str).collect()
    }
}

impl<T> RefSlot for Vec<Ref<T>> {
    fn rename(&mut self, old: &str, new: &str) -> usize {
        let mut renamed = 0;
        for reference in self.iter_mut().filter(|r| r.is(old)) {
            *reference = Ref::new(new);
            renamed += 1;
        }
        renamed
    }

    fn clear(&mut self, name: &str) -> usize {
        let before = self.len();
        self.retain(|r| !r.is(name));
        before - self.len()
    }

    fn names(&self) -> Vec<&str> {
        self.iter().map(Ref::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Target;

    #[test]
    fn test_ref_serializes_as_name() {
        let reference: Ref<Target> = Ref::new("management");
        assert_eq!(serde_json::to_string(&reference).unwrap(), "\"management\"");

        let absent: Option<Ref<Target>> = serde_json::from_str("null").unwrap();
        assert!(absent.is_none());
    }

    #[test]
    fn test_optional_slot() {
        let mut slot: Option<Ref<Target>> = Some(Ref::new("kms"));
        assert_eq!(slot.rename("other", "x"), 0);
        assert_eq!(slot.rename("kms", "vault"), 1);
        assert_eq!(slot.names(), vec!["vault"]);
        assert_eq!(slot.clear("vault"), 1);
        assert!(slot.is_none());
    }

    #[test]
    fn test_list_slot() {
        let mut slot: Vec<Ref<Target>> = vec!["a".into(), "b".into(), "a".into()];
        assert_eq!(slot.rename("a", "c"), 2);
        assert_eq!(RefSlot::clear(&mut slot, "c"), 2);
        assert_eq!(slot.names(), vec!["b"]);
    }
}
