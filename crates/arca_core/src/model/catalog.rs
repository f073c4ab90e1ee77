//! Name-indexed entity arena.
//!
//! # Invariants
//! - Names are unique within one catalog; the first insert wins.
//! - Handles are only minted by `Catalog::insert` and stay valid for the
//!   lifetime of that catalog.

use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::Index;

/// Entities addressable by a natural name.
pub trait Named {
    fn name(&self) -> &str;
}

/// Stable index of one entity in its `Catalog`.
///
/// Two handles from the same catalog are equal iff they point at the same
/// entity.
pub struct Handle<T> {
    index: usize,
    marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(index: usize) -> Self {
        Self {
            index,
            marker: PhantomData,
        }
    }

    pub fn index(self) -> usize {
        self.index
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> Debug for Handle<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Handle({})", self.index)
    }
}

/// Ordered collection of uniquely named entities.
#[derive(Debug, Clone)]
pub struct Catalog<T> {
    items: Vec<T>,
    by_name: HashMap<String, Handle<T>>,
}

impl<T> Default for Catalog<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            by_name: HashMap::new(),
        }
    }
}

impl<T: Named> Catalog<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `item`, or returns the existing handle when its name is taken.
    pub fn insert(&mut self, item: T) -> Result<Handle<T>, Handle<T>> {
        if let Some(existing) = self.by_name.get(item.name()) {
            return Err(*existing);
        }
        let handle = Handle::new(self.items.len());
        self.by_name.insert(item.name().to_string(), handle);
        self.items.push(item);
        Ok(handle)
    }

    pub fn find(&self, name: &str) -> Option<Handle<T>> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.items.get(handle.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Named> FromIterator<T> for Catalog<T> {
    /// Collects in order, dropping later duplicates of a name.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for item in iter {
            let _ = catalog.insert(item);
        }
        catalog
    }
}

impl<T> Index<Handle<T>> for Catalog<T> {
    type Output = T;

    fn index(&self, handle: Handle<T>) -> &Self::Output {
        &self.items[handle.index()]
    }
}

impl<T: Serialize> Serialize for Catalog<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.items)
    }
}

#[cfg(test)]
mod tests {
    use super::{Catalog, Named};

    #[derive(Debug, PartialEq)]
    struct Item(&'static str, u8);

    impl Named for Item {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn insert_keeps_first_occurrence() {
        let mut catalog = Catalog::new();
        let first = catalog.insert(Item("a", 1)).unwrap();
        let duplicate = catalog.insert(Item("a", 2)).unwrap_err();

        assert_eq!(first, duplicate);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[first], Item("a", 1));
        assert_eq!(catalog.get(first), Some(&Item("a", 1)));
    }

    #[test]
    fn handles_compare_by_identity() {
        let catalog: Catalog<Item> = [Item("a", 1), Item("b", 2), Item("a", 3)]
            .into_iter()
            .collect();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.find("a"), catalog.find("a"));
        assert_ne!(catalog.find("a"), catalog.find("b"));
        assert!(catalog.find("c").is_none());
        let names: Vec<&str> = catalog.iter().map(Named::name).collect();
        assert_eq!(names, ["a", "b"]);
    }
}
