//! Name-keyed lookup over store entities

use std::collections::{BTreeMap, BTreeSet};

use super::{Collection, Mode, Variable};

/// Anything the engine addresses by name.
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for Collection {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Mode {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Variable {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Entities keyed by name. When a store holds two entities with the same
/// name, the first one listed wins and the rest stay invisible.
#[derive(Debug, Clone)]
pub struct NameIndex<T> {
    entries: BTreeMap<String, T>,
}

impl<T> Default for NameIndex<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T: Named> NameIndex<T> {
    pub fn build(items: impl IntoIterator<Item = T>) -> Self {
        let mut entries = BTreeMap::new();
        for item in items {
            entries.entry(item.name().to_string()).or_insert(item);
        }
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Insert or replace by name.
    pub fn insert(&mut self, item: T) {
        self.entries.insert(item.name().to_string(), item);
    }

    pub fn remove(&mut self, name: &str) -> Option<T> {
        self.entries.remove(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    /// Entries whose name is not in `expected`, in name order.
    pub fn stale<'a>(&'a self, expected: &'a BTreeSet<String>) -> impl Iterator<Item = &'a T> + 'a {
        self.entries
            .iter()
            .filter(move |(name, _)| !expected.contains(*name))
            .map(|(_, item)| item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ModeId;

    fn mode(id: &str, name: &str) -> Mode {
        Mode {
            id: ModeId::from(id),
            name: name.to_string(),
        }
    }

    #[test]
    fn first_duplicate_wins() {
        let index = NameIndex::build([mode("m1", "Light"), mode("m2", "Light"), mode("m3", "Dark")]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("Light").unwrap().id.as_str(), "m1");
    }

    #[test]
    fn stale_lists_unexpected_names() {
        let index = NameIndex::build([mode("m1", "a"), mode("m2", "b"), mode("m3", "c")]);
        let expected = BTreeSet::from(["b".to_string()]);
        let stale: Vec<&str> = index.stale(&expected).map(|m| m.name.as_str()).collect();
        assert_eq!(stale, vec!["a", "c"]);
    }

    #[test]
    fn insert_replaces_by_name() {
        let mut index = NameIndex::build([mode("m1", "a")]);
        index.insert(mode("m9", "a"));
        assert_eq!(index.get("a").unwrap().id.as_str(), "m9");
        assert!(index.remove("a").is_some());
        assert!(index.is_empty());
    }
}
