//! Deduplicating string pool built by the writer.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use indexmap::IndexSet;

use slate_value::StrRef;

/// Pool entry keyed by string content.
#[derive(Clone, Debug)]
struct PoolKey(StrRef);

impl PartialEq for PoolKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes() == other.0.as_bytes()
    }
}

impl Eq for PoolKey {}

impl PartialOrd for PoolKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PoolKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.as_bytes().cmp(other.0.as_bytes())
    }
}

impl Hash for PoolKey {
    // Must hash like `[u8]` so lookups through `Borrow<[u8]>` agree.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.as_bytes().hash(state);
    }
}

impl Borrow<[u8]> for PoolKey {
    fn borrow(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// Set of distinct strings referenced by a document.
///
/// Strings are collected with [`insert`](StringPool::insert), then
/// [`sort`](StringPool::sort)ed by content; an entry's index after sorting
/// is what value nodes refer to.
#[derive(Debug, Default)]
pub struct StringPool {
    entries: IndexSet<PoolKey>,
    max_len: usize,
}

impl StringPool {
    /// An empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a string. Returns `false` when equal content is already pooled.
    pub fn insert(&mut self, s: &StrRef) -> bool {
        if self.entries.contains(s.as_bytes()) {
            return false;
        }
        self.max_len = self.max_len.max(s.len());
        self.entries.insert(PoolKey(s.clone()))
    }

    /// Order the entries by content.
    pub fn sort(&mut self) {
        self.entries.sort();
    }

    /// Index of the entry with content `bytes`.
    pub fn index_of(&self, bytes: &[u8]) -> Option<usize> {
        self.entries.get_index_of(bytes)
    }

    /// Number of distinct strings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Length of the longest entry in bytes.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = &StrRef> {
        self.entries.iter().map(|k| &k.0)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.max_len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_alloc::default_allocator;
    use slate_value::ObjectFactory;

    #[test]
    fn duplicates_collapse_and_sort_assigns_indices() {
        let alloc = default_allocator();
        let mut pool = StringPool::new();
        for s in ["pear", "apple", "pear", "fig"] {
            pool.insert(&alloc.create_string(s.as_bytes()));
        }
        assert_eq!(pool.len(), 3);
        pool.sort();
        assert_eq!(pool.index_of(b"apple"), Some(0));
        assert_eq!(pool.index_of(b"fig"), Some(1));
        assert_eq!(pool.index_of(b"pear"), Some(2));
        assert_eq!(pool.index_of(b"kiwi"), None);
        assert_eq!(pool.max_len(), 5);
    }

    #[test]
    fn distinct_objects_with_same_content_share_an_entry() {
        let alloc = default_allocator();
        let mut pool = StringPool::new();
        assert!(pool.insert(&alloc.create_string(b"k")));
        assert!(!pool.insert(&alloc.adopt_string(b"k".to_vec())));
    }
}
