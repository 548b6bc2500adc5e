//! Insertion-ordered associative container with `/`-separated path access.

use std::fmt;

use smallvec::SmallVec;

use slate_alloc::{default_allocator, AllocatorRef};

use crate::error::PathError;
use crate::heap::{Heap, MapRef, ObjectFactory};
use crate::raw::RawBuf;
use crate::value::{FloatCompare, Value};

/// Separator between the segments of a member path.
pub const PATH_SEPARATOR: char = '/';

/// One key/value entry of a [`Map`].
#[derive(Clone, Debug, Default)]
pub struct Member {
    /// The key. Usually a string; integer keys are allowed.
    pub key: Value,
    /// The value.
    pub value: Value,
}

/// Whether `candidate` names the same key as `key`.
///
/// Scalars and strings compare by value; arrays and maps by identity.
fn key_matches(candidate: &Value, key: &Value) -> bool {
    match (candidate, key) {
        (Value::Array(a), Value::Array(b)) => Heap::ptr_eq(a, b),
        (Value::Map(a), Value::Map(b)) => Heap::ptr_eq(a, b),
        _ => candidate == key,
    }
}

/// Associative container of [`Member`]s kept in insertion order.
///
/// Lookup is a linear scan by key equality. Storage comes from the map's
/// allocator and grows with the same policy as [`Array`](crate::Array).
pub struct Map {
    buf: RawBuf<Member>,
    len: usize,
}

#[allow(unsafe_code)]
impl Map {
    /// An empty map that allocates from `allocator`.
    pub fn new_in(allocator: AllocatorRef) -> Self {
        Self {
            buf: RawBuf::new_in(allocator),
            len: 0,
        }
    }

    /// An empty map on the per-thread default allocator.
    pub fn new() -> Self {
        Self::new_in(default_allocator())
    }

    /// The allocator backing this map.
    pub fn allocator(&self) -> &AllocatorRef {
        self.buf.allocator()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the map has no members.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of member slots in the buffer.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Grow the buffer to exactly `capacity` slots, if larger than now.
    pub fn reserve(&mut self, capacity: usize) {
        self.buf.grow_exact(capacity, self.len);
    }

    /// The members in insertion order.
    pub fn as_slice(&self) -> &[Member] {
        // SAFETY: `[0, len)` are live.
        unsafe { self.buf.slice(self.len) }
    }

    fn as_mut_slice(&mut self) -> &mut [Member] {
        // SAFETY: `[0, len)` are live.
        unsafe { self.buf.slice_mut(self.len) }
    }

    /// Index of the member whose key equals `key`.
    pub fn find(&self, key: &Value) -> Option<usize> {
        self.iter().position(|m| key_matches(&m.key, key))
    }

    /// Index of the member whose key is the string `key`.
    pub fn find_str(&self, key: &[u8]) -> Option<usize> {
        self.iter()
            .position(|m| matches!(&m.key, Value::String(s) if s.as_bytes() == key))
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.find(key).map(|i| &self.as_slice()[i].value)
    }

    /// Mutable value stored under `key`.
    pub fn get_mut(&mut self, key: &Value) -> Option<&mut Value> {
        let i = self.find(key)?;
        Some(&mut self.as_mut_slice()[i].value)
    }

    /// Value stored under the string key `key`.
    pub fn get_str(&self, key: &str) -> Option<&Value> {
        self.find_str(key.as_bytes()).map(|i| &self.as_slice()[i].value)
    }

    /// Whether a member with key `key` exists.
    pub fn contains_key(&self, key: &Value) -> bool {
        self.find(key).is_some()
    }

    /// Replace the value under `key`, or append a new member.
    ///
    /// Returns the previous value when one was replaced.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        match self.find(&key) {
            Some(i) => Some(std::mem::replace(&mut self.as_mut_slice()[i].value, value)),
            None => {
                self.append(key, value);
                None
            }
        }
    }

    /// Append a member without checking for an existing key.
    pub fn append(&mut self, key: Value, value: Value) {
        self.buf.grow_for(self.len + 1, self.len);
        // SAFETY: the slot at `len` is inside the buffer and vacant.
        unsafe { self.buf.write(self.len, Member { key, value }) };
        self.len += 1;
    }

    /// The value under `key`, inserting `Null` first if absent.
    pub fn entry(&mut self, key: Value) -> &mut Value {
        let i = match self.find(&key) {
            Some(i) => i,
            None => {
                self.append(key, Value::Null);
                self.len - 1
            }
        };
        &mut self.as_mut_slice()[i].value
    }

    /// Remove the member with key `key` and return its value.
    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        let i = self.find(key)?;
        self.erase(i).map(|m| m.value)
    }

    /// Remove the member at `index`, keeping the order of the rest.
    pub fn erase(&mut self, index: usize) -> Option<Member> {
        if index >= self.len {
            return None;
        }
        // SAFETY: `index < len`, so the slot is live; the shift closes the gap.
        let member = unsafe {
            let member = self.buf.read(index);
            self.buf.shift_left(index, self.len);
            member
        };
        self.len -= 1;
        Some(member)
    }

    /// Member at `index`.
    pub fn at(&self, index: usize) -> Option<&Member> {
        self.as_slice().get(index)
    }

    /// Iterate over the members in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Member> {
        self.as_slice().iter()
    }

    /// Iterate over the keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.iter().map(|m| &m.key)
    }

    /// Iterate over the values in order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.iter().map(|m| &m.value)
    }

    /// Reorder the members by key using [`Value::total_cmp`].
    pub fn sort_by_key(&mut self) {
        self.as_mut_slice().sort_by(|a, b| a.key.total_cmp(&b.key));
    }

    /// Drop every member. The capacity is kept.
    pub fn clear(&mut self) {
        let old = self.len;
        self.len = 0;
        // SAFETY: `[0, old)` were live and are now outside the map.
        unsafe { self.buf.drop_range(0, old) };
    }

    /// Same size and every key maps to an equal value, ignoring order.
    pub fn eq_with(&self, other: &Map, mode: FloatCompare) -> bool {
        self.len == other.len
            && self.iter().all(|m| match other.find(&m.key) {
                Some(i) => m.value.eq_with(&other.as_slice()[i].value, mode),
                None => false,
            })
    }

    /// Copy the whole tree below this map into `allocator`.
    pub fn deep_clone_in(&self, allocator: &AllocatorRef) -> Map {
        let mut out = Map::new_in(allocator.clone());
        out.reserve(self.len);
        for m in self.iter() {
            out.append(m.key.deep_clone_in(allocator), m.value.deep_clone_in(allocator));
        }
        out
    }

    // ── Path access ────────────────────────────────────────────

    /// Look up a `/`-separated path through nested maps.
    ///
    /// Returns `None` when a segment is missing, an intermediate node is
    /// not a map, or a nested map is mutably borrowed.
    pub fn find_member_by_path(&self, path: &str) -> Option<Value> {
        let segments: SmallVec<[&str; 8]> = path.split(PATH_SEPARATOR).collect();
        let (last, parents) = segments.split_last()?;
        let Some((first, rest)) = parents.split_first() else {
            return self.get_str(last).cloned();
        };
        let mut current = self.get_str(first)?.clone();
        for segment in rest {
            let next = match &current {
                Value::Map(m) => m.try_borrow().ok()?.get_str(segment)?.clone(),
                _ => return None,
            };
            current = next;
        }
        let found = match &current {
            Value::Map(m) => m.try_borrow().ok()?.get_str(last).cloned(),
            _ => None,
        };
        found
    }

    /// Store `value` at a `/`-separated path, creating missing
    /// intermediate maps through this map's allocator.
    pub fn set_member_by_path(&mut self, path: &str, value: Value) -> Result<(), PathError> {
        if path.is_empty() {
            return Err(PathError::EmptyPath);
        }
        self.set_path(path, 0, value)
    }

    fn set_path(&mut self, full: &str, start: usize, value: Value) -> Result<(), PathError> {
        let rest = &full[start..];
        let Some(cut) = rest.find(PATH_SEPARATOR) else {
            self.insert_str(rest, value);
            return Ok(());
        };
        let head = &rest[..cut];
        let at = &full[..start + cut];
        let child = self.child_map(head, at)?;
        let mut child = child.try_borrow_mut().map_err(|_| PathError::Borrowed {
            at: at.to_owned(),
        })?;
        child.set_path(full, start + cut + 1, value)
    }

    /// The map stored under `key`, created if absent.
    fn child_map(&mut self, key: &str, at: &str) -> Result<MapRef, PathError> {
        match self.find_str(key.as_bytes()) {
            Some(i) => match &self.as_slice()[i].value {
                Value::Map(m) => Ok(m.clone()),
                _ => Err(PathError::NotAMap { at: at.to_owned() }),
            },
            None => {
                let map = self.allocator().create_map();
                let key = Value::String(self.allocator().create_string(key.as_bytes()));
                self.append(key, Value::Map(map.clone()));
                Ok(map)
            }
        }
    }

    fn insert_str(&mut self, key: &str, value: Value) {
        match self.find_str(key.as_bytes()) {
            Some(i) => self.as_mut_slice()[i].value = value,
            None => {
                let key = Value::String(self.allocator().create_string(key.as_bytes()));
                self.append(key, value);
            }
        }
    }

    /// Remove the member at a `/`-separated path and return its value.
    ///
    /// Fails like [`find_member_by_path`](Map::find_member_by_path).
    pub fn remove_member_by_path(&mut self, path: &str) -> Option<Value> {
        match path.split_once(PATH_SEPARATOR) {
            None => {
                let i = self.find_str(path.as_bytes())?;
                self.erase(i).map(|m| m.value)
            }
            Some((head, rest)) => {
                let child = match self.get_str(head)? {
                    Value::Map(m) => m.clone(),
                    _ => return None,
                };
                let mut child = child.try_borrow_mut().ok()?;
                child.remove_member_by_path(rest)
            }
        }
    }
}

impl Default for Map {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Map {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Shallow copy: a new buffer in the same allocator holding new handles to
/// the same keys and values.
impl Clone for Map {
    fn clone(&self) -> Self {
        let mut out = Map::new_in(self.allocator().clone());
        out.reserve(self.len);
        for m in self.iter() {
            out.append(m.key.clone(), m.value.clone());
        }
        out
    }
}

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.eq_with(other, FloatCompare::Epsilon)
    }
}

impl<'a> IntoIterator for &'a Map {
    type Item = &'a Member;
    type IntoIter = std::slice::Iter<'a, Member>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|m| (&m.key, &m.value)))
            .finish()
    }
}
