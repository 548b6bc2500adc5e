//! Growable array of values stored in an allocator-owned buffer.

use std::fmt;
use std::ops::{Index, IndexMut};

use slate_alloc::{default_allocator, AllocatorRef};

use crate::raw::RawBuf;
use crate::value::{FloatCompare, Value};

/// Contiguous, growable sequence of [`Value`]s.
///
/// Storage comes from the array's allocator. `capacity() >= len()` always
/// holds; slots in `[0, len)` are live. Growth is geometric:
/// `max(needed, max(2 * capacity, 4))`.
pub struct Array {
    buf: RawBuf<Value>,
    len: usize,
}

#[allow(unsafe_code)]
impl Array {
    /// An empty array that allocates from `allocator`.
    pub fn new_in(allocator: AllocatorRef) -> Self {
        Self {
            buf: RawBuf::new_in(allocator),
            len: 0,
        }
    }

    /// An empty array on the per-thread default allocator.
    pub fn new() -> Self {
        Self::new_in(default_allocator())
    }

    /// An empty array with room for exactly `capacity` values.
    pub fn with_capacity_in(capacity: usize, allocator: AllocatorRef) -> Self {
        Self {
            buf: RawBuf::with_capacity_in(capacity, allocator),
            len: 0,
        }
    }

    /// The allocator backing this array.
    pub fn allocator(&self) -> &AllocatorRef {
        self.buf.allocator()
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots in the buffer.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Grow the buffer to exactly `capacity` slots, if larger than now.
    pub fn reserve(&mut self, capacity: usize) {
        self.buf.grow_exact(capacity, self.len);
    }

    /// Ensure room for `needed` elements using the geometric growth policy.
    pub fn reserve_for(&mut self, needed: usize) {
        self.buf.grow_for(needed, self.len);
    }

    /// Set the length to `len`, filling new slots with `Null` and dropping
    /// truncated ones.
    pub fn resize(&mut self, len: usize) {
        if len > self.len {
            self.reserve_for(len);
            for i in self.len..len {
                // SAFETY: `i < len <= capacity` and slots past `self.len` are vacant.
                unsafe { self.buf.write(i, Value::Null) };
            }
            self.len = len;
        } else if len < self.len {
            let old = self.len;
            // Shrink first so a panicking destructor cannot double drop.
            self.len = len;
            // SAFETY: `[len, old)` were live and are now outside the array.
            unsafe { self.buf.drop_range(len, old) };
        }
    }

    /// Append a value.
    pub fn push(&mut self, value: Value) {
        self.reserve_for(self.len + 1);
        // SAFETY: the slot at `len` is inside the buffer and vacant.
        unsafe { self.buf.write(self.len, value) };
        self.len += 1;
    }

    /// Remove and return the last value.
    pub fn pop(&mut self) -> Option<Value> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot at the old `len - 1` was live.
        Some(unsafe { self.buf.read(self.len) })
    }

    /// Insert `value` at `index`, shifting the tail up by one.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, value: Value) {
        assert!(
            index <= self.len,
            "insert index {index} out of bounds (len {})",
            self.len
        );
        self.reserve_for(self.len + 1);
        // SAFETY: `index <= len < capacity` after the reserve.
        unsafe {
            self.buf.shift_right(index, self.len);
            self.buf.write(index, value);
        }
        self.len += 1;
    }

    /// Remove the value at `index`, shifting the tail down by one.
    ///
    /// Returns `None` when `index >= len`.
    pub fn erase(&mut self, index: usize) -> Option<Value> {
        if index >= self.len {
            return None;
        }
        // SAFETY: `index < len`, so the slot is live; after reading it is
        // vacant and the shift closes the gap.
        let value = unsafe {
            let value = self.buf.read(index);
            self.buf.shift_left(index, self.len);
            value
        };
        self.len -= 1;
        Some(value)
    }

    /// Remove the first element equal to `value`. Returns whether one was found.
    pub fn remove_value(&mut self, value: &Value) -> bool {
        match self.find(value) {
            Some(index) => {
                self.erase(index);
                true
            }
            None => false,
        }
    }

    /// Index of the first element equal to `value`.
    pub fn find(&self, value: &Value) -> Option<usize> {
        self.iter().position(|v| v == value)
    }

    /// Drop every element. The capacity is kept.
    pub fn clear(&mut self) {
        self.resize(0);
    }

    /// The live elements.
    pub fn as_slice(&self) -> &[Value] {
        // SAFETY: `[0, len)` are live.
        unsafe { self.buf.slice(self.len) }
    }

    /// The live elements, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [Value] {
        // SAFETY: `[0, len)` are live.
        unsafe { self.buf.slice_mut(self.len) }
    }

    /// Element at `index`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.as_slice().get(index)
    }

    /// Mutable element at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.as_mut_slice().get_mut(index)
    }

    /// First element.
    pub fn first(&self) -> Option<&Value> {
        self.as_slice().first()
    }

    /// Last element.
    pub fn last(&self) -> Option<&Value> {
        self.as_slice().last()
    }

    /// Iterate over the elements.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.as_slice().iter()
    }

    /// Iterate mutably over the elements.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Value> {
        self.as_mut_slice().iter_mut()
    }

    /// Element-wise comparison with an explicit float policy.
    pub fn eq_with(&self, other: &Array, mode: FloatCompare) -> bool {
        self.len == other.len
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| a.eq_with(b, mode))
    }

    /// Copy the whole tree below this array into `allocator`.
    pub fn deep_clone_in(&self, allocator: &AllocatorRef) -> Array {
        let mut out = Array::with_capacity_in(self.len, allocator.clone());
        for v in self.iter() {
            out.push(v.deep_clone_in(allocator));
        }
        out
    }
}

impl Default for Array {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Array {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Shallow copy: a new buffer in the same allocator holding new handles to
/// the same children.
impl Clone for Array {
    fn clone(&self) -> Self {
        let mut out = Array::with_capacity_in(self.len, self.allocator().clone());
        out.extend(self.iter().cloned());
        out
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.eq_with(other, FloatCompare::Epsilon)
    }
}

impl Index<usize> for Array {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.as_slice()[index]
    }
}

impl IndexMut<usize> for Array {
    fn index_mut(&mut self, index: usize) -> &mut Value {
        &mut self.as_mut_slice()[index]
    }
}

impl Extend<Value> for Array {
    fn extend<I: IntoIterator<Item = Value>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve_for(self.len + iter.size_hint().0);
        for v in iter {
            self.push(v);
        }
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut out = Array::new();
        out.extend(iter);
        out
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::ObjectFactory;

    fn ints(a: &Array) -> Vec<i64> {
        a.iter().map(Value::as_int).collect()
    }

    #[test]
    fn five_pushes_grow_to_four_then_eight() {
        let mut a = Array::new();
        let mut caps = Vec::new();
        for i in 0..5 {
            a.push(Value::from(i));
            caps.push(a.capacity());
        }
        assert_eq!(caps, vec![4, 4, 4, 4, 8]);
    }

    #[test]
    fn reserve_is_exact() {
        let mut a = Array::new();
        a.reserve(7);
        assert_eq!(a.capacity(), 7);
        a.reserve(3);
        assert_eq!(a.capacity(), 7);
    }

    #[test]
    fn insert_and_erase_shift_the_tail() {
        let mut a: Array = [1, 2, 4].into_iter().map(Value::from).collect();
        a.insert(2, Value::from(3));
        a.insert(0, Value::from(0));
        assert_eq!(ints(&a), vec![0, 1, 2, 3, 4]);
        assert_eq!(a.erase(1).map(|v| v.as_int()), Some(1));
        assert_eq!(ints(&a), vec![0, 2, 3, 4]);
        assert!(a.erase(4).is_none());
    }

    #[test]
    #[should_panic]
    fn insert_past_end_panics() {
        let mut a = Array::new();
        a.insert(1, Value::Null);
    }

    #[test]
    fn resize_fills_with_null_and_truncates() {
        let mut a = Array::new();
        a.resize(3);
        assert!(a.iter().all(Value::is_null));
        a[1] = Value::from(true);
        a.resize(1);
        assert_eq!(a.len(), 1);
        assert!(a.capacity() >= 3);
    }

    #[test]
    fn find_uses_value_equality() {
        let alloc = default_allocator();
        let mut a = Array::new();
        a.push(Value::from(1.0));
        a.push(Value::String(alloc.create_string(b"x")));
        assert_eq!(a.find(&Value::from(1)), Some(0));
        assert_eq!(a.find(&Value::String(alloc.create_string(b"x"))), Some(1));
        assert!(a.remove_value(&Value::from(1)));
        assert_eq!(a.len(), 1);
        assert!(!a.remove_value(&Value::from(1)));
    }

    #[test]
    fn shallow_clone_shares_children() {
        let alloc = default_allocator();
        let child = alloc.create_array();
        let mut a = Array::new();
        a.push(Value::Array(child.clone()));
        let b = a.clone();
        child.borrow_mut().push(Value::from(5));
        assert_eq!(b[0].len(), 1);
    }

    #[test]
    fn deep_clone_detaches_children() {
        let alloc = default_allocator();
        let child = alloc.create_array();
        let mut a = Array::new();
        a.push(Value::Array(child.clone()));
        let b = a.deep_clone_in(&alloc);
        child.borrow_mut().push(Value::from(5));
        assert_eq!(b[0].len(), 0);
    }

    #[test]
    fn pop_returns_in_reverse() {
        let mut a: Array = (0..3).map(Value::from).collect();
        assert_eq!(a.pop().map(|v| v.as_int()), Some(2));
        assert_eq!(a.len(), 2);
        a.clear();
        assert!(a.pop().is_none());
    }
}
