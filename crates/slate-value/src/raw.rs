//! Allocator-backed contiguous buffers.
//!
//! [`RawBuf`] is the storage behind every growable Slate container. It owns
//! an uninitialised block obtained from an [`Allocator`] and tracks only the
//! capacity; the container on top tracks which slots are live and is
//! responsible for dropping them.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::marker::PhantomData;
use std::ptr::{self, NonNull};

use slate_alloc::{Allocator, AllocatorRef};

/// Uninitialised, allocator-owned storage for up to `capacity` values.
pub(crate) struct RawBuf<T> {
    ptr: NonNull<T>,
    cap: usize,
    allocator: AllocatorRef,
    _owns: PhantomData<T>,
}

fn capacity_overflow() -> ! {
    panic!("capacity overflow")
}

impl<T> RawBuf<T> {
    /// An empty buffer that allocates nothing until it grows.
    pub(crate) fn new_in(allocator: AllocatorRef) -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: 0,
            allocator,
            _owns: PhantomData,
        }
    }

    /// A buffer with room for exactly `cap` values.
    pub(crate) fn with_capacity_in(cap: usize, allocator: AllocatorRef) -> Self {
        let mut buf = Self::new_in(allocator);
        buf.grow_exact(cap, 0);
        buf
    }

    fn layout(cap: usize) -> Layout {
        match Layout::array::<T>(cap) {
            Ok(layout) => layout,
            Err(_) => capacity_overflow(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.cap
    }

    pub(crate) fn allocator(&self) -> &AllocatorRef {
        &self.allocator
    }

    pub(crate) fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Move to a block of exactly `new_cap` slots, carrying the first `len`.
    ///
    /// No-op unless `new_cap > capacity`.
    pub(crate) fn grow_exact(&mut self, new_cap: usize, len: usize) {
        if new_cap <= self.cap {
            return;
        }
        debug_assert!(len <= self.cap);
        let new_layout = Self::layout(new_cap);
        let new_ptr = self.allocator.allocate(new_layout).cast::<T>();
        if self.cap != 0 {
            // SAFETY: both blocks hold at least `len` slots, the old one has
            // `len` initialised values, and distinct live blocks never overlap.
            unsafe { ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), len) };
            // SAFETY: the old block came from this allocator with this layout.
            unsafe { self.allocator.free(self.ptr.cast(), Self::layout(self.cap)) };
        }
        self.ptr = new_ptr;
        self.cap = new_cap;
    }

    /// Grow for `needed` total slots using the geometric policy
    /// `max(needed, max(2 * capacity, 4))`.
    pub(crate) fn grow_for(&mut self, needed: usize, len: usize) {
        if needed > self.cap {
            let doubled = self.cap.checked_mul(2).unwrap_or_else(|| capacity_overflow());
            self.grow_exact(needed.max(doubled.max(4)), len);
        }
    }

    /// Write `value` into slot `index` without dropping the old contents.
    ///
    /// # Safety
    ///
    /// `index < capacity` and the slot holds no live value.
    pub(crate) unsafe fn write(&mut self, index: usize, value: T) {
        debug_assert!(index < self.cap);
        // SAFETY: the caller guarantees `index` is in bounds and vacant.
        unsafe { self.ptr.as_ptr().add(index).write(value) }
    }

    /// Move the value out of slot `index`, leaving it vacant.
    ///
    /// # Safety
    ///
    /// `index < capacity` and the slot holds a live value.
    pub(crate) unsafe fn read(&mut self, index: usize) -> T {
        debug_assert!(index < self.cap);
        // SAFETY: the caller guarantees `index` is in bounds and live.
        unsafe { self.ptr.as_ptr().add(index).read() }
    }

    /// Open a vacant slot at `index` by moving `[index, len)` one slot up.
    ///
    /// # Safety
    ///
    /// `index <= len < capacity`, and `[0, len)` are live.
    pub(crate) unsafe fn shift_right(&mut self, index: usize, len: usize) {
        debug_assert!(index <= len && len < self.cap);
        let base = self.ptr.as_ptr();
        // SAFETY: source and destination both lie within `[0, len + 1)`,
        // which is inside the block; `copy` permits overlap.
        unsafe { ptr::copy(base.add(index), base.add(index + 1), len - index) }
    }

    /// Close the vacant slot at `index` by moving `(index, len)` one slot down.
    ///
    /// # Safety
    ///
    /// `index < len <= capacity`, slot `index` is vacant and the others in
    /// `[0, len)` are live.
    pub(crate) unsafe fn shift_left(&mut self, index: usize, len: usize) {
        debug_assert!(index < len && len <= self.cap);
        let base = self.ptr.as_ptr();
        // SAFETY: source and destination both lie within `[0, len)`;
        // `copy` permits overlap.
        unsafe { ptr::copy(base.add(index + 1), base.add(index), len - index - 1) }
    }

    /// The first `len` slots as a slice.
    ///
    /// # Safety
    ///
    /// `[0, len)` are live and `len <= capacity`.
    pub(crate) unsafe fn slice(&self, len: usize) -> &[T] {
        debug_assert!(len <= self.cap);
        // SAFETY: the caller guarantees the range is live and in bounds; a
        // dangling pointer is valid for zero-length slices.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), len) }
    }

    /// The first `len` slots as a mutable slice.
    ///
    /// # Safety
    ///
    /// `[0, len)` are live and `len <= capacity`.
    pub(crate) unsafe fn slice_mut(&mut self, len: usize) -> &mut [T] {
        debug_assert!(len <= self.cap);
        // SAFETY: as for `slice`, and `&mut self` guarantees uniqueness.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), len) }
    }

    /// Drop the values in `[from, to)` in place.
    ///
    /// # Safety
    ///
    /// `[from, to)` are live; they are vacant afterwards.
    pub(crate) unsafe fn drop_range(&mut self, from: usize, to: usize) {
        debug_assert!(from <= to && to <= self.cap);
        // SAFETY: the caller guarantees the range is live and in bounds.
        unsafe {
            let tail = ptr::slice_from_raw_parts_mut(self.ptr.as_ptr().add(from), to - from);
            ptr::drop_in_place(tail);
        }
    }
}

impl<T> Drop for RawBuf<T> {
    fn drop(&mut self) {
        if self.cap != 0 {
            // SAFETY: the block came from this allocator with this layout;
            // the owning container has already dropped every live value.
            unsafe { self.allocator.free(self.ptr.cast(), Self::layout(self.cap)) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_alloc::default_allocator;

    #[test]
    fn geometric_growth_from_empty() {
        let mut buf = RawBuf::<u64>::new_in(default_allocator());
        buf.grow_for(1, 0);
        assert_eq!(buf.capacity(), 4);
        buf.grow_for(5, 0);
        assert_eq!(buf.capacity(), 8);
        buf.grow_for(30, 0);
        assert_eq!(buf.capacity(), 30);
    }

    #[test]
    fn exact_growth_keeps_contents() {
        let mut buf = RawBuf::<u32>::with_capacity_in(2, default_allocator());
        unsafe {
            buf.write(0, 7);
            buf.write(1, 9);
        }
        buf.grow_exact(7, 2);
        assert_eq!(buf.capacity(), 7);
        assert_eq!(unsafe { buf.slice(2) }, &[7, 9]);
    }

    #[test]
    fn shifts_move_the_tail() {
        let mut buf = RawBuf::<u32>::with_capacity_in(4, default_allocator());
        unsafe {
            buf.write(0, 1);
            buf.write(1, 3);
            buf.shift_right(1, 2);
            buf.write(1, 2);
            assert_eq!(buf.slice(3), &[1, 2, 3]);
            assert_eq!(buf.read(0), 1);
            buf.shift_left(0, 3);
            assert_eq!(buf.slice(2), &[2, 3]);
        }
    }
}
