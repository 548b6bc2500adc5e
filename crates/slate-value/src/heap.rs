//! Reference-counted heap objects and the allocator-side factories.
//!
//! A [`Heap<T>`] is a non-atomic shared handle to a cell obtained from an
//! [`Allocator`]. The cell holds the reference count, a handle to the
//! allocator that produced it, and the body. Cloning a handle retains the
//! cell; dropping the last handle destroys the body and returns the cell to
//! its allocator.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::Deref;
use std::ptr::{self, NonNull};
use std::rc::Rc;

use slate_alloc::{AllocError, Allocator, AllocatorRef, PoolAllocator, PoolConfig};

use crate::array::Array;
use crate::map::Map;
use crate::string::Str;

/// Shared handle to an immutable string body.
pub type StrRef = Heap<Str>;
/// Shared handle to a mutable array body.
pub type ArrayRef = Heap<RefCell<Array>>;
/// Shared handle to a mutable map body.
pub type MapRef = Heap<RefCell<Map>>;

#[repr(C)]
struct HeapCell<T> {
    refs: Cell<usize>,
    allocator: AllocatorRef,
    body: T,
}

/// Intrusively reference-counted handle to an allocator-owned `T`.
///
/// Behaves like `Rc<T>` except that the storage comes from the allocator
/// given at creation, and that allocator stays alive for as long as the
/// object does. Not `Send` or `Sync`.
pub struct Heap<T> {
    ptr: NonNull<HeapCell<T>>,
    _owns: PhantomData<HeapCell<T>>,
}

impl<T> Heap<T> {
    /// Allocate a new object holding `body` from `allocator`.
    ///
    /// The returned handle owns the only reference.
    pub fn new_in(allocator: &AllocatorRef, body: T) -> Self {
        let ptr = allocator.allocate(Self::cell_layout()).cast::<HeapCell<T>>();
        // SAFETY: `ptr` is a fresh block sized and aligned for `HeapCell<T>`.
        unsafe {
            ptr.as_ptr().write(HeapCell {
                refs: Cell::new(1),
                allocator: Rc::clone(allocator),
                body,
            })
        };
        Self {
            ptr,
            _owns: PhantomData,
        }
    }

    /// Layout of the cell allocated for each object.
    pub fn cell_layout() -> Layout {
        Layout::new::<HeapCell<T>>()
    }

    fn cell(&self) -> &HeapCell<T> {
        // SAFETY: a live handle keeps the cell initialised and allocated.
        unsafe { self.ptr.as_ref() }
    }

    /// Current number of handles to this object.
    pub fn ref_count(this: &Self) -> usize {
        this.cell().refs.get()
    }

    /// The allocator that owns this object.
    pub fn allocator(this: &Self) -> &AllocatorRef {
        &this.cell().allocator
    }

    /// Whether two handles point at the same object.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        a.ptr == b.ptr
    }
}

/// Destroy the object in `ptr` and return its cell to the owning allocator.
///
/// The allocator is pinned across the destructor and the release, so an
/// object that holds the last outside handle to its allocator cannot free
/// the allocator mid-call.
///
/// # Safety
///
/// The cell's reference count has reached zero and no handle remains.
unsafe fn free_object<T>(ptr: NonNull<HeapCell<T>>) {
    // SAFETY: the cell is still initialised; only the count reached zero.
    let allocator = Rc::clone(unsafe { &ptr.as_ref().allocator });
    // SAFETY: no handle remains, so the cell is dropped exactly once.
    unsafe { ptr::drop_in_place(ptr.as_ptr()) };
    // SAFETY: the cell was allocated from this allocator with this layout.
    unsafe { allocator.free(ptr.cast(), Heap::<T>::cell_layout()) };
}

impl<T> Clone for Heap<T> {
    fn clone(&self) -> Self {
        let refs = &self.cell().refs;
        refs.set(refs.get() + 1);
        Self {
            ptr: self.ptr,
            _owns: PhantomData,
        }
    }
}

impl<T> Drop for Heap<T> {
    fn drop(&mut self) {
        let refs = &self.cell().refs;
        let remaining = refs.get() - 1;
        refs.set(remaining);
        if remaining == 0 {
            // SAFETY: this was the last handle.
            unsafe { free_object(self.ptr) };
        }
    }
}

impl<T> Deref for Heap<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.cell().body
    }
}

impl<T: fmt::Debug> fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

// ── Factories ──────────────────────────────────────────────────

/// Object constructors on an allocator handle.
///
/// Every heap object in a Slate tree is created through one of these, so the
/// object and all of its buffers come from the same allocator.
pub trait ObjectFactory {
    /// Create a string holding a copy of `bytes`.
    fn create_string(&self, bytes: &[u8]) -> StrRef;
    /// Create a string that borrows caller-owned static bytes.
    fn create_static_string(&self, bytes: &'static [u8]) -> StrRef;
    /// Create a string that takes ownership of `bytes`.
    fn adopt_string(&self, bytes: Vec<u8>) -> StrRef;
    /// Create an empty array.
    fn create_array(&self) -> ArrayRef;
    /// Create an empty map.
    fn create_map(&self) -> MapRef;
}

impl ObjectFactory for AllocatorRef {
    fn create_string(&self, bytes: &[u8]) -> StrRef {
        Heap::new_in(self, Str::copied_in(bytes, self))
    }

    fn create_static_string(&self, bytes: &'static [u8]) -> StrRef {
        Heap::new_in(self, Str::from_static(bytes))
    }

    fn adopt_string(&self, bytes: Vec<u8>) -> StrRef {
        Heap::new_in(self, Str::adopted(bytes))
    }

    fn create_array(&self) -> ArrayRef {
        Heap::new_in(self, RefCell::new(Array::new_in(self.clone())))
    }

    fn create_map(&self) -> MapRef {
        Heap::new_in(self, RefCell::new(Map::new_in(self.clone())))
    }
}

/// Node size that fits the cell of every heap object kind.
pub fn object_node_size() -> usize {
    mem::size_of::<HeapCell<Str>>()
        .max(mem::size_of::<HeapCell<RefCell<Array>>>())
        .max(mem::size_of::<HeapCell<RefCell<Map>>>())
}

/// Create a pool allocator whose nodes fit every heap object kind.
///
/// Strings, arrays, and maps come from pool nodes; their content buffers
/// are larger than a node in general and fall through to the system
/// allocator.
pub fn pool_allocator() -> Result<AllocatorRef, AllocError> {
    pool_allocator_with(PoolConfig::new(object_node_size()))
}

/// Like [`pool_allocator`], with a caller-supplied config.
///
/// The node size is raised to [`object_node_size`] if smaller.
pub fn pool_allocator_with(mut config: PoolConfig) -> Result<AllocatorRef, AllocError> {
    if config.node_size < object_node_size() {
        config.node_size = PoolConfig::new(object_node_size()).node_size;
    }
    let pool = PoolAllocator::new(config)?;
    log::trace!(
        "object pool: node size {}, {} nodes per page",
        pool.node_size(),
        pool.nodes_per_page()
    );
    Ok(Rc::new(pool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_alloc::{default_allocator, TrackingAllocator};

    #[test]
    fn clone_and_drop_track_ref_count() {
        let alloc = default_allocator();
        let a = alloc.create_string(b"abc");
        assert_eq!(Heap::ref_count(&a), 1);
        let b = a.clone();
        assert_eq!(Heap::ref_count(&a), 2);
        assert!(Heap::ptr_eq(&a, &b));
        drop(b);
        assert_eq!(Heap::ref_count(&a), 1);
        assert_eq!(a.as_bytes(), b"abc");
    }

    #[test]
    fn last_release_frees_through_allocator() {
        let tracker = Rc::new(TrackingAllocator::new(default_allocator()));
        let alloc: AllocatorRef = tracker.clone();
        let s = alloc.create_string(b"hello");
        // Cell plus copied buffer.
        assert_eq!(tracker.live_allocations(), 2);
        drop(s);
        assert_eq!(tracker.live_allocations(), 0);
        assert_eq!(tracker.invalid_frees(), 0);
    }

    #[test]
    fn object_keeps_its_allocator_alive() {
        let tracker = Rc::new(TrackingAllocator::new(default_allocator()));
        let weak = Rc::downgrade(&tracker);
        let alloc: AllocatorRef = tracker;
        let map = alloc.create_map();
        drop(alloc);
        assert!(weak.upgrade().is_some());
        drop(map);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn pool_allocator_serves_every_cell() {
        let pool = pool_allocator().unwrap();
        for layout in [
            Heap::<Str>::cell_layout(),
            Heap::<RefCell<Array>>::cell_layout(),
            Heap::<RefCell<Map>>::cell_layout(),
        ] {
            assert!(layout.size() <= object_node_size());
        }
        let a = pool.create_array();
        assert!(slate_alloc::same_allocator(Heap::allocator(&a), &pool));
    }
}
