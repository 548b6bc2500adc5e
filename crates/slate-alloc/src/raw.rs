//! Low-level primitives for allocator memory operations.
//!
//! The only place in this crate that touches raw pointers directly. Each
//! `unsafe` block carries a `// SAFETY:` comment stating the invariant it
//! relies on.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::ptr::{self, NonNull};

/// A well-aligned, non-null pointer for zero-sized allocations.
pub(crate) fn dangling(layout: Layout) -> NonNull<u8> {
    match NonNull::new(ptr::without_provenance_mut::<u8>(layout.align())) {
        Some(p) => p,
        None => NonNull::dangling(),
    }
}

/// Obtain a block from the global allocator, aborting on exhaustion.
///
/// Zero-sized layouts yield a dangling, well-aligned pointer.
pub(crate) fn system_alloc(layout: Layout) -> NonNull<u8> {
    if layout.size() == 0 {
        return dangling(layout);
    }
    // SAFETY: the layout has a non-zero size.
    let ptr = unsafe { alloc::alloc(layout) };
    match NonNull::new(ptr) {
        Some(p) => p,
        None => alloc::handle_alloc_error(layout),
    }
}

/// Return a block obtained from [`system_alloc`].
///
/// # Safety
///
/// `ptr` must have been returned by `system_alloc(layout)` with the same
/// layout and must not have been freed already.
pub(crate) unsafe fn system_free(ptr: NonNull<u8>, layout: Layout) {
    if layout.size() == 0 {
        return;
    }
    // SAFETY: guaranteed by the caller contract above.
    unsafe { alloc::dealloc(ptr.as_ptr(), layout) }
}

/// Free-list link written into the first word of an unused pool node.
pub(crate) struct FreeNode {
    next: Option<NonNull<FreeNode>>,
}

/// Head of an intrusive singly linked free list.
pub(crate) type FreeList = Option<NonNull<FreeNode>>;

/// Push an unused node onto a free list.
///
/// # Safety
///
/// `node` must point to at least `size_of::<FreeNode>()` writable bytes,
/// aligned for `FreeNode`, that nobody else is using.
pub(crate) unsafe fn push_node(head: &mut FreeList, node: NonNull<u8>) {
    let node = node.cast::<FreeNode>();
    // SAFETY: the caller guarantees the node is writable, aligned, and unused.
    unsafe { node.as_ptr().write(FreeNode { next: *head }) };
    *head = Some(node);
}

/// Pop a node from a free list.
///
/// # Safety
///
/// Every node on the list must have been pushed with [`push_node`] and
/// still be unused.
pub(crate) unsafe fn pop_node(head: &mut FreeList) -> Option<NonNull<u8>> {
    let node = (*head)?;
    // SAFETY: the node was initialised by `push_node` and is still unused.
    *head = unsafe { (*node.as_ptr()).next };
    Some(node.cast())
}

/// Thread every node of a freshly allocated page onto a new free list.
///
/// # Safety
///
/// `base` must point to at least `node_size * count` writable bytes aligned
/// for `FreeNode`, and `node_size` must be a multiple of that alignment.
pub(crate) unsafe fn thread_page(base: NonNull<u8>, node_size: usize, count: usize) -> FreeList {
    let mut head = None;
    // Push in reverse so that allocation walks the page front to back.
    for i in (0..count).rev() {
        // SAFETY: `i * node_size` stays within the page per the contract.
        let node = unsafe { base.add(i * node_size) };
        // SAFETY: each node is in bounds, aligned, and not yet handed out.
        unsafe { push_node(&mut head, node) };
    }
    head
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_alloc_is_aligned_and_free_is_noop() {
        let layout = Layout::from_size_align(0, 16).unwrap();
        let p = system_alloc(layout);
        assert_eq!(p.as_ptr() as usize % 16, 0);
        unsafe { system_free(p, layout) };
    }

    #[test]
    fn threaded_page_pops_in_address_order() {
        let node_size = 16;
        let layout = Layout::from_size_align(node_size * 4, 8).unwrap();
        let base = system_alloc(layout);
        let mut list = unsafe { thread_page(base, node_size, 4) };
        let mut addrs = Vec::new();
        while let Some(node) = unsafe { pop_node(&mut list) } {
            addrs.push(node.as_ptr() as usize - base.as_ptr() as usize);
        }
        assert_eq!(addrs, vec![0, 16, 32, 48]);
        unsafe { system_free(base, layout) };
    }
}
