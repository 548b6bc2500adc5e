//! Allocator wrapper that audits every block it hands out.

use std::alloc::Layout;
use std::cell::RefCell;
use std::collections::HashMap;
use std::ptr::NonNull;

use crate::allocator::{AllocStats, Allocator, AllocatorRef};

#[derive(Default)]
struct Ledger {
    live: HashMap<usize, Layout>,
    stats: AllocStats,
    invalid_frees: usize,
}

/// Wraps another allocator and records every live block.
///
/// Used by tests to prove that object lifetimes are balanced: after the last
/// reference to a value tree is dropped, [`live_allocations`] must return to
/// its starting point. Frees of unknown pointers, double frees, and frees
/// with a mismatched layout are counted in [`invalid_frees`] and are not
/// forwarded to the inner allocator.
///
/// [`live_allocations`]: TrackingAllocator::live_allocations
/// [`invalid_frees`]: TrackingAllocator::invalid_frees
pub struct TrackingAllocator {
    inner: AllocatorRef,
    ledger: RefCell<Ledger>,
}

impl TrackingAllocator {
    /// Track allocations served by `inner`.
    pub fn new(inner: AllocatorRef) -> Self {
        Self {
            inner,
            ledger: RefCell::new(Ledger::default()),
        }
    }

    /// The wrapped allocator.
    pub fn inner(&self) -> &AllocatorRef {
        &self.inner
    }

    /// Number of blocks handed out and not yet freed.
    pub fn live_allocations(&self) -> usize {
        self.ledger.borrow().live.len()
    }

    /// Number of rejected frees.
    pub fn invalid_frees(&self) -> usize {
        self.ledger.borrow().invalid_frees
    }

    /// Whether `ptr` is a live block of this allocator.
    pub fn is_live(&self, ptr: NonNull<u8>) -> bool {
        self.ledger
            .borrow()
            .live
            .contains_key(&(ptr.as_ptr() as usize))
    }
}

impl Allocator for TrackingAllocator {
    fn allocate(&self, layout: Layout) -> NonNull<u8> {
        let ptr = self.inner.allocate(layout);
        let mut ledger = self.ledger.borrow_mut();
        // Zero-sized blocks share dangling addresses and are not tracked.
        if layout.size() != 0 {
            ledger.live.insert(ptr.as_ptr() as usize, layout);
        }
        ledger.stats.record_alloc(layout.size());
        log::trace!("tracking: alloc {} bytes at {ptr:p}", layout.size());
        ptr
    }

    #[allow(unsafe_code)]
    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        {
            let mut ledger = self.ledger.borrow_mut();
            if layout.size() != 0 {
                match ledger.live.remove(&(ptr.as_ptr() as usize)) {
                    Some(recorded) if recorded == layout => {}
                    Some(recorded) => {
                        log::error!(
                            "tracking: free of {ptr:p} with layout {layout:?}, allocated as {recorded:?}"
                        );
                        ledger.live.insert(ptr.as_ptr() as usize, recorded);
                        ledger.invalid_frees += 1;
                        return;
                    }
                    None => {
                        log::error!("tracking: free of unknown or already freed {ptr:p}");
                        ledger.invalid_frees += 1;
                        return;
                    }
                }
            }
            ledger.stats.record_free(layout.size());
        }
        // SAFETY: the ledger confirmed `ptr` is a live block allocated from
        // `inner` with this exact layout.
        unsafe { self.inner.free(ptr, layout) }
    }

    fn name(&self) -> &'static str {
        "tracking"
    }

    fn stats(&self) -> AllocStats {
        self.ledger.borrow().stats
    }
}

impl std::fmt::Debug for TrackingAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingAllocator")
            .field("inner", &self.inner.name())
            .field("live", &self.live_allocations())
            .field("invalid_frees", &self.invalid_frees())
            .finish()
    }
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;
    use crate::allocator::default_allocator;
    use crate::{PoolAllocator, PoolConfig};
    use std::rc::Rc;

    fn layout(size: usize) -> Layout {
        Layout::from_size_align(size, 8).unwrap()
    }

    #[test]
    fn balanced_alloc_free_leaves_nothing_live() {
        let tracker = TrackingAllocator::new(default_allocator());
        let a = tracker.allocate(layout(32));
        let b = tracker.allocate(layout(64));
        assert_eq!(tracker.live_allocations(), 2);
        assert!(tracker.is_live(a));
        unsafe {
            tracker.free(a, layout(32));
            tracker.free(b, layout(64));
        }
        assert_eq!(tracker.live_allocations(), 0);
        assert_eq!(tracker.invalid_frees(), 0);
    }

    #[test]
    fn double_free_is_caught() {
        let tracker = TrackingAllocator::new(default_allocator());
        let a = tracker.allocate(layout(16));
        unsafe {
            tracker.free(a, layout(16));
            tracker.free(a, layout(16));
        }
        assert_eq!(tracker.invalid_frees(), 1);
    }

    #[test]
    fn mismatched_layout_is_caught_and_block_stays_live() {
        let tracker = TrackingAllocator::new(default_allocator());
        let a = tracker.allocate(layout(16));
        unsafe { tracker.free(a, layout(24)) };
        assert_eq!(tracker.invalid_frees(), 1);
        assert!(tracker.is_live(a));
        unsafe { tracker.free(a, layout(16)) };
        assert_eq!(tracker.live_allocations(), 0);
    }

    #[test]
    fn wraps_a_pool() {
        let pool: AllocatorRef = Rc::new(PoolAllocator::new(PoolConfig::new(32)).unwrap());
        let tracker = TrackingAllocator::new(pool);
        let a = tracker.allocate(layout(32));
        assert_eq!(tracker.inner().stats().live_allocations, 1);
        unsafe { tracker.free(a, layout(32)) };
        assert_eq!(tracker.inner().stats().live_allocations, 0);
    }
}
