//! Pass-through allocator backed by the global system allocator.

use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::allocator::{AllocStats, Allocator};
use crate::raw;

/// Allocator that forwards every request to [`std::alloc`].
///
/// Safe to use from several threads at once: the global allocator is
/// thread-safe and the counters are atomic. This is the default allocator.
#[derive(Debug, Default)]
pub struct SystemAllocator {
    live_allocations: AtomicUsize,
    live_bytes: AtomicUsize,
    total_allocations: AtomicU64,
    total_frees: AtomicU64,
}

impl SystemAllocator {
    /// Create a new pass-through allocator.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Allocator for SystemAllocator {
    fn allocate(&self, layout: Layout) -> NonNull<u8> {
        let ptr = raw::system_alloc(layout);
        self.live_allocations.fetch_add(1, Ordering::Relaxed);
        self.live_bytes.fetch_add(layout.size(), Ordering::Relaxed);
        self.total_allocations.fetch_add(1, Ordering::Relaxed);
        ptr
    }

    #[allow(unsafe_code)]
    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: the caller guarantees `ptr` came from `allocate(layout)`,
        // which is `raw::system_alloc(layout)`.
        unsafe { raw::system_free(ptr, layout) };
        self.live_allocations.fetch_sub(1, Ordering::Relaxed);
        self.live_bytes.fetch_sub(layout.size(), Ordering::Relaxed);
        self.total_frees.fetch_add(1, Ordering::Relaxed);
    }

    fn name(&self) -> &'static str {
        "system"
    }

    fn stats(&self) -> AllocStats {
        AllocStats {
            live_allocations: self.live_allocations.load(Ordering::Relaxed),
            live_bytes: self.live_bytes.load(Ordering::Relaxed),
            total_allocations: self.total_allocations.load(Ordering::Relaxed),
            total_frees: self.total_frees.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;

    #[test]
    fn alloc_free_updates_counters() {
        let alloc = SystemAllocator::new();
        let layout = Layout::from_size_align(24, 8).unwrap();
        let p = alloc.allocate(layout);
        assert_eq!(alloc.stats().live_allocations, 1);
        assert_eq!(alloc.stats().live_bytes, 24);
        unsafe { alloc.free(p, layout) };
        let stats = alloc.stats();
        assert_eq!(stats.live_allocations, 0);
        assert_eq!(stats.total_allocations, 1);
        assert_eq!(stats.total_frees, 1);
    }

    #[test]
    fn usable_from_many_threads() {
        let alloc = std::sync::Arc::new(SystemAllocator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let alloc = alloc.clone();
                std::thread::spawn(move || {
                    let layout = Layout::from_size_align(64, 8).unwrap();
                    for _ in 0..100 {
                        let p = alloc.allocate(layout);
                        unsafe { alloc.free(p, layout) };
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(alloc.stats().live_allocations, 0);
        assert_eq!(alloc.stats().total_allocations, 400);
    }
}
