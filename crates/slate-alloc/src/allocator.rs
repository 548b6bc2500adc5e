//! The allocator capability trait and the per-thread default instance.

use std::alloc::Layout;
use std::fmt;
use std::ptr::NonNull;
use std::rc::Rc;

use crate::system::SystemAllocator;

/// Source of raw memory for heap-resident values.
///
/// An allocator hands out blocks described by a [`Layout`] and takes them
/// back through [`free`](Allocator::free). It is also the destruction
/// authority for every object created from it: objects remember the
/// allocator that produced them and are always returned to it.
///
/// Implementations must never return a null pointer. Exhaustion is
/// unrecoverable and aborts through [`std::alloc::handle_alloc_error`].
pub trait Allocator {
    /// Allocate a block satisfying `layout`.
    fn allocate(&self, layout: Layout) -> NonNull<u8>;

    /// Return a block to the allocator.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by [`allocate`](Allocator::allocate) on
    /// this same allocator with an identical `layout`, and must not have
    /// been freed already.
    #[allow(unsafe_code)]
    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout);

    /// Short label used in logs and `Debug` output.
    fn name(&self) -> &'static str;

    /// Allocation counters. Implementations that do not track return zeros.
    fn stats(&self) -> AllocStats {
        AllocStats::default()
    }
}

/// Shared, reference-counted handle to an allocator.
///
/// Cloning the handle retains the allocator; dropping it releases. The
/// allocator is freed when its last handle (including the ones held by the
/// objects it created) goes away.
pub type AllocatorRef = Rc<dyn Allocator>;

/// Allocation counters reported by [`Allocator::stats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllocStats {
    /// Blocks currently handed out.
    pub live_allocations: usize,
    /// Bytes currently handed out (requested sizes, not node sizes).
    pub live_bytes: usize,
    /// Blocks handed out since creation.
    pub total_allocations: u64,
    /// Blocks returned since creation.
    pub total_frees: u64,
}

impl AllocStats {
    pub(crate) fn record_alloc(&mut self, size: usize) {
        self.live_allocations += 1;
        self.live_bytes += size;
        self.total_allocations += 1;
    }

    pub(crate) fn record_free(&mut self, size: usize) {
        self.live_allocations = self.live_allocations.saturating_sub(1);
        self.live_bytes = self.live_bytes.saturating_sub(size);
        self.total_frees += 1;
    }
}

impl fmt::Display for AllocStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} live blocks ({} bytes), {} allocs / {} frees",
            self.live_allocations, self.live_bytes, self.total_allocations, self.total_frees
        )
    }
}

impl fmt::Debug for dyn Allocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Allocator")
            .field("name", &self.name())
            .field("stats", &self.stats())
            .finish()
    }
}

thread_local! {
    static DEFAULT_ALLOCATOR: AllocatorRef = Rc::new(SystemAllocator::new());
}

/// The default allocator for the calling thread.
///
/// A [`SystemAllocator`] created on first use and kept alive for the rest
/// of the thread. It cannot be replaced; code that wants a different
/// allocator passes one explicitly.
pub fn default_allocator() -> AllocatorRef {
    DEFAULT_ALLOCATOR.with(Rc::clone)
}

/// Whether two handles refer to the same allocator instance.
pub fn same_allocator(a: &AllocatorRef, b: &AllocatorRef) -> bool {
    Rc::ptr_eq(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allocator_is_shared_per_thread() {
        let a = default_allocator();
        let b = default_allocator();
        assert!(same_allocator(&a, &b));
        assert_eq!(a.name(), "system");
    }

    #[test]
    fn stats_record_alloc_and_free() {
        let mut stats = AllocStats::default();
        stats.record_alloc(32);
        stats.record_alloc(8);
        stats.record_free(32);
        assert_eq!(stats.live_allocations, 1);
        assert_eq!(stats.live_bytes, 8);
        assert_eq!(stats.total_allocations, 2);
        assert_eq!(stats.total_frees, 1);
    }
}
