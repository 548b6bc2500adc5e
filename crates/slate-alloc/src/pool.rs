//! Slab/pool allocator for small, fixed-size objects.
//!
//! A [`PoolAllocator`] keeps a set of pages. Each page is carved into
//! equally sized nodes threaded onto an intrusive free list, so creating
//! and destroying heap objects costs a pointer swap instead of a trip to
//! the system allocator. Requests that do not fit a node bypass the pool.

use std::alloc::Layout;
use std::cell::RefCell;
use std::ptr::NonNull;

use crate::allocator::{AllocStats, Allocator};
use crate::config::PoolConfig;
use crate::error::AllocError;
use crate::raw::{self, FreeList};

/// One page of pool memory.
struct Page {
    /// Start of the page, allocated with `PoolAllocator::page_layout`.
    base: NonNull<u8>,
    /// Unused nodes of this page.
    free_list: FreeList,
    /// Nodes currently handed out from this page.
    alloc_count: usize,
}

impl Page {
    fn contains(&self, ptr: NonNull<u8>, page_size: usize) -> bool {
        let start = self.base.as_ptr() as usize;
        let addr = ptr.as_ptr() as usize;
        addr >= start && addr < start + page_size
    }
}

#[derive(Default)]
struct PoolState {
    pages: Vec<Page>,
    stats: AllocStats,
    /// Live allocations that bypassed the pool.
    bypass_live: usize,
}

/// Allocator that serves small requests from fixed-size page nodes.
///
/// - Requests with `size <= node_size` and `align <= node_align` take a
///   node from the most recently created page that has one, creating a
///   new page when all pages are full.
/// - Larger or over-aligned requests go to the system allocator.
/// - Freeing finds the owning page by a linear scan (page count stays small
///   relative to node count). When a page becomes empty and the total number
///   of free nodes reaches `release_threshold_percent` of one page, the page
///   is handed back to the system allocator.
///
/// Not thread-safe: the allocator is `!Sync` and `!Send`.
pub struct PoolAllocator {
    config: PoolConfig,
    nodes_per_page: usize,
    page_layout: Layout,
    state: RefCell<PoolState>,
}

impl PoolAllocator {
    /// Create a pool allocator from a validated config.
    pub fn new(config: PoolConfig) -> Result<Self, AllocError> {
        config.validate()?;
        let page_layout = Layout::from_size_align(config.page_size, config.node_align)
            .map_err(|_| AllocError::PageTooSmall {
                page_size: config.page_size,
                node_size: config.node_size,
            })?;
        Ok(Self {
            nodes_per_page: config.nodes_per_page(),
            page_layout,
            config,
            state: RefCell::new(PoolState::default()),
        })
    }

    /// The config this pool was built with.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Size of every pool-managed node in bytes.
    pub fn node_size(&self) -> usize {
        self.config.node_size
    }

    /// Number of nodes in each page.
    pub fn nodes_per_page(&self) -> usize {
        self.nodes_per_page
    }

    /// Number of resident pages.
    pub fn page_count(&self) -> usize {
        self.state.borrow().pages.len()
    }

    /// Number of unused nodes across all resident pages.
    pub fn free_node_count(&self) -> usize {
        Self::free_nodes(&self.state.borrow(), self.nodes_per_page)
    }

    /// Number of live allocations that bypassed the pool.
    pub fn bypass_count(&self) -> usize {
        self.state.borrow().bypass_live
    }

    /// Whether a request is served from pool nodes.
    pub fn serves(&self, layout: Layout) -> bool {
        layout.size() != 0
            && layout.size() <= self.config.node_size
            && layout.align() <= self.config.node_align
    }

    fn free_nodes(state: &PoolState, nodes_per_page: usize) -> usize {
        state
            .pages
            .iter()
            .map(|p| nodes_per_page - p.alloc_count)
            .sum()
    }

    #[allow(unsafe_code)]
    fn new_page(&self, state: &mut PoolState) -> usize {
        let base = raw::system_alloc(self.page_layout);
        // SAFETY: `base` spans `page_size >= node_size * nodes_per_page`
        // bytes aligned to `node_align`, and `node_size` is a multiple of
        // `node_align` (checked by `PoolConfig::validate`).
        let free_list =
            unsafe { raw::thread_page(base, self.config.node_size, self.nodes_per_page) };
        state.pages.push(Page {
            base,
            free_list,
            alloc_count: 0,
        });
        log::debug!(
            "pool allocator: new page #{} ({} nodes of {} bytes)",
            state.pages.len(),
            self.nodes_per_page,
            self.config.node_size
        );
        state.pages.len() - 1
    }

    #[allow(unsafe_code)]
    fn try_release_page(&self, state: &mut PoolState, index: usize) {
        let threshold =
            self.nodes_per_page * self.config.release_threshold_percent as usize / 100;
        if Self::free_nodes(state, self.nodes_per_page) < threshold {
            return;
        }
        let page = state.pages.swap_remove(index);
        // SAFETY: the page base came from `system_alloc(page_layout)` and no
        // node of it is handed out (`alloc_count == 0`).
        unsafe { raw::system_free(page.base, self.page_layout) };
        log::debug!(
            "pool allocator: released page, {} pages resident",
            state.pages.len()
        );
    }
}

impl Allocator for PoolAllocator {
    #[allow(unsafe_code)]
    fn allocate(&self, layout: Layout) -> NonNull<u8> {
        let mut state = self.state.borrow_mut();
        state.stats.record_alloc(layout.size());

        if !self.serves(layout) {
            state.bypass_live += 1;
            return raw::system_alloc(layout);
        }

        let index = match state.pages.iter().rposition(|p| p.free_list.is_some()) {
            Some(i) => i,
            None => self.new_page(&mut state),
        };
        let page = &mut state.pages[index];
        // SAFETY: the page's free list only holds nodes threaded by
        // `thread_page` or returned through `free`, none of them in use.
        match unsafe { raw::pop_node(&mut page.free_list) } {
            Some(node) => {
                page.alloc_count += 1;
                node
            }
            // Unreachable: `index` names a page with a non-empty list.
            None => raw::system_alloc(layout),
        }
    }

    #[allow(unsafe_code)]
    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        let mut state = self.state.borrow_mut();
        state.stats.record_free(layout.size());

        if !self.serves(layout) {
            state.bypass_live = state.bypass_live.saturating_sub(1);
            // SAFETY: requests this pool does not serve were allocated by
            // `system_alloc(layout)`; the caller guarantees the layout matches.
            unsafe { raw::system_free(ptr, layout) };
            return;
        }

        let page_size = self.config.page_size;
        let Some(index) = state.pages.iter().position(|p| p.contains(ptr, page_size)) else {
            debug_assert!(false, "pointer {ptr:p} was not allocated by this pool");
            log::error!("pool allocator: ignoring free of foreign pointer {ptr:p}");
            return;
        };

        let page = &mut state.pages[index];
        // SAFETY: `ptr` is a node of this page that the caller no longer
        // uses; nodes are `node_size` bytes aligned to `node_align`.
        unsafe { raw::push_node(&mut page.free_list, ptr) };
        page.alloc_count -= 1;
        if page.alloc_count == 0 {
            self.try_release_page(&mut state, index);
        }
    }

    fn name(&self) -> &'static str {
        "pool"
    }

    fn stats(&self) -> AllocStats {
        self.state.borrow().stats
    }
}

impl Drop for PoolAllocator {
    #[allow(unsafe_code)]
    fn drop(&mut self) {
        let state = self.state.get_mut();
        for page in state.pages.drain(..) {
            if page.alloc_count != 0 {
                log::warn!(
                    "pool allocator dropped with {} live nodes in a page",
                    page.alloc_count
                );
            }
            // SAFETY: every page base came from `system_alloc(page_layout)`.
            unsafe { raw::system_free(page.base, self.page_layout) };
        }
    }
}

impl std::fmt::Debug for PoolAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolAllocator")
            .field("node_size", &self.config.node_size)
            .field("nodes_per_page", &self.nodes_per_page)
            .field("pages", &self.page_count())
            .field("free_nodes", &self.free_node_count())
            .finish()
    }
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;

    /// 4 nodes of 16 bytes per page.
    fn small_pool() -> PoolAllocator {
        PoolAllocator::new(PoolConfig::new(16).with_page_size(64)).unwrap()
    }

    fn node() -> Layout {
        Layout::from_size_align(16, 8).unwrap()
    }

    #[test]
    fn first_alloc_creates_a_page() {
        let pool = small_pool();
        assert_eq!(pool.page_count(), 0);
        let p = pool.allocate(node());
        assert_eq!(pool.page_count(), 1);
        assert_eq!(pool.free_node_count(), 3);
        unsafe { pool.free(p, node()) };
    }

    #[test]
    fn freed_node_is_reused() {
        let pool = small_pool();
        let a = pool.allocate(node());
        let _b = pool.allocate(node());
        unsafe { pool.free(a, node()) };
        let c = pool.allocate(node());
        assert_eq!(a, c);
    }

    #[test]
    fn full_page_grows_a_second_page() {
        let pool = small_pool();
        let ptrs: Vec<_> = (0..5).map(|_| pool.allocate(node())).collect();
        assert_eq!(pool.page_count(), 2);
        for p in ptrs {
            unsafe { pool.free(p, node()) };
        }
    }

    #[test]
    fn nodes_are_aligned_and_distinct() {
        let pool = small_pool();
        let ptrs: Vec<_> = (0..8).map(|_| pool.allocate(node())).collect();
        for p in &ptrs {
            assert_eq!(p.as_ptr() as usize % 8, 0);
        }
        let mut addrs: Vec<_> = ptrs.iter().map(|p| p.as_ptr() as usize).collect();
        addrs.sort();
        addrs.dedup();
        assert_eq!(addrs.len(), 8);
        for p in ptrs {
            unsafe { pool.free(p, node()) };
        }
    }

    #[test]
    fn large_requests_bypass_the_pool() {
        let pool = small_pool();
        let big = Layout::from_size_align(256, 8).unwrap();
        let p = pool.allocate(big);
        assert_eq!(pool.page_count(), 0);
        assert_eq!(pool.bypass_count(), 1);
        unsafe { pool.free(p, big) };
        assert_eq!(pool.bypass_count(), 0);
    }

    #[test]
    fn over_aligned_requests_bypass_the_pool() {
        let pool = small_pool();
        let aligned = Layout::from_size_align(16, 64).unwrap();
        assert!(!pool.serves(aligned));
        let p = pool.allocate(aligned);
        assert_eq!(p.as_ptr() as usize % 64, 0);
        unsafe { pool.free(p, aligned) };
    }

    #[test]
    fn sole_empty_page_is_kept() {
        // One page of 4 free nodes is below the 150% watermark (6 nodes).
        let pool = small_pool();
        let p = pool.allocate(node());
        unsafe { pool.free(p, node()) };
        assert_eq!(pool.page_count(), 1);
    }

    #[test]
    fn empty_page_released_above_watermark() {
        let pool = small_pool();
        let ptrs: Vec<_> = (0..8).map(|_| pool.allocate(node())).collect();
        assert_eq!(pool.page_count(), 2);
        // Free the whole first page: free nodes go to 4, below 6, kept.
        for p in &ptrs[..4] {
            unsafe { pool.free(*p, node()) };
        }
        assert_eq!(pool.page_count(), 2);
        // Free the second page: when it empties, 8 free nodes >= 6, release.
        for p in &ptrs[4..] {
            unsafe { pool.free(*p, node()) };
        }
        assert_eq!(pool.page_count(), 1);
        assert_eq!(pool.free_node_count(), 4);
    }

    #[test]
    fn stats_track_live_blocks() {
        let pool = small_pool();
        let a = pool.allocate(node());
        let b = pool.allocate(Layout::from_size_align(100, 8).unwrap());
        assert_eq!(pool.stats().live_allocations, 2);
        unsafe { pool.free(a, node()) };
        unsafe { pool.free(b, Layout::from_size_align(100, 8).unwrap()) };
        let stats = pool.stats();
        assert_eq!(stats.live_allocations, 0);
        assert_eq!(stats.live_bytes, 0);
        assert_eq!(stats.total_frees, 2);
    }

    proptest::proptest! {
        #[test]
        fn random_churn_stays_balanced(
            ops in proptest::collection::vec((proptest::bool::ANY, 0usize..32), 0..200)
        ) {
            let pool = small_pool();
            let mut live: Vec<NonNull<u8>> = Vec::new();
            for (alloc, pick) in ops {
                if alloc || live.is_empty() {
                    live.push(pool.allocate(node()));
                } else {
                    let p = live.swap_remove(pick % live.len());
                    unsafe { pool.free(p, node()) };
                }
                proptest::prop_assert_eq!(pool.stats().live_allocations, live.len());
                let capacity = pool.page_count() * pool.nodes_per_page();
                proptest::prop_assert_eq!(capacity - pool.free_node_count(), live.len());
            }
            for p in live {
                unsafe { pool.free(p, node()) };
            }
            proptest::prop_assert!(pool.page_count() <= 1);
        }
    }

    #[test]
    fn invalid_config_rejected() {
        let result = PoolAllocator::new(PoolConfig::new(64).with_page_size(8));
        assert!(matches!(result, Err(AllocError::PageTooSmall { .. })));
    }
}
