//! Pool allocator configuration parameters.

use std::mem;

use crate::error::AllocError;

/// Configuration for the [`PoolAllocator`](crate::PoolAllocator).
///
/// Controls page sizing, the fixed node size served from pages, and the
/// idle-page release policy. Validated at construction; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Size of each page in bytes.
    ///
    /// Default: 102_400 (100 KiB). Each page is carved into
    /// `page_size / node_size` nodes.
    pub page_size: usize,

    /// Size of every pool-managed node in bytes.
    ///
    /// Requests larger than this bypass the pool and go straight to the
    /// system allocator. Always a multiple of `node_align`.
    pub node_size: usize,

    /// Alignment of every node (and of the page itself).
    ///
    /// Requests with a stricter alignment bypass the pool.
    pub node_align: usize,

    /// Free-node watermark, in percent of one page's node count, at or
    /// above which a page that has just become empty is released.
    ///
    /// Default: 150. Must be at least 100.
    pub release_threshold_percent: u32,
}

impl PoolConfig {
    /// Default page size: 100 KiB.
    pub const DEFAULT_PAGE_SIZE: usize = 100 * 1024;

    /// Default page release threshold.
    pub const DEFAULT_RELEASE_THRESHOLD_PERCENT: u32 = 150;

    /// Create a config serving nodes of at least `node_size` bytes.
    ///
    /// The node size is raised to hold a free-list link and rounded up to
    /// word alignment. Other parameters take their defaults.
    pub fn new(node_size: usize) -> Self {
        let node_align = Self::word_align();
        Self {
            page_size: Self::DEFAULT_PAGE_SIZE,
            node_size: round_up(node_size.max(Self::min_node_size()), node_align),
            node_align,
            release_threshold_percent: Self::DEFAULT_RELEASE_THRESHOLD_PERCENT,
        }
    }

    /// Replace the page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Replace the release threshold.
    pub fn with_release_threshold(mut self, percent: u32) -> Self {
        self.release_threshold_percent = percent;
        self
    }

    /// Number of nodes carved out of each page.
    pub fn nodes_per_page(&self) -> usize {
        self.page_size / self.node_size.max(1)
    }

    /// Smallest node that can hold the intrusive free-list link.
    pub fn min_node_size() -> usize {
        mem::size_of::<usize>()
    }

    /// Alignment that satisfies every word-sized field, including `u64`
    /// and `f64` on 32-bit targets.
    pub fn word_align() -> usize {
        mem::align_of::<usize>()
            .max(mem::align_of::<u64>())
            .max(mem::align_of::<f64>())
    }

    /// Check the config for internal consistency.
    pub fn validate(&self) -> Result<(), AllocError> {
        if self.node_align == 0 || !self.node_align.is_power_of_two() {
            return Err(AllocError::InvalidAlignment {
                align: self.node_align,
            });
        }
        let minimum = round_up(Self::min_node_size(), self.node_align);
        if self.node_size < minimum || self.node_size % self.node_align != 0 {
            return Err(AllocError::InvalidNodeSize {
                node_size: self.node_size,
                minimum,
            });
        }
        if self.page_size < self.node_size {
            return Err(AllocError::PageTooSmall {
                page_size: self.page_size,
                node_size: self.node_size,
            });
        }
        if self.release_threshold_percent < 100 {
            return Err(AllocError::ThresholdTooLow {
                percent: self.release_threshold_percent,
            });
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new(Self::min_node_size())
    }
}

/// Round `n` up to the next multiple of `align` (a power of two).
pub(crate) fn round_up(n: usize, align: usize) -> usize {
    (n + align - 1) & !(align - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_page_size_is_100k() {
        let config = PoolConfig::new(40);
        assert_eq!(config.page_size, 100 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn node_size_rounded_to_word_alignment() {
        let config = PoolConfig::new(41);
        assert_eq!(config.node_size % PoolConfig::word_align(), 0);
        assert!(config.node_size >= 41);
    }

    #[test]
    fn tiny_node_raised_to_link_size() {
        let config = PoolConfig::new(1);
        assert!(config.node_size >= std::mem::size_of::<usize>());
    }

    #[test]
    fn nodes_per_page_truncates() {
        let config = PoolConfig::new(48).with_page_size(100);
        assert_eq!(config.nodes_per_page(), 2);
    }

    #[test]
    fn page_smaller_than_node_rejected() {
        let config = PoolConfig::new(64).with_page_size(32);
        assert!(matches!(
            config.validate(),
            Err(AllocError::PageTooSmall { .. })
        ));
    }

    #[test]
    fn bad_alignment_rejected() {
        let mut config = PoolConfig::new(64);
        config.node_align = 12;
        assert!(matches!(
            config.validate(),
            Err(AllocError::InvalidAlignment { align: 12 })
        ));
    }

    #[test]
    fn low_threshold_rejected() {
        let config = PoolConfig::new(64).with_release_threshold(50);
        assert_eq!(
            config.validate(),
            Err(AllocError::ThresholdTooLow { percent: 50 })
        );
    }
}
