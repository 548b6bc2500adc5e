//! Allocator-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur when constructing an allocator.
///
/// Allocation itself never returns an error: running out of memory aborts
/// through [`std::alloc::handle_alloc_error`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// A page cannot hold even a single node.
    PageTooSmall {
        /// Configured page size in bytes.
        page_size: usize,
        /// Configured node size in bytes.
        node_size: usize,
    },
    /// Node alignment is zero or not a power of two.
    InvalidAlignment {
        /// The rejected alignment.
        align: usize,
    },
    /// Nodes are too small to hold the free-list link, or not a multiple
    /// of the node alignment.
    InvalidNodeSize {
        /// Configured node size in bytes.
        node_size: usize,
        /// Smallest admissible node size.
        minimum: usize,
    },
    /// The page release threshold would release the last free page
    /// immediately and thrash.
    ThresholdTooLow {
        /// Configured threshold, in percent of one page's node count.
        percent: u32,
    },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PageTooSmall {
                page_size,
                node_size,
            } => {
                write!(
                    f,
                    "page of {page_size} bytes cannot hold a node of {node_size} bytes"
                )
            }
            Self::InvalidAlignment { align } => {
                write!(f, "node alignment {align} is not a power of two")
            }
            Self::InvalidNodeSize { node_size, minimum } => {
                write!(
                    f,
                    "node size {node_size} is invalid (minimum {minimum}, must be a multiple of the alignment)"
                )
            }
            Self::ThresholdTooLow { percent } => {
                write!(f, "page release threshold {percent}% is below 100%")
            }
        }
    }
}

impl Error for AllocError {}
