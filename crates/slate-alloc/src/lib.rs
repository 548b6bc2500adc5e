//! Pluggable allocation strategies for Slate value trees.
//!
//! Every heap-resident payload in a Slate tree (strings, arrays, maps and
//! their backing buffers) is obtained from an [`Allocator`] and returned to
//! the same allocator when the last handle to it is dropped. This crate is
//! one of two that may contain `unsafe` code (along with `slate-value`).
//!
//! # Architecture
//!
//! ```text
//! AllocatorRef = Rc<dyn Allocator>
//! ├── SystemAllocator    (pass-through to std::alloc, Send + Sync)
//! ├── PoolAllocator      (fixed-size pages, per-page free lists, !Sync)
//! │   └── Page[] → FreeNode list threaded through unused nodes
//! └── TrackingAllocator  (wraps another allocator, counts live blocks)
//! ```
//!
//! # Allocator lifetime
//!
//! Allocators are shared through [`AllocatorRef`]. Every object created from
//! an allocator holds a clone of the reference, so the allocator is freed
//! only after its last object. Code that needs an allocator and has none
//! takes [`default_allocator`], a per-thread [`SystemAllocator`].
//!
//! # Safety
//!
//! `unsafe` is denied crate-wide and allowed item by item. All raw memory
//! primitives live in `raw.rs`; each `unsafe` block carries a `// SAFETY:`
//! comment.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod allocator;
pub mod config;
pub mod error;
pub mod pool;
mod raw;
pub mod system;
pub mod tracking;

// Public re-exports for the primary API surface.
pub use allocator::{default_allocator, same_allocator, AllocStats, Allocator, AllocatorRef};
pub use config::PoolConfig;
pub use error::AllocError;
pub use pool::PoolAllocator;
pub use system::SystemAllocator;
pub use tracking::TrackingAllocator;
