//! Benchmark documents and workloads for Slate.
//!
//! - [`DocumentSize`]: three deterministic document profiles built with
//!   [`RandomTree`](slate_test_utils::RandomTree)
//! - [`object_churn`]: the allocate/release pattern of building and
//!   dropping many small trees, used to compare allocators

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use slate_alloc::AllocatorRef;
use slate_test_utils::{RandomTree, TreeShape};
use slate_value::{Array, Map, ObjectFactory, Value};

/// Seed shared by every benchmark document.
pub const BENCH_SEED: u64 = 0x51a7e;

/// Document profiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentSize {
    /// A few dozen nodes, like a config entry.
    Small,
    /// A few thousand nodes.
    Medium,
    /// Tens of thousands of nodes with a wide string vocabulary.
    Large,
}

impl DocumentSize {
    /// Every profile, smallest first.
    pub const ALL: [DocumentSize; 3] = [Self::Small, Self::Medium, Self::Large];

    /// Short label for benchmark ids.
    pub fn label(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    /// Generator limits for this profile.
    pub fn shape(self) -> TreeShape {
        match self {
            Self::Small => TreeShape {
                max_depth: 2,
                max_width: 6,
                vocabulary: 16,
                max_string_len: 12,
            },
            Self::Medium => TreeShape {
                max_depth: 4,
                max_width: 12,
                vocabulary: 256,
                max_string_len: 24,
            },
            Self::Large => TreeShape {
                max_depth: 5,
                max_width: 16,
                vocabulary: 4096,
                max_string_len: 32,
            },
        }
    }
}

/// Build the benchmark document for `size` on `allocator`.
pub fn document(allocator: &AllocatorRef, size: DocumentSize) -> Value {
    RandomTree::new(BENCH_SEED, size.shape()).generate(allocator)
}

/// Build and drop `rounds` small trees, each an object with a short string,
/// an integer array, and a nested object. Returns the total member count
/// so the work cannot be optimized away.
pub fn object_churn(allocator: &AllocatorRef, rounds: usize) -> usize {
    let mut total = 0;
    for round in 0..rounds {
        let mut items = Array::with_capacity_in(4, allocator.clone());
        for i in 0..4 {
            items.push(Value::Int((round * 4 + i) as i64));
        }
        let mut inner = Map::new_in(allocator.clone());
        inner.insert(
            Value::String(allocator.create_static_string(b"ok")),
            Value::Bool(round % 2 == 0),
        );

        let mut root = Map::new_in(allocator.clone());
        root.insert(
            Value::String(allocator.create_string(b"id")),
            Value::Int(round as i64),
        );
        root.insert(
            Value::String(allocator.create_string(b"items")),
            Value::from(items),
        );
        root.insert(
            Value::String(allocator.create_string(b"meta")),
            Value::from(inner),
        );
        total += root.len();
    }
    total
}
