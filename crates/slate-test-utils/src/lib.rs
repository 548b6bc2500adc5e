//! Test fixtures and tree generators for Slate development.
//!
//! Provides the canonical scenario document used across the codec tests,
//! a handful of shaped fixtures for benchmarks, a seeded
//! [`RandomTree`] generator, and a proptest strategy ([`arb_tree`]) whose
//! output is plain data that builds into a [`Value`](slate_value::Value)
//! on any allocator.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod random;

pub use fixtures::{
    int_array, nested_arrays, scenario_tree, string_heavy_map, wide_map, SCENARIO_JSON,
};
pub use random::{arb_tree, RandomTree, TreePlan, TreeShape};
