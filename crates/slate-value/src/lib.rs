//! Reference-counted JSON value model for Slate.
//!
//! A [`Value`] is a closed enum over the JSON-like types. Strings, arrays,
//! and maps live in heap objects obtained from an
//! [`Allocator`](slate_alloc::Allocator) and shared through intrusively
//! counted [`Heap`] handles. Every object and every buffer it owns comes
//! from one allocator, and the object keeps that allocator alive.
//!
//! # Architecture
//!
//! ```text
//! Value ─┬─ Null | Bool | Int | Float        (inline)
//!        ├─ String(StrRef)  → Heap<Str>      (Static | Copied | Adopted)
//!        ├─ Array(ArrayRef) → Heap<RefCell<Array>> → RawBuf<Value>
//!        └─ Map(MapRef)     → Heap<RefCell<Map>>   → RawBuf<Member>
//!
//! AllocatorRef ── ObjectFactory::{create_string, create_array, create_map}
//! ```
//!
//! # Safety
//!
//! `unsafe` is denied crate-wide. Raw buffer handling is confined to
//! `raw.rs` and the heap cell lifecycle to `heap.rs`; the containers use
//! those primitives under per-item `#[allow(unsafe_code)]`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod array;
pub mod error;
pub mod hash;
pub mod heap;
pub mod map;
mod raw;
pub mod string;
pub mod value;

// Public re-exports for the primary API surface.
pub use array::Array;
pub use error::{PathError, ResultCode};
pub use heap::{
    object_node_size, pool_allocator, pool_allocator_with, ArrayRef, Heap, MapRef, ObjectFactory,
    StrRef,
};
pub use map::{Map, Member, PATH_SEPARATOR};
pub use string::{BufferMode, Str};
pub use value::{integral_f64, FloatCompare, Value, ValueType};
