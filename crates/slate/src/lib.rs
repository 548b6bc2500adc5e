//! Slate: a reference-counted JSON value model with pluggable allocators
//! and a compact binary codec.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Slate sub-crates. For most users, adding `slate` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use slate::prelude::*;
//!
//! // Parse text into a tree backed by a pool allocator.
//! let pool = pool_allocator().unwrap();
//! let root = from_text_in(&pool, br#"{"a": 1, "b": [true, null, "x"]}"#).unwrap();
//! root.set_member("c/d", Value::from("deep")).unwrap();
//!
//! // Binary round trip.
//! let bytes = encode(&root).unwrap();
//! let back = decode(&bytes).unwrap();
//! assert_eq!(back, root);
//! assert_eq!(back.get_member("c/d").as_str(), "deep");
//!
//! // And back to text.
//! let text = to_text_with(&back, &TextWriterConfig::compact().with_sort_keys(true)).unwrap();
//! assert_eq!(text, r#"{"a":1,"b":[true,null,"x"],"c":{"d":"deep"}}"#);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`alloc`] | `slate-alloc` | `Allocator` trait, system, pool, and tracking allocators |
//! | [`value`] | `slate-value` | `Value`, `Array`, `Map`, `Str`, heap handles, result codes |
//! | [`binary`] | `slate-binary` | Binary writer and parser, wire tags, string pool |
//! | [`text`] | `slate-text` | JSON text parser and writer |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Allocators (`slate-alloc`).
///
/// [`alloc::SystemAllocator`] backs the per-thread default;
/// [`alloc::PoolAllocator`] serves fixed-size nodes from pages;
/// [`alloc::TrackingAllocator`] counts live blocks for leak checks.
pub use slate_alloc as alloc;

/// The value model (`slate-value`).
///
/// [`value::Value`] and its heap containers [`value::Array`] and
/// [`value::Map`], plus [`value::ResultCode`] shared by every decoder.
pub use slate_value as value;

/// Binary codec (`slate-binary`).
///
/// [`binary::BinaryWriter`] and [`binary::BinaryParser`], with the
/// [`binary::encode`] and [`binary::decode`] shortcuts.
pub use slate_binary as binary;

/// JSON text (`slate-text`).
///
/// [`text::Parser`] and [`text::TextWriter`].
pub use slate_text as text;

/// Common imports for typical Slate usage.
///
/// ```rust
/// use slate::prelude::*;
/// ```
pub mod prelude {
    // Allocators
    pub use slate_alloc::{default_allocator, Allocator, AllocatorRef, PoolConfig};

    // Values
    pub use slate_value::{
        pool_allocator, Array, FloatCompare, Map, ObjectFactory, ResultCode, Value, ValueType,
    };

    // Binary codec
    pub use slate_binary::{
        decode, decode_in, encode, encode_with, BinaryParser, BinaryWriter, DecodeError,
        EncodeError,
    };

    // Text
    pub use slate_text::{
        from_text, from_text_in, to_text, to_text_with, ParseError, Parser, TextWriter,
        TextWriterConfig, WriteError,
    };
}
