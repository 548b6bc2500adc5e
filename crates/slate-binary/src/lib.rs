//! Compact binary codec for Slate value trees.
//!
//! A document is a small header, a pool of every distinct string in the
//! tree, and a tagged value stream. Strings in the stream are indices into
//! the pool, and integers and counts use the narrowest width that holds
//! them.
//!
//! # Architecture
//!
//! ```text
//! BinaryWriter<W: Write>            BinaryParser
//!   collect_strings → StringPool      header → string table (Array)
//!   header + pool entries             value stream → Value tree
//!   value stream (codec::write_*)     (codec::ByteCursor, bounds-checked)
//! ```
//!
//! # Format
//!
//! All multi-byte fields are little-endian.
//!
//! ```text
//! magic       4 bytes   00 00 61 62 ("\0\0ab")
//! version     u32       1 or 2
//! reserved    u16 n + n bytes          (version 2 only)
//! count       u32                      (version 1: a value node)
//! max_len     u32                      (version 2 only)
//! entries     count × (u16 len + bytes)
//! root        one value node
//! ```
//!
//! Value nodes start with a one-byte [`Tag`]. `STR*`, `LIST*`, and
//! `DICT*` tags carry a 0, 1, 2, or 4 byte unsigned payload; `STR0` is
//! pool index 0 and `LIST0`/`DICT0` are empty containers.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod config;
pub mod error;
pub mod pool;
pub mod reader;
pub mod types;
pub mod writer;

use slate_alloc::AllocatorRef;
use slate_value::Value;

// Public re-exports for the primary API surface.
pub use config::{FloatWidth, ReaderConfig, WriterConfig};
pub use error::{DecodeError, EncodeError};
pub use pool::StringPool;
pub use reader::BinaryParser;
pub use types::{Tag, Width};
pub use writer::BinaryWriter;

/// Leading bytes of every binary document.
pub const MAGIC: [u8; 4] = *b"\0\0ab";

/// Format version written by [`BinaryWriter`].
pub const FORMAT_VERSION: u32 = 2;

/// Oldest format version [`BinaryParser`] accepts.
pub const MIN_FORMAT_VERSION: u32 = 1;

/// Encode `root` into a fresh buffer with the default config.
pub fn encode(root: &Value) -> Result<Vec<u8>, EncodeError> {
    encode_with(root, &WriterConfig::default())
}

/// Encode `root` into a fresh buffer.
pub fn encode_with(root: &Value, config: &WriterConfig) -> Result<Vec<u8>, EncodeError> {
    let mut writer = BinaryWriter::with_config(Vec::new(), config.clone());
    writer.write_document(root)?;
    Ok(writer.into_inner())
}

/// Decode one document on the per-thread default allocator.
pub fn decode(data: &[u8]) -> Result<Value, DecodeError> {
    BinaryParser::new().parse(data)
}

/// Decode one document, allocating the tree from `allocator`.
pub fn decode_in(allocator: &AllocatorRef, data: &[u8]) -> Result<Value, DecodeError> {
    BinaryParser::with_allocator(allocator.clone()).parse(data)
}
