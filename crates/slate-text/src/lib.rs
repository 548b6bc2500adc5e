//! JSON text parser and writer for Slate value trees.
//!
//! The text form sits outside the core: [`Parser`] produces ordinary
//! [`Value`] trees and [`TextWriter`] consumes them, so documents move
//! freely between text and the binary codec.
//!
//! # Architecture
//!
//! ```text
//! &[u8] / Read ──→ Parser (Scanner) ──→ Value tree
//! Value tree ──→ TextWriter<W: Write> ──→ JSON text
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod parser;
pub mod writer;

use std::io;

use slate_alloc::AllocatorRef;
use slate_value::Value;

// Public re-exports for the primary API surface.
pub use config::{ParserConfig, TextWriterConfig};
pub use error::{ParseError, WriteError};
pub use parser::Parser;
pub use writer::TextWriter;

/// Parse `text` on the per-thread default allocator.
pub fn from_text(text: &str) -> Result<Value, ParseError> {
    Parser::new().parse_str(text)
}

/// Parse `input`, allocating the tree from `allocator`.
pub fn from_text_in(allocator: &AllocatorRef, input: &[u8]) -> Result<Value, ParseError> {
    Parser::with_allocator(allocator.clone()).parse(input)
}

/// Write `root` with the default config.
pub fn to_text(root: &Value) -> Result<String, WriteError> {
    to_text_with(root, &TextWriterConfig::default())
}

/// Write `root` to a fresh string.
pub fn to_text_with(root: &Value, config: &TextWriterConfig) -> Result<String, WriteError> {
    let mut writer = TextWriter::with_config(Vec::new(), config.clone());
    writer.write_document(root)?;
    String::from_utf8(writer.into_inner())
        .map_err(|e| WriteError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}
