//! Immutable string bodies.

use std::cell::Cell;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use slate_alloc::AllocatorRef;

use crate::hash::fnv1a;
use crate::raw::RawBuf;

/// How a [`Str`] holds its bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferMode {
    /// Caller-owned `'static` bytes, never copied or freed.
    Static,
    /// A copy allocated through the string's own allocator.
    Copied,
    /// An external buffer whose ownership the string took over.
    Adopted,
}

enum Buffer {
    Static(&'static [u8]),
    Copied { buf: RawBuf<u8>, len: usize },
    Adopted(Box<[u8]>),
}

/// Immutable byte string stored in a heap object.
///
/// Bytes are not required to be UTF-8. The content hash is computed on
/// first use and cached.
pub struct Str {
    buffer: Buffer,
    hash: Cell<Option<u64>>,
}

impl Str {
    /// Copy `bytes` into a buffer obtained from `allocator`.
    ///
    /// A zero-length copy shares the static empty buffer.
    pub(crate) fn copied_in(bytes: &[u8], allocator: &AllocatorRef) -> Self {
        if bytes.is_empty() {
            return Self::from_static(b"");
        }
        let mut buf = RawBuf::with_capacity_in(bytes.len(), allocator.clone());
        #[allow(unsafe_code)]
        // SAFETY: the buffer holds exactly `bytes.len()` vacant `u8` slots.
        unsafe {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), buf.as_ptr(), bytes.len())
        };
        Self::with_buffer(Buffer::Copied {
            buf,
            len: bytes.len(),
        })
    }

    pub(crate) fn from_static(bytes: &'static [u8]) -> Self {
        Self::with_buffer(Buffer::Static(bytes))
    }

    pub(crate) fn adopted(bytes: Vec<u8>) -> Self {
        Self::with_buffer(Buffer::Adopted(bytes.into_boxed_slice()))
    }

    fn with_buffer(buffer: Buffer) -> Self {
        Self {
            buffer,
            hash: Cell::new(None),
        }
    }

    /// The string's bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.buffer {
            Buffer::Static(bytes) => *bytes,
            #[allow(unsafe_code)]
            // SAFETY: all `len` bytes were initialised at construction.
            Buffer::Copied { buf, len } => unsafe { buf.slice(*len) },
            Buffer::Adopted(bytes) => &bytes[..],
        }
    }

    /// The bytes as `&str`, if they are valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(self.as_bytes()).ok()
    }

    /// The bytes as text, replacing invalid UTF-8 sequences.
    pub fn to_string_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Whether the string has no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How the bytes are held.
    pub fn mode(&self) -> BufferMode {
        match self.buffer {
            Buffer::Static(_) => BufferMode::Static,
            Buffer::Copied { .. } => BufferMode::Copied,
            Buffer::Adopted(_) => BufferMode::Adopted,
        }
    }

    /// FNV-1a hash of the bytes, cached after the first call.
    pub fn content_hash(&self) -> u64 {
        if let Some(h) = self.hash.get() {
            return h;
        }
        let h = fnv1a(self.as_bytes());
        self.hash.set(Some(h));
        h
    }

    /// Whether the content hash has been computed.
    pub fn is_hashed(&self) -> bool {
        self.hash.get().is_some()
    }
}

impl PartialEq for Str {
    fn eq(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (self.hash.get(), other.hash.get()) {
            if a != b {
                return false;
            }
        }
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for Str {}

impl PartialOrd for Str {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Str {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl Hash for Str {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.content_hash());
    }
}

impl PartialEq<[u8]> for Str {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl PartialEq<str> for Str {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl fmt::Debug for Str {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.to_string_lossy(), f)
    }
}

impl fmt::Display for Str {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}
