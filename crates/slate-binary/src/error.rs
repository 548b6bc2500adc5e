//! Error types for the binary codec.

use std::fmt;
use std::io;

use slate_value::ResultCode;

/// Errors that can occur while encoding a value tree.
#[derive(Debug)]
pub enum EncodeError {
    /// An I/O error occurred on the output sink.
    Io(io::Error),
    /// A string is longer than the `u16` length field of a pool entry.
    StringTooLong {
        /// Length of the offending string in bytes.
        len: usize,
    },
    /// An array, map, or the string pool has more than `u32::MAX` entries.
    CountTooLarge {
        /// The entry count that does not fit.
        count: usize,
    },
    /// The tree is nested deeper than the configured maximum.
    DepthExceeded {
        /// The configured maximum depth.
        max: usize,
    },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::StringTooLong { len } => {
                write!(f, "string of {len} bytes exceeds the 65535-byte pool entry limit")
            }
            Self::CountTooLarge { count } => {
                write!(f, "{count} entries exceed the u32 count field")
            }
            Self::DepthExceeded { max } => write!(f, "value tree deeper than {max} levels"),
        }
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for EncodeError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Errors that can occur while decoding a binary document.
#[derive(Debug)]
pub enum DecodeError {
    /// Reading the input source failed.
    Io(io::Error),
    /// The input does not start with the expected `b"\0\0ab"` magic bytes.
    InvalidMagic,
    /// The format version is not supported by this build.
    UnsupportedVersion {
        /// The version found in the header.
        found: u32,
    },
    /// The input ended in the middle of a header field or value node.
    UnexpectedEof {
        /// Byte offset at which the truncated item starts.
        offset: usize,
    },
    /// A value node carries an unknown tag byte.
    InvalidType {
        /// The unrecognized tag.
        tag: u8,
        /// Byte offset of the tag.
        offset: usize,
    },
    /// A string node refers past the end of the string pool.
    StringIndexOutOfRange {
        /// The index found in the node.
        index: u64,
        /// Number of entries in the pool.
        len: usize,
    },
    /// The string pool header is malformed.
    InvalidStringTable {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// An element count is larger than the remaining input could hold.
    CountOutOfRange {
        /// The declared element count.
        count: u64,
        /// Bytes left in the input.
        remaining: usize,
    },
    /// The document is nested deeper than the configured maximum.
    DepthExceeded {
        /// The configured maximum depth.
        max: usize,
    },
}

impl DecodeError {
    /// The result code this error maps to.
    pub fn code(&self) -> ResultCode {
        match self {
            Self::Io(_) => ResultCode::OpenFileError,
            Self::InvalidMagic | Self::InvalidStringTable { .. } => ResultCode::InvalidHeader,
            Self::UnsupportedVersion { .. } => ResultCode::UnsupportedVersion,
            Self::UnexpectedEof { .. } => ResultCode::EndOfFile,
            Self::InvalidType { .. } => ResultCode::InvalidType,
            Self::StringIndexOutOfRange { .. } => ResultCode::InvalidString,
            Self::CountOutOfRange { .. } => ResultCode::InvalidArray,
            Self::DepthExceeded { .. } => ResultCode::InvalidJson,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidMagic => write!(f, "invalid magic bytes (expected b\"\\0\\0ab\")"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported format version {found}")
            }
            Self::UnexpectedEof { offset } => {
                write!(f, "unexpected end of input at offset {offset}")
            }
            Self::InvalidType { tag, offset } => {
                write!(f, "unknown value tag {tag} at offset {offset}")
            }
            Self::StringIndexOutOfRange { index, len } => {
                write!(f, "string index {index} out of range for pool of {len}")
            }
            Self::InvalidStringTable { detail } => write!(f, "invalid string table: {detail}"),
            Self::CountOutOfRange { count, remaining } => write!(
                f,
                "element count {count} exceeds the {remaining} bytes remaining"
            ),
            Self::DepthExceeded { max } => write!(f, "document deeper than {max} levels"),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for DecodeError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_errors_map_to_result_codes() {
        assert_eq!(DecodeError::InvalidMagic.code(), ResultCode::InvalidHeader);
        assert_eq!(
            DecodeError::UnsupportedVersion { found: 9 }.code(),
            ResultCode::UnsupportedVersion
        );
        assert_eq!(
            DecodeError::UnexpectedEof { offset: 3 }.code(),
            ResultCode::EndOfFile
        );
        assert_eq!(
            DecodeError::StringIndexOutOfRange { index: 4, len: 4 }.code(),
            ResultCode::InvalidString
        );
        assert_eq!(
            DecodeError::Io(io::Error::other("gone")).code(),
            ResultCode::OpenFileError
        );
    }

    #[test]
    fn io_error_is_the_source() {
        use std::error::Error;
        let e = EncodeError::from(io::Error::other("disk full"));
        assert!(e.source().is_some());
        assert!(EncodeError::StringTooLong { len: 70_000 }.source().is_none());
    }
}
