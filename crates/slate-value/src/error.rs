//! Result codes shared by every Slate decoder, and value-level errors.

use std::fmt;

/// Outcome of a parse or decode operation.
///
/// A closed set shared by the binary reader and the text parser. Each
/// decoder's structured error maps onto one of these through its `code()`
/// method; decoder instances also remember the most recent code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ResultCode {
    /// No error.
    #[default]
    Ok,
    /// Input ended before the document was complete.
    EndOfFile,
    /// The input source could not be opened or read.
    OpenFileError,
    /// The document is not valid at the top level.
    InvalidJson,
    /// A malformed object.
    InvalidDict,
    /// A malformed object key.
    InvalidKey,
    /// A malformed array.
    InvalidArray,
    /// A malformed string, or a string index outside the string table.
    InvalidString,
    /// A malformed number.
    InvalidNumber,
    /// A malformed `null` literal.
    InvalidNull,
    /// A malformed `true` literal.
    InvalidTrue,
    /// A malformed `false` literal.
    InvalidFalse,
    /// An unknown value type or wire tag.
    InvalidType,
    /// A malformed comment.
    InvalidComment,
    /// An unexpected character.
    InvalidChar,
    /// A malformed unicode escape.
    InvalidUnicode,
    /// The binary header (magic or string table) is malformed.
    InvalidHeader,
    /// The binary format version is not supported.
    UnsupportedVersion,
}

impl ResultCode {
    /// Whether this code denotes success.
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }

    /// Stable lower-case name of the code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::EndOfFile => "end of file",
            Self::OpenFileError => "open file error",
            Self::InvalidJson => "invalid json",
            Self::InvalidDict => "invalid dict",
            Self::InvalidKey => "invalid key",
            Self::InvalidArray => "invalid array",
            Self::InvalidString => "invalid string",
            Self::InvalidNumber => "invalid number",
            Self::InvalidNull => "invalid null",
            Self::InvalidTrue => "invalid true",
            Self::InvalidFalse => "invalid false",
            Self::InvalidType => "invalid type",
            Self::InvalidComment => "invalid comment",
            Self::InvalidChar => "invalid char",
            Self::InvalidUnicode => "invalid unicode",
            Self::InvalidHeader => "invalid header",
            Self::UnsupportedVersion => "unsupported version",
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from path-aware map mutation ([`Value::set_member`]).
///
/// [`Value::set_member`]: crate::Value::set_member
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathError {
    /// The target, or an intermediate node on the path, is not a map.
    NotAMap {
        /// The path prefix naming the offending node (empty for the root).
        at: String,
    },
    /// The path has no segments.
    EmptyPath,
    /// A map on the path is already mutably borrowed.
    Borrowed {
        /// The path prefix naming the borrowed map (empty for the root).
        at: String,
    },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAMap { at } => write!(f, "node at '{at}' is not a map"),
            Self::EmptyPath => write!(f, "empty member path"),
            Self::Borrowed { at } => write!(f, "map at '{at}' is already borrowed"),
        }
    }
}

impl std::error::Error for PathError {}
