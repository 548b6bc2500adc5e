//! Error types for text parsing and writing.

use std::error::Error;
use std::fmt;
use std::io;

use slate_value::{ResultCode, ValueType};

/// Errors from [`Parser`](crate::Parser).
#[derive(Debug)]
pub enum ParseError {
    /// Reading the input failed.
    Io(io::Error),
    /// The text is malformed.
    Syntax {
        /// What went wrong.
        code: ResultCode,
        /// 1-based line where parsing stopped.
        line: usize,
        /// 1-based column where parsing stopped.
        column: usize,
    },
}

impl ParseError {
    /// The result code this error maps to.
    pub fn code(&self) -> ResultCode {
        match self {
            ParseError::Io(_) => ResultCode::OpenFileError,
            ParseError::Syntax { code, .. } => *code,
        }
    }

    /// Line and column of a syntax error.
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            ParseError::Io(_) => None,
            ParseError::Syntax { line, column, .. } => Some((*line, *column)),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Io(e) => write!(f, "I/O error: {e}"),
            ParseError::Syntax { code, line, column } => {
                write!(f, "{code} at line {line}, column {column}")
            }
        }
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParseError::Io(e) => Some(e),
            ParseError::Syntax { .. } => None,
        }
    }
}

impl From<io::Error> for ParseError {
    fn from(e: io::Error) -> Self {
        ParseError::Io(e)
    }
}

/// Errors from [`TextWriter`](crate::TextWriter).
#[derive(Debug)]
pub enum WriteError {
    /// Writing to the sink failed.
    Io(io::Error),
    /// A map key has no text form. Only strings and integers do.
    InvalidKey {
        /// Type of the offending key.
        found: ValueType,
    },
    /// Nesting exceeded the configured limit.
    DepthExceeded {
        /// The configured limit.
        max: usize,
    },
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteError::Io(e) => write!(f, "I/O error: {e}"),
            WriteError::InvalidKey { found } => {
                write!(f, "map key of type {found} cannot be written as text")
            }
            WriteError::DepthExceeded { max } => {
                write!(f, "nesting deeper than {max} levels")
            }
        }
    }
}

impl Error for WriteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WriteError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for WriteError {
    fn from(e: io::Error) -> Self {
        WriteError::Io(e)
    }
}
