//! JSON text writer.

use std::io::Write;

use slate_value::{Member, Value};

use crate::config::TextWriterConfig;
use crate::error::WriteError;

/// Writes value trees as JSON text.
///
/// Output is always valid UTF-8. String bytes that are not UTF-8 are
/// written as `\xHH` escapes, which [`Parser`](crate::Parser) reads back.
/// Non-finite floats are written as `null`.
///
/// # Examples
///
/// ```
/// use slate_text::{TextWriter, TextWriterConfig};
/// use slate_value::{Map, Value};
///
/// let root = Value::from(Map::new());
/// root.set_member("n", Value::from(1.5)).unwrap();
///
/// let mut writer = TextWriter::with_config(Vec::new(), TextWriterConfig::compact());
/// writer.write_document(&root).unwrap();
/// assert_eq!(writer.into_inner(), br#"{"n":1.5}"#);
/// ```
pub struct TextWriter<W: Write> {
    writer: W,
    config: TextWriterConfig,
    documents_written: u64,
}

impl<W: Write> TextWriter<W> {
    /// A writer with the default, tab-indented config.
    pub fn new(writer: W) -> Self {
        Self::with_config(writer, TextWriterConfig::default())
    }

    /// A writer with an explicit config.
    pub fn with_config(writer: W, config: TextWriterConfig) -> Self {
        Self {
            writer,
            config,
            documents_written: 0,
        }
    }

    /// The active config.
    pub fn config(&self) -> &TextWriterConfig {
        &self.config
    }

    /// Write `root` followed by the end-of-line string.
    ///
    /// On error, a partial document may have been written to the sink.
    pub fn write_document(&mut self, root: &Value) -> Result<(), WriteError> {
        write_value(&mut self.writer, &self.config, root, 0)?;
        self.writer.write_all(self.config.eol.as_bytes())?;
        self.documents_written += 1;
        Ok(())
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<(), WriteError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Number of documents written so far.
    pub fn documents_written(&self) -> u64 {
        self.documents_written
    }

    /// Consume the writer and return the underlying `Write` sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn write_indent(w: &mut dyn Write, config: &TextWriterConfig, depth: usize) -> Result<(), WriteError> {
    for _ in 0..depth {
        w.write_all(config.indent.as_bytes())?;
    }
    Ok(())
}

fn write_float(w: &mut dyn Write, f: f64) -> Result<(), WriteError> {
    if f.is_finite() {
        let mut buf = ryu::Buffer::new();
        w.write_all(buf.format_finite(f).as_bytes())?;
    } else {
        w.write_all(b"null")?;
    }
    Ok(())
}

/// Write `bytes` as a quoted, escaped string.
pub(crate) fn write_string(w: &mut dyn Write, bytes: &[u8]) -> Result<(), WriteError> {
    w.write_all(b"\"")?;
    for chunk in bytes.utf8_chunks() {
        let text = chunk.valid();
        let mut run = 0;
        for (i, ch) in text.char_indices() {
            let escape: Option<&str> = match ch {
                '"' => Some("\\\""),
                '\\' => Some("\\\\"),
                '\n' => Some("\\n"),
                '\t' => Some("\\t"),
                '\r' => Some("\\r"),
                '\u{8}' => Some("\\b"),
                '\u{c}' => Some("\\f"),
                c if c < ' ' || c == '\u{7f}' => None,
                _ => continue,
            };
            w.write_all(&text.as_bytes()[run..i])?;
            run = i + ch.len_utf8();
            match escape {
                Some(escape) => w.write_all(escape.as_bytes())?,
                None => write!(w, "\\u{:04x}", u32::from(ch))?,
            }
        }
        w.write_all(&text.as_bytes()[run..])?;
        for byte in chunk.invalid() {
            write!(w, "\\x{byte:02x}")?;
        }
    }
    w.write_all(b"\"")?;
    Ok(())
}

fn write_key(w: &mut dyn Write, key: &Value) -> Result<(), WriteError> {
    match key {
        Value::String(s) => write_string(w, s.as_bytes()),
        Value::Int(i) => Ok(write!(w, "{i}")?),
        other => Err(WriteError::InvalidKey {
            found: other.value_type(),
        }),
    }
}

fn write_value(
    w: &mut dyn Write,
    config: &TextWriterConfig,
    value: &Value,
    depth: usize,
) -> Result<(), WriteError> {
    match value {
        Value::Null => w.write_all(b"null")?,
        Value::Bool(true) => w.write_all(b"true")?,
        Value::Bool(false) => w.write_all(b"false")?,
        Value::Int(i) => write!(w, "{i}")?,
        Value::Float(f) => write_float(w, *f)?,
        Value::String(s) => write_string(w, s.as_bytes())?,
        Value::Array(a) => {
            if depth >= config.max_depth {
                return Err(WriteError::DepthExceeded {
                    max: config.max_depth,
                });
            }
            let a = a.borrow();
            if a.is_empty() {
                w.write_all(b"[]")?;
                return Ok(());
            }
            w.write_all(b"[")?;
            w.write_all(config.eol.as_bytes())?;
            for (i, item) in a.iter().enumerate() {
                write_indent(w, config, depth + 1)?;
                write_value(w, config, item, depth + 1)?;
                if i + 1 != a.len() {
                    w.write_all(b",")?;
                }
                w.write_all(config.eol.as_bytes())?;
            }
            write_indent(w, config, depth)?;
            w.write_all(b"]")?;
        }
        Value::Map(m) => {
            if depth >= config.max_depth {
                return Err(WriteError::DepthExceeded {
                    max: config.max_depth,
                });
            }
            let m = m.borrow();
            if m.is_empty() {
                w.write_all(b"{}")?;
                return Ok(());
            }
            let mut members: Vec<&Member> = m.iter().collect();
            if config.sort_keys {
                members.sort_by(|a, b| a.key.total_cmp(&b.key));
            }
            w.write_all(b"{")?;
            w.write_all(config.eol.as_bytes())?;
            let last = members.len() - 1;
            for (i, member) in members.into_iter().enumerate() {
                write_indent(w, config, depth + 1)?;
                write_key(w, &member.key)?;
                w.write_all(config.key_separator.as_bytes())?;
                write_value(w, config, &member.value, depth + 1)?;
                if i != last {
                    w.write_all(b",")?;
                }
                w.write_all(config.eol.as_bytes())?;
            }
            write_indent(w, config, depth)?;
            w.write_all(b"}")?;
        }
    }
    Ok(())
}
