//! Binary document writer.
//!
//! [`BinaryWriter`] encodes value trees to any `Write` sink. Each document
//! is self-contained: header, string pool, then the value stream.

use std::io::Write;

use slate_value::{integral_f64, Member, Value};

use crate::codec::{
    write_f32_le, write_f64_le, write_i16_le, write_i32_le, write_i64_le, write_short_bytes,
    write_u16_le, write_u32_le, write_u8,
};
use crate::config::{FloatWidth, WriterConfig};
use crate::error::EncodeError;
use crate::pool::StringPool;
use crate::types::{int_tag, Tag, Width};
use crate::{FORMAT_VERSION, MAGIC};

/// Writes binary documents to a byte stream.
///
/// Generic over `W: Write` so tests can use `Vec<u8>` and production
/// code can use `BufWriter<File>`.
///
/// # Examples
///
/// ```
/// use slate_binary::{BinaryWriter, decode};
/// use slate_value::{Map, Value};
///
/// let root = Value::from(Map::new());
/// root.set_member("answer", Value::from(42)).unwrap();
///
/// let mut writer = BinaryWriter::new(Vec::new());
/// writer.write_document(&root).unwrap();
/// assert_eq!(writer.documents_written(), 1);
///
/// let back = decode(&writer.into_inner()).unwrap();
/// assert_eq!(back, root);
/// ```
pub struct BinaryWriter<W: Write> {
    writer: W,
    config: WriterConfig,
    pool: StringPool,
    documents_written: u64,
}

impl<W: Write> BinaryWriter<W> {
    /// A writer with the default config.
    pub fn new(writer: W) -> Self {
        Self::with_config(writer, WriterConfig::default())
    }

    /// A writer with an explicit config.
    pub fn with_config(writer: W, config: WriterConfig) -> Self {
        Self {
            writer,
            config,
            pool: StringPool::new(),
            documents_written: 0,
        }
    }

    /// The active config.
    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Encode `root` as one complete document.
    ///
    /// On error, a partial document may have been written to the sink.
    pub fn write_document(&mut self, root: &Value) -> Result<(), EncodeError> {
        self.pool.clear();
        collect_strings(&mut self.pool, root, 0, self.config.max_depth)?;
        self.pool.sort();
        self.write_header()?;
        write_value(&mut self.writer, &self.pool, &self.config, root, 0)?;
        self.documents_written += 1;
        Ok(())
    }

    fn write_header(&mut self) -> Result<(), EncodeError> {
        let w: &mut dyn Write = &mut self.writer;
        w.write_all(&MAGIC)?;
        write_u32_le(w, FORMAT_VERSION)?;
        // Reserved block, currently empty.
        write_u16_le(w, 0)?;

        let count = count_u32(self.pool.len())?;
        let max_len = count_u32(self.pool.max_len())?;
        log::trace!("binary header: {count} pooled strings, longest {max_len} bytes");
        write_u32_le(w, count)?;
        write_u32_le(w, max_len)?;
        for s in self.pool.iter() {
            write_short_bytes(w, s.as_bytes())?;
        }
        Ok(())
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<(), EncodeError> {
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

fn count_u32(n: usize) -> Result<u32, EncodeError> {
    u32::try_from(n).map_err(|_| EncodeError::CountTooLarge { count: n })
}

// ── String collection ───────────────────────────────────────────

fn collect_strings(
    pool: &mut StringPool,
    value: &Value,
    depth: usize,
    max_depth: usize,
) -> Result<(), EncodeError> {
    match value {
        Value::String(s) => {
            if u16::try_from(s.len()).is_err() {
                return Err(EncodeError::StringTooLong { len: s.len() });
            }
            pool.insert(s);
        }
        Value::Array(a) => {
            if depth >= max_depth {
                return Err(EncodeError::DepthExceeded { max: max_depth });
            }
            for v in a.borrow().iter() {
                collect_strings(pool, v, depth + 1, max_depth)?;
            }
        }
        Value::Map(m) => {
            if depth >= max_depth {
                return Err(EncodeError::DepthExceeded { max: max_depth });
            }
            for member in m.borrow().iter() {
                collect_strings(pool, &member.key, depth + 1, max_depth)?;
                collect_strings(pool, &member.value, depth + 1, max_depth)?;
            }
        }
        _ => {}
    }
    Ok(())
}

// ── Value stream ────────────────────────────────────────────────

fn write_tag(w: &mut dyn Write, tag: Tag) -> Result<(), EncodeError> {
    write_u8(w, tag.as_u8())
}

/// Write an unsigned payload of the given width.
fn write_sized(w: &mut dyn Write, width: Width, n: usize) -> Result<(), EncodeError> {
    // Callers derive `width` from `n`, so the narrowing casts are exact.
    match width {
        Width::W0 => Ok(()),
        Width::W8 => write_u8(w, n as u8),
        Width::W16 => write_u16_le(w, n as u16),
        Width::W32 => write_u32_le(w, n as u32),
    }
}

fn write_int(w: &mut dyn Write, v: i64) -> Result<(), EncodeError> {
    let tag = int_tag(v);
    write_tag(w, tag)?;
    // `int_tag` picked a width that holds `v`.
    match tag {
        Tag::Int8 => write_u8(w, v as i8 as u8),
        Tag::Int16 => write_i16_le(w, v as i16),
        Tag::Int32 => write_i32_le(w, v as i32),
        Tag::Int64 => write_i64_le(w, v),
        _ => Ok(()),
    }
}

fn write_float(w: &mut dyn Write, v: f64, width: FloatWidth) -> Result<(), EncodeError> {
    if let Some(i) = integral_f64(v) {
        return write_int(w, i);
    }
    let single = v as f32;
    let use_single = match width {
        FloatWidth::Double => false,
        FloatWidth::Single => true,
        FloatWidth::Shortest => f64::from(single).to_bits() == v.to_bits() || v.is_nan(),
    };
    if use_single {
        write_tag(w, Tag::Float)?;
        write_f32_le(w, single)
    } else {
        write_tag(w, Tag::Double)?;
        write_f64_le(w, v)
    }
}

fn write_value(
    w: &mut dyn Write,
    pool: &StringPool,
    config: &WriterConfig,
    value: &Value,
    depth: usize,
) -> Result<(), EncodeError> {
    match value {
        Value::Null => write_tag(w, Tag::None),
        Value::Bool(true) => write_tag(w, Tag::True),
        Value::Bool(false) => write_tag(w, Tag::False),
        Value::Int(i) => write_int(w, *i),
        Value::Float(f) => write_float(w, *f, config.float_width),
        Value::String(s) => {
            // Every string was pooled by `collect_strings`.
            let index = pool.index_of(s.as_bytes()).unwrap_or_default();
            let width = Width::for_count(index).ok_or(EncodeError::CountTooLarge { count: index })?;
            write_tag(w, width.str_tag())?;
            write_sized(w, width, index)
        }
        Value::Array(a) => {
            if depth >= config.max_depth {
                return Err(EncodeError::DepthExceeded {
                    max: config.max_depth,
                });
            }
            let a = a.borrow();
            let width = Width::for_count(a.len())
                .ok_or(EncodeError::CountTooLarge { count: a.len() })?;
            write_tag(w, width.list_tag())?;
            write_sized(w, width, a.len())?;
            for v in a.iter() {
                write_value(w, pool, config, v, depth + 1)?;
            }
            Ok(())
        }
        Value::Map(m) => {
            if depth >= config.max_depth {
                return Err(EncodeError::DepthExceeded {
                    max: config.max_depth,
                });
            }
            let m = m.borrow();
            let width = Width::for_count(m.len())
                .ok_or(EncodeError::CountTooLarge { count: m.len() })?;
            write_tag(w, width.dict_tag())?;
            write_sized(w, width, m.len())?;
            let mut members: Vec<&Member> = m.iter().collect();
            if config.sort_keys {
                members.sort_by(|a, b| a.key.total_cmp(&b.key));
            }
            for member in members {
                write_value(w, pool, config, &member.key, depth + 1)?;
                write_value(w, pool, config, &member.value, depth + 1)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_value::{Array, Heap, Map, ObjectFactory};

    fn encode_root(v: &Value) -> Vec<u8> {
        let mut writer = BinaryWriter::new(Vec::new());
        writer.write_document(v).unwrap();
        writer.into_inner()
    }

    /// Header of a document with an empty pool: magic, version, reserved
    /// length, count, max length.
    const EMPTY_HEADER_LEN: usize = 4 + 4 + 2 + 4 + 4;

    #[test]
    fn empty_pool_header_layout() {
        let bytes = encode_root(&Value::Null);
        assert_eq!(&bytes[..4], b"\0\0ab");
        assert_eq!(&bytes[4..8], &2u32.to_le_bytes());
        assert_eq!(&bytes[8..10], &[0, 0]);
        assert_eq!(&bytes[10..14], &0u32.to_le_bytes());
        assert_eq!(&bytes[14..18], &0u32.to_le_bytes());
        assert_eq!(&bytes[EMPTY_HEADER_LEN..], &[Tag::None.as_u8()]);
    }

    #[test]
    fn minimal_width_integers() {
        let cases: [(i64, &[u8]); 5] = [
            (0, &[4]),
            (1, &[5]),
            (200, &[9, 200, 0]),
            (-100, &[8, (-100i8) as u8]),
            (70_000, &[10, 0x70, 0x11, 0x01, 0x00]),
        ];
        for (v, expected) in cases {
            let bytes = encode_root(&Value::from(v));
            assert_eq!(&bytes[EMPTY_HEADER_LEN..], expected, "encoding {v}");
        }
    }

    #[test]
    fn integral_floats_encode_as_integers() {
        let bytes = encode_root(&Value::from(2.0));
        assert_eq!(&bytes[EMPTY_HEADER_LEN..], &[Tag::Int8.as_u8(), 2]);
        let bytes = encode_root(&Value::from(0.5));
        assert_eq!(bytes[EMPTY_HEADER_LEN], Tag::Double.as_u8());
    }

    #[test]
    fn shortest_float_width() {
        let config = WriterConfig {
            float_width: FloatWidth::Shortest,
            ..WriterConfig::default()
        };
        let mut writer = BinaryWriter::with_config(Vec::new(), config);
        writer.write_document(&Value::from(0.5)).unwrap();
        let bytes = writer.into_inner();
        assert_eq!(bytes[EMPTY_HEADER_LEN], Tag::Float.as_u8());
        assert_eq!(bytes.len(), EMPTY_HEADER_LEN + 5);
    }

    #[test]
    fn strings_share_pool_entries() {
        let list: Array = ["b", "a", "b"].into_iter().map(Value::from).collect();
        let bytes = encode_root(&Value::from(list));
        // Pool: count 2, max len 1, "a", "b".
        assert_eq!(&bytes[10..14], &2u32.to_le_bytes());
        assert_eq!(&bytes[14..18], &1u32.to_le_bytes());
        assert_eq!(&bytes[18..24], &[1, 0, b'a', 1, 0, b'b']);
        // LIST8 3, STR8 1, STR0, STR8 1.
        assert_eq!(&bytes[24..], &[17, 3, 13, 1, 12, 13, 1]);
    }

    #[test]
    fn keys_sorted_by_default() {
        let mut m = Map::new();
        m.insert(Value::from("z"), Value::Null);
        m.insert(Value::from("a"), Value::Null);
        let bytes = encode_root(&Value::from(m));
        // DICT8 2, "a" (index 0), null, "z" (index 1), null.
        assert_eq!(&bytes[bytes.len() - 7..], &[21, 2, 12, 1, 13, 1, 1]);
    }

    #[test]
    fn insertion_order_when_unsorted() {
        let mut m = Map::new();
        m.insert(Value::from("z"), Value::Null);
        m.insert(Value::from("a"), Value::Null);
        let config = WriterConfig {
            sort_keys: false,
            ..WriterConfig::default()
        };
        let mut writer = BinaryWriter::with_config(Vec::new(), config);
        writer.write_document(&Value::from(m)).unwrap();
        let bytes = writer.into_inner();
        assert_eq!(&bytes[bytes.len() - 7..], &[21, 2, 13, 1, 1, 12, 1]);
    }

    #[test]
    fn oversized_string_rejected() {
        let long = Value::from("x".repeat(70_000));
        let mut writer = BinaryWriter::new(Vec::new());
        assert!(matches!(
            writer.write_document(&long),
            Err(EncodeError::StringTooLong { len: 70_000 })
        ));
        assert_eq!(writer.documents_written(), 0);
    }

    #[test]
    fn depth_limit_applies() {
        let mut root = Value::Null;
        let mut leaf = root.set_array(None);
        for _ in 0..10 {
            let next = Heap::allocator(&leaf).create_array();
            leaf.borrow_mut().push(Value::Array(next.clone()));
            leaf = next;
        }
        let config = WriterConfig {
            max_depth: 5,
            ..WriterConfig::default()
        };
        let mut writer = BinaryWriter::with_config(Vec::new(), config);
        assert!(matches!(
            writer.write_document(&root),
            Err(EncodeError::DepthExceeded { max: 5 })
        ));
    }
}
