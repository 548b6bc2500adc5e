//! Binary document parser.
//!
//! [`BinaryParser`] validates the header, rebuilds the string pool, and
//! decodes the value stream into a fresh tree. All reads go through a
//! [`ByteCursor`], so truncated or corrupt input fails with a
//! [`DecodeError`] instead of reading out of bounds.

use std::io::Read;

use slate_alloc::{default_allocator, AllocatorRef};
use slate_value::{Array, Map, ObjectFactory, ResultCode, Value};

use crate::codec::ByteCursor;
use crate::config::ReaderConfig;
use crate::error::DecodeError;
use crate::types::Tag;
use crate::{FORMAT_VERSION, MAGIC, MIN_FORMAT_VERSION};

/// Decodes binary documents into value trees.
///
/// Every object of a decoded tree is allocated from the parser's allocator.
/// Strings with equal content share one object. The parser remembers the
/// result code and byte offset of the most recent parse.
///
/// # Examples
///
/// ```
/// use slate_binary::{encode, BinaryParser};
/// use slate_value::{ResultCode, Value};
///
/// let bytes = encode(&Value::from("hi")).unwrap();
/// let mut parser = BinaryParser::new();
/// assert_eq!(parser.parse(&bytes).unwrap().as_str(), "hi");
///
/// assert!(parser.parse(&bytes[..bytes.len() - 1]).is_err());
/// assert_eq!(parser.error_code(), ResultCode::EndOfFile);
/// ```
pub struct BinaryParser {
    allocator: AllocatorRef,
    config: ReaderConfig,
    error_code: ResultCode,
    error_offset: usize,
}

impl BinaryParser {
    /// A parser on the per-thread default allocator.
    pub fn new() -> Self {
        Self::with_allocator(default_allocator())
    }

    /// A parser that allocates decoded trees from `allocator`.
    pub fn with_allocator(allocator: AllocatorRef) -> Self {
        Self {
            allocator,
            config: ReaderConfig::default(),
            error_code: ResultCode::Ok,
            error_offset: 0,
        }
    }

    /// Replace the config.
    pub fn with_config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    /// The allocator decoded trees come from.
    pub fn allocator(&self) -> &AllocatorRef {
        &self.allocator
    }

    /// Result code of the most recent parse.
    pub fn error_code(&self) -> ResultCode {
        self.error_code
    }

    /// Byte offset of the item that failed in the most recent parse.
    pub fn error_offset(&self) -> usize {
        self.error_offset
    }

    /// Decode one document from `data`.
    ///
    /// Bytes after the root value are ignored.
    pub fn parse(&mut self, data: &[u8]) -> Result<Value, DecodeError> {
        let mut decoder = Decoder {
            cursor: ByteCursor::new(data),
            mark: 0,
            table: Array::new_in(self.allocator.clone()),
            allocator: &self.allocator,
            max_depth: self.config.max_depth,
        };
        let result = decoder.document();
        match &result {
            Ok(_) => {
                self.error_code = ResultCode::Ok;
                self.error_offset = 0;
                if decoder.cursor.remaining() != 0 {
                    log::trace!(
                        "binary decode: ignoring {} trailing bytes",
                        decoder.cursor.remaining()
                    );
                }
            }
            Err(e) => {
                self.error_code = e.code();
                self.error_offset = decoder.mark;
                log::debug!(
                    "binary decode failed: {e} (code: {}, offset: {})",
                    self.error_code,
                    self.error_offset
                );
            }
        }
        result
    }

    /// Read `reader` to the end and decode the bytes as one document.
    ///
    /// A failing read yields [`DecodeError::Io`] and the
    /// [`OpenFileError`](ResultCode::OpenFileError) code.
    pub fn parse_reader<R: Read>(&mut self, mut reader: R) -> Result<Value, DecodeError> {
        let mut data = Vec::new();
        if let Err(e) = reader.read_to_end(&mut data) {
            self.error_code = ResultCode::OpenFileError;
            self.error_offset = 0;
            log::debug!("binary decode failed: cannot read input: {e}");
            return Err(e.into());
        }
        self.parse(&data)
    }
}

impl Default for BinaryParser {
    fn default() -> Self {
        Self::new()
    }
}

/// State of one decode pass.
struct Decoder<'a> {
    cursor: ByteCursor<'a>,
    /// Offset of the item being decoded, reported on failure.
    mark: usize,
    table: Array,
    allocator: &'a AllocatorRef,
    max_depth: usize,
}

impl Decoder<'_> {
    fn mark(&mut self) {
        self.mark = self.cursor.offset();
    }

    /// Fail if any read since the last check ran past the end.
    fn check(&self) -> Result<(), DecodeError> {
        if self.cursor.overrun() {
            Err(DecodeError::UnexpectedEof { offset: self.mark })
        } else {
            Ok(())
        }
    }

    /// Fail unless `count` items of at least `min_size` bytes each fit in
    /// the remaining input.
    fn check_count(&self, count: u64, min_size: u64) -> Result<usize, DecodeError> {
        let remaining = self.cursor.remaining();
        match count.checked_mul(min_size) {
            Some(needed) if needed <= remaining as u64 => Ok(count as usize),
            _ => Err(DecodeError::CountOutOfRange { count, remaining }),
        }
    }

    fn document(&mut self) -> Result<Value, DecodeError> {
        self.mark();
        match self.cursor.read_bytes(MAGIC.len()) {
            Some(magic) if magic == MAGIC => {}
            Some(_) => return Err(DecodeError::InvalidMagic),
            None => return Err(DecodeError::UnexpectedEof { offset: self.mark }),
        }

        self.mark();
        let version = self.cursor.read_u32_le();
        self.check()?;
        if !(MIN_FORMAT_VERSION..=FORMAT_VERSION).contains(&version) {
            return Err(DecodeError::UnsupportedVersion { found: version });
        }

        self.string_table(version)?;
        self.value(0)
    }

    fn string_table(&mut self, version: u32) -> Result<(), DecodeError> {
        let (count, max_len) = if version >= 2 {
            self.mark();
            let reserved = usize::from(self.cursor.read_u16_le());
            self.check()?;
            self.cursor.read_bytes(reserved);
            self.check()?;

            self.mark();
            let count = self.cursor.read_u32_le();
            let max_len = self.cursor.read_u32_le();
            self.check()?;
            (u64::from(count), max_len as usize)
        } else {
            let count = match self.value(0)? {
                Value::Int(n) if n >= 0 => n as u64,
                other => {
                    return Err(DecodeError::InvalidStringTable {
                        detail: format!("string count is a {} node", other.value_type()),
                    })
                }
            };
            (count, usize::from(u16::MAX))
        };
        log::trace!("binary header: version {version}, {count} pooled strings");

        // Each entry carries at least its u16 length.
        let count = self.check_count(count, 2)?;
        self.table.reserve(count);
        for i in 0..count {
            self.mark();
            let len = usize::from(self.cursor.read_u16_le());
            self.check()?;
            if len > max_len {
                return Err(DecodeError::InvalidStringTable {
                    detail: format!("entry {i} has {len} bytes, header maximum is {max_len}"),
                });
            }
            let bytes = self
                .cursor
                .read_bytes(len)
                .ok_or(DecodeError::UnexpectedEof { offset: self.mark })?;
            let s = self.allocator.create_string(bytes);
            self.table.push(Value::String(s));
        }
        Ok(())
    }

    fn value(&mut self, depth: usize) -> Result<Value, DecodeError> {
        self.mark();
        let offset = self.cursor.offset();
        let byte = self.cursor.read_u8();
        self.check()?;
        let tag = match Tag::from_u8(byte) {
            Some(Tag::Eof) | None => return Err(DecodeError::InvalidType { tag: byte, offset }),
            Some(tag) => tag,
        };

        let value = match tag {
            Tag::Eof | Tag::None => Value::Null,
            Tag::True => Value::Bool(true),
            Tag::False => Value::Bool(false),
            Tag::Zero => Value::Int(0),
            Tag::One => Value::Int(1),
            Tag::Int8 => Value::Int(self.cursor.read_i8().into()),
            Tag::Int16 => Value::Int(self.cursor.read_i16_le().into()),
            Tag::Int32 => Value::Int(self.cursor.read_i32_le().into()),
            Tag::Int64 => Value::Int(self.cursor.read_i64_le()),
            Tag::Float => Value::Float(self.cursor.read_f32_le().into()),
            Tag::Double => Value::Float(self.cursor.read_f64_le()),
            Tag::Str0 => self.string(0)?,
            Tag::Str8 => {
                let index = self.cursor.read_u8().into();
                self.check()?;
                self.string(index)?
            }
            Tag::Str16 => {
                let index = self.cursor.read_u16_le().into();
                self.check()?;
                self.string(index)?
            }
            Tag::Str32 => {
                let index = self.cursor.read_u32_le().into();
                self.check()?;
                self.string(index)?
            }
            Tag::List0 => self.list(0, depth)?,
            Tag::List8 => {
                let count = self.cursor.read_u8().into();
                self.check()?;
                self.list(count, depth)?
            }
            Tag::List16 => {
                let count = self.cursor.read_u16_le().into();
                self.check()?;
                self.list(count, depth)?
            }
            Tag::List32 => {
                let count = self.cursor.read_u32_le().into();
                self.check()?;
                self.list(count, depth)?
            }
            Tag::Dict0 => self.dict(0, depth)?,
            Tag::Dict8 => {
                let count = self.cursor.read_u8().into();
                self.check()?;
                self.dict(count, depth)?
            }
            Tag::Dict16 => {
                let count = self.cursor.read_u16_le().into();
                self.check()?;
                self.dict(count, depth)?
            }
            Tag::Dict32 => {
                let count = self.cursor.read_u32_le().into();
                self.check()?;
                self.dict(count, depth)?
            }
        };
        self.check()?;
        Ok(value)
    }

    fn string(&self, index: u64) -> Result<Value, DecodeError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.table.get(i))
            .cloned()
            .ok_or(DecodeError::StringIndexOutOfRange {
                index,
                len: self.table.len(),
            })
    }

    fn list(&mut self, count: u64, depth: usize) -> Result<Value, DecodeError> {
        if depth >= self.max_depth {
            return Err(DecodeError::DepthExceeded {
                max: self.max_depth,
            });
        }
        let count = self.check_count(count, 1)?;
        let mut array = Array::with_capacity_in(count, self.allocator.clone());
        for _ in 0..count {
            array.push(self.value(depth + 1)?);
        }
        Ok(Value::from(array))
    }

    fn dict(&mut self, count: u64, depth: usize) -> Result<Value, DecodeError> {
        if depth >= self.max_depth {
            return Err(DecodeError::DepthExceeded {
                max: self.max_depth,
            });
        }
        let count = self.check_count(count, 2)?;
        let mut map = Map::new_in(self.allocator.clone());
        map.reserve(count);
        for _ in 0..count {
            let key = self.value(depth + 1)?;
            let value = self.value(depth + 1)?;
            map.insert(key, value);
        }
        Ok(Value::from(map))
    }
}
