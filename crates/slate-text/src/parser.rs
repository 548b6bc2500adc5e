//! JSON text parser.
//!
//! Accepts standard JSON plus a few extensions:
//!
//! - `//` line comments and `/* */` block comments wherever whitespace
//!   is allowed;
//! - `\xHH` escapes for raw bytes in strings;
//! - `0x`, `0o`, and `0b` integer literals and a leading `+`;
//! - integer object keys.
//!
//! The root must be an object or an array, and nothing but whitespace
//! and comments may follow it.

use std::io::Read;

use slate_alloc::{default_allocator, AllocatorRef};
use slate_value::{Array, Map, ObjectFactory, ResultCode, Value};

use crate::config::ParserConfig;
use crate::error::ParseError;

type Step<T> = Result<T, ResultCode>;

/// Parses JSON text into value trees.
///
/// Every object of a parsed tree comes from the parser's allocator. The
/// parser remembers the result code and position of the most recent
/// parse.
///
/// # Examples
///
/// ```
/// use slate_text::Parser;
/// use slate_value::ResultCode;
///
/// let mut parser = Parser::new();
/// let root = parser.parse_str(r#"{"a": 0x10, /* note */ "b": [true]}"#).unwrap();
/// assert_eq!(root.get_member("a").as_int(), 16);
///
/// assert!(parser.parse_str("[1, 2").is_err());
/// assert_eq!(parser.error_code(), ResultCode::InvalidArray);
/// ```
pub struct Parser {
    allocator: AllocatorRef,
    config: ParserConfig,
    scratch: Vec<u8>,
    error_code: ResultCode,
    line: usize,
    column: usize,
}

impl Parser {
    /// A parser on the per-thread default allocator.
    pub fn new() -> Self {
        Self::with_allocator(default_allocator())
    }

    /// A parser that allocates parsed trees from `allocator`.
    pub fn with_allocator(allocator: AllocatorRef) -> Self {
        Self {
            allocator,
            config: ParserConfig::default(),
            scratch: Vec::new(),
            error_code: ResultCode::Ok,
            line: 0,
            column: 0,
        }
    }

    /// Replace the config.
    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// The allocator parsed trees come from.
    pub fn allocator(&self) -> &AllocatorRef {
        &self.allocator
    }

    /// Result code of the most recent parse.
    pub fn error_code(&self) -> ResultCode {
        self.error_code
    }

    /// 1-based line where the most recent parse stopped.
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based column where the most recent parse stopped.
    pub fn column(&self) -> usize {
        self.column
    }

    /// Parse a UTF-8 document.
    pub fn parse_str(&mut self, text: &str) -> Result<Value, ParseError> {
        self.parse(text.as_bytes())
    }

    /// Parse a document from raw bytes.
    ///
    /// String contents are taken byte for byte, so input need not be valid
    /// UTF-8.
    pub fn parse(&mut self, input: &[u8]) -> Result<Value, ParseError> {
        let mut scanner = Scanner {
            input,
            pos: 0,
            line: 1,
            column: 1,
            allocator: &self.allocator,
            scratch: &mut self.scratch,
            max_depth: self.config.max_depth,
        };
        let result = scanner.document();
        self.line = scanner.line;
        self.column = scanner.column;
        match result {
            Ok(root) => {
                self.error_code = ResultCode::Ok;
                Ok(root)
            }
            Err(code) => {
                self.error_code = code;
                log::debug!(
                    "text parse failed: {code} at line {}, column {}",
                    self.line,
                    self.column
                );
                Err(ParseError::Syntax {
                    code,
                    line: self.line,
                    column: self.column,
                })
            }
        }
    }

    /// Read `reader` to the end and parse the bytes as one document.
    pub fn parse_reader<R: Read>(&mut self, mut reader: R) -> Result<Value, ParseError> {
        let mut input = Vec::new();
        if let Err(e) = reader.read_to_end(&mut input) {
            self.error_code = ResultCode::OpenFileError;
            self.line = 0;
            self.column = 0;
            log::debug!("text parse failed: cannot read input: {e}");
            return Err(e.into());
        }
        self.parse(&input)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ── Scanner ─────────────────────────────────────────────────────

struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
    allocator: &'a AllocatorRef,
    scratch: &'a mut Vec<u8>,
    max_depth: usize,
}

impl Scanner<'_> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Consume `ch`, or fail with `code` leaving the input in place.
    fn expect(&mut self, ch: u8, code: ResultCode) -> Step<()> {
        if self.peek() == Some(ch) {
            self.bump();
            Ok(())
        } else {
            Err(code)
        }
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) -> Step<()> {
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\r' | b'\n') => {
                    self.bump();
                }
                Some(b'/') => {
                    self.bump();
                    self.comment()?;
                }
                _ => return Ok(()),
            }
        }
    }

    /// A comment body after its leading `/`.
    fn comment(&mut self) -> Step<()> {
        match self.bump() {
            Some(b'/') => {
                while let Some(ch) = self.bump() {
                    if ch == b'\n' {
                        break;
                    }
                }
                Ok(())
            }
            Some(b'*') => loop {
                match self.bump() {
                    None => return Err(ResultCode::InvalidComment),
                    Some(b'*') if self.peek() == Some(b'/') => {
                        self.bump();
                        return Ok(());
                    }
                    Some(_) => {}
                }
            },
            _ => Err(ResultCode::InvalidComment),
        }
    }

    fn document(&mut self) -> Step<Value> {
        self.skip_trivia()?;
        let root = match self.peek() {
            Some(b'{' | b'[') => self.value(0)?,
            _ => return Err(ResultCode::InvalidJson),
        };
        self.skip_trivia()?;
        if self.peek().is_some() {
            return Err(ResultCode::InvalidJson);
        }
        Ok(root)
    }

    fn value(&mut self, depth: usize) -> Step<Value> {
        self.skip_trivia()?;
        match self.peek() {
            None => Err(ResultCode::EndOfFile),
            Some(b'{') => {
                self.bump();
                self.object(depth)
            }
            Some(b'[') => {
                self.bump();
                self.array(depth)
            }
            Some(b'"') => {
                self.bump();
                self.string()
            }
            Some(b'n') => self.literal(b"null", Value::Null, ResultCode::InvalidNull),
            Some(b't') => self.literal(b"true", Value::Bool(true), ResultCode::InvalidTrue),
            Some(b'f') => self.literal(b"false", Value::Bool(false), ResultCode::InvalidFalse),
            Some(b'-' | b'+' | b'0'..=b'9') => self.number(),
            Some(_) => Err(ResultCode::InvalidJson),
        }
    }

    fn literal(&mut self, word: &[u8], value: Value, code: ResultCode) -> Step<Value> {
        for &ch in word {
            self.expect(ch, code)?;
        }
        Ok(value)
    }

    fn object(&mut self, depth: usize) -> Step<Value> {
        if depth >= self.max_depth {
            return Err(ResultCode::InvalidJson);
        }
        let mut map = Map::new_in(self.allocator.clone());
        self.skip_trivia()?;
        match self.peek() {
            Some(b'}') => {
                self.bump();
                return Ok(Value::from(map));
            }
            None => return Err(ResultCode::InvalidDict),
            Some(_) => {}
        }
        loop {
            let key = self.value(depth + 1)?;
            if !key.is_string() && !key.is_int() {
                return Err(ResultCode::InvalidKey);
            }
            self.skip_trivia()?;
            self.expect(b':', ResultCode::InvalidDict)?;
            let value = self.value(depth + 1)?;
            map.insert(key, value);

            self.skip_trivia()?;
            match self.bump() {
                Some(b'}') => return Ok(Value::from(map)),
                Some(b',') => {}
                _ => return Err(ResultCode::InvalidDict),
            }
        }
    }

    fn array(&mut self, depth: usize) -> Step<Value> {
        if depth >= self.max_depth {
            return Err(ResultCode::InvalidJson);
        }
        let mut array = Array::new_in(self.allocator.clone());
        self.skip_trivia()?;
        match self.peek() {
            Some(b']') => {
                self.bump();
                return Ok(Value::from(array));
            }
            None => return Err(ResultCode::InvalidArray),
            Some(_) => {}
        }
        loop {
            array.push(self.value(depth + 1)?);

            self.skip_trivia()?;
            match self.bump() {
                Some(b']') => return Ok(Value::from(array)),
                Some(b',') => {}
                _ => return Err(ResultCode::InvalidArray),
            }
        }
    }

    // ── Strings ────────────────────────────────────────────────

    /// A string body after its opening quote.
    fn string(&mut self) -> Step<Value> {
        self.scratch.clear();
        loop {
            match self.bump() {
                None | Some(b'\n') => return Err(ResultCode::InvalidString),
                Some(b'"') => break,
                Some(b'\\') => self.escape()?,
                Some(ch) => self.scratch.push(ch),
            }
        }
        Ok(Value::String(self.allocator.create_string(self.scratch.as_slice())))
    }

    fn escape(&mut self) -> Step<()> {
        let byte = match self.bump() {
            Some(b'b') => 0x08,
            Some(b'f') => 0x0c,
            Some(b'n') => b'\n',
            Some(b't') => b'\t',
            Some(b'r') => b'\r',
            Some(b'"') => b'"',
            Some(b'\\') => b'\\',
            Some(b'/') => b'/',
            Some(b'x') => {
                let hi = self.hex_digit(ResultCode::InvalidChar)?;
                let lo = self.hex_digit(ResultCode::InvalidChar)?;
                ((hi << 4) | lo) as u8
            }
            Some(b'u') => return self.unicode_escape(),
            _ => return Err(ResultCode::InvalidChar),
        };
        self.scratch.push(byte);
        Ok(())
    }

    fn hex_digit(&mut self, code: ResultCode) -> Step<u32> {
        self.bump()
            .and_then(|ch| char::from(ch).to_digit(16))
            .ok_or(code)
    }

    fn hex_quad(&mut self) -> Step<u32> {
        let mut unit = 0;
        for _ in 0..4 {
            unit = (unit << 4) | self.hex_digit(ResultCode::InvalidUnicode)?;
        }
        Ok(unit)
    }

    /// A `\u` escape after the `u`, including the low half of a
    /// surrogate pair.
    fn unicode_escape(&mut self) -> Step<()> {
        let unit = self.hex_quad()?;
        let code_point = match unit {
            0xd800..=0xdbff => {
                self.expect(b'\\', ResultCode::InvalidUnicode)?;
                self.expect(b'u', ResultCode::InvalidUnicode)?;
                let low = self.hex_quad()?;
                if !(0xdc00..=0xdfff).contains(&low) {
                    return Err(ResultCode::InvalidUnicode);
                }
                0x10000 + ((unit & 0x3ff) << 10) + (low & 0x3ff)
            }
            0xdc00..=0xdfff => return Err(ResultCode::InvalidUnicode),
            _ => unit,
        };
        let ch = char::from_u32(code_point).ok_or(ResultCode::InvalidUnicode)?;
        let mut buf = [0; 4];
        self.scratch
            .extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        Ok(())
    }

    // ── Numbers ────────────────────────────────────────────────

    fn digits(&mut self, radix: u32) -> usize {
        let mut n = 0;
        while self.peek().is_some_and(|ch| char::from(ch).is_digit(radix)) {
            self.bump();
            n += 1;
        }
        n
    }

    fn number(&mut self) -> Step<Value> {
        let start = self.pos;
        let negative = match self.peek() {
            Some(b'-') => {
                self.bump();
                true
            }
            Some(b'+') => {
                self.bump();
                false
            }
            _ => false,
        };
        let digits_start = self.pos;

        let radix = match (self.peek(), self.input.get(self.pos + 1).copied()) {
            (Some(b'0'), Some(b'x' | b'X')) => Some(16),
            (Some(b'0'), Some(b'o' | b'O')) => Some(8),
            (Some(b'0'), Some(b'b' | b'B')) => Some(2),
            _ => None,
        };
        let value = match radix {
            Some(radix) => {
                self.bump();
                self.bump();
                self.radix_integer(radix, negative)?
            }
            None => self.decimal(start, digits_start)?,
        };

        match self.peek() {
            None
            | Some(b',' | b']' | b'}' | b':' | b'/' | b' ' | b'\t' | b'\r' | b'\n') => Ok(value),
            Some(_) => Err(ResultCode::InvalidNumber),
        }
    }

    /// Digits of a `0x`/`0o`/`0b` literal. The bits are kept as written,
    /// so `0xffffffffffffffff` is `-1`.
    fn radix_integer(&mut self, radix: u32, negative: bool) -> Step<Value> {
        let digits_start = self.pos;
        if self.digits(radix) == 0 {
            return Err(ResultCode::InvalidNumber);
        }
        let digits = std::str::from_utf8(&self.input[digits_start..self.pos])
            .map_err(|_| ResultCode::InvalidNumber)?;
        let bits = u64::from_str_radix(digits, radix).map_err(|_| ResultCode::InvalidNumber)?;
        let value = bits as i64;
        Ok(Value::Int(if negative {
            value.wrapping_neg()
        } else {
            value
        }))
    }

    fn decimal(&mut self, start: usize, digits_start: usize) -> Step<Value> {
        let int_digits = self.digits(10);
        if int_digits == 0 {
            return Err(ResultCode::InvalidNumber);
        }
        if int_digits > 1 && self.input[digits_start] == b'0' {
            return Err(ResultCode::InvalidNumber);
        }

        let mut is_float = false;
        if self.peek() == Some(b'.') {
            self.bump();
            if self.digits(10) == 0 {
                return Err(ResultCode::InvalidNumber);
            }
            is_float = true;
        }
        if let Some(b'e' | b'E') = self.peek() {
            self.bump();
            if let Some(b'+' | b'-') = self.peek() {
                self.bump();
            }
            if self.digits(10) == 0 {
                return Err(ResultCode::InvalidNumber);
            }
            is_float = true;
        }

        let text = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| ResultCode::InvalidNumber)?;
        if !is_float {
            if let Ok(i) = text.parse::<i64>() {
                return Ok(Value::Int(i));
            }
        }
        // Integers outside i64 range fall back to float.
        text.parse::<f64>()
            .map(Value::Float)
            .map_err(|_| ResultCode::InvalidNumber)
    }
}
