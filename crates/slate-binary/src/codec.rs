//! Little-endian primitives for the binary format.
//!
//! Writers go to any `Write` sink. Reads go through [`ByteCursor`], which
//! never reads outside its buffer: a read that runs past the end yields
//! zeros, pins the cursor at the end, and records the overrun.

use std::io::Write;

use crate::error::EncodeError;

// ── Primitive writers ───────────────────────────────────────────

/// Write a single byte.
pub fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), EncodeError> {
    w.write_all(&[v])?;
    Ok(())
}

/// Write a little-endian u16.
pub fn write_u16_le(w: &mut dyn Write, v: u16) -> Result<(), EncodeError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian u32.
pub fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), EncodeError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian i16.
pub fn write_i16_le(w: &mut dyn Write, v: i16) -> Result<(), EncodeError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian i32.
pub fn write_i32_le(w: &mut dyn Write, v: i32) -> Result<(), EncodeError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian i64.
pub fn write_i64_le(w: &mut dyn Write, v: i64) -> Result<(), EncodeError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian f32.
pub fn write_f32_le(w: &mut dyn Write, v: f32) -> Result<(), EncodeError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian f64.
pub fn write_f64_le(w: &mut dyn Write, v: f64) -> Result<(), EncodeError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a pool entry: u16 length + bytes.
pub fn write_short_bytes(w: &mut dyn Write, b: &[u8]) -> Result<(), EncodeError> {
    let len = u16::try_from(b.len()).map_err(|_| EncodeError::StringTooLong { len: b.len() })?;
    write_u16_le(w, len)?;
    w.write_all(b)?;
    Ok(())
}

// ── Cursor ──────────────────────────────────────────────────────

/// Bounds-clamping reader over a byte slice.
#[derive(Clone, Debug)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    overrun: bool,
}

impl<'a> ByteCursor<'a> {
    /// A cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            overrun: false,
        }
    }

    /// Current byte offset.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Whether any read ran past the end.
    pub fn overrun(&self) -> bool {
        self.overrun
    }

    /// Take the next `len` bytes, or `None` (cursor pinned at the end) if
    /// fewer remain.
    pub fn read_bytes(&mut self, len: usize) -> Option<&'a [u8]> {
        if len <= self.remaining() {
            let out = &self.data[self.pos..self.pos + len];
            self.pos += len;
            Some(out)
        } else {
            self.pos = self.data.len();
            self.overrun = true;
            None
        }
    }

    fn read_array<const N: usize>(&mut self) -> [u8; N] {
        let mut buf = [0u8; N];
        if let Some(bytes) = self.read_bytes(N) {
            buf.copy_from_slice(bytes);
        }
        buf
    }

    /// Read a byte.
    pub fn read_u8(&mut self) -> u8 {
        self.read_array::<1>()[0]
    }

    /// Read a little-endian u16.
    pub fn read_u16_le(&mut self) -> u16 {
        u16::from_le_bytes(self.read_array())
    }

    /// Read a little-endian u32.
    pub fn read_u32_le(&mut self) -> u32 {
        u32::from_le_bytes(self.read_array())
    }

    /// Read an i8.
    pub fn read_i8(&mut self) -> i8 {
        i8::from_le_bytes(self.read_array())
    }

    /// Read a little-endian i16.
    pub fn read_i16_le(&mut self) -> i16 {
        i16::from_le_bytes(self.read_array())
    }

    /// Read a little-endian i32.
    pub fn read_i32_le(&mut self) -> i32 {
        i32::from_le_bytes(self.read_array())
    }

    /// Read a little-endian i64.
    pub fn read_i64_le(&mut self) -> i64 {
        i64::from_le_bytes(self.read_array())
    }

    /// Read a little-endian f32.
    pub fn read_f32_le(&mut self) -> f32 {
        f32::from_le_bytes(self.read_array())
    }

    /// Read a little-endian f64.
    pub fn read_f64_le(&mut self) -> f64 {
        f64::from_le_bytes(self.read_array())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn reads_past_end_clamp_to_zero() {
        let mut c = ByteCursor::new(&[1, 2, 3]);
        assert_eq!(c.read_u8(), 1);
        assert!(!c.overrun());
        assert_eq!(c.read_u32_le(), 0);
        assert!(c.overrun());
        assert_eq!(c.offset(), 3);
        assert_eq!(c.remaining(), 0);
    }

    #[test]
    fn read_bytes_exact_fit() {
        let mut c = ByteCursor::new(b"abcd");
        assert_eq!(c.read_bytes(4), Some(&b"abcd"[..]));
        assert_eq!(c.read_bytes(0), Some(&b""[..]));
        assert_eq!(c.read_bytes(1), None);
    }

    #[test]
    fn short_bytes_limit() {
        let mut buf = Vec::new();
        let long = vec![b'x'; 70_000];
        assert!(matches!(
            write_short_bytes(&mut buf, &long),
            Err(EncodeError::StringTooLong { len: 70_000 })
        ));
    }

    proptest! {
        #[test]
        fn roundtrip_u16(v in any::<u16>()) {
            let mut buf = Vec::new();
            write_u16_le(&mut buf, v).unwrap();
            prop_assert_eq!(ByteCursor::new(&buf).read_u16_le(), v);
        }

        #[test]
        fn roundtrip_i64(v in any::<i64>()) {
            let mut buf = Vec::new();
            write_i64_le(&mut buf, v).unwrap();
            prop_assert_eq!(ByteCursor::new(&buf).read_i64_le(), v);
        }

        #[test]
        fn roundtrip_f64(v in any::<f64>()) {
            let mut buf = Vec::new();
            write_f64_le(&mut buf, v).unwrap();
            prop_assert_eq!(ByteCursor::new(&buf).read_f64_le().to_bits(), v.to_bits());
        }
    }
}
