//! Wire tags of the binary format.

/// Tag byte that starts every value node.
///
/// Sized families (`Str*`, `List*`, `Dict*`) differ only in the width of
/// the payload that follows: `*0` carries no payload (string index 0, or
/// an empty container), `*8`/`*16`/`*32` carry an unsigned little-endian
/// index or element count of that width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    /// End of stream marker. Never emitted inside a document.
    Eof = 0,
    /// `null`.
    None = 1,
    /// `true`.
    True = 2,
    /// `false`.
    False = 3,
    /// Integer `0`.
    Zero = 4,
    /// Integer `1`.
    One = 5,
    /// `f32` payload.
    Float = 6,
    /// `f64` payload.
    Double = 7,
    /// `i8` payload.
    Int8 = 8,
    /// `i16` payload.
    Int16 = 9,
    /// `i32` payload.
    Int32 = 10,
    /// `i64` payload.
    Int64 = 11,
    /// String pool index 0.
    Str0 = 12,
    /// `u8` string pool index.
    Str8 = 13,
    /// `u16` string pool index.
    Str16 = 14,
    /// `u32` string pool index.
    Str32 = 15,
    /// Empty array.
    List0 = 16,
    /// Array with a `u8` element count.
    List8 = 17,
    /// Array with a `u16` element count.
    List16 = 18,
    /// Array with a `u32` element count.
    List32 = 19,
    /// Empty map.
    Dict0 = 20,
    /// Map with a `u8` member count.
    Dict8 = 21,
    /// Map with a `u16` member count.
    Dict16 = 22,
    /// Map with a `u32` member count.
    Dict32 = 23,
}

impl Tag {
    /// Decode a tag byte.
    pub fn from_u8(byte: u8) -> Option<Tag> {
        let tag = match byte {
            0 => Tag::Eof,
            1 => Tag::None,
            2 => Tag::True,
            3 => Tag::False,
            4 => Tag::Zero,
            5 => Tag::One,
            6 => Tag::Float,
            7 => Tag::Double,
            8 => Tag::Int8,
            9 => Tag::Int16,
            10 => Tag::Int32,
            11 => Tag::Int64,
            12 => Tag::Str0,
            13 => Tag::Str8,
            14 => Tag::Str16,
            15 => Tag::Str32,
            16 => Tag::List0,
            17 => Tag::List8,
            18 => Tag::List16,
            19 => Tag::List32,
            20 => Tag::Dict0,
            21 => Tag::Dict8,
            22 => Tag::Dict16,
            23 => Tag::Dict32,
            _ => return None,
        };
        Some(tag)
    }

    /// The tag byte.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Width of an unsigned index or count payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Width {
    /// No payload; the value is implied by the tag.
    W0,
    /// One byte.
    W8,
    /// Two bytes.
    W16,
    /// Four bytes.
    W32,
}

impl Width {
    /// Smallest width holding `n`. `W0` only for zero.
    ///
    /// Returns `None` when `n` does not fit in a `u32`.
    pub fn for_count(n: usize) -> Option<Width> {
        match n {
            0 => Some(Width::W0),
            1..=0xff => Some(Width::W8),
            0x100..=0xffff => Some(Width::W16),
            _ if u32::try_from(n).is_ok() => Some(Width::W32),
            _ => None,
        }
    }

    /// Offset of this width within a sized tag family.
    fn rank(self) -> u8 {
        match self {
            Width::W0 => 0,
            Width::W8 => 1,
            Width::W16 => 2,
            Width::W32 => 3,
        }
    }

    /// The string tag of this width.
    pub fn str_tag(self) -> Tag {
        sized(Tag::Str0, self)
    }

    /// The array tag of this width.
    pub fn list_tag(self) -> Tag {
        sized(Tag::List0, self)
    }

    /// The map tag of this width.
    pub fn dict_tag(self) -> Tag {
        sized(Tag::Dict0, self)
    }
}

fn sized(base: Tag, width: Width) -> Tag {
    match Tag::from_u8(base.as_u8() + width.rank()) {
        Some(tag) => tag,
        None => base,
    }
}

/// Smallest integer tag for `v`: `Zero`, `One`, or a signed width.
pub fn int_tag(v: i64) -> Tag {
    match v {
        0 => Tag::Zero,
        1 => Tag::One,
        _ if i8::try_from(v).is_ok() => Tag::Int8,
        _ if i16::try_from(v).is_ok() => Tag::Int16,
        _ if i32::try_from(v).is_ok() => Tag::Int32,
        _ => Tag::Int64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_byte_below_24_is_a_tag() {
        for b in 0..24u8 {
            assert_eq!(Tag::from_u8(b).map(Tag::as_u8), Some(b));
        }
        assert_eq!(Tag::from_u8(24), None);
        assert_eq!(Tag::from_u8(0xff), None);
    }

    #[test]
    fn minimal_integer_tags() {
        assert_eq!(int_tag(0), Tag::Zero);
        assert_eq!(int_tag(1), Tag::One);
        assert_eq!(int_tag(-1), Tag::Int8);
        assert_eq!(int_tag(-100), Tag::Int8);
        assert_eq!(int_tag(127), Tag::Int8);
        assert_eq!(int_tag(128), Tag::Int16);
        assert_eq!(int_tag(200), Tag::Int16);
        assert_eq!(int_tag(-32_769), Tag::Int32);
        assert_eq!(int_tag(1 << 40), Tag::Int64);
    }

    #[test]
    fn sized_families() {
        assert_eq!(Width::for_count(0), Some(Width::W0));
        assert_eq!(Width::for_count(255), Some(Width::W8));
        assert_eq!(Width::for_count(256), Some(Width::W16));
        assert_eq!(Width::for_count(70_000), Some(Width::W32));
        assert_eq!(Width::W0.str_tag(), Tag::Str0);
        assert_eq!(Width::W16.list_tag(), Tag::List16);
        assert_eq!(Width::W32.dict_tag(), Tag::Dict32);
    }
}
