//! Hashing utilities for strings and value trees.
//!
//! Uses FNV-1a for fast, deterministic hashing. These hashes are not
//! cryptographically secure; they back string hash caching and the
//! [`Hash`](std::hash::Hash) impl of [`Value`].

use crate::value::Value;

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

/// Feed a single byte into an FNV-1a hash state.
#[inline]
fn fnv1a_byte(hash: u64, byte: u8) -> u64 {
    (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
}

/// Feed a u64 (as 8 LE bytes) into an FNV-1a hash state.
#[inline]
fn fnv1a_u64(mut hash: u64, v: u64) -> u64 {
    for &b in &v.to_le_bytes() {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

#[inline]
fn fnv1a_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

/// FNV-1a hash of a byte string.
pub fn fnv1a(bytes: &[u8]) -> u64 {
    fnv1a_bytes(FNV_OFFSET, bytes)
}

// Kind bytes folded in ahead of each node's payload.
const KIND_NULL: u8 = 0;
const KIND_BOOL: u8 = 1;
const KIND_INTEGRAL: u8 = 2;
const KIND_FRACTIONAL: u8 = 3;
const KIND_STRING: u8 = 4;
const KIND_ARRAY: u8 = 5;
const KIND_MAP: u8 = 6;

/// Structural hash of a value tree.
///
/// Integral numbers hash by integer value whether stored as `Int` or
/// `Float`, so `1` and `1.0` collide. Map members are combined with an
/// order-independent sum, matching map equality. Values that are equal
/// under [`FloatCompare::Exact`](crate::FloatCompare::Exact) hash equally.
pub fn value_hash(value: &Value) -> u64 {
    feed(FNV_OFFSET, value)
}

fn feed(hash: u64, value: &Value) -> u64 {
    match value {
        Value::Null => fnv1a_byte(hash, KIND_NULL),
        Value::Bool(b) => fnv1a_byte(fnv1a_byte(hash, KIND_BOOL), *b as u8),
        Value::Int(i) => fnv1a_u64(fnv1a_byte(hash, KIND_INTEGRAL), *i as u64),
        Value::Float(f) => match crate::value::integral_f64(*f) {
            Some(i) => fnv1a_u64(fnv1a_byte(hash, KIND_INTEGRAL), i as u64),
            None => fnv1a_u64(fnv1a_byte(hash, KIND_FRACTIONAL), f.to_bits()),
        },
        Value::String(s) => fnv1a_u64(fnv1a_byte(hash, KIND_STRING), s.content_hash()),
        Value::Array(a) => {
            let a = a.borrow();
            let mut hash = fnv1a_u64(fnv1a_byte(hash, KIND_ARRAY), a.len() as u64);
            for v in a.iter() {
                hash = feed(hash, v);
            }
            hash
        }
        Value::Map(m) => {
            let m = m.borrow();
            let members = m.iter().fold(0u64, |acc, member| {
                let h = feed(feed(FNV_OFFSET, &member.key), &member.value);
                acc.wrapping_add(h)
            });
            let hash = fnv1a_u64(fnv1a_byte(hash, KIND_MAP), m.len() as u64);
            fnv1a_u64(hash, members)
        }
    }
}
