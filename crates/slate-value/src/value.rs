//! The [`Value`] enum: one JSON-like datum.

use std::cell::{Ref, RefCell};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use slate_alloc::{default_allocator, AllocatorRef};

use crate::array::Array;
use crate::error::PathError;
use crate::hash::value_hash;
use crate::heap::{ArrayRef, Heap, MapRef, ObjectFactory, StrRef};
use crate::map::Map;
use crate::string::Str;

/// Discriminant of a [`Value`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueType {
    /// `null`.
    Null,
    /// `true` or `false`.
    Bool,
    /// Signed 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// Byte string.
    String,
    /// Ordered sequence.
    Array,
    /// Key/value map.
    Map,
}

impl ValueType {
    /// Lower-case type name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Array => "array",
            Self::Map => "map",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How floats compare in [`Value::eq_with`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FloatCompare {
    /// Numbers are equal when `|a - b| < f64::EPSILON`. Used by `==`.
    #[default]
    Epsilon,
    /// Floats are equal only when bit-identical after conversion to `f64`.
    Exact,
}

/// The integer an `f64` holds exactly, if it is finite, integral, and
/// within `i64` range. Negative zero has no integer form.
pub fn integral_f64(f: f64) -> Option<i64> {
    // 2^63 is exactly representable; every finite f64 below it fits in i64.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.to_bits() == (-0.0f64).to_bits() {
        return None;
    }
    if f.is_finite() && f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f) {
        Some(f as i64)
    } else {
        None
    }
}

/// A JSON-like datum.
///
/// Scalars are stored inline. Strings, arrays, and maps are shared heap
/// objects: cloning a `Value` retains the object, dropping it releases, and
/// the last release destroys the object through its allocator. Arrays and
/// maps are mutable through any handle, so aliases observe each other's
/// changes. Use [`deep_clone`](Value::deep_clone) for an independent copy.
///
/// Trees that contain themselves are never freed.
#[derive(Clone, Default)]
pub enum Value {
    /// `null`.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer. Unsigned 64-bit values are stored bit-cast.
    Int(i64),
    /// A float.
    Float(f64),
    /// A shared string.
    String(StrRef),
    /// A shared array.
    Array(ArrayRef),
    /// A shared map.
    Map(MapRef),
}

impl Value {
    // ── Type predicates ────────────────────────────────────────

    /// The type of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Null => ValueType::Null,
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
            Self::String(_) => ValueType::String,
            Self::Array(_) => ValueType::Array,
            Self::Map(_) => ValueType::Map,
        }
    }

    /// Whether this is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether this is a `Bool`.
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(_))
    }

    /// Whether this is an `Int`.
    pub fn is_int(&self) -> bool {
        matches!(self, Self::Int(_))
    }

    /// Whether this is a `Float`.
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float(_))
    }

    /// Whether this is an `Int` or a `Float`.
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// Whether this is a `String`.
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    /// Whether this is an `Array`.
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Whether this is a `Map`.
    pub fn is_map(&self) -> bool {
        matches!(self, Self::Map(_))
    }

    /// Whether this holds a heap object.
    pub fn is_pointer(&self) -> bool {
        matches!(self, Self::String(_) | Self::Array(_) | Self::Map(_))
    }

    /// The allocator of the held heap object.
    pub fn allocator(&self) -> Option<&AllocatorRef> {
        match self {
            Self::String(s) => Some(Heap::allocator(s)),
            Self::Array(a) => Some(Heap::allocator(a)),
            Self::Map(m) => Some(Heap::allocator(m)),
            _ => None,
        }
    }

    // ── Safe accessors ─────────────────────────────────────────

    /// The boolean, or `false` for any other type.
    pub fn as_bool(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            _ => false,
        }
    }

    /// The number as `i64` (floats truncate), or `0`.
    pub fn as_int(&self) -> i64 {
        match self {
            Self::Int(i) => *i,
            Self::Float(f) => *f as i64,
            _ => 0,
        }
    }

    /// The number as `i32` (wrapping), or `0`.
    pub fn as_i32(&self) -> i32 {
        self.as_int() as i32
    }

    /// The number as `u64` (integers bit-cast, floats saturate), or `0`.
    pub fn as_u64(&self) -> u64 {
        match self {
            Self::Int(i) => *i as u64,
            Self::Float(f) => *f as u64,
            _ => 0,
        }
    }

    /// The number as `f64`, or `0.0`.
    pub fn as_float(&self) -> f64 {
        match self {
            Self::Int(i) => *i as f64,
            Self::Float(f) => *f,
            _ => 0.0,
        }
    }

    /// The number as `f32`, or `0.0`.
    pub fn as_f32(&self) -> f32 {
        self.as_float() as f32
    }

    /// The string's bytes, or an empty slice.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::String(s) => s.as_bytes(),
            _ => &[],
        }
    }

    /// The string as UTF-8 text, or `""` for other types and invalid UTF-8.
    pub fn as_str(&self) -> &str {
        match self {
            Self::String(s) => s.as_str().unwrap_or(""),
            _ => "",
        }
    }

    /// The string handle.
    pub fn as_string(&self) -> Option<&StrRef> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The array handle.
    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// The map handle.
    pub fn as_map(&self) -> Option<&MapRef> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    // ── Unchecked accessors ────────────────────────────────────

    #[track_caller]
    fn type_mismatch(&self, wanted: ValueType) -> ! {
        panic!("expected {wanted} value, found {}", self.value_type())
    }

    /// The boolean.
    ///
    /// # Panics
    ///
    /// Panics if this is not a `Bool`.
    #[track_caller]
    pub fn raw_bool(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            _ => self.type_mismatch(ValueType::Bool),
        }
    }

    /// The integer.
    ///
    /// # Panics
    ///
    /// Panics if this is not an `Int`.
    #[track_caller]
    pub fn raw_int(&self) -> i64 {
        match self {
            Self::Int(i) => *i,
            _ => self.type_mismatch(ValueType::Int),
        }
    }

    /// The float.
    ///
    /// # Panics
    ///
    /// Panics if this is not a `Float`.
    #[track_caller]
    pub fn raw_float(&self) -> f64 {
        match self {
            Self::Float(f) => *f,
            _ => self.type_mismatch(ValueType::Float),
        }
    }

    /// The string body.
    ///
    /// # Panics
    ///
    /// Panics if this is not a `String`.
    #[track_caller]
    pub fn raw_str(&self) -> &Str {
        match self {
            Self::String(s) => s,
            _ => self.type_mismatch(ValueType::String),
        }
    }

    /// The array handle.
    ///
    /// # Panics
    ///
    /// Panics if this is not an `Array`.
    #[track_caller]
    pub fn raw_array(&self) -> &ArrayRef {
        match self {
            Self::Array(a) => a,
            _ => self.type_mismatch(ValueType::Array),
        }
    }

    /// The map handle.
    ///
    /// # Panics
    ///
    /// Panics if this is not a `Map`.
    #[track_caller]
    pub fn raw_map(&self) -> &MapRef {
        match self {
            Self::Map(m) => m,
            _ => self.type_mismatch(ValueType::Map),
        }
    }

    // ── Mutators ───────────────────────────────────────────────

    /// Release any held object and become `Null`.
    pub fn set_null(&mut self) {
        *self = Self::Null;
    }

    /// Become a `Bool`.
    pub fn set_bool(&mut self, b: bool) {
        *self = Self::Bool(b);
    }

    /// Become an `Int`.
    pub fn set_int(&mut self, i: i64) {
        *self = Self::Int(i);
    }

    /// Become a `Float`.
    pub fn set_float(&mut self, f: f64) {
        *self = Self::Float(f);
    }

    /// Allocator for a replacement object: the given one, else the one of
    /// the held object, else the per-thread default.
    fn pick_allocator(&self, allocator: Option<&AllocatorRef>) -> AllocatorRef {
        match allocator.or_else(|| self.allocator()) {
            Some(a) => a.clone(),
            None => default_allocator(),
        }
    }

    /// Become a new string holding a copy of `bytes`.
    pub fn set_string(&mut self, bytes: &[u8], allocator: Option<&AllocatorRef>) -> StrRef {
        let allocator = self.pick_allocator(allocator);
        let s = allocator.create_string(bytes);
        *self = Self::String(s.clone());
        s
    }

    /// Become a new empty array and return its handle.
    pub fn set_array(&mut self, allocator: Option<&AllocatorRef>) -> ArrayRef {
        let allocator = self.pick_allocator(allocator);
        let a = allocator.create_array();
        *self = Self::Array(a.clone());
        a
    }

    /// Become a new empty map and return its handle.
    pub fn set_map(&mut self, allocator: Option<&AllocatorRef>) -> MapRef {
        let allocator = self.pick_allocator(allocator);
        let m = allocator.create_map();
        *self = Self::Map(m.clone());
        m
    }

    /// Become a shallow copy of `other`.
    ///
    /// `other` is retained before the old payload is released, so assigning
    /// from an alias of `self` is safe.
    pub fn assign(&mut self, other: &Value) {
        let next = other.clone();
        *self = next;
    }

    // ── Comparison ─────────────────────────────────────────────

    /// Equality with an explicit float policy.
    ///
    /// Numbers cross-compare between `Int` and `Float`; `Int` against `Int`
    /// is exact. Other types must match. Arrays compare in order; maps
    /// compare by key regardless of member order.
    pub fn eq_with(&self, other: &Value, mode: FloatCompare) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Int(a), Self::Float(b)) => floats_eq(*a as f64, *b, mode),
            (Self::Float(a), Self::Int(b)) => floats_eq(*a, *b as f64, mode),
            (Self::Float(a), Self::Float(b)) => floats_eq(*a, *b, mode),
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::String(a), Self::String(b)) => Heap::ptr_eq(a, b) || **a == **b,
            (Self::Array(a), Self::Array(b)) => {
                Heap::ptr_eq(a, b) || a.borrow().eq_with(&b.borrow(), mode)
            }
            (Self::Map(a), Self::Map(b)) => {
                Heap::ptr_eq(a, b) || a.borrow().eq_with(&b.borrow(), mode)
            }
            _ => false,
        }
    }

    /// A total order over values.
    ///
    /// Types order as `Null < Bool < numbers < String < Array < Map`.
    /// Numbers compare numerically across `Int` and `Float` (with
    /// [`f64::total_cmp`] for floats); strings compare by bytes; arrays
    /// lexicographically; maps by size, then member by member in order.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Int(a), Self::Float(b)) => (*a as f64).total_cmp(b),
            (Self::Float(a), Self::Int(b)) => a.total_cmp(&(*b as f64)),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::String(a), Self::String(b)) => a.as_bytes().cmp(b.as_bytes()),
            (Self::Array(a), Self::Array(b)) => {
                if Heap::ptr_eq(a, b) {
                    Ordering::Equal
                } else {
                    cmp_arrays(&a.borrow(), &b.borrow())
                }
            }
            (Self::Map(a), Self::Map(b)) => {
                if Heap::ptr_eq(a, b) {
                    Ordering::Equal
                } else {
                    cmp_maps(&a.borrow(), &b.borrow())
                }
            }
            _ => type_rank(self).cmp(&type_rank(other)),
        }
    }

    // ── Cloning ────────────────────────────────────────────────

    /// An independent copy of the whole tree in the allocator of this
    /// value's object (or the default allocator for scalars).
    pub fn deep_clone(&self) -> Value {
        match self.allocator() {
            Some(a) => {
                let a = a.clone();
                self.deep_clone_in(&a)
            }
            None => self.clone(),
        }
    }

    /// An independent copy of the whole tree with every object allocated
    /// from `allocator`.
    pub fn deep_clone_in(&self, allocator: &AllocatorRef) -> Value {
        match self {
            Self::String(s) => Self::String(allocator.create_string(s.as_bytes())),
            Self::Array(a) => {
                let copy = a.borrow().deep_clone_in(allocator);
                Self::Array(Heap::new_in(allocator, RefCell::new(copy)))
            }
            Self::Map(m) => {
                let copy = m.borrow().deep_clone_in(allocator);
                Self::Map(Heap::new_in(allocator, RefCell::new(copy)))
            }
            scalar => scalar.clone(),
        }
    }

    // ── Container conveniences ─────────────────────────────────

    /// Length of a string, array, or map; `0` otherwise.
    pub fn len(&self) -> usize {
        match self {
            Self::String(s) => s.len(),
            Self::Array(a) => a.borrow().len(),
            Self::Map(m) => m.borrow().len(),
            _ => 0,
        }
    }

    /// Whether [`len`](Value::len) is zero.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capacity of an array or map; the length of a string; `0` otherwise.
    pub fn capacity(&self) -> usize {
        match self {
            Self::String(s) => s.len(),
            Self::Array(a) => a.borrow().capacity(),
            Self::Map(m) => m.borrow().capacity(),
            _ => 0,
        }
    }

    /// Grow an array or map to exactly `capacity` slots. No-op otherwise.
    pub fn reserve(&self, capacity: usize) {
        match self {
            Self::Array(a) => a.borrow_mut().reserve(capacity),
            Self::Map(m) => m.borrow_mut().reserve(capacity),
            _ => {}
        }
    }

    /// Empty an array or map. No-op otherwise.
    pub fn clear(&self) {
        match self {
            Self::Array(a) => a.borrow_mut().clear(),
            Self::Map(m) => m.borrow_mut().clear(),
            _ => {}
        }
    }

    /// Append to an array. Returns `false` if this is not an array.
    pub fn push(&self, value: Value) -> bool {
        match self {
            Self::Array(a) => {
                a.borrow_mut().push(value);
                true
            }
            _ => false,
        }
    }

    /// Remove the last element of an array.
    pub fn pop(&self) -> Option<Value> {
        match self {
            Self::Array(a) => a.borrow_mut().pop(),
            _ => None,
        }
    }

    /// Element `index` of an array, or the member keyed by the integer
    /// `index` of a map. `Null` when absent.
    pub fn at(&self, index: usize) -> Value {
        let found = match self {
            Self::Array(a) => a.borrow().get(index).cloned(),
            Self::Map(m) => m.borrow().get(&Value::from(index as u64)).cloned(),
            _ => None,
        };
        found.unwrap_or_default()
    }

    /// Borrow the array body.
    ///
    /// # Panics
    ///
    /// Panics if this is not an array or the array is mutably borrowed.
    #[track_caller]
    pub fn array(&self) -> Ref<'_, Array> {
        self.raw_array().borrow()
    }

    /// Borrow the map body.
    ///
    /// # Panics
    ///
    /// Panics if this is not a map or the map is mutably borrowed.
    #[track_caller]
    pub fn map(&self) -> Ref<'_, Map> {
        self.raw_map().borrow()
    }

    /// The member at a `/`-separated path, or `Null` when any segment is
    /// missing or this is not a map.
    pub fn get_member(&self, path: &str) -> Value {
        let found = match self {
            Self::Map(m) => match m.try_borrow() {
                Ok(m) => m.find_member_by_path(path),
                Err(_) => None,
            },
            _ => None,
        };
        found.unwrap_or_default()
    }

    /// Whether a member exists at a `/`-separated path.
    pub fn has_member(&self, path: &str) -> bool {
        match self {
            Self::Map(m) => m
                .try_borrow()
                .is_ok_and(|m| m.find_member_by_path(path).is_some()),
            _ => false,
        }
    }

    /// Store `value` at a `/`-separated path, creating intermediate maps.
    pub fn set_member(&self, path: &str, value: Value) -> Result<(), PathError> {
        let Self::Map(m) = self else {
            return Err(PathError::NotAMap { at: String::new() });
        };
        let mut m = m
            .try_borrow_mut()
            .map_err(|_| PathError::Borrowed { at: String::new() })?;
        m.set_member_by_path(path, value)
    }

    /// Remove and return the member at a `/`-separated path.
    pub fn remove_member(&self, path: &str) -> Option<Value> {
        match self {
            Self::Map(m) => m.try_borrow_mut().ok()?.remove_member_by_path(path),
            _ => None,
        }
    }
}

fn floats_eq(a: f64, b: f64, mode: FloatCompare) -> bool {
    match mode {
        FloatCompare::Epsilon => a == b || (a - b).abs() < f64::EPSILON,
        FloatCompare::Exact => a.to_bits() == b.to_bits(),
    }
}

fn cmp_arrays(a: &Array, b: &Array) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let o = x.total_cmp(y);
        if o.is_ne() {
            return o;
        }
    }
    a.len().cmp(&b.len())
}

fn cmp_maps(a: &Map, b: &Map) -> Ordering {
    let by_len = a.len().cmp(&b.len());
    if by_len.is_ne() {
        return by_len;
    }
    for (x, y) in a.iter().zip(b.iter()) {
        let o = x.key.total_cmp(&y.key).then_with(|| x.value.total_cmp(&y.value));
        if o.is_ne() {
            return o;
        }
    }
    Ordering::Equal
}

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Int(_) | Value::Float(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Map(_) => 5,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.eq_with(other, FloatCompare::Epsilon)
    }
}

impl PartialOrd for Value {
    /// Consistent with `==`: equal values yield `Equal`, others follow
    /// [`Value::total_cmp`].
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            Some(Ordering::Equal)
        } else {
            Some(self.total_cmp(other))
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(value_hash(self));
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::String(s) => fmt::Debug::fmt(&**s, f),
            Self::Array(a) => match a.try_borrow() {
                Ok(a) => fmt::Debug::fmt(&*a, f),
                Err(_) => f.write_str("[<borrowed>]"),
            },
            Self::Map(m) => match m.try_borrow() {
                Ok(m) => fmt::Debug::fmt(&*m, f),
                Err(_) => f.write_str("{<borrowed>}"),
            },
        }
    }
}

// ── Conversions ────────────────────────────────────────────────

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i.into())
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Int(i.into())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u64> for Value {
    /// Stored bit-cast; read back with [`Value::as_u64`].
    fn from(i: u64) -> Self {
        Self::Int(i as i64)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Self::Float(f.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<StrRef> for Value {
    fn from(s: StrRef) -> Self {
        Self::String(s)
    }
}

impl From<ArrayRef> for Value {
    fn from(a: ArrayRef) -> Self {
        Self::Array(a)
    }
}

impl From<MapRef> for Value {
    fn from(m: MapRef) -> Self {
        Self::Map(m)
    }
}

/// Wraps the array in a heap object from the array's own allocator.
impl From<Array> for Value {
    fn from(a: Array) -> Self {
        let allocator = a.allocator().clone();
        Self::Array(Heap::new_in(&allocator, RefCell::new(a)))
    }
}

/// Wraps the map in a heap object from the map's own allocator.
impl From<Map> for Value {
    fn from(m: Map) -> Self {
        let allocator = m.allocator().clone();
        Self::Map(Heap::new_in(&allocator, RefCell::new(m)))
    }
}

/// Copies the text into a string on the default allocator.
impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(default_allocator().create_string(s.as_bytes()))
    }
}

/// Adopts the buffer into a string on the default allocator.
impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(default_allocator().adopt_string(s.into_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates_follow_the_tag() {
        let v = Value::from(1.5);
        assert!(v.is_float() && v.is_number() && !v.is_int());
        assert_eq!(v.value_type(), ValueType::Float);
        assert!(Value::from("s").is_pointer());
        assert!(!Value::Null.is_pointer());
    }

    #[test]
    fn numeric_accessors_cross_convert() {
        assert_eq!(Value::from(2.9).as_int(), 2);
        assert_eq!(Value::from(3).as_float(), 3.0);
        assert_eq!(Value::from("x").as_int(), 0);
        assert_eq!(Value::from(u64::MAX).as_u64(), u64::MAX);
        assert!(!Value::from(1).as_bool());
    }

    #[test]
    #[should_panic(expected = "expected int value, found string")]
    fn raw_accessor_panics_on_mismatch() {
        Value::from("x").raw_int();
    }

    #[test]
    fn int_float_equality_uses_epsilon() {
        assert_eq!(Value::from(1), Value::from(1.0));
        assert_ne!(Value::from(1), Value::from(1.5));
        assert!(Value::from(0.1 + 0.2).eq_with(&Value::from(0.3), FloatCompare::Epsilon));
        assert!(!Value::from(0.1 + 0.2).eq_with(&Value::from(0.3), FloatCompare::Exact));
        assert_eq!(Value::from(f64::INFINITY), Value::from(f64::INFINITY));
    }

    #[test]
    fn different_types_are_unequal() {
        assert_ne!(Value::Null, Value::from(false));
        assert_ne!(Value::from(0), Value::from(false));
        assert_ne!(Value::from("1"), Value::from(1));
    }

    #[test]
    fn total_order_ranks_types() {
        let mut vs = vec![
            Value::from("b"),
            Value::from(2),
            Value::Null,
            Value::from(1.5),
            Value::from(true),
            Value::from("a"),
        ];
        vs.sort_by(Value::total_cmp);
        let names: Vec<_> = vs.iter().map(|v| format!("{v:?}")).collect();
        assert_eq!(names, ["null", "true", "1.5", "2", "\"a\"", "\"b\""]);
    }

    #[test]
    fn set_string_reuses_held_allocator() {
        let pool = crate::pool_allocator().unwrap();
        let mut v = Value::Null;
        v.set_map(Some(&pool));
        let s = v.set_string(b"hi", None);
        assert!(slate_alloc::same_allocator(Heap::allocator(&s), &pool));
        assert_eq!(v.as_str(), "hi");
    }

    #[test]
    fn assign_from_alias_keeps_object_alive() {
        let mut v = Value::from("payload");
        let alias = v.clone();
        drop(alias);
        let same = v.clone();
        v.assign(&same);
        drop(same);
        assert_eq!(v.as_str(), "payload");
        assert_eq!(Heap::ref_count(v.as_string().unwrap()), 1);
    }

    #[test]
    fn member_paths() {
        let mut root = Value::Null;
        root.set_map(None);
        root.set_member("a/b", Value::from(5)).unwrap();
        assert_eq!(root.get_member("a/b"), Value::from(5));
        assert!(root.get_member("a/x").is_null());
        assert!(root.has_member("a"));
        assert_eq!(root.remove_member("a/b"), Some(Value::from(5)));
        assert!(!root.has_member("a/b"));
    }

    #[test]
    fn set_member_on_scalar_fails() {
        assert_eq!(
            Value::from(1).set_member("a", Value::Null),
            Err(PathError::NotAMap { at: String::new() })
        );
    }

    #[test]
    fn self_containing_map_reports_borrow() {
        let mut root = Value::Null;
        let m = root.set_map(None);
        m.borrow_mut()
            .insert(Value::from("self"), Value::Map(m.clone()));
        assert_eq!(
            root.set_member("self/x", Value::Null),
            Err(PathError::Borrowed { at: "self".into() })
        );
        // Break the cycle so the map is freed.
        m.borrow_mut().clear();
    }

    #[test]
    fn deep_clone_is_independent() {
        let mut v = Value::Null;
        v.set_array(None);
        v.push(Value::from("x"));
        let copy = v.deep_clone();
        v.push(Value::Null);
        assert_eq!(copy.len(), 1);
        assert_ne!(v, copy);
        let s1 = v.at(0);
        let s2 = copy.at(0);
        assert!(!Heap::ptr_eq(s1.as_string().unwrap(), s2.as_string().unwrap()));
    }

    #[test]
    fn at_reads_arrays_and_integer_keyed_maps() {
        let mut m = Map::new();
        m.insert(Value::from(2), Value::from("two"));
        let v = Value::from(m);
        assert_eq!(v.at(2).as_str(), "two");
        assert!(v.at(3).is_null());
        assert!(Value::from(1).at(0).is_null());
    }
}
