//! Fixed-shape trees.

use slate_alloc::AllocatorRef;
use slate_value::{Array, Map, ObjectFactory, Value};

/// Text form of [`scenario_tree`].
pub const SCENARIO_JSON: &str = r#"{"a":1,"b":[true,null,"x"]}"#;

/// `{"a": 1, "b": [true, null, "x"]}` built on `allocator`.
pub fn scenario_tree(allocator: &AllocatorRef) -> Value {
    let mut list = Array::new_in(allocator.clone());
    list.push(Value::Bool(true));
    list.push(Value::Null);
    list.push(Value::String(allocator.create_string(b"x")));

    let mut root = Map::new_in(allocator.clone());
    root.insert(Value::String(allocator.create_string(b"a")), Value::Int(1));
    root.insert(Value::String(allocator.create_string(b"b")), Value::from(list));
    Value::from(root)
}

/// `[0, 1, .., n - 1]`.
pub fn int_array(allocator: &AllocatorRef, n: usize) -> Value {
    let mut array = Array::with_capacity_in(n, allocator.clone());
    for i in 0..n {
        array.push(Value::Int(i as i64));
    }
    Value::from(array)
}

/// A map of `n` members `"k<i>": <i as float>`.
pub fn wide_map(allocator: &AllocatorRef, n: usize) -> Value {
    let mut map = Map::new_in(allocator.clone());
    map.reserve(n);
    for i in 0..n {
        let key = allocator.adopt_string(format!("k{i}").into_bytes());
        map.append(Value::String(key), Value::Float(i as f64 + 0.25));
    }
    Value::from(map)
}

/// A map of `n` members whose values cycle through `distinct` strings.
///
/// Exercises string pool deduplication.
pub fn string_heavy_map(allocator: &AllocatorRef, n: usize, distinct: usize) -> Value {
    let distinct = distinct.max(1);
    let mut map = Map::new_in(allocator.clone());
    map.reserve(n);
    for i in 0..n {
        let key = allocator.adopt_string(format!("field_{i}").into_bytes());
        let value = allocator.adopt_string(format!("value_{}", i % distinct).into_bytes());
        map.append(Value::String(key), Value::String(value));
    }
    Value::from(map)
}

/// `depth` arrays nested inside each other around an empty array.
pub fn nested_arrays(allocator: &AllocatorRef, depth: usize) -> Value {
    let mut value = Value::from(Array::new_in(allocator.clone()));
    for _ in 0..depth {
        let mut outer = Array::with_capacity_in(1, allocator.clone());
        outer.push(value);
        value = Value::from(outer);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_alloc::default_allocator;

    #[test]
    fn scenario_shape() {
        let root = scenario_tree(&default_allocator());
        assert_eq!(root.len(), 2);
        assert_eq!(root.get_member("a").as_int(), 1);
        let b = root.get_member("b");
        assert_eq!(b.len(), 3);
        assert_eq!(b.at(2).as_str(), "x");
    }

    #[test]
    fn nested_depth() {
        let mut v = nested_arrays(&default_allocator(), 3);
        let mut depth = 0;
        while v.len() == 1 {
            v = v.at(0);
            depth += 1;
        }
        assert_eq!(depth, 3);
        assert!(v.is_array() && v.is_empty());
    }
}
