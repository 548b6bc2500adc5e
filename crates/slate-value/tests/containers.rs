//! Container invariants: capacity growth, ordering, and member paths.

use proptest::prelude::*;

use slate_value::{Array, Map, PathError, Value};

// ── Capacity ────────────────────────────────────────────────────

#[test]
fn five_pushes_from_empty() {
    let v = Value::from(Array::new());
    let mut seen = Vec::new();
    for i in 0..5 {
        v.push(Value::from(i));
        seen.push(v.capacity());
    }
    assert_eq!(seen, [4, 4, 4, 4, 8]);
}

#[derive(Clone, Debug)]
enum Op {
    Push(i64),
    Pop,
    Insert(usize, i64),
    Erase(usize),
    Resize(usize),
    Reserve(usize),
    Clear,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<i64>().prop_map(Op::Push),
        1 => Just(Op::Pop),
        2 => (0usize..40, any::<i64>()).prop_map(|(i, v)| Op::Insert(i, v)),
        2 => (0usize..40).prop_map(Op::Erase),
        1 => (0usize..40).prop_map(Op::Resize),
        1 => (0usize..64).prop_map(Op::Reserve),
        1 => Just(Op::Clear),
    ]
}

proptest! {
    #[test]
    fn array_matches_vec_model(ops in prop::collection::vec(arb_op(), 0..80)) {
        let mut array = Array::new();
        let mut model: Vec<Value> = Vec::new();
        for op in ops {
            match op {
                Op::Push(v) => {
                    array.push(Value::from(v));
                    model.push(Value::from(v));
                }
                Op::Pop => {
                    prop_assert_eq!(array.pop(), model.pop());
                }
                Op::Insert(i, v) => {
                    let i = i.min(model.len());
                    array.insert(i, Value::from(v));
                    model.insert(i, Value::from(v));
                }
                Op::Erase(i) => {
                    let expected = (i < model.len()).then(|| model.remove(i));
                    prop_assert_eq!(array.erase(i), expected);
                }
                Op::Resize(n) => {
                    array.resize(n);
                    model.resize(n, Value::Null);
                }
                Op::Reserve(n) => array.reserve(n),
                Op::Clear => {
                    array.clear();
                    model.clear();
                }
            }
            prop_assert!(array.capacity() >= array.len());
            prop_assert_eq!(array.as_slice(), model.as_slice());
        }
    }

    #[test]
    fn map_insert_keeps_last_value_per_key(
        entries in prop::collection::vec(("[a-e]{1,2}", any::<i32>()), 0..40)
    ) {
        let mut map = Map::new();
        let mut model: Vec<(String, i32)> = Vec::new();
        for (k, v) in &entries {
            map.insert(Value::from(k.as_str()), Value::from(*v));
            match model.iter_mut().find(|(mk, _)| mk == k) {
                Some(slot) => slot.1 = *v,
                None => model.push((k.clone(), *v)),
            }
        }
        prop_assert_eq!(map.len(), model.len());
        for (member, (k, v)) in map.iter().zip(&model) {
            prop_assert_eq!(member.key.as_str(), k.as_str());
            prop_assert_eq!(member.value.as_int(), i64::from(*v));
        }
    }
}

// ── Paths ───────────────────────────────────────────────────────

#[test]
fn set_then_get_member_path() {
    let root = Value::from(Map::new());
    let v = Value::from("leaf");
    root.set_member("a/b", v.clone()).unwrap();
    assert_eq!(root.get_member("a/b"), v);
    assert!(root.get_member("a/x").is_null());
    assert!(root.get_member("q/r/s").is_null());
}

#[test]
fn path_overwrites_existing_leaf() {
    let root = Value::from(Map::new());
    root.set_member("a/b", Value::from(1)).unwrap();
    root.set_member("a/b", Value::from(2)).unwrap();
    assert_eq!(root.get_member("a").len(), 1);
    assert_eq!(root.get_member("a/b").as_int(), 2);
}

#[test]
fn path_through_non_map_is_rejected() {
    let root = Value::from(Map::new());
    root.set_member("a/b", Value::from(1)).unwrap();
    assert_eq!(
        root.set_member("a/b/c", Value::Null),
        Err(PathError::NotAMap { at: "a/b".into() })
    );
    assert_eq!(root.set_member("", Value::Null), Err(PathError::EmptyPath));
}

#[test]
fn remove_member_path() {
    let root = Value::from(Map::new());
    root.set_member("a/b", Value::from(1)).unwrap();
    assert!(root.remove_member("a/b").is_some());
    assert!(root.has_member("a"));
    assert!(!root.has_member("a/b"));
    assert!(root.remove_member("a/b/c").is_none());
}
