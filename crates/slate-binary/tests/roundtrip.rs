//! Encode/decode agreement over fixtures and arbitrary trees.

use proptest::prelude::*;
use slate_alloc::{default_allocator, same_allocator, AllocatorRef, TrackingAllocator};
use slate_binary::{decode, decode_in, encode, encode_with, FloatWidth, WriterConfig};
use slate_test_utils::{arb_tree, scenario_tree, string_heavy_map, RandomTree, TreeShape};
use slate_value::{pool_allocator, FloatCompare, Heap, Value};
use std::rc::Rc;

#[test]
fn scenario_document() {
    let root = scenario_tree(&default_allocator());
    let bytes = encode(&root).unwrap();

    // Pool holds "a", "b", "x" in sorted order.
    let pool = &bytes[18..18 + 9];
    assert_eq!(pool, &[1, 0, b'a', 1, 0, b'b', 1, 0, b'x']);
    // DICT8 2, "a" ONE, "b" LIST8 3 TRUE NONE "x"
    assert_eq!(&bytes[27..], &[21, 2, 12, 5, 13, 1, 17, 3, 2, 1, 13, 2]);

    let back = decode(&bytes).unwrap();
    assert_eq!(back, root);
    assert_eq!(back.get_member("b").at(2).as_str(), "x");
}

#[test]
fn decoded_tree_lives_in_requested_allocator() {
    let tracking = Rc::new(TrackingAllocator::new(default_allocator()));
    let alloc: AllocatorRef = tracking.clone();
    let bytes = encode(&scenario_tree(&default_allocator())).unwrap();

    let root = decode_in(&alloc, &bytes).unwrap();
    assert!(tracking.live_allocations() > 0);
    let list = root.get_member("b");
    assert!(same_allocator(list.allocator().unwrap(), &alloc));

    drop(list);
    drop(root);
    assert_eq!(tracking.live_allocations(), 0);
    assert_eq!(tracking.invalid_frees(), 0);
}

#[test]
fn failed_decode_releases_partial_tree() {
    let tracking = Rc::new(TrackingAllocator::new(default_allocator()));
    let alloc: AllocatorRef = tracking.clone();
    let bytes = encode(&scenario_tree(&default_allocator())).unwrap();

    assert!(decode_in(&alloc, &bytes[..bytes.len() - 1]).is_err());
    assert_eq!(tracking.live_allocations(), 0);
}

#[test]
fn pooled_strings_are_shared_after_decode() {
    let root = string_heavy_map(&default_allocator(), 40, 3);
    let back = decode(&encode(&root).unwrap()).unwrap();
    let map = back.map();
    let first = map.get_str("field_0").unwrap().as_string().unwrap().clone();
    let fourth = map.get_str("field_3").unwrap().as_string().unwrap().clone();
    assert!(Heap::ptr_eq(&first, &fourth));
    // Fourteen members hold "value_0", plus the two handles above.
    assert_eq!(Heap::ref_count(&first), 16);
}

#[test]
fn random_documents_on_pool_allocator() {
    let pool = pool_allocator().unwrap();
    let mut generator = RandomTree::new(42, TreeShape::default());
    for _ in 0..20 {
        let root = generator.generate(&default_allocator());
        let back = decode_in(&pool, &encode(&root).unwrap()).unwrap();
        assert!(back.eq_with(&root, FloatCompare::Exact));
    }
}

#[test]
fn single_width_floats_lose_precision() {
    let config = WriterConfig {
        float_width: FloatWidth::Single,
        ..WriterConfig::default()
    };
    let bytes = encode_with(&Value::from(0.1), &config).unwrap();
    let back = decode(&bytes).unwrap();
    assert_eq!(back.as_float(), f64::from(0.1f32));
}

#[test]
fn trailing_bytes_are_ignored() {
    let mut bytes = encode(&Value::from(7)).unwrap();
    bytes.extend_from_slice(b"junk");
    assert_eq!(decode(&bytes).unwrap().as_int(), 7);
}

proptest! {
    #[test]
    fn arbitrary_trees_roundtrip(plan in arb_tree()) {
        let root = plan.build(&default_allocator());
        let back = decode(&encode(&root).unwrap()).unwrap();
        prop_assert!(back.eq_with(&root, FloatCompare::Exact));
    }

    #[test]
    fn unsorted_keys_roundtrip(plan in arb_tree()) {
        let config = WriterConfig { sort_keys: false, ..WriterConfig::default() };
        let root = plan.build(&default_allocator());
        let back = decode(&encode_with(&root, &config).unwrap()).unwrap();
        prop_assert!(back.eq_with(&root, FloatCompare::Exact));
    }

    #[test]
    fn encoding_is_deterministic(plan in arb_tree()) {
        let root = plan.build(&default_allocator());
        prop_assert_eq!(encode(&root).unwrap(), encode(&root.deep_clone()).unwrap());
    }
}
