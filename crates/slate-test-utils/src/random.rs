//! Random trees: a seeded generator for benchmarks and a proptest
//! strategy for property tests.

use proptest::prelude::{any, prop, Just, Strategy};
use proptest::prop_oneof;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use slate_alloc::AllocatorRef;
use slate_value::{Array, Map, ObjectFactory, Value};

// ── Plain-data trees ────────────────────────────────────────────

/// A value tree as plain owned data.
///
/// Strategies produce these rather than [`Value`]s so shrinking never
/// touches allocator state. [`build`](TreePlan::build) turns one into a
/// real tree.
#[derive(Clone, Debug, PartialEq)]
pub enum TreePlan {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Vec<u8>),
    List(Vec<TreePlan>),
    Dict(Vec<(String, TreePlan)>),
}

impl TreePlan {
    /// Build the tree on `allocator`. Later duplicate keys replace
    /// earlier ones.
    pub fn build(&self, allocator: &AllocatorRef) -> Value {
        match self {
            TreePlan::Null => Value::Null,
            TreePlan::Bool(b) => Value::Bool(*b),
            TreePlan::Int(i) => Value::Int(*i),
            TreePlan::Float(f) => Value::Float(*f),
            TreePlan::Str(bytes) => Value::String(allocator.create_string(bytes)),
            TreePlan::List(items) => {
                let mut array = Array::with_capacity_in(items.len(), allocator.clone());
                for item in items {
                    array.push(item.build(allocator));
                }
                Value::from(array)
            }
            TreePlan::Dict(members) => {
                let mut map = Map::new_in(allocator.clone());
                for (key, value) in members {
                    map.insert(
                        Value::String(allocator.create_string(key.as_bytes())),
                        value.build(allocator),
                    );
                }
                Value::from(map)
            }
        }
    }

    /// Whether the root is an array or map.
    pub fn is_container(&self) -> bool {
        matches!(self, TreePlan::List(_) | TreePlan::Dict(_))
    }
}

/// Arbitrary trees up to four levels deep with finite floats and
/// arbitrary string bytes.
pub fn arb_tree() -> impl Strategy<Value = TreePlan> {
    let leaf = prop_oneof![
        Just(TreePlan::Null),
        any::<bool>().prop_map(TreePlan::Bool),
        any::<i64>().prop_map(TreePlan::Int),
        (-1.0e12f64..1.0e12).prop_map(TreePlan::Float),
        prop::collection::vec(any::<u8>(), 0..12).prop_map(TreePlan::Str),
    ];
    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(TreePlan::List),
            prop::collection::vec(("[a-z_]{0,6}", inner), 0..8).prop_map(TreePlan::Dict),
        ]
    })
}

// ── Seeded generator ────────────────────────────────────────────

/// Size limits for [`RandomTree`].
#[derive(Clone, Debug)]
pub struct TreeShape {
    /// Maximum container nesting below the root.
    pub max_depth: usize,
    /// Maximum members per container.
    pub max_width: usize,
    /// Number of distinct strings keys and values are drawn from.
    pub vocabulary: usize,
    /// Maximum length of a vocabulary string.
    pub max_string_len: usize,
}

impl Default for TreeShape {
    fn default() -> Self {
        Self {
            max_depth: 4,
            max_width: 16,
            vocabulary: 64,
            max_string_len: 24,
        }
    }
}

/// Deterministic random trees from a seed.
///
/// Strings come from a fixed vocabulary, so generated documents repeat
/// strings the way real ones do.
pub struct RandomTree {
    rng: ChaCha8Rng,
    shape: TreeShape,
    vocabulary: Vec<String>,
}

impl RandomTree {
    pub fn new(seed: u64, shape: TreeShape) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let vocabulary = (0..shape.vocabulary.max(1))
            .map(|_| {
                let len = rng.gen_range(1..=shape.max_string_len.max(1));
                (0..len)
                    .map(|_| rng.gen_range(b'a'..=b'z') as char)
                    .collect()
            })
            .collect();
        Self {
            rng,
            shape,
            vocabulary,
        }
    }

    pub fn shape(&self) -> &TreeShape {
        &self.shape
    }

    /// A fresh tree whose root is a map.
    pub fn generate(&mut self, allocator: &AllocatorRef) -> Value {
        self.map(allocator, 0)
    }

    fn word(&mut self, allocator: &AllocatorRef) -> Value {
        let i = self.rng.gen_range(0..self.vocabulary.len());
        Value::String(allocator.create_string(self.vocabulary[i].as_bytes()))
    }

    fn width(&mut self) -> usize {
        self.rng.gen_range(0..=self.shape.max_width)
    }

    fn value(&mut self, allocator: &AllocatorRef, depth: usize) -> Value {
        let nest = depth < self.shape.max_depth;
        match self.rng.gen_range(0..if nest { 9 } else { 7 }) {
            0 => Value::Null,
            1 => Value::Bool(self.rng.gen()),
            2 => Value::Int(self.rng.gen_range(-300..300)),
            3 => Value::Int(self.rng.gen()),
            4 => Value::Float(self.rng.gen::<f64>() * 1000.0),
            5 | 6 => self.word(allocator),
            7 => self.array(allocator, depth + 1),
            _ => self.map(allocator, depth + 1),
        }
    }

    fn array(&mut self, allocator: &AllocatorRef, depth: usize) -> Value {
        let n = self.width();
        let mut array = Array::with_capacity_in(n, allocator.clone());
        for _ in 0..n {
            array.push(self.value(allocator, depth));
        }
        Value::from(array)
    }

    fn map(&mut self, allocator: &AllocatorRef, depth: usize) -> Value {
        let n = self.width();
        let mut map = Map::new_in(allocator.clone());
        for _ in 0..n {
            let key = self.word(allocator);
            let value = self.value(allocator, depth);
            map.insert(key, value);
        }
        Value::from(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::{prop_assert_eq, proptest};
    use slate_alloc::default_allocator;

    #[test]
    fn same_seed_same_tree() {
        let alloc = default_allocator();
        let a = RandomTree::new(7, TreeShape::default()).generate(&alloc);
        let b = RandomTree::new(7, TreeShape::default()).generate(&alloc);
        assert_eq!(a, b);
    }

    #[test]
    fn flat_shape_has_no_nested_containers() {
        let shape = TreeShape {
            max_depth: 0,
            ..TreeShape::default()
        };
        let root = RandomTree::new(1, shape).generate(&default_allocator());
        for member in root.map().iter() {
            assert!(!member.value.is_array() && !member.value.is_map());
        }
    }

    proptest! {
        #[test]
        fn built_trees_compare_equal(plan in arb_tree()) {
            let alloc = default_allocator();
            prop_assert_eq!(plan.build(&alloc), plan.build(&alloc));
        }
    }
}
