//! Tests for TypeKeyMap semantics: identity, union, and put-key inference.

use std::collections::BTreeSet;

use emblem_types::{ErasedKey, Identity, ListOf, TypeKey, TypeKeyMap, keyed};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

// ============================================================================
// Fixtures
// ============================================================================

trait Shape {}

#[derive(Clone, Debug, PartialEq)]
struct Circle {
    radius: i32,
}

#[derive(Clone, Debug, PartialEq)]
struct Square {
    side: i32,
}

/// A closed shape type that can hold either variant.
#[derive(Clone, Debug, PartialEq)]
enum AnyShape {
    Circle(Circle),
    Square(Square),
}

keyed! {
    dyn Shape;
    Circle: dyn Shape;
    Square: dyn Shape;
    AnyShape: dyn Shape;
}

fn circle(radius: i32) -> Circle {
    Circle { radius }
}

// ============================================================================
// Shape lists
// ============================================================================

#[test]
fn test_lookup_returns_entries_in_insertion_order() {
    let mut map = TypeKeyMap::<ListOf>::new();
    map.put(vec![circle(1), circle(2)]);
    map.put(vec![Square { side: 3 }]);

    assert_eq!(
        map.get(&TypeKey::<Circle>::of()),
        Some(&vec![circle(1), circle(2)])
    );
    assert_eq!(
        map.get(&TypeKey::<Square>::of()),
        Some(&vec![Square { side: 3 }])
    );
    assert_eq!(map.get(&TypeKey::<AnyShape>::of()), None);
}

#[test]
fn test_no_supertype_fallback() {
    let mut map = TypeKeyMap::<ListOf>::new();
    map.put(vec![circle(1)]);

    assert!(TypeKey::<Circle>::of().is_subtype_of(&TypeKey::<dyn Shape>::of()));
    assert!(map.get_dyn(&ErasedKey::of::<dyn Shape>()).is_none());
}

#[test]
fn test_union_of_disjoint_maps_equals_combined_map() {
    let mut circles = TypeKeyMap::<ListOf>::new();
    circles.put(vec![circle(1), circle(2)]);
    let mut squares = TypeKeyMap::<ListOf>::new();
    squares.put(vec![Square { side: 4 }]);

    let mut combined = TypeKeyMap::<ListOf>::new();
    combined.put(vec![Square { side: 4 }]);
    combined.put(vec![circle(1), circle(2)]);

    assert_eq!(circles.union(&squares), combined);
    assert_eq!(squares.union(&circles), combined);
}

#[test]
fn test_put_keys_by_declared_type_not_contents() {
    // Every element is a circle, but the declared element type is the wider
    // AnyShape, so the entry lands under AnyShape.
    let declared: Vec<AnyShape> = vec![
        AnyShape::Circle(circle(1)),
        AnyShape::Circle(circle(2)),
    ];
    let mut map = TypeKeyMap::<ListOf>::new();
    map.put(declared.clone());

    assert_eq!(map.get(&TypeKey::<Circle>::of()), None);
    assert_eq!(map.get(&TypeKey::<AnyShape>::of()), Some(&declared));
    assert_eq!(map.keys().collect::<Vec<_>>(), [ErasedKey::of::<AnyShape>()]);

    // An explicit key is the way to file it elsewhere.
    let unwrapped: Vec<Circle> = declared
        .into_iter()
        .filter_map(|shape| match shape {
            AnyShape::Circle(c) => Some(c),
            AnyShape::Square(_) => None,
        })
        .collect();
    map.insert(TypeKey::<Circle>::of(), unwrapped);
    assert_eq!(
        map.get(&TypeKey::<Circle>::of()),
        Some(&vec![circle(1), circle(2)])
    );
}

#[test]
fn test_equality_ignores_insertion_order() {
    let mut a = TypeKeyMap::<Identity>::new();
    a.put(1i32);
    a.put(String::from("one"));
    let mut b = TypeKeyMap::<Identity>::new();
    b.put(String::from("one"));
    b.put(1i32);
    assert_eq!(a, b);

    b.put(2i32);
    assert_ne!(a, b);
}

#[test]
fn test_debug_lists_entries() {
    let mut map = TypeKeyMap::<Identity>::new();
    map.put(7i64);
    assert_eq!(format!("{map:?}"), "{ErasedKey(i64): 7}");
}

// ============================================================================
// Properties
// ============================================================================

/// One write into an identity map, tagged by which of five types it uses.
#[derive(Clone, Debug)]
enum Write {
    Int(i32),
    Long(i64),
    Bool(bool),
    Str(String),
    Chars(BTreeSet<char>),
}

impl Write {
    fn key(&self) -> ErasedKey {
        match self {
            Write::Int(_) => ErasedKey::of::<i32>(),
            Write::Long(_) => ErasedKey::of::<i64>(),
            Write::Bool(_) => ErasedKey::of::<bool>(),
            Write::Str(_) => ErasedKey::of::<String>(),
            Write::Chars(_) => ErasedKey::of::<BTreeSet<char>>(),
        }
    }

    fn apply(self, map: &mut TypeKeyMap<Identity>) {
        match self {
            Write::Int(v) => {
                map.put(v);
            }
            Write::Long(v) => {
                map.put(v);
            }
            Write::Bool(v) => {
                map.put(v);
            }
            Write::Str(v) => {
                map.put(v);
            }
            Write::Chars(v) => {
                map.put(v);
            }
        }
    }

    fn is_stored_in(&self, map: &TypeKeyMap<Identity>) -> bool {
        match self {
            Write::Int(v) => map.get(&TypeKey::<i32>::of()) == Some(v),
            Write::Long(v) => map.get(&TypeKey::<i64>::of()) == Some(v),
            Write::Bool(v) => map.get(&TypeKey::<bool>::of()) == Some(v),
            Write::Str(v) => map.get(&TypeKey::<String>::of()) == Some(v),
            Write::Chars(v) => map.get(&TypeKey::<BTreeSet<char>>::of()) == Some(v),
        }
    }
}

fn write_strategy() -> impl Strategy<Value = Write> {
    prop_oneof![
        any::<i32>().prop_map(Write::Int),
        any::<i64>().prop_map(Write::Long),
        any::<bool>().prop_map(Write::Bool),
        "[a-z]{0,6}".prop_map(Write::Str),
        proptest::collection::btree_set(any::<char>(), 0..4).prop_map(Write::Chars),
    ]
}

fn build(writes: &[Write]) -> TypeKeyMap<Identity> {
    let mut map = TypeKeyMap::new();
    for write in writes {
        write.clone().apply(&mut map);
    }
    map
}

proptest! {
    #[test]
    fn prop_len_counts_distinct_types(writes in proptest::collection::vec(write_strategy(), 0..20)) {
        let map = build(&writes);
        let distinct: std::collections::HashSet<ErasedKey> = writes.iter().map(Write::key).collect();
        prop_assert_eq!(map.len(), distinct.len());
    }

    #[test]
    fn prop_last_write_wins(writes in proptest::collection::vec(write_strategy(), 1..20)) {
        let map = build(&writes);
        let last = writes.last().unwrap();
        prop_assert!(last.is_stored_in(&map));
    }

    #[test]
    fn prop_union_laws(
        left in proptest::collection::vec(write_strategy(), 0..10),
        right in proptest::collection::vec(write_strategy(), 0..10),
    ) {
        let l = build(&left);
        let r = build(&right);
        let empty = TypeKeyMap::<Identity>::new();

        prop_assert_eq!(l.union(&l), l.clone());
        prop_assert_eq!(l.union(&empty), l.clone());
        prop_assert_eq!(empty.union(&l), l.clone());

        // Right-biased: the merged map is what writing `left` then `right` produces.
        let sequential: Vec<Write> = left.iter().chain(right.iter()).cloned().collect();
        prop_assert_eq!(l.union(&r), build(&sequential));
    }
}
