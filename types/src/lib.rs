//! Runtime type identity for the emblem traversal engine.
//!
//! This crate provides typed and erased type keys, the structural [`Kind`]
//! of every keyed type, declared subtype lineage, and a heterogeneous
//! [`TypeKeyMap`] whose value type is chosen per key by a [`Family`].
//!
//! # Example
//!
//! ```
//! use emblem_types::{ListOf, TypeKey, TypeKeyMap};
//!
//! let mut map = TypeKeyMap::<ListOf>::new();
//! map.put(vec![1i32, 2, 3]);
//! map.put(vec![String::from("a")]);
//!
//! assert_eq!(map.get(&TypeKey::<i32>::of()), Some(&vec![1, 2, 3]));
//! assert_eq!(map.len(), 2);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
extern crate alloc;

mod macros;

mod family;
mod key;
mod keyed;
mod kind;
mod map;

pub use family::{Family, FamilyValue, Identity, ListOf};
pub use key::{ErasedKey, Lineage, LowerBounded, TypeKey, UpperBounded};
pub use keyed::Keyed;
pub use kind::{Kind, Mismatch, OptionOps, Primitive, SeqOps, unbox};
pub use map::TypeKeyMap;
