//! Value families for [`TypeKeyMap`](crate::TypeKeyMap).
//!
//! A family maps each key type `A` to the type of value stored under
//! `TypeKey<A>`. The map is generic over the family, so one map type can hold
//! `A` under `A`, `Vec<A>` under `A`, a registry handle under `A`, and so on.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::keyed::Keyed;

/// Maps key type `A` to the stored value type.
pub trait Family<A: ?Sized + 'static>: 'static {
    type Value: Clone + PartialEq + Debug + Send + Sync + 'static;
}

/// Reverse direction of [`Family`]: which key a stored value belongs under.
///
/// Lets [`TypeKeyMap::put`](crate::TypeKeyMap::put) infer the key from the
/// value's static type.
pub trait FamilyValue<F>: Sized {
    type Key: Keyed + ?Sized;
}

/// Store `A` under `TypeKey<A>`.
#[derive(Debug)]
pub enum Identity {}

impl<A> Family<A> for Identity
where
    A: Keyed + Clone + PartialEq + Debug + Send + Sync,
{
    type Value = A;
}

impl<A> FamilyValue<Identity> for A
where
    A: Keyed + Clone + PartialEq + Debug + Send + Sync,
{
    type Key = A;
}

/// Store `Vec<A>` under `TypeKey<A>`.
#[derive(Debug)]
pub enum ListOf {}

impl<A> Family<A> for ListOf
where
    A: Keyed + Clone + PartialEq + Debug + Send + Sync,
{
    type Value = Vec<A>;
}

impl<A> FamilyValue<ListOf> for Vec<A>
where
    A: Keyed + Clone + PartialEq + Debug + Send + Sync,
{
    type Key = A;
}
