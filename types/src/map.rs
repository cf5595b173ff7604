//! Heterogeneous map keyed by runtime type identity.

use alloc::boxed::Box;
use core::any::Any;
use core::fmt::{self, Debug};
use core::marker::PhantomData;

use hashbrown::HashMap;

use crate::family::{Family, FamilyValue};
use crate::key::{ErasedKey, TypeKey};

/// Object-safe view of a stored value.
trait Slot: Send + Sync {
    fn value(&self) -> &(dyn Any + Send + Sync);
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn clone_slot(&self) -> Box<dyn Slot>;
    fn eq_slot(&self, other: &dyn Slot) -> bool;
    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

struct Held<V>(V);

impl<V> Slot for Held<V>
where
    V: Clone + PartialEq + Debug + Send + Sync + 'static,
{
    fn value(&self) -> &(dyn Any + Send + Sync) {
        &self.0
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        Box::new(self.0)
    }

    fn clone_slot(&self) -> Box<dyn Slot> {
        Box::new(Held(self.0.clone()))
    }

    fn eq_slot(&self, other: &dyn Slot) -> bool {
        other
            .value()
            .downcast_ref::<V>()
            .is_some_and(|value| *value == self.0)
    }

    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Debug for dyn Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_value(f)
    }
}

/// A map holding, for each key type `A`, at most one `F::Value`.
///
/// Lookups are by exact type: there is no fallback to supertypes.
pub struct TypeKeyMap<F> {
    slots: HashMap<ErasedKey, Box<dyn Slot>>,
    _family: PhantomData<fn() -> F>,
}

impl<F> TypeKeyMap<F> {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
            _family: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The keys present, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = ErasedKey> + '_ {
        self.slots.keys().copied()
    }

    pub fn contains<A: ?Sized>(&self, key: &TypeKey<A>) -> bool {
        self.slots.contains_key(&key.erase())
    }

    pub fn contains_dyn(&self, key: &ErasedKey) -> bool {
        self.slots.contains_key(key)
    }

    /// Erased lookup for callers that only have an [`ErasedKey`].
    pub fn get_dyn(&self, key: &ErasedKey) -> Option<&(dyn Any + Send + Sync)> {
        self.slots.get(key).map(|slot| slot.value())
    }

    pub fn get<A>(&self, key: &TypeKey<A>) -> Option<&F::Value>
    where
        A: ?Sized + 'static,
        F: Family<A>,
    {
        self.get_dyn(&key.erase())?.downcast_ref::<F::Value>()
    }

    /// Store `value` under an explicit key. Replaces and returns any prior value.
    pub fn insert<A>(&mut self, key: TypeKey<A>, value: F::Value) -> Option<F::Value>
    where
        A: ?Sized + 'static,
        F: Family<A>,
    {
        let previous = self.slots.insert(key.erase(), Box::new(Held(value)))?;
        previous.into_any().downcast::<F::Value>().ok().map(|v| *v)
    }

    /// Store `value` under the key implied by its declared type.
    ///
    /// The key comes from the *static* type of `value`. For families whose
    /// values can be declared at a wider type than their contents (a list
    /// typed as `Vec<Shape>` holding only circles), the entry lands under
    /// the wider key. Use [`TypeKeyMap::insert`] when the intended key
    /// differs from the declared one.
    pub fn put<V>(&mut self, value: V) -> Option<V>
    where
        V: FamilyValue<F>,
        F: Family<V::Key, Value = V>,
    {
        self.insert(TypeKey::<V::Key>::of(), value)
    }

    pub fn remove<A>(&mut self, key: &TypeKey<A>) -> Option<F::Value>
    where
        A: ?Sized + 'static,
        F: Family<A>,
    {
        let removed = self.slots.remove(&key.erase())?;
        removed.into_any().downcast::<F::Value>().ok().map(|v| *v)
    }

    /// Right-biased merge: where both maps hold a key, `other` wins.
    pub fn union(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        for (key, slot) in &other.slots {
            merged.slots.insert(*key, slot.clone_slot());
        }
        merged
    }
}

impl<F> Default for TypeKeyMap<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> Clone for TypeKeyMap<F> {
    fn clone(&self) -> Self {
        Self {
            slots: self
                .slots
                .iter()
                .map(|(key, slot)| (*key, slot.clone_slot()))
                .collect(),
            _family: PhantomData,
        }
    }
}

impl<F> PartialEq for TypeKeyMap<F> {
    fn eq(&self, other: &Self) -> bool {
        self.slots.len() == other.slots.len()
            && self.slots.iter().all(|(key, slot)| {
                other
                    .slots
                    .get(key)
                    .is_some_and(|theirs| slot.eq_slot(theirs.as_ref()))
            })
    }
}

impl<F> Debug for TypeKeyMap<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.slots.iter()).finish()
    }
}
