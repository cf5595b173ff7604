//! Runtime type identity.
//!
//! [`TypeKey<A>`] is a statically typed handle for the type `A`; [`ErasedKey`]
//! is the same handle with the type parameter forgotten, usable as a map key
//! and compared by identity. Keys also answer subtype queries through the
//! lineage each [`Keyed`] type declares.

use alloc::vec::Vec;
use core::any::{TypeId, type_name};
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

use smallvec::SmallVec;
use static_assertions::assert_impl_all;

use crate::keyed::Keyed;
use crate::kind::Kind;

/// The direct supertypes declared by a [`Keyed`] type.
#[derive(Clone, Debug, Default)]
pub struct Lineage(SmallVec<[ErasedKey; 2]>);

impl Lineage {
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// Declare `B` as a direct supertype.
    pub fn with<B: Keyed + ?Sized>(mut self) -> Self {
        self.0.push(ErasedKey::of::<B>());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &ErasedKey> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Type-erased identity of a keyed type.
///
/// Equality and hashing use the underlying [`TypeId`] only.
#[derive(Clone, Copy)]
pub struct ErasedKey {
    id: TypeId,
    name: &'static str,
    kind: fn() -> Kind,
    supertypes: fn() -> Lineage,
}

assert_impl_all!(ErasedKey: Copy, Send, Sync);

impl ErasedKey {
    pub fn of<A: Keyed + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<A>(),
            name: type_name::<A>(),
            kind: A::kind,
            supertypes: A::supertypes,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> Kind {
        (self.kind)()
    }

    /// Direct supertypes only. See [`ErasedKey::is_subtype_of`] for the
    /// transitive relation.
    pub fn supertypes(&self) -> Lineage {
        (self.supertypes)()
    }

    /// Reflexive, transitive subtype test over declared lineages.
    pub fn is_subtype_of(&self, other: &ErasedKey) -> bool {
        if self == other {
            return true;
        }
        // Lineages are user declared; track visited keys so a cycle can't spin.
        let mut seen: SmallVec<[ErasedKey; 8]> = SmallVec::new();
        let mut pending: Vec<ErasedKey> = self.supertypes().iter().copied().collect();
        while let Some(key) = pending.pop() {
            if key == *other {
                return true;
            }
            if seen.contains(&key) {
                continue;
            }
            seen.push(key);
            pending.extend(key.supertypes().iter().copied());
        }
        false
    }

    /// Recover the typed key, if this key identifies `A`.
    pub fn typed<A: ?Sized + 'static>(&self) -> Option<TypeKey<A>> {
        (self.id == TypeId::of::<A>()).then(|| TypeKey::from_erased(*self))
    }

    /// Bound this key above by `bound`, if it is a subtype of it.
    pub fn widen<B: ?Sized>(&self, bound: &TypeKey<B>) -> Option<UpperBounded<B>> {
        self.is_subtype_of(&bound.erase()).then(|| UpperBounded {
            key: *self,
            bound: *bound,
        })
    }

    /// Bound this key below by `bound`, if it is a supertype of it.
    pub fn narrow<B: ?Sized>(&self, bound: &TypeKey<B>) -> Option<LowerBounded<B>> {
        bound.erase().is_subtype_of(self).then(|| LowerBounded {
            key: *self,
            bound: *bound,
        })
    }
}

impl PartialEq for ErasedKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ErasedKey {}

impl Hash for ErasedKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ErasedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ErasedKey({})", self.name)
    }
}

impl fmt::Display for ErasedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Statically typed identity of `A`.
pub struct TypeKey<A: ?Sized> {
    erased: ErasedKey,
    _marker: PhantomData<fn(&A)>,
}

assert_impl_all!(TypeKey<str>: Copy, Send, Sync);

impl<A: Keyed + ?Sized> TypeKey<A> {
    pub fn of() -> Self {
        Self::from_erased(ErasedKey::of::<A>())
    }
}

impl<A: ?Sized> TypeKey<A> {
    fn from_erased(erased: ErasedKey) -> Self {
        Self {
            erased,
            _marker: PhantomData,
        }
    }

    pub fn erase(&self) -> ErasedKey {
        self.erased
    }

    pub fn name(&self) -> &'static str {
        self.erased.name
    }

    pub fn kind(&self) -> Kind {
        self.erased.kind()
    }

    pub fn is_subtype_of<B: ?Sized>(&self, other: &TypeKey<B>) -> bool {
        self.erased.is_subtype_of(&other.erased)
    }

    pub fn widen<B: ?Sized>(&self, bound: &TypeKey<B>) -> Option<UpperBounded<B>> {
        self.erased.widen(bound)
    }

    pub fn narrow<B: ?Sized>(&self, bound: &TypeKey<B>) -> Option<LowerBounded<B>> {
        self.erased.narrow(bound)
    }
}

impl<A: Keyed + ?Sized> Default for TypeKey<A> {
    fn default() -> Self {
        Self::of()
    }
}

impl<A: ?Sized> Clone for TypeKey<A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: ?Sized> Copy for TypeKey<A> {}

impl<A: ?Sized, B: ?Sized> PartialEq<TypeKey<B>> for TypeKey<A> {
    fn eq(&self, other: &TypeKey<B>) -> bool {
        self.erased == other.erased
    }
}

impl<A: ?Sized> Eq for TypeKey<A> {}

impl<A: ?Sized> Hash for TypeKey<A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.erased.hash(state);
    }
}

impl<A: ?Sized> fmt::Debug for TypeKey<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey<{}>", self.erased.name)
    }
}

impl<A: ?Sized> fmt::Display for TypeKey<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.erased.name)
    }
}

impl<A: ?Sized> From<TypeKey<A>> for ErasedKey {
    fn from(key: TypeKey<A>) -> Self {
        key.erased
    }
}

/// A key known to denote some subtype of `B`.
pub struct UpperBounded<B: ?Sized> {
    key: ErasedKey,
    bound: TypeKey<B>,
}

impl<B: ?Sized> UpperBounded<B> {
    pub fn key(&self) -> ErasedKey {
        self.key
    }

    pub fn bound(&self) -> TypeKey<B> {
        self.bound
    }
}

/// A key known to denote some supertype of `B`.
pub struct LowerBounded<B: ?Sized> {
    key: ErasedKey,
    bound: TypeKey<B>,
}

impl<B: ?Sized> LowerBounded<B> {
    pub fn key(&self) -> ErasedKey {
        self.key
    }

    pub fn bound(&self) -> TypeKey<B> {
        self.bound
    }
}

macro_rules! bounded_common_impls {
    ($($bounded:ident),*) => {
        $(
            impl<B: ?Sized> Clone for $bounded<B> {
                fn clone(&self) -> Self {
                    *self
                }
            }

            impl<B: ?Sized> Copy for $bounded<B> {}

            impl<B: ?Sized> fmt::Debug for $bounded<B> {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.debug_struct(stringify!($bounded))
                        .field("key", &self.key)
                        .field("bound", &self.bound)
                        .finish()
                }
            }
        )*
    };
}

bounded_common_impls!(UpperBounded, LowerBounded);
