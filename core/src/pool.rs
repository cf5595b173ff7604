//! Immutable, one-entry-per-type registries handed to every traversal.
//!
//! Pools are assembled through builders. Registration is fluent; duplicate
//! claims on the same type are collected and reported together by `build()`,
//! after which the pool can no longer change.

use core::fmt;
use core::marker::PhantomData;
use std::sync::Arc;

use emblem_types::{ErasedKey, Family, Keyed, TypeKey, TypeKeyMap};
use static_assertions::assert_impl_all;

use crate::emblem::{AnyEmblem, Emblem};
use crate::error::DuplicateRegistration;
use crate::extractor::{AnyExtractor, Extractor, Shorthand};

/// Family storing the same handle type `V` under every key.
pub(crate) struct Entry<V>(PhantomData<fn() -> V>);

impl<A, V> Family<A> for Entry<V>
where
    A: ?Sized + 'static,
    V: Clone + PartialEq + fmt::Debug + Send + Sync + 'static,
{
    type Value = V;
}

/// Shared registration state: entries plus every key claimed twice.
struct Registrar<V> {
    pool: &'static str,
    entries: TypeKeyMap<Entry<V>>,
    duplicates: Vec<ErasedKey>,
}

impl<V> Registrar<V>
where
    V: Clone + PartialEq + fmt::Debug + Send + Sync + 'static,
{
    fn new(pool: &'static str) -> Self {
        Self {
            pool,
            entries: TypeKeyMap::new(),
            duplicates: Vec::new(),
        }
    }

    fn register<A: ?Sized + 'static>(&mut self, key: TypeKey<A>, value: V) -> bool {
        if self.entries.contains(&key) {
            if !self.duplicates.contains(&key.erase()) {
                self.duplicates.push(key.erase());
            }
            return false;
        }
        self.entries.insert(key, value);
        true
    }

    fn finish(mut self) -> Result<TypeKeyMap<Entry<V>>, DuplicateRegistration> {
        if !self.duplicates.is_empty() {
            return Err(DuplicateRegistration {
                pool: self.pool,
                keys: core::mem::take(&mut self.duplicates),
            });
        }
        tracing::debug!(pool = self.pool, entries = self.entries.len(), "pool built");
        Ok(self.entries)
    }
}

fn lookup<'a, V: 'static>(entries: &'a TypeKeyMap<Entry<V>>, key: &ErasedKey) -> Option<&'a V> {
    entries.get_dyn(key)?.downcast_ref::<V>()
}

// ============================================================================
// Emblems
// ============================================================================

/// Record schemas, at most one per record type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EmblemPool {
    emblems: TypeKeyMap<Entry<Arc<dyn AnyEmblem>>>,
}

impl EmblemPool {
    pub fn builder() -> EmblemPoolBuilder {
        EmblemPoolBuilder {
            registrar: Registrar::new("emblem"),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ErasedKey) -> Option<&Arc<dyn AnyEmblem>> {
        lookup(&self.emblems, key)
    }

    /// The schema for `R` with its static type restored.
    pub fn emblem<R: Keyed>(&self) -> Option<&Emblem<R>> {
        self.get(&ErasedKey::of::<R>())?
            .as_any()
            .downcast_ref::<Emblem<R>>()
    }

    pub fn contains(&self, key: &ErasedKey) -> bool {
        self.emblems.contains_dyn(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = ErasedKey> + '_ {
        self.emblems.keys()
    }

    pub fn len(&self) -> usize {
        self.emblems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emblems.is_empty()
    }
}

pub struct EmblemPoolBuilder {
    registrar: Registrar<Arc<dyn AnyEmblem>>,
}

impl EmblemPoolBuilder {
    pub fn register<R: Keyed>(mut self, emblem: Emblem<R>) -> Self {
        self.registrar.register(emblem.key(), Arc::new(emblem));
        self
    }

    pub fn build(self) -> Result<EmblemPool, DuplicateRegistration> {
        Ok(EmblemPool {
            emblems: self.registrar.finish()?,
        })
    }
}

// ============================================================================
// Extractors
// ============================================================================

/// Conversions keyed by their domain type, at most one per domain.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtractorPool {
    extractors: TypeKeyMap<Entry<Arc<dyn AnyExtractor>>>,
}

/// A pool of canonical shorthands is an extractor pool.
pub type ShorthandPool = ExtractorPool;

// Traversals on different threads share one set of pools.
assert_impl_all!(EmblemPool: Send, Sync);
assert_impl_all!(ExtractorPool: Send, Sync);

impl ExtractorPool {
    pub fn builder() -> ExtractorPoolBuilder {
        ExtractorPoolBuilder {
            registrar: Registrar::new("extractor"),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, domain: &ErasedKey) -> Option<&Arc<dyn AnyExtractor>> {
        lookup(&self.extractors, domain)
    }

    pub fn extractor<D: Keyed, R: Keyed + fmt::Debug>(&self) -> Option<&Extractor<D, R>> {
        self.get(&ErasedKey::of::<D>())?
            .as_any()
            .downcast_ref::<Extractor<D, R>>()
    }

    pub fn contains(&self, domain: &ErasedKey) -> bool {
        self.extractors.contains_dyn(domain)
    }

    pub fn keys(&self) -> impl Iterator<Item = ErasedKey> + '_ {
        self.extractors.keys()
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

pub struct ExtractorPoolBuilder {
    registrar: Registrar<Arc<dyn AnyExtractor>>,
}

impl ExtractorPoolBuilder {
    pub fn register<D: Keyed, R: Keyed + fmt::Debug>(mut self, extractor: Extractor<D, R>) -> Self {
        self.registrar.register(extractor.domain(), Arc::new(extractor));
        self
    }

    /// Register the canonical shorthand of `S`.
    pub fn shorthand<S: Shorthand>(self) -> Self {
        self.register(S::shorthand())
    }

    pub fn build(self) -> Result<ExtractorPool, DuplicateRegistration> {
        Ok(ExtractorPool {
            extractors: self.registrar.finish()?,
        })
    }
}

// ============================================================================
// Custom traversors
// ============================================================================

/// Shared handle to a custom handler. Handles are equal only to themselves.
pub struct CustomHandle<C: ?Sized>(Arc<C>);

impl<C: ?Sized> Clone for CustomHandle<C> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<C: ?Sized> PartialEq for CustomHandle<C> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<C: ?Sized> fmt::Debug for CustomHandle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CustomHandle({:p})", Arc::as_ptr(&self.0))
    }
}

/// Handlers that take over traversal of a type and all its subtypes.
///
/// `C` is the handler trait object, e.g. `dyn CustomVisitor<H>`. Handlers
/// are searched in registration order; the first one registered for a
/// supertype of the traversed type wins.
pub struct CustomTraversorPool<C: ?Sized> {
    handlers: TypeKeyMap<Entry<CustomHandle<C>>>,
    order: Vec<ErasedKey>,
}

assert_impl_all!(crate::visit::CustomVisitorPool<()>: Send, Sync);
assert_impl_all!(crate::transform::CustomTransformerPool<()>: Send, Sync);

impl<C: ?Sized + Send + Sync + 'static> CustomTraversorPool<C> {
    pub fn builder() -> CustomTraversorPoolBuilder<C> {
        CustomTraversorPoolBuilder {
            registrar: Registrar::new("custom traversor"),
            order: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self {
            handlers: TypeKeyMap::new(),
            order: Vec::new(),
        }
    }

    /// The handler registered for exactly `key`.
    pub fn get(&self, key: &ErasedKey) -> Option<&Arc<C>> {
        lookup(&self.handlers, key).map(|handle| &handle.0)
    }

    /// Registered keys, in registration order.
    pub fn keys(&self) -> &[ErasedKey] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<C: ?Sized> Clone for CustomTraversorPool<C> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
            order: self.order.clone(),
        }
    }
}

impl<C: ?Sized> fmt::Debug for CustomTraversorPool<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomTraversorPool")
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

pub struct CustomTraversorPoolBuilder<C: ?Sized> {
    registrar: Registrar<CustomHandle<C>>,
    order: Vec<ErasedKey>,
}

impl<C: ?Sized + Send + Sync + 'static> CustomTraversorPoolBuilder<C> {
    /// Handle `A` and every subtype of `A` with `handler`.
    pub fn register<A: Keyed + ?Sized>(mut self, handler: Arc<C>) -> Self {
        let key = TypeKey::<A>::of();
        if self.registrar.register(key, CustomHandle(handler)) {
            self.order.push(key.erase());
        }
        self
    }

    pub fn build(self) -> Result<CustomTraversorPool<C>, DuplicateRegistration> {
        Ok(CustomTraversorPool {
            handlers: self.registrar.finish()?,
            order: self.order,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emblem::Property;
    use emblem_types::keyed;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    struct Meters(f64);

    #[derive(Debug, Clone, PartialEq)]
    struct Span {
        length: Meters,
    }

    keyed! { Meters; Span }

    fn span_emblem() -> Emblem<Span> {
        Emblem::new(
            vec![Property::<Span, Meters>::new("length", |s| &s.length).into()],
            |args| Ok(Span { length: args.next()? }),
        )
        .unwrap()
    }

    fn meters() -> Extractor<Meters, f64> {
        Extractor::bijection(|m: &Meters| m.0, |raw: &f64| Meters(*raw))
    }

    trait Handler: Send + Sync {
        fn label(&self) -> &'static str;
    }

    struct Named(&'static str);

    impl Handler for Named {
        fn label(&self) -> &'static str {
            self.0
        }
    }

    #[test]
    fn test_emblem_pool_lookup() {
        crate::test_utils::init_test_logging();

        let pool = EmblemPool::builder().register(span_emblem()).build().unwrap();
        assert_eq!(pool.len(), 1);
        assert!(pool.contains(&ErasedKey::of::<Span>()));
        assert!(pool.get(&ErasedKey::of::<Meters>()).is_none());

        let emblem = pool.emblem::<Span>().unwrap();
        assert_eq!(emblem.properties()[0].name(), "length");
    }

    #[test]
    fn test_duplicates_reported_together() {
        let err = EmblemPool::builder()
            .register(span_emblem())
            .register(span_emblem())
            .register(span_emblem())
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            DuplicateRegistration {
                pool: "emblem",
                keys: vec![ErasedKey::of::<Span>()],
            }
        );

        let err = ExtractorPool::builder()
            .register(meters())
            .register(Extractor::bijection(
                |m: &Meters| m.0 as i64,
                |raw: &i64| Meters(*raw as f64),
            ))
            .build()
            .unwrap_err();
        assert_eq!(err.keys, [ErasedKey::of::<Meters>()]);
        assert!(err.to_string().starts_with("Duplicate extractor registration for `"));
    }

    #[test]
    fn test_extractor_pool_typed_lookup() {
        let pool = ExtractorPool::builder().register(meters()).build().unwrap();
        let extractor = pool.extractor::<Meters, f64>().unwrap();
        assert_eq!(extractor.apply(&Meters(2.5)), 2.5);
        assert!(pool.extractor::<Meters, i64>().is_none());
        assert_eq!(ExtractorPool::empty().len(), 0);
    }

    #[test]
    fn test_custom_pool_keeps_registration_order() {
        let pool = CustomTraversorPool::<dyn Handler>::builder()
            .register::<Span>(Arc::new(Named("span")))
            .register::<Meters>(Arc::new(Named("meters")))
            .build()
            .unwrap();
        assert_eq!(pool.keys(), [ErasedKey::of::<Span>(), ErasedKey::of::<Meters>()]);
        assert_eq!(pool.get(&ErasedKey::of::<Meters>()).unwrap().label(), "meters");

        let err = CustomTraversorPool::<dyn Handler>::builder()
            .register::<Span>(Arc::new(Named("a")))
            .register::<Span>(Arc::new(Named("b")))
            .build()
            .unwrap_err();
        assert_eq!(err.pool, "custom traversor");
    }
}
