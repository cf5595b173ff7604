//! The generic traversal engine.
//!
//! A [`Traversor`] decides what flows *into* each step (`Input`) and what
//! comes *out* (`Output`); [`traverse`] owns the dispatch order and the
//! recursion. Visiting, generating and transforming are all thin hook sets
//! over this one walk.
//!
//! For a value of type `A`, the first matching rule wins:
//!
//! 1. a custom handler registered for a supertype of `A`
//! 2. a record emblem for `A`
//! 3. an extractor whose domain is `A`
//! 4. `A` is an `Option`
//! 5. `A` is a list or set
//! 6. `A` is a primitive
//!
//! Anything else fails with [`TraverseError::Unresolved`].

use core::any::Any;

use emblem_types::{ErasedKey, Kind, Mismatch, OptionOps, Primitive, SeqOps, unbox};

use crate::emblem::AnyEmblem;
use crate::error::{EmblemError, TraverseError};
use crate::extractor::AnyExtractor;
use crate::pool::{EmblemPool, ExtractorPool};

/// Which collection rule matched.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Collection {
    List,
    Set,
}

/// A type-erased value that is either borrowed from the caller or produced
/// during traversal (e.g. by abbreviating through an extractor).
pub enum Subject<'v> {
    Borrowed(&'v dyn Any),
    Owned(Box<dyn Any>),
}

impl Subject<'_> {
    pub fn get(&self) -> &dyn Any {
        match self {
            Subject::Borrowed(value) => *value,
            Subject::Owned(value) => value.as_ref(),
        }
    }

    pub fn downcast<T: 'static>(&self) -> Result<&T, Mismatch> {
        self.get().downcast_ref::<T>().ok_or_else(Mismatch::of::<T>)
    }

    /// Move the value out, cloning only if it is borrowed.
    pub fn take<T: Clone + 'static>(self) -> Result<T, Mismatch> {
        match self {
            Subject::Borrowed(value) => value
                .downcast_ref::<T>()
                .cloned()
                .ok_or_else(Mismatch::of::<T>),
            Subject::Owned(value) => unbox(value),
        }
    }
}

impl core::fmt::Debug for Subject<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Subject::Borrowed(_) => f.write_str("Subject::Borrowed(..)"),
            Subject::Owned(_) => f.write_str("Subject::Owned(..)"),
        }
    }
}

/// Hook set driven by [`traverse`].
///
/// `stage_*` hooks split one input into inputs for the children; `unstage_*`
/// hooks fold the children's outputs back into one output. Staged inputs may
/// borrow from the parent input.
pub trait Traversor {
    type Input<'v>;
    type Output;

    fn emblems(&self) -> &EmblemPool;

    fn extractors(&self) -> &ExtractorPool;

    /// Keys with a custom handler, in search order.
    fn custom_keys(&self) -> &[ErasedKey] {
        &[]
    }

    /// Hand a value of type `key` to the handler registered for `bound`.
    fn traverse_custom(
        &mut self,
        bound: ErasedKey,
        key: ErasedKey,
        input: Self::Input<'_>,
    ) -> Result<Self::Output, TraverseError> {
        let _ = (bound, input);
        Err(TraverseError::Unresolved { key })
    }

    fn traverse_primitive(
        &mut self,
        primitive: Primitive,
        key: ErasedKey,
        input: Self::Input<'_>,
    ) -> Result<Self::Output, TraverseError>;

    /// One staged input per declared property, in declared order.
    fn stage_record<'a>(
        &mut self,
        emblem: &dyn AnyEmblem,
        input: &'a Self::Input<'_>,
    ) -> Result<Vec<Self::Input<'a>>, TraverseError>;

    /// `outputs` holds one result per declared property, in declared order.
    fn unstage_record(
        &mut self,
        emblem: &dyn AnyEmblem,
        outputs: Vec<Self::Output>,
    ) -> Result<Self::Output, TraverseError>;

    fn stage_extractor<'a>(
        &mut self,
        extractor: &dyn AnyExtractor,
        input: &'a Self::Input<'_>,
    ) -> Result<Self::Input<'a>, TraverseError>;

    fn unstage_extractor(
        &mut self,
        extractor: &dyn AnyExtractor,
        output: Self::Output,
    ) -> Result<Self::Output, TraverseError>;

    fn stage_option<'a>(
        &mut self,
        ops: &OptionOps,
        input: &'a Self::Input<'_>,
    ) -> Result<Option<Self::Input<'a>>, TraverseError>;

    fn unstage_option(
        &mut self,
        ops: &OptionOps,
        output: Option<Self::Output>,
    ) -> Result<Self::Output, TraverseError>;

    fn stage_elements<'a>(
        &mut self,
        collection: Collection,
        ops: &SeqOps,
        input: &'a Self::Input<'_>,
    ) -> Result<Vec<Self::Input<'a>>, TraverseError>;

    fn unstage_elements(
        &mut self,
        collection: Collection,
        ops: &SeqOps,
        outputs: Vec<Self::Output>,
    ) -> Result<Self::Output, TraverseError>;
}

/// Walk one value of type `key`.
pub fn traverse<T: Traversor>(
    traversor: &mut T,
    key: ErasedKey,
    input: T::Input<'_>,
) -> Result<T::Output, TraverseError> {
    let custom = traversor
        .custom_keys()
        .iter()
        .copied()
        .find(|bound| key.is_subtype_of(bound));
    if let Some(bound) = custom {
        tracing::trace!(ty = %key, bound = %bound, "dispatch: custom");
        return traversor.traverse_custom(bound, key, input);
    }

    if let Some(emblem) = traversor.emblems().get(&key).cloned() {
        tracing::trace!(ty = %key, "dispatch: record");
        return traverse_record(traversor, &*emblem, input);
    }

    if let Some(extractor) = traversor.extractors().get(&key).cloned() {
        tracing::trace!(ty = %key, range = %extractor.range(), "dispatch: extractor");
        let staged = traversor.stage_extractor(&*extractor, &input)?;
        let output = traverse(traversor, extractor.range(), staged)?;
        return traversor.unstage_extractor(&*extractor, output);
    }

    match key.kind() {
        Kind::Option(inner, ops) => {
            tracing::trace!(ty = %key, "dispatch: option");
            let output = match traversor.stage_option(&ops, &input)? {
                Some(staged) => Some(traverse(traversor, inner, staged)?),
                None => None,
            };
            traversor.unstage_option(&ops, output)
        }
        Kind::List(inner, ops) => {
            tracing::trace!(ty = %key, "dispatch: list");
            traverse_elements(traversor, Collection::List, inner, &ops, input)
        }
        Kind::Set(inner, ops) => {
            tracing::trace!(ty = %key, "dispatch: set");
            traverse_elements(traversor, Collection::Set, inner, &ops, input)
        }
        Kind::Primitive(primitive) => {
            tracing::trace!(ty = %key, primitive = primitive.name(), "dispatch: primitive");
            traversor.traverse_primitive(primitive, key, input)
        }
        Kind::Opaque => {
            tracing::trace!(ty = %key, "dispatch: unresolved");
            Err(TraverseError::Unresolved { key })
        }
    }
}

fn traverse_record<T: Traversor>(
    traversor: &mut T,
    emblem: &dyn AnyEmblem,
    input: T::Input<'_>,
) -> Result<T::Output, TraverseError> {
    let staged = traversor.stage_record(emblem, &input)?;
    let properties = emblem.properties();
    if staged.len() != properties.len() {
        return Err(EmblemError::Arity {
            record: emblem.key(),
            declared: properties.len(),
            used: staged.len(),
        }
        .into());
    }
    let mut outputs = Vec::with_capacity(properties.len());
    for (property, staged) in properties.iter().zip(staged) {
        outputs.push(traverse(traversor, property.key(), staged)?);
    }
    traversor.unstage_record(emblem, outputs)
}

fn traverse_elements<T: Traversor>(
    traversor: &mut T,
    collection: Collection,
    inner: ErasedKey,
    ops: &SeqOps,
    input: T::Input<'_>,
) -> Result<T::Output, TraverseError> {
    let staged = traversor.stage_elements(collection, ops, &input)?;
    let mut outputs = Vec::with_capacity(staged.len());
    for element in staged {
        outputs.push(traverse(traversor, inner, element)?);
    }
    traversor.unstage_elements(collection, ops, outputs)
}
