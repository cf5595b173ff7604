//! Structure-preserving rewrites.
//!
//! A [`Transformer`] rebuilds a value bottom-up. With no overrides the result
//! equals the input; hooks and custom handlers substitute the parts they
//! care about and leave everything else alone.

use core::any::Any;

use emblem_types::{ErasedKey, Keyed, OptionOps, Primitive, SeqOps, unbox};

use crate::emblem::AnyEmblem;
use crate::error::TraverseError;
use crate::extractor::AnyExtractor;
use crate::pool::{CustomTraversorPool, EmblemPool, ExtractorPool};
use crate::traverse::{Collection, Subject, Traversor, traverse};

/// Rewrites for primitive leaves. Every hook defaults to the identity.
pub trait TransformHooks {
    fn transform_bool(&mut self, value: bool) -> bool {
        value
    }

    fn transform_char(&mut self, value: char) -> char {
        value
    }

    fn transform_double(&mut self, value: f64) -> f64 {
        value
    }

    fn transform_float(&mut self, value: f32) -> f32 {
        value
    }

    fn transform_int(&mut self, value: i32) -> i32 {
        value
    }

    fn transform_long(&mut self, value: i64) -> i64 {
        value
    }

    fn transform_string(&mut self, value: String) -> String {
        value
    }
}

impl TransformHooks for () {}

/// Takes over rewriting a type (and its subtypes) from the engine.
pub trait CustomTransformer<H: TransformHooks + 'static>: Send + Sync {
    /// Return a boxed replacement whose runtime type is `key`.
    fn transform(
        &self,
        transformer: &mut Transformer<'_, H>,
        key: ErasedKey,
        value: &dyn Any,
    ) -> Result<Box<dyn Any>, TraverseError>;
}

pub type CustomTransformerPool<H> = CustomTraversorPool<dyn CustomTransformer<H>>;

pub struct Transformer<'p, H: TransformHooks + 'static> {
    hooks: H,
    emblems: &'p EmblemPool,
    extractors: &'p ExtractorPool,
    custom: Option<&'p CustomTransformerPool<H>>,
}

impl<'p, H: TransformHooks + 'static> Transformer<'p, H> {
    pub fn new(hooks: H, emblems: &'p EmblemPool, extractors: &'p ExtractorPool) -> Self {
        Self {
            hooks,
            emblems,
            extractors,
            custom: None,
        }
    }

    pub fn with_custom(mut self, custom: &'p CustomTransformerPool<H>) -> Self {
        self.custom = Some(custom);
        self
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    pub fn transform<A: Keyed>(&mut self, value: &A) -> Result<A, TraverseError> {
        let rewritten = self.transform_dyn(ErasedKey::of::<A>(), value)?;
        Ok(unbox::<A>(rewritten)?)
    }

    /// Rewrite an erased value whose runtime type is `key`.
    pub fn transform_dyn(
        &mut self,
        key: ErasedKey,
        value: &dyn Any,
    ) -> Result<Box<dyn Any>, TraverseError> {
        traverse(self, key, Subject::Borrowed(value))
    }
}

impl<H: TransformHooks + 'static> Traversor for Transformer<'_, H> {
    type Input<'v> = Subject<'v>;
    type Output = Box<dyn Any>;

    fn emblems(&self) -> &EmblemPool {
        self.emblems
    }

    fn extractors(&self) -> &ExtractorPool {
        self.extractors
    }

    fn custom_keys(&self) -> &[ErasedKey] {
        self.custom.map(|pool| pool.keys()).unwrap_or_default()
    }

    fn traverse_custom(
        &mut self,
        bound: ErasedKey,
        key: ErasedKey,
        input: Subject<'_>,
    ) -> Result<Box<dyn Any>, TraverseError> {
        let Some(handler) = self.custom.and_then(|pool| pool.get(&bound)) else {
            return Err(TraverseError::Unresolved { key });
        };
        handler.transform(self, key, input.get())
    }

    fn traverse_primitive(
        &mut self,
        primitive: Primitive,
        _key: ErasedKey,
        input: Subject<'_>,
    ) -> Result<Box<dyn Any>, TraverseError> {
        let hooks = &mut self.hooks;
        let value: Box<dyn Any> = match primitive {
            Primitive::Bool => Box::new(hooks.transform_bool(input.take()?)),
            Primitive::Char => Box::new(hooks.transform_char(input.take()?)),
            Primitive::Double => Box::new(hooks.transform_double(input.take()?)),
            Primitive::Float => Box::new(hooks.transform_float(input.take()?)),
            Primitive::Int => Box::new(hooks.transform_int(input.take()?)),
            Primitive::Long => Box::new(hooks.transform_long(input.take()?)),
            Primitive::Str => Box::new(hooks.transform_string(input.take()?)),
        };
        Ok(value)
    }

    fn stage_record<'a>(
        &mut self,
        emblem: &dyn AnyEmblem,
        input: &'a Subject<'_>,
    ) -> Result<Vec<Subject<'a>>, TraverseError> {
        let record = input.get();
        emblem
            .properties()
            .iter()
            .map(|property| -> Result<Subject<'a>, TraverseError> {
                Ok(Subject::Borrowed(property.get(record)?))
            })
            .collect()
    }

    fn unstage_record(
        &mut self,
        emblem: &dyn AnyEmblem,
        outputs: Vec<Box<dyn Any>>,
    ) -> Result<Box<dyn Any>, TraverseError> {
        Ok(emblem.assemble(outputs)?)
    }

    fn stage_extractor<'a>(
        &mut self,
        extractor: &dyn AnyExtractor,
        input: &'a Subject<'_>,
    ) -> Result<Subject<'a>, TraverseError> {
        Ok(Subject::Owned(extractor.abbreviate(input.get())?))
    }

    fn unstage_extractor(
        &mut self,
        extractor: &dyn AnyExtractor,
        output: Box<dyn Any>,
    ) -> Result<Box<dyn Any>, TraverseError> {
        extractor.unabbreviate(output.as_ref())
    }

    fn stage_option<'a>(
        &mut self,
        ops: &OptionOps,
        input: &'a Subject<'_>,
    ) -> Result<Option<Subject<'a>>, TraverseError> {
        Ok(ops.peek(input.get())?.map(Subject::Borrowed))
    }

    fn unstage_option(
        &mut self,
        ops: &OptionOps,
        output: Option<Box<dyn Any>>,
    ) -> Result<Box<dyn Any>, TraverseError> {
        Ok(ops.assemble(output)?)
    }

    fn stage_elements<'a>(
        &mut self,
        _collection: Collection,
        ops: &SeqOps,
        input: &'a Subject<'_>,
    ) -> Result<Vec<Subject<'a>>, TraverseError> {
        Ok(ops
            .elements(input.get())?
            .into_iter()
            .map(Subject::Borrowed)
            .collect())
    }

    fn unstage_elements(
        &mut self,
        _collection: Collection,
        ops: &SeqOps,
        outputs: Vec<Box<dyn Any>>,
    ) -> Result<Box<dyn Any>, TraverseError> {
        Ok(ops.assemble(outputs)?)
    }
}
