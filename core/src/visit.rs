//! Read-only walks over values.

use core::any::Any;

use emblem_types::{ErasedKey, Keyed, OptionOps, Primitive, SeqOps};

use crate::emblem::AnyEmblem;
use crate::error::{TraverseError, VisitError};
use crate::extractor::AnyExtractor;
use crate::pool::{CustomTraversorPool, EmblemPool, ExtractorPool};
use crate::traverse::{Collection, Subject, Traversor, traverse};

/// Callbacks for primitive leaves. Every hook defaults to doing nothing.
pub trait VisitHooks {
    fn visit_bool(&mut self, _value: bool) {}
    fn visit_char(&mut self, _value: char) {}
    fn visit_double(&mut self, _value: f64) {}
    fn visit_float(&mut self, _value: f32) {}
    fn visit_int(&mut self, _value: i32) {}
    fn visit_long(&mut self, _value: i64) {}
    fn visit_string(&mut self, _value: &str) {}
}

impl VisitHooks for () {}

/// Takes over visiting a type (and its subtypes) from the engine.
pub trait CustomVisitor<H: VisitHooks + 'static>: Send + Sync {
    /// `key` is the runtime type of `value`. Call back into `visitor` to
    /// keep walking nested values.
    fn visit(
        &self,
        visitor: &mut Visitor<'_, H>,
        key: ErasedKey,
        value: &dyn Any,
    ) -> Result<(), TraverseError>;
}

pub type CustomVisitorPool<H> = CustomTraversorPool<dyn CustomVisitor<H>>;

pub struct Visitor<'p, H: VisitHooks + 'static> {
    hooks: H,
    emblems: &'p EmblemPool,
    extractors: &'p ExtractorPool,
    custom: Option<&'p CustomVisitorPool<H>>,
}

impl<'p, H: VisitHooks + 'static> Visitor<'p, H> {
    pub fn new(hooks: H, emblems: &'p EmblemPool, extractors: &'p ExtractorPool) -> Self {
        Self {
            hooks,
            emblems,
            extractors,
            custom: None,
        }
    }

    pub fn with_custom(mut self, custom: &'p CustomVisitorPool<H>) -> Self {
        self.custom = Some(custom);
        self
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    pub fn into_hooks(self) -> H {
        self.hooks
    }

    pub fn visit<A: Keyed>(&mut self, value: &A) -> Result<(), VisitError> {
        let key = ErasedKey::of::<A>();
        self.visit_dyn(key, value)
            .map_err(|source| VisitError { key, source })
    }

    /// Visit an erased value whose runtime type is `key`.
    pub fn visit_dyn(&mut self, key: ErasedKey, value: &dyn Any) -> Result<(), TraverseError> {
        traverse(self, key, Subject::Borrowed(value))
    }
}

impl<H: VisitHooks + 'static> Traversor for Visitor<'_, H> {
    type Input<'v> = Subject<'v>;
    type Output = ();

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
    ) -> Result<(), TraverseError> {
        let Some(handler) = self.custom.and_then(|pool| pool.get(&bound)) else {
            return Err(TraverseError::Unresolved { key });
        };
        handler.visit(self, key, input.get())
    }

    fn traverse_primitive(
        &mut self,
        primitive: Primitive,
        _key: ErasedKey,
        input: Subject<'_>,
    ) -> Result<(), TraverseError> {
        match primitive {
            Primitive::Bool => self.hooks.visit_bool(*input.downcast::<bool>()?),
            Primitive::Char => self.hooks.visit_char(*input.downcast::<char>()?),
            Primitive::Double => self.hooks.visit_double(*input.downcast::<f64>()?),
            Primitive::Float => self.hooks.visit_float(*input.downcast::<f32>()?),
            Primitive::Int => self.hooks.visit_int(*input.downcast::<i32>()?),
            Primitive::Long => self.hooks.visit_long(*input.downcast::<i64>()?),
            Primitive::Str => self.hooks.visit_string(input.downcast::<String>()?),
        }
        Ok(())
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
        _emblem: &dyn AnyEmblem,
        _outputs: Vec<()>,
    ) -> Result<(), TraverseError> {
        Ok(())
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
        _extractor: &dyn AnyExtractor,
        _output: (),
    ) -> Result<(), TraverseError> {
        Ok(())
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
        _ops: &OptionOps,
        _output: Option<()>,
    ) -> Result<(), TraverseError> {
        Ok(())
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
        _ops: &SeqOps,
        _outputs: Vec<()>,
    ) -> Result<(), TraverseError> {
        Ok(())
    }
}
