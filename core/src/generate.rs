//! Synthesizing arbitrary values of any traversable type.
//!
//! # Example
//!
//! ```
//! use emblem_core::{EmblemPool, ExtractorPool, Generator, GeneratorOptions, StandardHooks};
//!
//! let emblems = EmblemPool::empty();
//! let extractors = ExtractorPool::empty();
//! let options = GeneratorOptions { seed: Some(7), ..Default::default() };
//! let mut generator = Generator::new(StandardHooks, options, &emblems, &extractors);
//!
//! let values: Vec<Option<i64>> = generator.generate().unwrap();
//! assert!(values.len() <= 3);
//! ```

use core::any::Any;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use emblem_types::{ErasedKey, Keyed, OptionOps, Primitive, SeqOps, unbox};

use crate::emblem::AnyEmblem;
use crate::error::{GenerateError, TraverseError};
use crate::extractor::AnyExtractor;
use crate::pool::{CustomTraversorPool, EmblemPool, ExtractorPool};
use crate::traverse::{Collection, Traversor, traverse};

const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Knobs for the default generation policy.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorOptions {
    /// Fixed RNG seed; `None` draws a fresh one.
    pub seed: Option<u64>,
    pub string_len: usize,
    /// Collections get between 0 and this many elements, inclusive.
    pub max_collection_len: usize,
    /// Probability that a generated `Option` is `Some`.
    pub option_presence: f64,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            seed: None,
            string_len: 8,
            max_collection_len: 3,
            option_presence: 0.5,
        }
    }
}

/// Seeded randomness plus the options it is drawn under.
pub struct Sampler {
    rng: ChaCha8Rng,
    options: GeneratorOptions,
}

impl Sampler {
    pub fn new(options: GeneratorOptions) -> Self {
        let seed = options.seed.unwrap_or_else(rand::random);
        tracing::debug!(seed, "generator seeded");
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            options,
        }
    }

    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    pub fn bool(&mut self) -> bool {
        self.rng.r#gen()
    }

    /// One of the 62 ASCII letters and digits, uniformly.
    pub fn alphanumeric(&mut self) -> char {
        char::from(ALPHANUMERIC[self.rng.gen_range(0..ALPHANUMERIC.len())])
    }

    pub fn string(&mut self) -> String {
        (0..self.options.string_len)
            .map(|_| self.alphanumeric())
            .collect()
    }

    pub fn collection_len(&mut self) -> usize {
        self.rng.gen_range(0..=self.options.max_collection_len)
    }

    pub fn option_present(&mut self) -> bool {
        let presence = self.options.option_presence;
        if presence.is_nan() {
            return false;
        }
        self.rng.gen_bool(presence.clamp(0.0, 1.0))
    }
}

/// Generation policy for leaves and container shapes.
///
/// Defaults follow [`GeneratorOptions`]; override individual hooks to bias
/// particular types.
pub trait GenerateHooks {
    fn generate_bool(&mut self, sampler: &mut Sampler) -> bool {
        sampler.bool()
    }

    fn generate_char(&mut self, sampler: &mut Sampler) -> char {
        sampler.alphanumeric()
    }

    fn generate_double(&mut self, sampler: &mut Sampler) -> f64 {
        sampler.rng().r#gen()
    }

    fn generate_float(&mut self, sampler: &mut Sampler) -> f32 {
        sampler.rng().r#gen()
    }

    fn generate_int(&mut self, sampler: &mut Sampler) -> i32 {
        sampler.rng().r#gen()
    }

    fn generate_long(&mut self, sampler: &mut Sampler) -> i64 {
        sampler.rng().r#gen()
    }

    fn generate_string(&mut self, sampler: &mut Sampler) -> String {
        sampler.string()
    }

    fn collection_len(&mut self, _collection: Collection, sampler: &mut Sampler) -> usize {
        sampler.collection_len()
    }

    fn option_present(&mut self, sampler: &mut Sampler) -> bool {
        sampler.option_present()
    }
}

/// The default policy.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardHooks;

impl GenerateHooks for StandardHooks {}

/// Takes over generating a type (and its subtypes) from the engine.
pub trait CustomGenerator<H: GenerateHooks + 'static>: Send + Sync {
    /// Produce a boxed value whose runtime type is `key`.
    fn generate(
        &self,
        generator: &mut Generator<'_, H>,
        key: ErasedKey,
    ) -> Result<Box<dyn Any>, TraverseError>;
}

pub type CustomGeneratorPool<H> = CustomTraversorPool<dyn CustomGenerator<H>>;

pub struct Generator<'p, H: GenerateHooks + 'static> {
    hooks: H,
    sampler: Sampler,
    emblems: &'p EmblemPool,
    extractors: &'p ExtractorPool,
    custom: Option<&'p CustomGeneratorPool<H>>,
}

impl<'p, H: GenerateHooks + 'static> Generator<'p, H> {
    pub fn new(
        hooks: H,
        options: GeneratorOptions,
        emblems: &'p EmblemPool,
        extractors: &'p ExtractorPool,
    ) -> Self {
        Self {
            hooks,
            sampler: Sampler::new(options),
            emblems,
            extractors,
            custom: None,
        }
    }

    pub fn with_custom(mut self, custom: &'p CustomGeneratorPool<H>) -> Self {
        self.custom = Some(custom);
        self
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn sampler(&mut self) -> &mut Sampler {
        &mut self.sampler
    }

    pub fn generate<A: Keyed>(&mut self) -> Result<A, GenerateError> {
        let key = ErasedKey::of::<A>();
        self.generate_dyn(key)
            .and_then(|value| Ok(unbox::<A>(value)?))
            .map_err(|source| GenerateError { key, source })
    }

    /// Generate a boxed value whose runtime type is `key`.
    pub fn generate_dyn(&mut self, key: ErasedKey) -> Result<Box<dyn Any>, TraverseError> {
        traverse(self, key, ())
    }
}

impl<H: GenerateHooks + 'static> Traversor for Generator<'_, H> {
    type Input<'v> = ();
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
        _input: (),
    ) -> Result<Box<dyn Any>, TraverseError> {
        let Some(handler) = self.custom.and_then(|pool| pool.get(&bound)) else {
            return Err(TraverseError::Unresolved { key });
        };
        handler.generate(self, key)
    }

    fn traverse_primitive(
        &mut self,
        primitive: Primitive,
        _key: ErasedKey,
        _input: (),
    ) -> Result<Box<dyn Any>, TraverseError> {
        let hooks = &mut self.hooks;
        let sampler = &mut self.sampler;
        let value: Box<dyn Any> = match primitive {
            Primitive::Bool => Box::new(hooks.generate_bool(sampler)),
            Primitive::Char => Box::new(hooks.generate_char(sampler)),
            Primitive::Double => Box::new(hooks.generate_double(sampler)),
            Primitive::Float => Box::new(hooks.generate_float(sampler)),
            Primitive::Int => Box::new(hooks.generate_int(sampler)),
            Primitive::Long => Box::new(hooks.generate_long(sampler)),
            Primitive::Str => Box::new(hooks.generate_string(sampler)),
        };
        Ok(value)
    }

    fn stage_record<'a>(
        &mut self,
        emblem: &dyn AnyEmblem,
        _input: &'a (),
    ) -> Result<Vec<()>, TraverseError> {
        Ok(vec![(); emblem.properties().len()])
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
        _extractor: &dyn AnyExtractor,
        _input: &'a (),
    ) -> Result<(), TraverseError> {
        Ok(())
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
        _ops: &OptionOps,
        _input: &'a (),
    ) -> Result<Option<()>, TraverseError> {
        Ok(self.hooks.option_present(&mut self.sampler).then_some(()))
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
        collection: Collection,
        _ops: &SeqOps,
        _input: &'a (),
    ) -> Result<Vec<()>, TraverseError> {
        let len = self.hooks.collection_len(collection, &mut self.sampler);
        Ok(vec![(); len])
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

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn seeded(seed: u64) -> GeneratorOptions {
        GeneratorOptions {
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn test_same_seed_same_values() {
        let emblems = EmblemPool::empty();
        let extractors = ExtractorPool::empty();
        let mut a = Generator::new(StandardHooks, seeded(42), &emblems, &extractors);
        let mut b = Generator::new(StandardHooks, seeded(42), &emblems, &extractors);
        for _ in 0..20 {
            let left: Vec<Option<String>> = a.generate().unwrap();
            let right: Vec<Option<String>> = b.generate().unwrap();
            assert_eq!(left, right);
        }
    }

    #[test]
    fn test_strings_use_configured_length_and_alphabet() {
        crate::test_utils::init_test_logging();

        let emblems = EmblemPool::empty();
        let extractors = ExtractorPool::empty();
        let options = GeneratorOptions {
            string_len: 12,
            ..seeded(1)
        };
        let mut generator = Generator::new(StandardHooks, options, &emblems, &extractors);
        for _ in 0..50 {
            let value: String = generator.generate().unwrap();
            assert_eq!(value.len(), 12);
            assert!(value.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    struct AlwaysSome;

    impl GenerateHooks for AlwaysSome {
        fn option_present(&mut self, _sampler: &mut Sampler) -> bool {
            true
        }

        fn generate_int(&mut self, _sampler: &mut Sampler) -> i32 {
            5
        }
    }

    #[test]
    fn test_hooks_override_policy() {
        let emblems = EmblemPool::empty();
        let extractors = ExtractorPool::empty();
        let mut generator = Generator::new(AlwaysSome, seeded(3), &emblems, &extractors);
        for _ in 0..10 {
            assert_eq!(generator.generate::<Option<i32>>().unwrap(), Some(5));
        }
    }

    #[test]
    fn test_set_lengths_stay_within_bound() {
        let emblems = EmblemPool::empty();
        let extractors = ExtractorPool::empty();
        let mut generator = Generator::new(StandardHooks, seeded(9), &emblems, &extractors);
        for _ in 0..50 {
            let set: std::collections::BTreeSet<char> = generator.generate().unwrap();
            assert!(set.len() <= 3);
        }
    }
}
