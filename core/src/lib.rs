//! Schemas, conversions and a generic traversal engine over keyed types.
//!
//! Register record schemas ([`Emblem`]) and conversions ([`Extractor`]) in
//! pools, then walk values with a [`Visitor`], synthesize them with a
//! [`Generator`], or rewrite them with a [`Transformer`]. All three run on the
//! same dispatch engine ([`traverse`]).

// Derives name this crate `::emblem_core` when it is the one compiling.
extern crate self as emblem_core;

mod emblem;
mod error;
mod extractor;
mod generate;
mod pool;
mod transform;
mod traverse;
mod visit;

pub use emblem::{AnyEmblem, AnyProperty, Args, Builder, Create, Emblem, Prop, Property, Record};
pub use error::{
    BoxError, DuplicateRegistration, EmblemError, ExtractorInverseError, GenerateError,
    TraverseError, VisitError,
};
pub use extractor::{AnyExtractor, Extractor, Shorthand};
pub use generate::{
    CustomGenerator, CustomGeneratorPool, GenerateHooks, Generator, GeneratorOptions, Sampler,
    StandardHooks,
};
pub use pool::{
    CustomHandle, CustomTraversorPool, CustomTraversorPoolBuilder, EmblemPool, EmblemPoolBuilder,
    ExtractorPool, ExtractorPoolBuilder, ShorthandPool,
};
pub use transform::{CustomTransformer, CustomTransformerPool, TransformHooks, Transformer};
pub use traverse::{Collection, Subject, Traversor, traverse};
pub use visit::{CustomVisitor, CustomVisitorPool, VisitHooks, Visitor};

pub use emblem_macros::{Emblem, Keyed, Shorthand};
pub use emblem_types::{
    ErasedKey, Family, FamilyValue, Identity, Keyed, Kind, Lineage, ListOf, LowerBounded,
    Mismatch, OptionOps, Primitive, SeqOps, TypeKey, TypeKeyMap, UpperBounded, keyed, unbox,
};

/// Test utilities for enabling logging in tests
#[cfg(test)]
pub mod test_utils {
    /// Initialize tracing subscriber for tests with DEBUG level
    /// Call this at the start of tests where you want to see logging output
    pub fn init_test_logging() {
        use tracing_subscriber::{EnvFilter, fmt};

        // Try to initialize, ignore error if already initialized
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }
}
