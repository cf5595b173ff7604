//! Emblem - schemas and generic traversal for plain Rust types
//!
//! # Overview
//!
//! Emblem lets generic code walk, synthesize and rewrite values it has never
//! seen, without per-type boilerplate. Types are identified by keys, records
//! describe themselves through schemas, and conversions between types are
//! registered once and reused everywhere. Common use cases include:
//!
//! - Random test data for arbitrary records
//! - Auditing or collecting leaves of nested values
//! - Rewriting every string, id or reference inside a structure
//!
//! # Quick Start
//!
//! ```
//! use emblem::{
//!     Emblem, EmblemPool, ExtractorPool, Generator, GeneratorOptions, Keyed, Record,
//!     StandardHooks, VisitHooks, Visitor,
//! };
//!
//! #[derive(Debug, Clone, PartialEq, Keyed, Emblem)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! let emblems = EmblemPool::builder()
//!     .register(Point::emblem().unwrap())
//!     .build()
//!     .unwrap();
//! let extractors = ExtractorPool::empty();
//!
//! // Generate a point from a fixed seed
//! let options = GeneratorOptions { seed: Some(1), ..GeneratorOptions::default() };
//! let mut generator = Generator::new(StandardHooks, options, &emblems, &extractors);
//! let point: Point = generator.generate().unwrap();
//!
//! // Sum its ints with a visitor
//! struct Sum(i64);
//! impl VisitHooks for Sum {
//!     fn visit_int(&mut self, value: i32) {
//!         self.0 += i64::from(value);
//!     }
//! }
//!
//! let mut visitor = Visitor::new(Sum(0), &emblems, &extractors);
//! visitor.visit(&point).unwrap();
//! assert_eq!(visitor.hooks().0, i64::from(point.x) + i64::from(point.y));
//! ```
//!
//! # Dispatch
//!
//! Every traversal resolves a type by the first rule that applies:
//!
//! 1. A custom handler registered for the type or one of its supertypes
//! 2. A record schema from the [`EmblemPool`]
//! 3. A conversion from the [`ExtractorPool`]
//! 4. `Option`, list and set containers
//! 5. Primitives
//!
//! Anything else fails with [`TraverseError::Unresolved`].

// Derives resolve to `::emblem` when the deriving crate depends on this one.
extern crate self as emblem;

pub use emblem_core::*;
