//! Record schemas: ordered, named, typed properties plus a constructor.
//!
//! An [`Emblem<R>`] describes how to take a record `R` apart (one accessor
//! per property) and how to put it back together (a constructor fed the
//! property values in declared order). The traversal engine drives records
//! exclusively through this description.
//!
//! # Example
//!
//! ```
//! use emblem_core::{Emblem, EmblemError, Property, keyed};
//!
//! #[derive(Debug, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! keyed! { Point }
//!
//! let x = Property::<Point, i32>::new("x", |p| &p.x);
//! let y = Property::<Point, i32>::new("y", |p| &p.y);
//! let emblem = Emblem::new(vec![x.into(), y.into()], |args| {
//!     Ok(Point { x: args.next()?, y: args.next()? })
//! })?;
//!
//! // Order of `set_prop` calls doesn't matter.
//! let point = emblem.builder().set_prop(&y, 2).set_prop(&x, 1).build()?;
//! assert_eq!(point, Point { x: 1, y: 2 });
//! # Ok::<(), EmblemError>(())
//! ```

use core::any::Any;
use core::fmt;
use core::marker::PhantomData;
use std::sync::Arc;

use emblem_types::{ErasedKey, Keyed, Mismatch, TypeKey, unbox};

use crate::error::EmblemError;

/// One named, typed field of record `R` holding a `P`.
pub struct Property<R, P> {
    name: &'static str,
    key: TypeKey<P>,
    get: fn(&R) -> &P,
}

impl<R: Keyed, P: Keyed> Property<R, P> {
    pub fn new(name: &'static str, get: fn(&R) -> &P) -> Self {
        Self {
            name,
            key: TypeKey::of(),
            get,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn key(&self) -> TypeKey<P> {
        self.key
    }

    pub fn get<'a>(&self, record: &'a R) -> &'a P {
        (self.get)(record)
    }
}

impl<R, P> Clone for Property<R, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R, P> Copy for Property<R, P> {}

impl<R, P> fmt::Debug for Property<R, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("key", &self.key)
            .finish()
    }
}

/// A property with its record and value types erased.
pub trait AnyProperty: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    /// Key of the property's value type.
    fn key(&self) -> ErasedKey;

    /// Borrow this property's value out of an erased record.
    fn get<'a>(&self, record: &'a dyn Any) -> Result<&'a dyn Any, Mismatch>;

    fn as_any(&self) -> &dyn Any;
}

impl<R: Keyed, P: Keyed> AnyProperty for Property<R, P> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn key(&self) -> ErasedKey {
        self.key.erase()
    }

    fn get<'a>(&self, record: &'a dyn Any) -> Result<&'a dyn Any, Mismatch> {
        let record = record.downcast_ref::<R>().ok_or_else(Mismatch::of::<R>)?;
        Ok((self.get)(record))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A property of `R` whose value type has been erased.
pub struct Prop<R> {
    inner: Arc<dyn AnyProperty>,
    _record: PhantomData<fn(&R)>,
}

impl<R: Keyed, P: Keyed> From<Property<R, P>> for Prop<R> {
    fn from(property: Property<R, P>) -> Self {
        Self {
            inner: Arc::new(property),
            _record: PhantomData,
        }
    }
}

/// Property values handed to an emblem's constructor, in declared order.
pub struct Args {
    record: ErasedKey,
    declared: usize,
    used: usize,
    values: std::vec::IntoIter<(&'static str, Box<dyn Any>)>,
}

impl Args {
    fn new(record: ErasedKey, values: Vec<(&'static str, Box<dyn Any>)>) -> Self {
        Self {
            record,
            declared: values.len(),
            used: 0,
            values: values.into_iter(),
        }
    }

    /// Take the next property value.
    pub fn next<P: 'static>(&mut self) -> Result<P, EmblemError> {
        let Some((property, value)) = self.values.next() else {
            return Err(EmblemError::Arity {
                record: self.record,
                declared: self.declared,
                used: self.used + 1,
            });
        };
        self.used += 1;
        unbox::<P>(value).map_err(|source| EmblemError::PropertyMismatch {
            record: self.record,
            property,
            source,
        })
    }

    fn finish(&self) -> Result<(), EmblemError> {
        if self.used == self.declared {
            Ok(())
        } else {
            Err(self.arity())
        }
    }

    fn arity(&self) -> EmblemError {
        EmblemError::Arity {
            record: self.record,
            declared: self.declared,
            used: self.used,
        }
    }
}

/// Constructor invoked with property values in declared order.
pub type Create<R> = fn(&mut Args) -> Result<R, EmblemError>;

/// The schema of record type `R`.
pub struct Emblem<R> {
    key: TypeKey<R>,
    props: Vec<Arc<dyn AnyProperty>>,
    create: Create<R>,
}

impl<R: Keyed> Emblem<R> {
    /// Declare a schema. Property names must be distinct.
    pub fn new(props: Vec<Prop<R>>, create: Create<R>) -> Result<Self, EmblemError> {
        let key = TypeKey::<R>::of();
        let props: Vec<Arc<dyn AnyProperty>> = props.into_iter().map(|p| p.inner).collect();
        for (i, prop) in props.iter().enumerate() {
            if props[..i].iter().any(|earlier| earlier.name() == prop.name()) {
                return Err(EmblemError::DuplicateProperty {
                    record: key.erase(),
                    property: prop.name(),
                });
            }
        }
        Ok(Self { key, props, create })
    }

    pub fn key(&self) -> TypeKey<R> {
        self.key
    }

    pub fn properties(&self) -> &[Arc<dyn AnyProperty>] {
        &self.props
    }

    /// Look up a declared property with its static types restored.
    pub fn property<P: Keyed>(&self, name: &str) -> Option<Property<R, P>> {
        self.props
            .iter()
            .find(|prop| prop.name() == name)?
            .as_any()
            .downcast_ref::<Property<R, P>>()
            .copied()
    }

    /// A fresh, empty builder.
    pub fn builder(&self) -> Builder<'_, R> {
        Builder {
            emblem: self,
            values: (0..self.props.len()).map(|_| None).collect(),
            error: None,
        }
    }

    fn construct(&self, values: Vec<(&'static str, Box<dyn Any>)>) -> Result<R, EmblemError> {
        let mut args = Args::new(self.key.erase(), values);
        let record = (self.create)(&mut args)?;
        args.finish()?;
        Ok(record)
    }
}

impl<R> fmt::Debug for Emblem<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emblem")
            .field("key", &self.key)
            .field("props", &self.props)
            .finish()
    }
}

/// Accumulates property values for one record.
///
/// Setting is fluent; problems are reported by [`Builder::build`].
pub struct Builder<'e, R> {
    emblem: &'e Emblem<R>,
    values: Vec<Option<Box<dyn Any>>>,
    error: Option<EmblemError>,
}

impl<R: Keyed> Builder<'_, R> {
    /// Record `value` for `property`. Setting a property again replaces it.
    pub fn set_prop<P: Keyed>(mut self, property: &Property<R, P>, value: P) -> Self {
        if self.error.is_some() {
            return self;
        }
        let record = self.emblem.key.erase();
        let slot = self
            .emblem
            .props
            .iter()
            .position(|prop| prop.name() == property.name());
        match slot {
            Some(i) if self.emblem.props[i].key() == property.key().erase() => {
                self.values[i] = Some(Box::new(value));
            }
            Some(i) => {
                self.error = Some(EmblemError::PropertyMismatch {
                    record,
                    property: property.name(),
                    source: Mismatch::named(self.emblem.props[i].key().name()),
                });
            }
            None => {
                self.error = Some(EmblemError::UnknownProperty {
                    record,
                    property: property.name(),
                });
            }
        }
        self
    }

    pub fn build(self) -> Result<R, EmblemError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let mut values = Vec::with_capacity(self.values.len());
        for (prop, value) in self.emblem.props.iter().zip(self.values) {
            let Some(value) = value else {
                return Err(EmblemError::MissingProperty {
                    record: self.emblem.key.erase(),
                    property: prop.name(),
                });
            };
            values.push((prop.name(), value));
        }
        self.emblem.construct(values)
    }
}

/// An emblem with its record type erased, as stored in pools.
pub trait AnyEmblem: Send + Sync + fmt::Debug {
    fn key(&self) -> ErasedKey;

    fn properties(&self) -> &[Arc<dyn AnyProperty>];

    /// Build an erased record from one erased value per property, in order.
    fn assemble(&self, values: Vec<Box<dyn Any>>) -> Result<Box<dyn Any>, EmblemError>;

    fn as_any(&self) -> &dyn Any;
}

impl<R: Keyed> AnyEmblem for Emblem<R> {
    fn key(&self) -> ErasedKey {
        self.key.erase()
    }

    fn properties(&self) -> &[Arc<dyn AnyProperty>] {
        &self.props
    }

    fn assemble(&self, values: Vec<Box<dyn Any>>) -> Result<Box<dyn Any>, EmblemError> {
        if values.len() != self.props.len() {
            return Err(EmblemError::Arity {
                record: self.key.erase(),
                declared: self.props.len(),
                used: values.len(),
            });
        }
        let named = self.props.iter().map(|prop| prop.name()).zip(values).collect();
        Ok(Box::new(self.construct(named)?))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl PartialEq for dyn AnyEmblem {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
            && self
                .properties()
                .iter()
                .map(|prop| (prop.name(), prop.key()))
                .eq(other.properties().iter().map(|prop| (prop.name(), prop.key())))
    }
}

/// A record type with a schema.
pub trait Record: Keyed + Sized {
    fn emblem() -> Result<Emblem<Self>, EmblemError>;
}
