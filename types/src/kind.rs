//! Structural descriptors the traversal engine dispatches on.
//!
//! A [`Kind`] tells the engine whether a type is a primitive, an option, a
//! collection, or something opaque that has to be resolved through a pool.
//! Container kinds carry small tables of monomorphic function pointers that
//! open and rebuild the container through `dyn Any` without knowing the
//! element type statically.

use alloc::{boxed::Box, vec::Vec};
use core::any::{Any, type_name};
use core::fmt;

use crate::key::ErasedKey;

/// Primitive leaf types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Primitive {
    /// `bool`
    Bool,
    /// `char`
    Char,
    /// `f64`
    Double,
    /// `f32`
    Float,
    /// `i32`
    Int,
    /// `i64`
    Long,
    /// `String`
    Str,
}

impl Primitive {
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Bool => "Bool",
            Primitive::Char => "Char",
            Primitive::Double => "Double",
            Primitive::Float => "Float",
            Primitive::Int => "Int",
            Primitive::Long => "Long",
            Primitive::Str => "Str",
        }
    }
}

/// The structural shape of a keyed type.
#[derive(Clone, Copy, Debug)]
pub enum Kind {
    /// A fixed leaf type.
    Primitive(Primitive),

    /// `Option<T>` with the key of `T`.
    Option(ErasedKey, OptionOps),

    /// An ordered collection of `T`.
    List(ErasedKey, SeqOps),

    /// An unordered collection of distinct `T`.
    Set(ErasedKey, SeqOps),

    /// Anything else: records, extractor domains, custom-handled types.
    Opaque,
}

impl Kind {
    /// The element key for container kinds.
    pub fn inner(&self) -> Option<ErasedKey> {
        match self {
            Kind::Option(inner, _) | Kind::List(inner, _) | Kind::Set(inner, _) => Some(*inner),
            Kind::Primitive(_) | Kind::Opaque => None,
        }
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, Kind::Opaque)
    }
}

/// A checked unboxing failed: the value was not of the expected type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("value is not a `{expected}`")]
pub struct Mismatch {
    expected: &'static str,
}

impl Mismatch {
    pub fn of<T: ?Sized>() -> Self {
        Self {
            expected: type_name::<T>(),
        }
    }

    pub fn named(expected: &'static str) -> Self {
        Self { expected }
    }

    /// Name of the type that was expected.
    pub fn expected(&self) -> &'static str {
        self.expected
    }
}

/// Move a `T` out of a type-erased box.
pub fn unbox<T: 'static>(boxed: Box<dyn Any>) -> Result<T, Mismatch> {
    boxed
        .downcast::<T>()
        .map(|value| *value)
        .map_err(|_| Mismatch::of::<T>())
}

/// Erased access to an `Option<T>`.
#[derive(Clone, Copy)]
pub struct OptionOps {
    peek: fn(&dyn Any) -> Result<Option<&dyn Any>, Mismatch>,
    assemble: fn(Option<Box<dyn Any>>) -> Result<Box<dyn Any>, Mismatch>,
}

impl OptionOps {
    pub fn of<T: 'static>() -> Self {
        Self {
            peek: peek_option::<T>,
            assemble: assemble_option::<T>,
        }
    }

    /// Borrow the inner value of an erased `Option<T>`, if present.
    pub fn peek<'a>(&self, value: &'a dyn Any) -> Result<Option<&'a dyn Any>, Mismatch> {
        (self.peek)(value)
    }

    /// Rebuild an erased `Option<T>` from an optional erased `T`.
    pub fn assemble(&self, inner: Option<Box<dyn Any>>) -> Result<Box<dyn Any>, Mismatch> {
        (self.assemble)(inner)
    }
}

impl fmt::Debug for OptionOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OptionOps")
    }
}

fn peek_option<T: 'static>(value: &dyn Any) -> Result<Option<&dyn Any>, Mismatch> {
    let option = value
        .downcast_ref::<Option<T>>()
        .ok_or_else(Mismatch::of::<Option<T>>)?;
    Ok(option.as_ref().map(|inner| inner as &dyn Any))
}

fn assemble_option<T: 'static>(inner: Option<Box<dyn Any>>) -> Result<Box<dyn Any>, Mismatch> {
    let value: Option<T> = match inner {
        Some(boxed) => Some(unbox::<T>(boxed)?),
        None => None,
    };
    Ok(Box::new(value))
}

/// Erased access to a collection of `T`.
///
/// Works for any container that can be collected from `T`s and iterated by
/// reference, so `Vec`, `VecDeque`, `BTreeSet` and `HashSet` all share it.
#[derive(Clone, Copy)]
pub struct SeqOps {
    elements: fn(&dyn Any) -> Result<Vec<&dyn Any>, Mismatch>,
    assemble: fn(Vec<Box<dyn Any>>) -> Result<Box<dyn Any>, Mismatch>,
}

impl SeqOps {
    pub fn of<C, T>() -> Self
    where
        C: FromIterator<T> + 'static,
        T: 'static,
        for<'a> &'a C: IntoIterator<Item = &'a T>,
    {
        Self {
            elements: elements_of::<C, T>,
            assemble: assemble_into::<C, T>,
        }
    }

    /// Borrow every element of an erased collection, in iteration order.
    pub fn elements<'a>(&self, value: &'a dyn Any) -> Result<Vec<&'a dyn Any>, Mismatch> {
        (self.elements)(value)
    }

    /// Collect erased elements into a fresh erased collection.
    pub fn assemble(&self, elements: Vec<Box<dyn Any>>) -> Result<Box<dyn Any>, Mismatch> {
        (self.assemble)(elements)
    }
}

impl fmt::Debug for SeqOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SeqOps")
    }
}

fn elements_of<C, T>(value: &dyn Any) -> Result<Vec<&dyn Any>, Mismatch>
where
    C: 'static,
    T: 'static,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    let collection = value.downcast_ref::<C>().ok_or_else(Mismatch::of::<C>)?;
    Ok(collection
        .into_iter()
        .map(|element| element as &dyn Any)
        .collect())
}

fn assemble_into<C, T>(elements: Vec<Box<dyn Any>>) -> Result<Box<dyn Any>, Mismatch>
where
    C: FromIterator<T> + 'static,
    T: 'static,
{
    let collection = elements
        .into_iter()
        .map(unbox::<T>)
        .collect::<Result<C, _>>()?;
    Ok(Box::new(collection))
}
