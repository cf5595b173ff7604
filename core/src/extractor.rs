//! Bidirectional conversions between a rich type and a simpler one.

use core::any::Any;
use core::fmt;
use std::sync::Arc;

use emblem_types::{ErasedKey, Keyed, Mismatch, TypeKey};

use crate::error::{BoxError, ExtractorInverseError, TraverseError};

type ApplyFn<D, R> = Arc<dyn Fn(&D) -> R + Send + Sync>;
type InverseFn<D, R> = Arc<dyn Fn(&R) -> Result<D, BoxError> + Send + Sync>;

/// Converts a `D` to an `R` (total) and back (possibly failing).
pub struct Extractor<D, R> {
    domain: TypeKey<D>,
    range: TypeKey<R>,
    apply: ApplyFn<D, R>,
    inverse: InverseFn<D, R>,
}

impl<D: Keyed, R: Keyed> Extractor<D, R> {
    pub fn new(
        apply: impl Fn(&D) -> R + Send + Sync + 'static,
        inverse: impl Fn(&R) -> Result<D, BoxError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            domain: TypeKey::of(),
            range: TypeKey::of(),
            apply: Arc::new(apply),
            inverse: Arc::new(inverse),
        }
    }

    /// An extractor whose inverse never fails.
    pub fn bijection(
        apply: impl Fn(&D) -> R + Send + Sync + 'static,
        inverse: impl Fn(&R) -> D + Send + Sync + 'static,
    ) -> Self {
        Self::new(apply, move |value| Ok(inverse(value)))
    }

    pub fn domain(&self) -> TypeKey<D> {
        self.domain
    }

    pub fn range(&self) -> TypeKey<R> {
        self.range
    }

    pub fn apply(&self, value: &D) -> R {
        (self.apply)(value)
    }
}

impl<D: Keyed, R: Keyed + fmt::Debug> Extractor<D, R> {
    pub fn inverse(&self, value: &R) -> Result<D, ExtractorInverseError> {
        (self.inverse)(value).map_err(|cause| ExtractorInverseError {
            value: format!("{value:?}"),
            target: self.domain.erase(),
            cause,
        })
    }
}

impl<D, R> Clone for Extractor<D, R> {
    fn clone(&self) -> Self {
        Self {
            domain: self.domain,
            range: self.range,
            apply: Arc::clone(&self.apply),
            inverse: Arc::clone(&self.inverse),
        }
    }
}

impl<D, R> fmt::Debug for Extractor<D, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extractor")
            .field("domain", &self.domain)
            .field("range", &self.range)
            .finish_non_exhaustive()
    }
}

/// An extractor with both sides erased, as stored in pools.
pub trait AnyExtractor: Send + Sync + fmt::Debug {
    fn domain(&self) -> ErasedKey;

    fn range(&self) -> ErasedKey;

    /// Domain value to range value.
    fn abbreviate(&self, value: &dyn Any) -> Result<Box<dyn Any>, Mismatch>;

    /// Range value back to domain value.
    fn unabbreviate(&self, value: &dyn Any) -> Result<Box<dyn Any>, TraverseError>;

    fn as_any(&self) -> &dyn Any;
}

impl<D: Keyed, R: Keyed + fmt::Debug> AnyExtractor for Extractor<D, R> {
    fn domain(&self) -> ErasedKey {
        self.domain.erase()
    }

    fn range(&self) -> ErasedKey {
        self.range.erase()
    }

    fn abbreviate(&self, value: &dyn Any) -> Result<Box<dyn Any>, Mismatch> {
        let value = value.downcast_ref::<D>().ok_or_else(Mismatch::of::<D>)?;
        Ok(Box::new(self.apply(value)))
    }

    fn unabbreviate(&self, value: &dyn Any) -> Result<Box<dyn Any>, TraverseError> {
        let value = value.downcast_ref::<R>().ok_or_else(Mismatch::of::<R>)?;
        Ok(Box::new(self.inverse(value)?))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Extractors compare equal when they convert between the same two types.
impl PartialEq for dyn AnyExtractor {
    fn eq(&self, other: &Self) -> bool {
        self.domain() == other.domain() && self.range() == other.range()
    }
}

/// A type with a canonical abbreviated form.
pub trait Shorthand: Keyed + Sized {
    type Abbreviated: Keyed + fmt::Debug;

    fn shorthand() -> Extractor<Self, Self::Abbreviated>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use emblem_types::{keyed, unbox};
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    struct Celsius(f64);

    #[derive(Debug, Clone, PartialEq)]
    struct Port(i32);

    keyed! { Celsius; Port }

    #[derive(Debug, thiserror::Error)]
    #[error("port {0} out of range")]
    struct OutOfRange(i32);

    fn port_extractor() -> Extractor<Port, i32> {
        Extractor::new(
            |port: &Port| port.0,
            |raw: &i32| {
                if (0..=65535).contains(raw) {
                    Ok(Port(*raw))
                } else {
                    Err(OutOfRange(*raw).into())
                }
            },
        )
    }

    #[test]
    fn test_bijection_round_trip() {
        let extractor = Extractor::bijection(|c: &Celsius| c.0, |raw: &f64| Celsius(*raw));
        let value = Celsius(21.5);
        assert_eq!(extractor.inverse(&extractor.apply(&value)).unwrap(), value);
    }

    #[test]
    fn test_inverse_failure_carries_value_and_target() {
        let extractor = port_extractor();
        let err = extractor.inverse(&70000).unwrap_err();
        assert_eq!(err.value, "70000");
        assert_eq!(err.target, ErasedKey::of::<Port>());
        assert_eq!(err.cause.to_string(), "port 70000 out of range");
    }

    #[test]
    fn test_erased_conversions() {
        let extractor = port_extractor();
        let erased: &dyn AnyExtractor = &extractor;
        assert_eq!(erased.domain(), ErasedKey::of::<Port>());
        assert_eq!(erased.range(), ErasedKey::of::<i32>());

        let short = erased.abbreviate(&Port(8080)).unwrap();
        assert_eq!(*short.downcast_ref::<i32>().unwrap(), 8080);
        let back = erased.unabbreviate(&8080i32).unwrap();
        assert_eq!(unbox::<Port>(back).unwrap(), Port(8080));

        assert!(erased.abbreviate(&8080i32).is_err());
        assert!(matches!(
            erased.unabbreviate(&-1i32),
            Err(TraverseError::ExtractorInverse(_))
        ));
    }
}
