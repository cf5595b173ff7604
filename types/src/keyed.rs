use alloc::{collections::BTreeSet, collections::VecDeque, string::String, vec::Vec};

use crate::key::{ErasedKey, Lineage};
use crate::kind::{Kind, OptionOps, Primitive, SeqOps};

/// A type with a runtime identity.
///
/// Records, extractor domains and marker traits (`dyn Trait`) implement this
/// with the defaults. Override [`Keyed::supertypes`] to declare subtyping, or
/// use the `keyed!` macro / `#[derive(Keyed)]`.
pub trait Keyed: 'static {
    fn kind() -> Kind {
        Kind::Opaque
    }

    fn supertypes() -> Lineage {
        Lineage::new()
    }
}

macro_rules! impl_primitive {
    ($($ty:ty => $primitive:ident),* $(,)?) => {
        $(
            impl Keyed for $ty {
                fn kind() -> Kind {
                    Kind::Primitive(Primitive::$primitive)
                }
            }
        )*
    };
}

impl_primitive! {
    bool => Bool,
    char => Char,
    f64 => Double,
    f32 => Float,
    i32 => Int,
    i64 => Long,
    String => Str,
}

impl<T: Keyed> Keyed for Option<T> {
    fn kind() -> Kind {
        Kind::Option(ErasedKey::of::<T>(), OptionOps::of::<T>())
    }
}

impl<T: Keyed> Keyed for Vec<T> {
    fn kind() -> Kind {
        Kind::List(ErasedKey::of::<T>(), SeqOps::of::<Vec<T>, T>())
    }
}

impl<T: Keyed> Keyed for VecDeque<T> {
    fn kind() -> Kind {
        Kind::List(ErasedKey::of::<T>(), SeqOps::of::<VecDeque<T>, T>())
    }
}

impl<T: Keyed + Ord> Keyed for BTreeSet<T> {
    fn kind() -> Kind {
        Kind::Set(ErasedKey::of::<T>(), SeqOps::of::<BTreeSet<T>, T>())
    }
}

#[cfg(feature = "std")]
impl<T, S> Keyed for std::collections::HashSet<T, S>
where
    T: Keyed + Eq + core::hash::Hash,
    S: core::hash::BuildHasher + Default + 'static,
{
    fn kind() -> Kind {
        Kind::Set(
            ErasedKey::of::<T>(),
            SeqOps::of::<std::collections::HashSet<T, S>, T>(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_kinds() {
        assert!(matches!(
            ErasedKey::of::<i32>().kind(),
            Kind::Primitive(Primitive::Int)
        ));
        assert!(matches!(
            ErasedKey::of::<String>().kind(),
            Kind::Primitive(Primitive::Str)
        ));
        assert!(matches!(
            ErasedKey::of::<f32>().kind(),
            Kind::Primitive(Primitive::Float)
        ));
    }

    #[test]
    fn test_container_kinds_expose_element_key() {
        let list = ErasedKey::of::<Vec<Option<i64>>>().kind();
        assert!(matches!(list, Kind::List(..)));
        let element = list.inner().unwrap();
        assert_eq!(element, ErasedKey::of::<Option<i64>>());
        assert_eq!(element.kind().inner(), Some(ErasedKey::of::<i64>()));

        assert!(matches!(
            ErasedKey::of::<BTreeSet<char>>().kind(),
            Kind::Set(..)
        ));
    }
}
