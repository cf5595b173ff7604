//! Declarative registration of keyed types.
//!
//! # Example
//!
//! ```
//! use emblem_types::{keyed, TypeKey};
//!
//! trait Shape {}
//! struct Circle;
//! struct Square;
//!
//! keyed! {
//!     dyn Shape;
//!     Circle: dyn Shape;
//!     Square: dyn Shape;
//! }
//!
//! assert!(TypeKey::<Circle>::of().is_subtype_of(&TypeKey::<dyn Shape>::of()));
//! assert!(!TypeKey::<Circle>::of().is_subtype_of(&TypeKey::<Square>::of()));
//! ```

/// Implement [`Keyed`](crate::Keyed) for opaque types.
///
/// # Syntax
///
/// | Pattern | Meaning |
/// |---------|---------|
/// | `T;` | `T` is keyed with no supertypes |
/// | `T: A, B;` | `T` is keyed with direct supertypes `A` and `B` |
#[macro_export]
macro_rules! keyed {
    ($($ty:ty $(: $($sup:ty),+)?);+ $(;)?) => {
        $(
            impl $crate::Keyed for $ty {
                fn supertypes() -> $crate::Lineage {
                    $crate::Lineage::new()$($(.with::<$sup>())+)?
                }
            }
        )+
    };
}
