//! Derive macros for emblem.
//!
//! - `#[derive(Keyed)]` - Give a type a key, optionally with supertypes
//! - `#[derive(Emblem)]` - Generate a record schema from named fields
//! - `#[derive(Shorthand)]` - Abbreviate a single-field wrapper to its field
//!
//! Generated code names the runtime through whichever of `emblem` or
//! `emblem-core` the deriving crate depends on, preferring `emblem`.

extern crate proc_macro;

use proc_macro::TokenStream;

mod common;
mod emblem;
mod keyed;
mod shorthand;

/// Implement `Keyed` for a concrete type.
///
/// Supertypes are declared with `extends`, nearest first. They take part in
/// custom-handler dispatch, where a handler registered for a supertype also
/// claims its subtypes.
///
/// ```ignore
/// trait Shape {}
/// emblem_core::keyed! { dyn Shape }
///
/// #[derive(Keyed)]
/// #[keyed(extends(dyn Shape))]
/// struct Circle {
///     radius: f64,
/// }
/// ```
///
/// # Limitations
///
/// - Generic types are not supported
#[proc_macro_derive(Keyed, attributes(keyed))]
pub fn derive_keyed(item: TokenStream) -> TokenStream {
    keyed::derive_keyed_impl(item)
}

/// Implement `Record` for a struct with named fields.
///
/// Each field becomes a property named after it, in declaration order. Rename
/// a property with `#[emblem(name = other)]`. The struct must also be `Keyed`
/// and every field type must be `Keyed`.
///
/// ```ignore
/// #[derive(Keyed, Emblem)]
/// struct Address {
///     #[emblem(name = street)]
///     line1: String,
///     zip: Option<i32>,
/// }
///
/// let emblem = Address::emblem()?;
/// assert_eq!(emblem.properties()[0].name(), "street");
/// ```
///
/// # Limitations
///
/// - Tuple structs, unit structs and enums are rejected
/// - Generic types are not supported
#[proc_macro_derive(Emblem, attributes(emblem))]
pub fn derive_emblem(item: TokenStream) -> TokenStream {
    emblem::derive_emblem_impl(item)
}

/// Implement `Shorthand` for a struct with exactly one field.
///
/// The abbreviated type is the field's type, which must be `Clone`, `Debug`
/// and `Keyed`.
///
/// ```ignore
/// #[derive(Clone, Keyed, Shorthand)]
/// struct Email(String);
/// ```
#[proc_macro_derive(Shorthand)]
pub fn derive_shorthand(item: TokenStream) -> TokenStream {
    shorthand::derive_shorthand_impl(item)
}
