//! Implementation of `#[derive(Shorthand)]`
//!
//! A single-field wrapper abbreviates to its field. The generated extractor
//! clones in both directions and never fails.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, Fields, parse_macro_input};

use crate::common::{crate_path, reject_generics, struct_fields};

pub fn derive_shorthand_impl(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    match generate_shorthand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_shorthand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    reject_generics(input, "Shorthand")?;
    let fields = struct_fields(input, "Shorthand")?;
    if fields.len() != 1 {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "[emblem] #[derive(Shorthand)] requires a struct with exactly one field",
        ));
    }

    let (ty, apply, inverse) = match fields {
        Fields::Unnamed(unnamed) => {
            let ty = &unnamed.unnamed[0].ty;
            (
                ty,
                quote! { |value: &Self| ::core::clone::Clone::clone(&value.0) },
                quote! { |raw: &#ty| Self(::core::clone::Clone::clone(raw)) },
            )
        }
        Fields::Named(named) => {
            let field = &named.named[0];
            let ty = &field.ty;
            let ident = &field.ident;
            (
                ty,
                quote! { |value: &Self| ::core::clone::Clone::clone(&value.#ident) },
                quote! { |raw: &#ty| Self { #ident: ::core::clone::Clone::clone(raw) } },
            )
        }
        Fields::Unit => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "[emblem] #[derive(Shorthand)] cannot be used on unit structs",
            ));
        }
    };

    let name = &input.ident;
    let krate = crate_path();
    Ok(quote! {
        impl #krate::Shorthand for #name {
            type Abbreviated = #ty;

            fn shorthand() -> #krate::Extractor<Self, Self::Abbreviated> {
                #krate::Extractor::bijection(#apply, #inverse)
            }
        }
    })
}
