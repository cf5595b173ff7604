//! Implementation of `#[derive(Keyed)]`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

use crate::common::{crate_path, parse_extends, reject_generics};

pub fn derive_keyed_impl(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    match generate_keyed(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_keyed(input: &DeriveInput) -> syn::Result<TokenStream2> {
    reject_generics(input, "Keyed")?;
    let supertypes = parse_extends(&input.attrs)?;
    let name = &input.ident;
    let krate = crate_path();

    // No `extends` keeps the trait's default, an empty lineage.
    if supertypes.is_empty() {
        return Ok(quote! {
            impl #krate::Keyed for #name {}
        });
    }

    Ok(quote! {
        impl #krate::Keyed for #name {
            fn supertypes() -> #krate::Lineage {
                #krate::Lineage::new()
                    #(.with::<#supertypes>())*
            }
        }
    })
}
