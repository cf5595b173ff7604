//! Implementation of `#[derive(Emblem)]`
//!
//! Generates a `Record` impl whose schema lists every named field, in
//! declaration order, with a constructor that consumes them in that order.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, Fields, parse_macro_input};

use crate::common::{crate_path, property_name, reject_generics, struct_fields};

pub fn derive_emblem_impl(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    match generate_emblem(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_emblem(input: &DeriveInput) -> syn::Result<TokenStream2> {
    reject_generics(input, "Emblem")?;
    let fields = match struct_fields(input, "Emblem")? {
        Fields::Named(named) => &named.named,
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "[emblem] #[derive(Emblem)] requires a struct with named fields",
            ));
        }
    };

    let name = &input.ident;
    let krate = crate_path();
    let mut properties = Vec::with_capacity(fields.len());
    let mut assignments = Vec::with_capacity(fields.len());
    for field in fields {
        // Named fields always carry an ident.
        let Some(ident) = &field.ident else {
            continue;
        };
        let ty = &field.ty;
        let published = property_name(&field.attrs, ident)?;
        properties.push(quote! {
            #krate::Property::<Self, #ty>::new(#published, |record| &record.#ident).into()
        });
        assignments.push(quote! { #ident: args.next()? });
    }

    Ok(quote! {
        impl #krate::Record for #name {
            fn emblem() -> ::core::result::Result<
                #krate::Emblem<Self>,
                #krate::EmblemError,
            > {
                #krate::Emblem::new(
                    ::std::vec![#(#properties),*],
                    |args| ::core::result::Result::Ok(Self { #(#assignments),* }),
                )
            }
        }
    })
}
