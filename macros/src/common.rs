//! Shared utilities for the emblem derives.

use proc_macro_crate::{FoundCrate, crate_name};
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::punctuated::Punctuated;
use syn::{Attribute, Data, DeriveInput, Expr, Fields, Ident, Meta, Token, Type};

/// Path generated code uses to reach the runtime crate.
///
/// Prefers the `emblem` facade over `emblem-core` and follows renames in the
/// deriving crate's manifest. Both crates alias themselves with
/// `extern crate self`, so `::emblem` and `::emblem_core` resolve inside
/// their own sources too.
pub(crate) fn crate_path() -> TokenStream2 {
    let found = crate_name("emblem")
        .map(|found| (found, "emblem"))
        .or_else(|_| crate_name("emblem-core").map(|found| (found, "emblem_core")));
    let name = match found {
        Ok((FoundCrate::Itself, own)) => own.to_string(),
        Ok((FoundCrate::Name(name), _)) => name,
        Err(_) => "emblem_core".to_string(),
    };
    let ident = Ident::new(&name, Span::call_site());
    quote!(::#ident)
}

/// Parse a single `key = value` from attribute tokens.
///
/// # Returns
/// - `Ok(Some(value))` if `key = value` is found.
/// - `Ok(None)` if the tokens are empty.
/// - `Err(...)` if malformed or another key is present.
pub(crate) fn parse_name_value(tokens: TokenStream2, key: &str) -> syn::Result<Option<Ident>> {
    if tokens.is_empty() {
        return Ok(None);
    }

    let meta: Meta = syn::parse2(tokens)?;
    match meta {
        Meta::NameValue(nv) if nv.path.is_ident(key) => {
            if let Expr::Path(expr_path) = &nv.value {
                if let Some(ident) = expr_path.path.get_ident() {
                    return Ok(Some(ident.clone()));
                }
            }
            Err(syn::Error::new_spanned(
                &nv.value,
                format!("[emblem] {} must be an identifier", key),
            ))
        }
        _ => Err(syn::Error::new_spanned(
            meta,
            format!("[emblem] expected `{} = identifier`, or no arguments", key),
        )),
    }
}

/// Name a field is published under: `#[emblem(name = other)]`, or the field's own.
pub(crate) fn property_name(attrs: &[Attribute], field: &Ident) -> syn::Result<String> {
    let Some(attr) = attrs.iter().find(|a| a.path().is_ident("emblem")) else {
        return Ok(unraw(field));
    };

    let tokens = match &attr.meta {
        Meta::Path(_) => TokenStream2::new(),
        Meta::List(list) => list.tokens.clone(),
        Meta::NameValue(_) => {
            return Err(syn::Error::new_spanned(
                attr,
                "[emblem] invalid attribute syntax for `#[emblem]`",
            ));
        }
    };

    let name = parse_name_value(tokens, "name")?.unwrap_or_else(|| field.clone());
    Ok(unraw(&name))
}

/// Supertypes listed in `#[keyed(extends(A, B, ...))]`, in declaration order.
pub(crate) fn parse_extends(attrs: &[Attribute]) -> syn::Result<Vec<Type>> {
    let mut supertypes = Vec::new();
    for attr in attrs.iter().filter(|a| a.path().is_ident("keyed")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("extends") {
                let content;
                syn::parenthesized!(content in meta.input);
                let listed = Punctuated::<Type, Token![,]>::parse_terminated(&content)?;
                supertypes.extend(listed);
                Ok(())
            } else {
                Err(meta.error("[emblem] expected `extends(Type, ...)`"))
            }
        })?;
    }
    Ok(supertypes)
}

/// Keys are per concrete type, so generic items cannot be derived.
pub(crate) fn reject_generics(input: &DeriveInput, derive: &str) -> syn::Result<()> {
    if input.generics.params.is_empty() {
        return Ok(());
    }
    Err(syn::Error::new_spanned(
        &input.generics,
        format!("[emblem] #[derive({})] does not support generic types", derive),
    ))
}

/// Fields of a struct, rejecting enums and unions.
pub(crate) fn struct_fields<'a>(input: &'a DeriveInput, derive: &str) -> syn::Result<&'a Fields> {
    match &input.data {
        Data::Struct(data) => Ok(&data.fields),
        _ => Err(syn::Error::new_spanned(
            &input.ident,
            format!("[emblem] #[derive({})] can only be used on structs", derive),
        )),
    }
}

fn unraw(ident: &Ident) -> String {
    let name = ident.to_string();
    match name.strip_prefix("r#") {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_crate_path_follows_manifest() {
        // This crate sees the runtime only through its `emblem-core` dev-dependency.
        assert_eq!(crate_path().to_string(), ":: emblem_core");
    }

    #[test]
    fn test_parse_name_value() {
        let parsed = parse_name_value(quote!(name = street), "name").unwrap();
        assert_eq!(parsed.unwrap().to_string(), "street");
        assert!(parse_name_value(TokenStream2::new(), "name").unwrap().is_none());
        assert!(parse_name_value(quote!(other = street), "name").is_err());
        assert!(parse_name_value(quote!(name = "street"), "name").is_err());
    }

    #[test]
    fn test_property_name_defaults_to_field() {
        let field: Ident = parse_quote!(r#type);
        assert_eq!(property_name(&[], &field).unwrap(), "type");

        let attrs: Vec<Attribute> = vec![parse_quote!(#[emblem(name = kind)])];
        assert_eq!(property_name(&attrs, &field).unwrap(), "kind");
    }

    #[test]
    fn test_parse_extends() {
        let attrs: Vec<Attribute> = vec![
            parse_quote!(#[keyed(extends(dyn Shape, AnyShape))]),
            parse_quote!(#[keyed(extends(Named))]),
        ];
        let supertypes = parse_extends(&attrs).unwrap();
        let rendered: Vec<String> = supertypes.iter().map(|ty| quote!(#ty).to_string()).collect();
        assert_eq!(rendered, ["dyn Shape", "AnyShape", "Named"]);

        let bad: Vec<Attribute> = vec![parse_quote!(#[keyed(implements(Shape))])];
        assert!(parse_extends(&bad).is_err());
    }

    #[test]
    fn test_reject_generics() {
        let plain: DeriveInput = parse_quote!(struct Point { x: i32 });
        assert!(reject_generics(&plain, "Emblem").is_ok());

        let generic: DeriveInput = parse_quote!(struct Wrapper<T> { inner: T });
        let err = reject_generics(&generic, "Emblem").unwrap_err();
        assert!(err.to_string().starts_with("[emblem]"));
    }
}
