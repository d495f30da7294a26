use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, Type, parse_macro_input};

pub fn derive_component(input: TokenStream) -> TokenStream {
    // Parse the input tokens into a syntax tree
    let ast = parse_macro_input!(input as DeriveInput);

    match expand(&ast) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand(ast: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let storage = match storage_type(ast)? {
        Some(storage) => quote! { #storage },
        None => quote! { ::strata::store::MapStore<Self> },
    };

    // Inside the crate this resolves through `extern crate self as strata;` in lib.rs,
    // outside it resolves to the strata dependency.
    Ok(quote! {
        impl #impl_generics ::strata::component::Component for #name #ty_generics #where_clause {
            type Storage = #storage;
        }
    })
}

/// Read `#[component(storage = <type>)]`, if present.
fn storage_type(ast: &DeriveInput) -> syn::Result<Option<Type>> {
    let mut storage = None;
    for attr in ast.attrs.iter().filter(|a| a.path().is_ident("component")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("storage") {
                if storage.is_some() {
                    return Err(meta.error("duplicate `storage` option"));
                }
                storage = Some(meta.value()?.parse::<Type>()?);
                Ok(())
            } else {
                Err(meta.error("expected `storage = <type>`"))
            }
        })?;
    }
    Ok(storage)
}
