mod component;

use proc_macro::TokenStream;

/// Implement `strata::component::Component`.
///
/// The store defaults to `MapStore<Self>`; pick another with
/// `#[component(storage = <type>)]`.
#[proc_macro_derive(Component, attributes(component))]
pub fn derive_component(item: TokenStream) -> TokenStream {
    component::derive_component(item)
}
