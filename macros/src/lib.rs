use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, spanned::Spanned, Ident, ItemFn, LitStr};

/// Test attribute shared by the crate's unit and integration tests.
///
/// Sync functions expand to `#[test]`. Async functions expand to
/// `#[tokio::test]`, optionally with a flavor: `local` (current thread) or
/// `shared` (multi thread).
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
  let input = parse_macro_input!(item as ItemFn);

  let is_async = input.sig.asyncness.is_some();

  let raw_args = proc_macro2::TokenStream::from(attr);
  let tokio_args = if raw_args.is_empty() {
    proc_macro2::TokenStream::new()
  } else {
    if !is_async {
      return syn::Error::new(
        raw_args.span(),
        "rxflow_macro::test flavor args are only supported for async tests",
      )
      .to_compile_error()
      .into();
    }

    let flavor = if let Ok(ident) = syn::parse2::<Ident>(raw_args.clone()) {
      (ident.to_string(), ident.span())
    } else if let Ok(lit) = syn::parse2::<LitStr>(raw_args.clone()) {
      (lit.value(), lit.span())
    } else {
      return syn::Error::new(
        raw_args.span(),
        "rxflow_macro::test only accepts: `local` or `shared`",
      )
      .to_compile_error()
      .into();
    };

    match flavor.0.as_str() {
      "local" => quote!(flavor = "current_thread"),
      "shared" => quote!(flavor = "multi_thread"),
      _ => {
        return syn::Error::new(flavor.1, "rxflow_macro::test only accepts: `local` or `shared`")
          .to_compile_error()
          .into();
      }
    }
  };

  let native_attr = if is_async { quote!(tokio::test(#tokio_args)) } else { quote!(test) };

  let expanded = quote! {
      #[#native_attr]
      #input
  };

  TokenStream::from(expanded)
}
