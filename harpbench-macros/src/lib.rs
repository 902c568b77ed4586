//! HarpBench Macros
//!
//! Procedural macros for compile-time test discovery.
//!
//! ## Macros
//!
//! - `#[suite]` - Turn an inherent impl block into a test suite
//! - `#[harp_test]` - Tag a method inside a `#[suite]` block as a test case

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{Attribute, FnArg, ImplItem, ImplItemFn, ItemImpl, Meta, parse_macro_input};

// ============================================================================
// Attribute Parsing Helpers
// ============================================================================

mod attr {
    use syn::meta::ParseNestedMeta;

    /// Get the attribute name as a string
    pub fn name(meta: &ParseNestedMeta) -> String {
        meta.path
            .get_ident()
            .map(|i| i.to_string())
            .unwrap_or_default()
    }

    /// Parse a string literal attribute: `attr = "value"`
    pub fn string(meta: &ParseNestedMeta) -> syn::Result<String> {
        let value: syn::LitStr = meta.value()?.parse()?;
        Ok(value.value())
    }

    /// Create an unknown attribute error
    pub fn unknown(meta: &ParseNestedMeta, name: &str) -> syn::Error {
        meta.error(format!("unknown attribute: {}", name))
    }
}

/// Turn an inherent impl block into a test suite
///
/// Every method tagged `#[harp_test]` becomes a test case, in declaration
/// order. A test method takes `&self` and the device endpoint (`&str`), may
/// be `async`, and returns anything implementing `IntoTestResult`.
///
/// # Example
///
/// ```ignore
/// struct RegisterTests { connector: Arc<dyn Connector> }
///
/// #[suite(description = "Register Tests")]
/// impl RegisterTests {
///     #[harp_test(description = "WhoAmI holds a valid id")]
///     async fn check_who_am_i(&self, port: &str) -> anyhow::Result<ValueResult<u16>> {
///         let mut device = self.connector.open(port).await?;
///         let id = device.read_who_am_i().await?;
///         Ok(ValueResult::evaluate(id, |v| *v > 0 && *v < 9999))
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn suite(args: TokenStream, item: TokenStream) -> TokenStream {
    let args = TokenStream2::from(args);
    let block = parse_macro_input!(item as ItemImpl);

    suite_impl(args, block)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Tag a test case inside a `#[suite]` impl block
///
/// Consumed by `#[suite]`; on its own it is a compile error.
#[proc_macro_attribute]
pub fn harp_test(_args: TokenStream, item: TokenStream) -> TokenStream {
    let item = TokenStream2::from(item);
    let error = syn::Error::new(
        proc_macro2::Span::call_site(),
        "#[harp_test] is only valid on methods inside a #[suite] impl block",
    )
    .to_compile_error();
    quote! { #error #item }.into()
}

#[derive(Default)]
struct SuiteConfig {
    description: Option<String>,
    name: Option<String>,
}

struct TestMethod {
    ident: syn::Ident,
    is_async: bool,
    description: String,
}

fn suite_impl(args: TokenStream2, mut block: ItemImpl) -> Result<TokenStream2, syn::Error> {
    let config = parse_suite_config(args)?;

    if let Some((_, path, _)) = &block.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[suite] must be placed on an inherent impl block",
        ));
    }

    // Collect tagged methods in source order, stripping the marker attribute
    let mut methods = Vec::new();
    for item in &mut block.items {
        if let ImplItem::Fn(method) = item {
            if let Some(description) = take_test_attr(&mut method.attrs)? {
                validate_signature(method)?;
                methods.push(TestMethod {
                    ident: method.sig.ident.clone(),
                    is_async: method.sig.asyncness.is_some(),
                    description,
                });
            }
        }
    }

    let self_ty = &block.self_ty;
    let (impl_generics, _, where_clause) = block.generics.split_for_impl();

    let runners: Vec<TokenStream2> = methods.iter().map(generate_runner).collect();

    let cases = methods.iter().map(|m| {
        let name = m.ident.to_string();
        let description = &m.description;
        let runner = format_ident!("__harp_run_{}", m.ident);
        quote! {
            ::harpbench::TestCase {
                name: #name,
                description: #description,
                run: Self::#runner,
            }
        }
    });

    let description = config.description.unwrap_or_default();
    let name_fn = config.name.map(|name| {
        quote! {
            fn name(&self) -> &str {
                #name
            }
        }
    });

    Ok(quote! {
        #block

        #[doc(hidden)]
        impl #impl_generics #self_ty #where_clause {
            #(#runners)*
        }

        impl #impl_generics ::harpbench::TestSuite for #self_ty #where_clause {
            fn description(&self) -> &str {
                #description
            }

            fn test_cases() -> ::std::vec::Vec<::harpbench::TestCase<Self>> {
                ::std::vec![#(#cases),*]
            }

            #name_fn
        }
    })
}

fn generate_runner(method: &TestMethod) -> TokenStream2 {
    let ident = &method.ident;
    let runner = format_ident!("__harp_run_{}", ident);
    let call = if method.is_async {
        quote! { suite.#ident(endpoint).await }
    } else {
        quote! { suite.#ident(endpoint) }
    };

    // The call happens inside the future so a panicking body is observed
    // when the suite polls it.
    quote! {
        fn #runner<'__harp>(
            suite: &'__harp Self,
            endpoint: &'__harp str,
        ) -> ::harpbench::internal::BoxFuture<
            '__harp,
            ::harpbench::internal::anyhow::Result<::harpbench::TestResult>,
        > {
            ::std::boxed::Box::pin(async move {
                ::harpbench::IntoTestResult::into_test_result(#call)
            })
        }
    }
}

fn parse_suite_config(args: TokenStream2) -> Result<SuiteConfig, syn::Error> {
    let mut config = SuiteConfig::default();

    if args.is_empty() {
        return Ok(config);
    }

    let parser = syn::meta::parser(|meta| {
        let name = attr::name(&meta);
        match name.as_str() {
            "description" => config.description = Some(attr::string(&meta)?),
            "name" => config.name = Some(attr::string(&meta)?),
            _ => return Err(attr::unknown(&meta, &name)),
        }
        Ok(())
    });

    syn::parse::Parser::parse2(parser, args)?;
    Ok(config)
}

fn is_test_attr(attr: &Attribute) -> bool {
    attr.path()
        .segments
        .last()
        .is_some_and(|segment| segment.ident == "harp_test")
}

/// Strip the `#[harp_test]` marker from `attrs`, returning its description
fn take_test_attr(attrs: &mut Vec<Attribute>) -> syn::Result<Option<String>> {
    let Some(index) = attrs.iter().position(is_test_attr) else {
        return Ok(None);
    };
    let marker = attrs.remove(index);
    if let Some(duplicate) = attrs.iter().find(|a| is_test_attr(a)) {
        return Err(syn::Error::new_spanned(
            duplicate,
            "duplicate #[harp_test] attribute",
        ));
    }

    let mut description = String::new();
    if let Meta::List(_) = &marker.meta {
        marker.parse_nested_meta(|meta| {
            let name = attr::name(&meta);
            match name.as_str() {
                "description" => description = attr::string(&meta)?,
                _ => return Err(attr::unknown(&meta, &name)),
            }
            Ok(())
        })?;
    }
    Ok(Some(description))
}

fn validate_signature(method: &ImplItemFn) -> syn::Result<()> {
    let sig = &method.sig;

    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "test methods cannot be generic",
        ));
    }

    let mut inputs = sig.inputs.iter();
    match inputs.next() {
        Some(FnArg::Receiver(receiver))
            if receiver.reference.is_some() && receiver.mutability.is_none() => {}
        _ => {
            return Err(syn::Error::new_spanned(
                &sig.ident,
                "test methods must take `&self` as their first argument",
            ));
        }
    }

    match (inputs.next(), inputs.next()) {
        (Some(FnArg::Typed(_)), None) => Ok(()),
        _ => Err(syn::Error::new_spanned(
            &sig.inputs,
            "test methods must take exactly one endpoint argument: `port: &str`",
        )),
    }
}
