//! Derive macros for named-injector
//!
//! - `#[derive(Inject)]` - Generate a `Constructor` impl whose dependency
//!   names are the names of the `#[inject]` fields
//!
//! # Example
//!
//! ```rust,ignore
//! use named_injector::{Container, Inject};
//! use std::sync::Arc;
//!
//! #[derive(Inject)]
//! struct UserService {
//!     #[inject]
//!     database: Arc<Database>,
//!     #[inject(name = "cacheClient")]
//!     cache: Arc<Cache>,
//!     // Non-injected fields use Default
//!     request_count: u64,
//! }
//!
//! let container = Container::new();
//! container.service::<Database>("database");
//! container.service::<Cache>("cacheClient");
//! container.service::<UserService>("users");
//! ```

use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, Type, parse_macro_input};

/// Derive macro for constructor injection.
///
/// Field names are captured at compile time and become the dependency
/// names, in declaration order.
///
/// # Attributes
///
/// - `#[inject]` - Inject the dependency named after the field.
/// - `#[inject(name = "...")]` - Inject the dependency with the given name.
///
/// An injected field of type `Arc<T>` receives the dependency downcast to
/// `T`; a field of type `Value` (or `Arc<dyn Any + Send + Sync>`) receives
/// it as is. Fields without `#[inject]` use `Default::default()`.
///
/// # Generated Code
///
/// ```rust,ignore
/// impl Constructor for UserService {
///     fn dependencies() -> Signature {
///         Signature::explicit(["database", "cacheClient"])
///     }
///     fn construct(mut arguments: Arguments) -> Result<Construction<Self>> {
///         Ok(Construction::Instance(Self {
///             database: arguments.take::<Database>()?,
///             cache: arguments.take::<Cache>()?,
///             request_count: Default::default(),
///         }))
///     }
/// }
/// ```
#[proc_macro_derive(Inject, attributes(inject))]
pub fn derive_inject(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_inject(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_inject(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    // Only support structs with named fields
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Inject can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Inject can only be derived for structs",
            ));
        }
    };

    let mut dependency_names = Vec::new();
    let mut field_inits = Vec::new();

    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let field_type = &field.ty;

        let Some(attr) = find_inject_attr(&field.attrs)? else {
            // Non-injected field - use Default
            field_inits.push(quote! {
                #field_name: ::core::default::Default::default()
            });
            continue;
        };

        dependency_names.push(attr.name.unwrap_or_else(|| field_name.to_string()));

        let take = if is_erased_value(field_type) {
            quote! { arguments.take_value()? }
        } else if let Some(inner) = extract_arc_inner_type(field_type) {
            quote! { arguments.take::<#inner>()? }
        } else {
            return Err(syn::Error::new_spanned(
                field_type,
                "Fields marked with #[inject] must have type Arc<T> or Value",
            ));
        };
        field_inits.push(quote! { #field_name: #take });
    }

    let dependencies = if dependency_names.is_empty() {
        quote! { ::named_injector::Signature::empty() }
    } else {
        quote! { ::named_injector::Signature::explicit([#(#dependency_names),*]) }
    };

    Ok(quote! {
        impl #impl_generics ::named_injector::Constructor for #name #ty_generics #where_clause {
            fn dependencies() -> ::named_injector::Signature {
                #dependencies
            }

            #[allow(unused_mut, unused_variables)]
            fn construct(
                mut arguments: ::named_injector::Arguments,
            ) -> ::named_injector::Result<::named_injector::Construction<Self>> {
                ::core::result::Result::Ok(::named_injector::Construction::Instance(Self {
                    #(#field_inits),*
                }))
            }
        }
    })
}

/// Parsed `#[inject]` attribute
struct InjectAttr {
    name: Option<String>,
}

/// Find and parse the #[inject] attribute
fn find_inject_attr(attrs: &[Attribute]) -> syn::Result<Option<InjectAttr>> {
    let Some(attr) = attrs.iter().find(|attr| attr.path().is_ident("inject")) else {
        return Ok(None);
    };

    if attr.meta.require_path_only().is_ok() {
        return Ok(Some(InjectAttr { name: None }));
    }

    let mut name = None;
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("name") {
            let lit: LitStr = meta.value()?.parse()?;
            name = Some(lit.value());
            Ok(())
        } else {
            Err(meta.error("unsupported inject attribute, expected `name = \"...\"`"))
        }
    })?;

    Ok(Some(InjectAttr { name }))
}

/// `Value` or `Arc<dyn ...>`: handed over without a downcast
fn is_erased_value(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if type_path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Value" && segment.arguments.is_empty())
        {
            return true;
        }
    }
    matches!(extract_arc_inner_type(ty), Some(Type::TraitObject(_)))
}

/// Extract T from Arc<T>
fn extract_arc_inner_type(ty: &Type) -> Option<&Type> {
    if let Type::Path(type_path) = ty {
        let segment = type_path.path.segments.last()?;
        if segment.ident == "Arc" {
            if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                    return Some(inner);
                }
            }
        }
    }
    None
}
