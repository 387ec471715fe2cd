//! Derive support for `helios-marshal`.
//!
//! `#[derive(XmlRecord)]` generates the static field descriptor and the
//! field accessor a record needs to be marshaled. Everything else (tag
//! parsing, caching, tree building) happens at runtime in `helios-marshal`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, GenericParam, parse_macro_input, parse_quote};

mod attrs;

use attrs::FieldAttrs;

/// # Derive XmlRecord
///
/// Implements `helios_marshal::XmlRecord` and `helios_marshal::XmlValue`
/// for a struct with named fields.
///
/// ```rust, ignore
/// #[derive(XmlRecord)]
/// struct Order {
///     #[xml("id,attr")]
///     id: u64,
///     #[xml("customer,omitempty")]
///     customer: Option<String>,
///     #[xml("lines>line")]
///     lines: Vec<Line>,
///     #[xml(embed)]
///     audit: Audit,
///     #[xml("-")]
///     cache_key: String,
/// }
/// ```
///
/// Fields without an `xml` attribute are serialized as child elements
/// named after the field. Type parameters must implement `XmlValue` and be
/// `'static`; lifetime parameters are not supported.
#[proc_macro_derive(XmlRecord, attributes(xml))]
pub fn derive_xml_record(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    match expand(ast) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

fn expand(mut ast: DeriveInput) -> syn::Result<TokenStream2> {
    let fields = match &ast.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named.named.iter().cloned().collect::<Vec<_>>(),
            _ => {
                return Err(syn::Error::new_spanned(
                    &ast.ident,
                    "XmlRecord can only be derived for structs with named fields",
                ));
            }
        },
        Data::Enum(_) | Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                &ast.ident,
                "XmlRecord can only be derived for structs",
            ));
        }
    };

    for param in ast.generics.params.iter_mut() {
        match param {
            GenericParam::Type(ty) => {
                ty.bounds.push(parse_quote!(::helios_marshal::XmlValue));
                ty.bounds.push(parse_quote!('static));
            }
            GenericParam::Lifetime(lifetime) => {
                return Err(syn::Error::new_spanned(
                    lifetime,
                    "XmlRecord cannot be derived for types with lifetime parameters",
                ));
            }
            GenericParam::Const(_) => {}
        }
    }

    let mut decls = Vec::with_capacity(fields.len());
    let mut arms = Vec::with_capacity(fields.len());
    for (index, field) in fields.iter().enumerate() {
        let attrs = FieldAttrs::parse_attrs(&field.attrs)?;
        // Named fields always carry an identifier.
        let Some(ident) = &field.ident else {
            continue;
        };
        let name = ident.unraw().to_string();
        let ty = &field.ty;
        let tag = match &attrs.tag {
            Some(tag) => quote!(::core::option::Option::Some(#tag)),
            None => quote!(::core::option::Option::None),
        };
        let embed = attrs.embed;

        decls.push(quote! {
            ::helios_marshal::FieldDecl::new(#name, #tag)
                .embedded(#embed)
                .element_name(<#ty as ::helios_marshal::XmlValue>::is_element_name())
        });
        arms.push(quote! {
            #index => ::core::option::Option::Some(&self.#ident as &dyn ::helios_marshal::XmlValue)
        });
    }

    let ident = &ast.ident;
    let type_name = ident.unraw().to_string();
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::helios_marshal::XmlRecord for #ident #ty_generics #where_clause {
            fn type_name(&self) -> &'static str {
                #type_name
            }

            fn type_key(&self) -> ::std::any::TypeId {
                ::std::any::TypeId::of::<Self>()
            }

            fn describe(&self) -> ::std::vec::Vec<::helios_marshal::FieldDecl> {
                ::std::vec![#(#decls),*]
            }

            fn field(&self, index: usize) -> ::core::option::Option<&dyn ::helios_marshal::XmlValue> {
                match index {
                    #(#arms,)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl #impl_generics ::helios_marshal::XmlValue for #ident #ty_generics #where_clause {
            fn as_value(&self) -> ::helios_marshal::ValueRef<'_> {
                ::helios_marshal::ValueRef::Record(self)
            }
        }
    })
}
