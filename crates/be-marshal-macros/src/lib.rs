//! Proc macros for be-marshal composites
//!
//! Provides `#[derive(Marshal)]`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, parse_quote, DeriveInput, Expr, Fields, GenericArgument, Ident, Member,
    PathArguments, Type,
};

/// Derive macro for composite types
///
/// Generates a `be_marshal::Marshal` implementation that sizes, reads and
/// writes every field in declaration order.
///
/// # Attributes
///
/// - `#[marshal(len = N)]` - Marks a `Vec<T>` or `Box<[T]>` field as an array
///   of exactly `N` elements. `N` may be any constant expression.
/// - `#[marshal(skip)]` - Leaves the field off the wire; it is filled with
///   `Default::default()` when reading.
///
/// # Example
///
/// ```ignore
/// use be_marshal::Marshal;
///
/// #[derive(Marshal)]
/// pub struct Packet {
///     pub kind: u8,
///     pub checksum: [u16; 2],
///     #[marshal(len = 16)]
///     pub body: Vec<u32>,
/// }
/// ```
#[proc_macro_derive(Marshal, attributes(marshal))]
pub fn derive_marshal(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

struct FieldSpec {
    member: Member,
    name: String,
    ty: Type,
    len: Option<Expr>,
    skip: bool,
}

impl FieldSpec {
    fn parse(index: usize, field: &syn::Field) -> syn::Result<Self> {
        let (member, name) = match &field.ident {
            Some(ident) => {
                let name = ident.to_string();
                let name = name.strip_prefix("r#").unwrap_or(&name).to_owned();
                (Member::Named(ident.clone()), name)
            }
            None => (Member::Unnamed(index.into()), index.to_string()),
        };

        let mut len = None;
        let mut skip = false;
        for attr in &field.attrs {
            if attr.path().is_ident("marshal") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("len") {
                        len = Some(meta.value()?.parse::<Expr>()?);
                        Ok(())
                    } else if meta.path.is_ident("skip") {
                        skip = true;
                        Ok(())
                    } else {
                        Err(meta.error("expected `len = ...` or `skip`"))
                    }
                })?;
            }
        }

        if skip && len.is_some() {
            return Err(syn::Error::new_spanned(
                field,
                "`skip` and `len` cannot be combined",
            ));
        }

        Ok(Self {
            member,
            name,
            ty: field.ty.clone(),
            len,
            skip,
        })
    }
}

/// True if `ty` names `Self` or the type being derived
///
/// Only an unqualified `Name` counts: `other::Name` is a different type.
fn contains_self(ty: &Type, name: &Ident) -> bool {
    match ty {
        Type::Array(array) => contains_self(&array.elem, name),
        Type::Slice(slice) => contains_self(&slice.elem, name),
        Type::Paren(paren) => contains_self(&paren.elem, name),
        Type::Group(group) => contains_self(&group.elem, name),
        Type::Tuple(tuple) => tuple.elems.iter().any(|elem| contains_self(elem, name)),
        Type::Path(type_path) => {
            if let Some(qself) = &type_path.qself {
                if contains_self(&qself.ty, name) {
                    return true;
                }
            }
            let path = &type_path.path;
            if path.leading_colon.is_none() {
                if let Some(first) = path.segments.first() {
                    if first.ident == "Self" {
                        return true;
                    }
                    if path.segments.len() == 1 && first.ident == *name {
                        return true;
                    }
                }
            }
            path.segments.iter().any(|segment| match &segment.arguments {
                PathArguments::AngleBracketed(args) => args.args.iter().any(|arg| match arg {
                    GenericArgument::Type(ty) => contains_self(ty, name),
                    _ => false,
                }),
                _ => false,
            })
        }
        _ => false,
    }
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    let fields = match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields.named.iter().collect::<Vec<_>>(),
            Fields::Unnamed(fields) => fields.unnamed.iter().collect::<Vec<_>>(),
            Fields::Unit => Vec::new(),
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Marshal can only be derived for structs",
            ))
        }
    };

    let specs = fields
        .iter()
        .enumerate()
        .map(|(i, f)| FieldSpec::parse(i, f))
        .collect::<syn::Result<Vec<_>>>()?;

    // A composite may not (directly) contain itself: the layout would be unbounded.
    for (spec, field) in specs.iter().zip(&fields) {
        if !spec.skip && contains_self(&spec.ty, name) {
            return Err(syn::Error::new_spanned(
                &field.ty,
                "a Marshal composite cannot contain itself",
            ));
        }
    }

    let mut generics = input.generics.clone();
    let type_params = generics
        .type_params()
        .map(|p| p.ident.clone())
        .collect::<Vec<_>>();
    {
        let where_clause = generics.make_where_clause();
        for param in &type_params {
            where_clause
                .predicates
                .push(parse_quote!(#param: ::be_marshal::Marshal));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let type_name = name.to_string();
    let active = specs.iter().filter(|s| !s.skip).collect::<Vec<_>>();

    let descriptor_fields = active.iter().map(|s| {
        let field_name = &s.name;
        let ty = &s.ty;
        let desc = match &s.len {
            Some(len) => quote! { <#ty as ::be_marshal::array::FixedSeq>::descriptor(#len) },
            None => quote! { <#ty as ::be_marshal::Marshal>::descriptor() },
        };
        quote! { ::be_marshal::FieldDescriptor::new(#field_name, #desc) }
    });

    let size_terms = active.iter().map(|s| {
        let ty = &s.ty;
        match &s.len {
            Some(len) => quote! {
                size = <<#ty as ::be_marshal::array::FixedSeq>::Item as ::be_marshal::Marshal>::size()?
                    .checked_mul(#len)
                    .and_then(|n| size.checked_add(n))
                    .ok_or_else(::be_marshal::Error::size_overflow)?;
            },
            None => quote! {
                size = size
                    .checked_add(<#ty as ::be_marshal::Marshal>::size()?)
                    .ok_or_else(::be_marshal::Error::size_overflow)?;
            },
        }
    });

    // Struct expression fields are evaluated in source order, which keeps
    // reads in declaration order.
    let read_fields = specs.iter().map(|s| {
        let member = &s.member;
        let ty = &s.ty;
        if s.skip {
            quote! { #member: ::core::default::Default::default() }
        } else if let Some(len) = &s.len {
            quote! { #member: <#ty as ::be_marshal::array::FixedSeq>::read_fixed(reader, #len)? }
        } else {
            quote! { #member: <#ty as ::be_marshal::Marshal>::read(reader)? }
        }
    });

    let write_fields = active.iter().map(|s| {
        let member = &s.member;
        match &s.len {
            Some(len) => quote! {
                ::be_marshal::array::FixedSeq::write_fixed(&self.#member, writer, #len)?;
            },
            None => quote! {
                ::be_marshal::Marshal::write(&self.#member, writer)?;
            },
        }
    });

    Ok(quote! {
        impl #impl_generics ::be_marshal::Marshal for #name #ty_generics #where_clause {
            fn descriptor() -> ::be_marshal::TypeDescriptor {
                ::be_marshal::TypeDescriptor::composite(
                    #type_name,
                    ::std::vec![#(#descriptor_fields),*],
                )
            }

            #[allow(unused_variables)]
            fn read(reader: &mut ::be_marshal::Reader<'_>) -> ::be_marshal::Result<Self> {
                ::core::result::Result::Ok(Self {
                    #(#read_fields,)*
                })
            }

            #[allow(unused_variables)]
            fn write(&self, writer: &mut ::be_marshal::Writer<'_>) -> ::be_marshal::Result<()> {
                #(#write_fields)*
                ::core::result::Result::Ok(())
            }

            #[allow(unused_mut)]
            fn size() -> ::be_marshal::Result<usize> {
                let mut size = 0usize;
                #(#size_terms)*
                ::core::result::Result::Ok(size)
            }
        }
    })
}
