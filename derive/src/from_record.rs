use std::collections::HashSet;

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Data, DeriveInput, Error, ExprClosure, Field, Fields, GenericArgument, Ident, LitStr, Pat,
    PathArguments, Result, Token, Type,
    parse::{Parse, ParseStream},
    spanned::Spanned,
};

pub(crate) fn expand_from_record(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        Err(Error::new(
            input.span(),
            "`FromRecord` may only be derived on structs.",
        ))?
    };

    let Fields::Named(fields) = &data.fields else {
        Err(Error::new(
            input.span(),
            "`FromRecord` may only be derived on structs with named fields.",
        ))?
    };

    let fields = fields
        .named
        .iter()
        .map(FieldMetadata::parse)
        .map(Result::transpose)
        .flatten() // Skip fields without an attribute.
        .collect::<Result<Vec<_>>>()?;

    let mut identifiers = HashSet::new();

    for field in &fields {
        if !identifiers.insert(field.identifier.value()) {
            Err(Error::new(
                field.identifier.span(),
                "Field identifiers must be unique.",
            ))?;
        }
    }

    let cases = fields.into_iter().map(|field| {
        let FieldMetadata {
            name,
            identifier,
            receiver,
        } = field;

        let assignment = match receiver {
            Receiver::Value(inner) => quote! {
                if let Some(value) =
                    <#inner as ::gdv_records::avec::FieldValue>::from_field(field)
                {
                    self.#name = Some(value);
                }
            },
            Receiver::Handler(field_type, handler) => {
                let body = handler.body;
                let mut inputs = handler.inputs.iter();
                let acc = inputs.next();
                let val = inputs.next();

                quote! {
                    (|#acc: &mut #field_type, #val| { #body })(&mut self.#name, field)
                }
            }
        };

        quote! { #identifier => { #assignment } }
    });

    let name = &input.ident;

    let expanded = quote! {
        impl ::gdv_records::avec::FromRecord for #name {
            fn add_field(&mut self, field: &::gdv_records::field::Field) {
                match field.name() {
                    #(#cases)*
                    _ => {}
                };
            }
        }
    };

    Ok(expanded.into())
}

#[derive(Debug)]
struct FieldMetadata {
    name: Ident,
    identifier: LitStr,
    receiver: Receiver,
}

#[derive(Debug)]
enum Receiver {
    /// The `T` of an `Option<T>` struct field.
    Value(Type),
    /// The struct field's type, and a closure receiving the field.
    Handler(Type, ExprClosure),
}

impl FieldMetadata {
    fn parse(field: &Field) -> Result<Option<Self>> {
        let Some(name) = field.ident.clone() else {
            return Ok(None);
        };

        let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("field")) else {
            return Ok(None);
        };

        let FieldAttribute {
            identifier,
            handler,
        } = attr.meta.require_list()?.parse_args()?;

        let receiver = if let Some(handler) = handler {
            if handler.inputs.len() != 2 {
                Err(Error::new_spanned(
                    &handler,
                    "Handler closure must have two parameters.",
                ))?
            }

            if let Some(parameter) = handler.inputs.iter().nth(1) {
                if !matches!(parameter, Pat::Type(_)) {
                    Err(Error::new_spanned(
                        parameter,
                        "Handler closure's second parameter must be annotated as `&Field`.",
                    ))?
                }
            }

            Receiver::Handler(field.ty.clone(), handler)
        } else {
            Receiver::Value(option_inner(&field.ty)?.clone())
        };

        Ok(Some(Self {
            name,
            identifier,
            receiver,
        }))
    }
}

fn option_inner(ty: &Type) -> Result<&Type> {
    let Type::Path(path) = ty else {
        Err(Error::new_spanned(ty, "Field must have a type annotation."))?
    };

    let Some(segment) = path.path.segments.first() else {
        Err(Error::new_spanned(
            &path.path.segments,
            "Field must have a type annotation.",
        ))?
    };

    if segment.ident != "Option" {
        Err(Error::new_spanned(
            &segment.ident,
            "Field without a handler must have type `Option<T>`.",
        ))?
    }

    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        Err(Error::new_spanned(
            &segment.arguments,
            "Field of type `Option<T>` must have a generic parameter.",
        ))?
    };

    let Some(GenericArgument::Type(inner)) = arguments.args.first() else {
        Err(Error::new_spanned(
            &arguments.args,
            "Generic argument of a field of type `Option<T>` must be a type.",
        ))?
    };

    Ok(inner)
}

#[derive(Debug)]
struct FieldAttribute {
    identifier: LitStr,
    handler: Option<ExprClosure>,
}

impl Parse for FieldAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let identifier = input.parse::<LitStr>()?;

        let handler = if !input.is_empty() {
            input.parse::<Token![,]>()?;
            Some(input.parse::<ExprClosure>()?)
        } else {
            None
        };

        Ok(Self {
            identifier,
            handler,
        })
    }
}
