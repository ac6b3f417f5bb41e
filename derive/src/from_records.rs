use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Data, DeriveInput, Error, Field, Fields, Ident, LitStr, Result, Type,
    parse::{Parse, ParseStream},
};

pub(crate) fn expand_from_records(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        Err(Error::new_spanned(
            input,
            "`FromRecords` may only be derived on structs.",
        ))?
    };

    let Fields::Named(fields) = &data.fields else {
        Err(Error::new_spanned(
            input,
            "`FromRecords` may only be derived on structs with named fields.",
        ))?
    };

    let mut fields = fields
        .named
        .iter()
        .map(FieldMetadata::parse)
        .map(Result::transpose)
        .flatten() // Skip fields without an attribute.
        .collect::<Result<Vec<_>>>()?;

    // The most specific key a record lies within wins.
    fields.sort_by(|a, b| b.key.depth().cmp(&a.key.depth()));

    let cases = fields.iter().map(|field| {
        let FieldMetadata { name, key, is_vec } = field;

        let assignment = if *is_vec {
            quote! {
                self.#name.push(Default::default());
                return self.#name.last_mut().map(|r| r as _);
            }
        } else {
            quote! {
                return Some(self.#name.insert(Default::default()));
            }
        };

        let key = key.to_tokens();

        quote! {
            if key.is_within(&#key) {
                #assignment
            }
        }
    });

    let name = &input.ident;

    let expanded = quote! {
        impl ::gdv_records::avec::FromRecords for #name {
            fn add_record(
                &mut self,
                key: &::gdv_records::key::TypeKey,
            ) -> Option<&mut dyn ::gdv_records::avec::FromRecord> {
                #(#cases)*
                None
            }
        }
    };

    Ok(expanded.into())
}

#[derive(Debug)]
struct FieldMetadata {
    name: Ident,
    key: Key,
    is_vec: bool,
}

impl FieldMetadata {
    fn parse(field: &Field) -> Result<Option<Self>> {
        let Some(name) = field.ident.clone() else {
            return Ok(None);
        };

        let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("record")) else {
            return Ok(None);
        };

        let RecordAttribute { key } = attr.meta.require_list()?.parse_args()?;

        let Type::Path(path) = &field.ty else {
            Err(Error::new_spanned(
                &field.ty,
                "Field must have a type annotation.",
            ))?
        };

        let Some(segment) = path.path.segments.first() else {
            Err(Error::new_spanned(
                &path.path.segments,
                "Field must have an `Option<T>` or `Vec<T>` type.",
            ))?
        };

        let is_vec = if segment.ident == "Option" {
            false
        } else if segment.ident == "Vec" {
            true
        } else {
            Err(Error::new_spanned(
                &segment.ident,
                "Field must have an `Option<T>` or `Vec<T>` type.",
            ))?
        };

        Ok(Some(Self { name, key, is_vec }))
    }
}

/// A type key, checked while expanding.
#[derive(Debug)]
struct Key {
    kind: u16,
    branch: Option<u16>,
    sub_branch: Option<u16>,
    sequence: Option<u8>,
}

impl Key {
    fn depth(&self) -> usize {
        1 + self.branch.is_some() as usize
            + self.sub_branch.is_some() as usize
            + self.sequence.is_some() as usize
    }

    fn to_tokens(&self) -> TokenStream2 {
        let kind = self.kind;
        let mut tokens = quote! { ::gdv_records::key::TypeKey::new(#kind) };

        if let Some(branch) = self.branch {
            tokens = quote! { #tokens.with_branch(#branch) };
        }
        if let Some(sub_branch) = self.sub_branch {
            tokens = quote! { #tokens.with_sub_branch(#sub_branch) };
        }
        if let Some(sequence) = self.sequence {
            tokens = quote! { #tokens.with_sequence(#sequence) };
        }

        tokens
    }
}

#[derive(Debug)]
struct RecordAttribute {
    key: Key,
}

impl Parse for RecordAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let literal = input.parse::<LitStr>()?;
        let value = literal.value();

        let invalid = || {
            Error::new_spanned(
                &literal,
                "Record key must have the form `KKKK[.BBB[.S[.N]]]`.",
            )
        };

        let parts = value
            .split('.')
            .map(|p| p.trim().parse::<u16>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>>>()?;

        let (kind, branch, sub_branch, sequence) = match parts[..] {
            [kind] => (kind, None, None, None),
            [kind, branch] => (kind, Some(branch), None, None),
            [kind, branch, sub_branch] => (kind, Some(branch), Some(sub_branch), None),
            [kind, branch, sub_branch, sequence] => (
                kind,
                Some(branch),
                Some(sub_branch),
                Some(u8::try_from(sequence).map_err(|_| invalid())?),
            ),
            _ => Err(invalid())?,
        };

        Ok(Self {
            key: Key {
                kind,
                branch,
                sub_branch,
                sequence,
            },
        })
    }
}
