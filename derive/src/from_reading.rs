use std::collections::HashSet;

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Data, DeriveInput, Error, ExprClosure, Field, Fields, GenericArgument, Ident, LitInt, Pat,
    Path, PathArguments, Result, Token, Type,
    parse::{Parse, ParseStream},
    spanned::Spanned,
};

pub(crate) fn expand_from_reading(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        Err(Error::new(
            input.span(),
            "`FromReading` may only be derived on structs.",
        ))?
    };

    let Fields::Named(fields) = &data.fields else {
        Err(Error::new(
            input.span(),
            "`FromReading` may only be derived on structs with named fields.",
        ))?
    };

    let fields = fields
        .named
        .iter()
        .map(FieldMetadata::parse)
        .map(Result::transpose)
        .flatten() // Skip fields without an attribute.
        .collect::<Result<Vec<_>>>()?;

    let mut seen = HashSet::new();

    for field in &fields {
        let slot = field.slot.tokens();

        if !seen.insert(slot.to_string()) {
            Err(Error::new_spanned(slot, "Slot identifiers must be unique."))?
        }
    }

    let cases = fields.into_iter().map(|field| {
        let FieldMetadata {
            name,
            slot,
            primitive,
            handler,
        } = field;

        let slot = slot.tokens();

        let assignment = if let Some((field_type, handler)) = handler {
            let body = handler.body;
            let acc = handler.inputs.iter().nth(0).unwrap();
            let val = handler.inputs.iter().nth(1).unwrap();

            quote! {
                (|#acc: &mut #field_type, #val| {#body})(&mut self.#name, value)
            }
        } else {
            quote! {
                self.#name = Some(value as #primitive)
            }
        };

        // A guard keeps a misnamed constant from binding as a catch-all.
        quote! { _ if slot == #slot => { #assignment } }
    });

    let name = &input.ident;

    let expanded = quote! {
        impl FromReading for #name {
            #[allow(unused_variables)]
            fn add_value(&mut self, slot: u8, value: f64) {
                match slot {
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
    slot: SlotIdentifier,
    primitive: Option<Type>,
    handler: Option<(Type, ExprClosure)>,
}

#[derive(Debug)]
enum SlotIdentifier {
    Number(LitInt),
    Constant(Path),
}

impl SlotIdentifier {
    fn tokens(&self) -> impl quote::ToTokens + std::fmt::Display {
        match self {
            SlotIdentifier::Number(number) => quote! { #number },
            SlotIdentifier::Constant(path) => quote! { #path },
        }
    }
}

impl FieldMetadata {
    fn parse(field: &Field) -> Result<Option<Self>> {
        let name = field.ident.clone().unwrap();

        let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("field")) else {
            return Ok(None);
        };

        let FieldAttribute { slot, handler } = attr.meta.require_list()?.parse_args()?;

        let primitive = if let Some(handler) = &handler {
            let Some(parameter) = handler.inputs.iter().nth(1) else {
                Err(Error::new_spanned(
                    handler,
                    "Handler closure must have two parameters.",
                ))?
            };

            let Pat::Type(_) = parameter else {
                Err(Error::new_spanned(
                    parameter,
                    "Handler closure's second parameter must be annotated as `f64`.",
                ))?
            };

            None
        } else {
            let Type::Path(path) = &field.ty else {
                Err(Error::new_spanned(
                    &field.ty,
                    "Field must have a type annotation.",
                ))?
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

            let Some(argument) = arguments.args.first() else {
                Err(Error::new_spanned(
                    &arguments.args,
                    "Field of type `Option<T>` must have a generic parameter.",
                ))?
            };

            let GenericArgument::Type(inner_type) = argument else {
                Err(Error::new_spanned(
                    argument,
                    "Generic argument of a field of type `Option<T>` must be a type.",
                ))?
            };

            Some(inner_type.clone())
        };

        let handler = handler.map(|h| (field.ty.clone(), h));

        Ok(Some(Self {
            name,
            slot,
            primitive,
            handler,
        }))
    }
}

#[derive(Debug)]
struct FieldAttribute {
    slot: SlotIdentifier,
    handler: Option<ExprClosure>,
}

impl Parse for FieldAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let slot = if input.peek(LitInt) {
            SlotIdentifier::Number(input.parse::<LitInt>()?)
        } else {
            SlotIdentifier::Constant(input.parse::<Path>().map_err(|e| {
                Error::new(
                    e.span(),
                    "Slot identifier must be an integer literal or a constant path.",
                )
            })?)
        };

        let handler = if !input.is_empty() {
            input.parse::<Token![,]>()?;
            Some(input.parse::<ExprClosure>()?)
        } else {
            None
        };

        Ok(Self { slot, handler })
    }
}
