//! Attribute parsing for the Entity derive macro.
//!
//! Handles struct-level and field-level `#[orm(...)]` attributes.

use syn::ext::IdentExt;
use syn::{Attribute, Field, LitStr, Result};

/// Struct-level `#[orm(table = "..", pk = "..", ai = "..", refs = "..")]`.
#[derive(Default)]
pub(super) struct EntityAttr {
    pub table: Option<LitStr>,
    pub pk: Option<LitStr>,
    pub ai: Option<LitStr>,
    pub refs: Option<LitStr>,
}

impl syn::parse::Parse for EntityAttr {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attr = EntityAttr::default();

        while !input.is_empty() {
            let ident: syn::Ident = input.call(syn::Ident::parse_any)?;
            let _: syn::Token![=] = input.parse()?;
            let value: LitStr = input.parse()?;

            let slot = match ident.to_string().as_str() {
                "table" => &mut attr.table,
                "pk" => &mut attr.pk,
                "ai" => &mut attr.ai,
                "refs" => &mut attr.refs,
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown entity attribute `{other}`; expected table, pk, ai or refs"),
                    ));
                }
            };
            if slot.replace(value).is_some() {
                return Err(syn::Error::new(
                    ident.span(),
                    format!("duplicate entity attribute `{ident}`"),
                ));
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        Ok(attr)
    }
}

/// Field-level `#[orm(column = "..")]` / `#[orm(skip)]`.
#[derive(Default)]
pub(super) struct FieldAttr {
    pub column: Option<String>,
    pub skip: bool,
}

impl syn::parse::Parse for FieldAttr {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();

        while !input.is_empty() {
            let ident: syn::Ident = input.call(syn::Ident::parse_any)?;
            if ident == "skip" {
                attr.skip = true;
            } else if ident == "column" {
                let _: syn::Token![=] = input.parse()?;
                let value: LitStr = input.parse()?;
                attr.column = Some(value.value());
            } else {
                return Err(syn::Error::new(
                    ident.span(),
                    format!("unknown field attribute `{ident}`; expected column or skip"),
                ));
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        Ok(attr)
    }
}

fn orm_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|a| a.path().is_ident("orm"))
}

/// Merge every struct-level `#[orm(...)]` attribute.
pub(super) fn entity_attr(attrs: &[Attribute]) -> Result<EntityAttr> {
    let mut merged = EntityAttr::default();
    for attr in orm_attrs(attrs) {
        let parsed: EntityAttr = attr.parse_args()?;
        for (slot, value) in [
            (&mut merged.table, parsed.table),
            (&mut merged.pk, parsed.pk),
            (&mut merged.ai, parsed.ai),
            (&mut merged.refs, parsed.refs),
        ] {
            if let Some(value) = value {
                if slot.replace(value.clone()).is_some() {
                    return Err(syn::Error::new(value.span(), "entity attribute set twice"));
                }
            }
        }
    }
    Ok(merged)
}

/// Merge every field-level `#[orm(...)]` attribute.
pub(super) fn field_attr(field: &Field) -> Result<FieldAttr> {
    let mut merged = FieldAttr::default();
    for attr in orm_attrs(&field.attrs) {
        let parsed: FieldAttr = attr.parse_args()?;
        merged.skip |= parsed.skip;
        if parsed.column.is_some() {
            merged.column = parsed.column;
        }
    }
    Ok(merged)
}
