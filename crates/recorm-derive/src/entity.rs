//! Entity derive macro implementation
//!
//! ## Module Structure
//!
//! - `attrs`: Struct and field attribute parsing

mod attrs;

use attrs::{entity_attr, field_attr};
use proc_macro2::TokenStream;
use quote::quote;
use std::collections::HashSet;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Result};

/// A field that is part of the registry.
struct ColumnField {
    ident: syn::Ident,
    column: String,
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let type_name = name.unraw().to_string();

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Entity cannot be derived for generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Entity can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Entity can only be derived for structs",
            ));
        }
    };

    let attr = entity_attr(&input.attrs)?;

    let mut columns: Vec<ColumnField> = Vec::with_capacity(fields.len());
    let mut seen = HashSet::with_capacity(fields.len());
    for field in fields {
        let field_attr = field_attr(field)?;
        if field_attr.skip {
            continue;
        }
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        let column = field_attr
            .column
            .unwrap_or_else(|| ident.unraw().to_string());
        if !seen.insert(column.clone()) {
            return Err(syn::Error::new_spanned(
                field,
                format!("column `{column}` is mapped twice"),
            ));
        }
        columns.push(ColumnField { ident, column });
    }

    let column_names: Vec<&str> = columns.iter().map(|c| c.column.as_str()).collect();

    let table = attr.table.map(|t| quote! { .table(#t) });
    let pk = attr.pk.map(|pk| quote! { .primary_key(#pk) });
    let ai = attr.ai.map(|ai| quote! { .auto_increment(#ai) });
    let refs = attr.refs.map(|refs| quote! { .references(#refs) });

    let read_arms = columns.iter().map(|ColumnField { ident, column }| {
        quote! {
            #column => ::std::result::Result::Ok(recorm::ToValue::to_value(&self.#ident)),
        }
    });

    let write_arms = columns.iter().map(|ColumnField { ident, column }| {
        quote! {
            #column => {
                self.#ident = recorm::FromValue::from_value(value)
                    .map_err(|e| e.in_column(#column))?;
                ::std::result::Result::Ok(())
            }
        }
    });

    Ok(quote! {
        impl recorm::Entity for #name {
            fn schema() -> &'static recorm::EntitySchema {
                static SCHEMA: recorm::EntitySchema =
                    recorm::EntitySchema::new(#type_name, &[#(#column_names),*])
                        #table #pk #ai #refs;
                &SCHEMA
            }

            fn column(&self, name: &str) -> recorm::OrmResult<recorm::Value> {
                match name {
                    #(#read_arms)*
                    _ => ::std::result::Result::Err(recorm::OrmError::unknown_field(#type_name, name)),
                }
            }

            fn set_column(&mut self, name: &str, value: recorm::Value) -> recorm::OrmResult<()> {
                match name {
                    #(#write_arms)*
                    _ => ::std::result::Result::Err(recorm::OrmError::unknown_field(#type_name, name)),
                }
            }
        }

        // Make this entity resolvable by `Registry::discover`
        recorm::inventory::submit! {
            recorm::EntityRegistration {
                register_fn: |registry: &mut recorm::Registry, db: &recorm::Db| {
                    registry.register_entity::<#name>(db);
                }
            }
        }
    })
}
