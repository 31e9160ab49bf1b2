//! Derive macros for recorm
//!
//! Provides `#[derive(Entity)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod entity;

/// Derive `Entity` for a struct.
///
/// # Example
///
/// ```ignore
/// use recorm::Entity;
///
/// #[derive(Debug, Clone, Default, Entity)]
/// #[orm(table = "users", pk = "id", ai = "id", refs = "group_id:groups.id")]
/// struct User {
///     id: Option<i64>,
///     #[orm(column = "user_name")]
///     name: String,
///     group_id: Option<i64>,
///     #[orm(skip)]
///     cached_label: String,
/// }
/// ```
///
/// # Generated
///
/// - `Entity::schema()` - static schema with the field registry
/// - `Entity::column` / `Entity::set_column` - one match arm per registered column
/// - an `inventory` registration picked up by `Registry::discover`
///
/// # Attributes
///
/// - `#[orm(table = "name")]` - Table name (defaults to the struct name)
/// - `#[orm(pk = "a, b")]` - Primary key column(s)
/// - `#[orm(ai = "id")]` - Auto-increment column
/// - `#[orm(refs = "local:table.column, ...")]` - References
/// - `#[orm(column = "name")]` - Map field to a different column name
/// - `#[orm(skip)]` - Keep the field out of the registry (never persisted)
#[proc_macro_derive(Entity, attributes(orm))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
