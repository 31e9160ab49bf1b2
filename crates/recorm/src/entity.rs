//! The entity contract and untyped related records.

use crate::error::{OrmError, OrmResult};
use crate::row::Row;
use crate::schema::{EntityMetadata, EntitySchema, metadata_for};
use crate::value::Value;
use serde::Serialize;
use std::any::TypeId;
use std::sync::Arc;

/// A typed record bound to one table.
///
/// Implementations expose an explicit field registry: [`schema`] lists every
/// persisted column and [`column`]/[`set_column`] read and write exactly
/// those columns. Any other name is an [`OrmError::UnknownField`].
///
/// Usually derived:
///
/// ```ignore
/// #[derive(Debug, Clone, Default, Entity)]
/// #[orm(table = "users", pk = "id", ai = "id", refs = "group_id:groups.id")]
/// struct User {
///     id: Option<i64>,
///     name: String,
///     group_id: Option<i64>,
/// }
/// ```
///
/// [`schema`]: Entity::schema
/// [`column`]: Entity::column
/// [`set_column`]: Entity::set_column
pub trait Entity: Default + Send + Sync + 'static {
    /// Static metadata and field registry.
    fn schema() -> &'static EntitySchema;

    /// Read a column.
    fn column(&self, name: &str) -> OrmResult<Value>;

    /// Write a column.
    fn set_column(&mut self, name: &str, value: Value) -> OrmResult<()>;

    /// Build an entity from a row.
    ///
    /// Every column in the row must be in the field registry; columns the
    /// row does not carry keep their default value.
    fn from_row(row: &Row) -> OrmResult<Self> {
        let mut entity = Self::default();
        for (column, value) in row.iter() {
            entity
                .set_column(column, value.clone())
                .map_err(|e| e.in_column(column))?;
        }
        Ok(entity)
    }

    /// All registered columns with their current values, in registry order.
    fn to_row(&self) -> OrmResult<Row> {
        let mut row = Row::new();
        for column in Self::schema().columns {
            row.insert(*column, self.column(column)?);
        }
        Ok(row)
    }
}

/// Parsed metadata for an entity type, validated once and cached.
pub fn metadata<E: Entity>() -> OrmResult<Arc<EntityMetadata>> {
    metadata_for(TypeId::of::<E>(), E::schema())
}

/// A related row loaded through a reference, detached from the database.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Table the row was read from.
    pub table: String,
    /// Column values.
    pub fields: Row,
}

impl Record {
    pub fn new(table: impl Into<String>, fields: Row) -> Self {
        Self {
            table: table.into(),
            fields,
        }
    }

    /// Read a column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    /// Rebuild a typed entity from this record.
    pub fn cast<T: Entity>(&self) -> OrmResult<T> {
        let meta = metadata::<T>()?;
        if meta.table != self.table {
            return Err(OrmError::configuration(format!(
                "cannot cast a row of table '{}' into {} (table '{}')",
                self.table, meta.type_name, meta.table
            )));
        }
        T::from_row(&self.fields)
    }
}
