//! Active-record model: an entity plus its query state.
//!
//! A [`Model`] owns one entity value, the SELECT state being built for it,
//! and the references loaded for it. Builder calls mutate that state;
//! terminal reads ([`find`](Model::find), [`count`](Model::count)) assemble
//! and run the statement and then reset every clause to its default.
//!
//! ```ignore
//! use recorm::prelude::*;
//!
//! let mut users = Model::<User>::blank(&db)?;
//! let adults = users
//!     .where_("age > ? and name = ?", params![18, "Alice"])?
//!     .order(&["name"])?
//!     .find(FindOptions::default());
//!
//! let mut user = Model::new(&db, User { name: "Bob".into(), ..Default::default() })?;
//! if let SaveResult::InsertId(id) = user.save() {
//!     assert_eq!(user.id, Some(id));
//! }
//! ```

mod find;
mod persist;
mod references;

pub use find::{Fetched, FindOptions};
pub use persist::{SaveResult, upsert_many};

use crate::client::Db;
use crate::entity::{Entity, Record, metadata};
use crate::error::OrmResult;
use crate::qb::{self, QueryState};
use crate::schema::EntityMetadata;
use crate::value::{Param, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// An entity bound to a database handle.
///
/// Dereferences to the entity, so fields are read and written directly.
/// Not meant to be shared across threads while building a query: the query
/// state belongs to this instance alone.
pub struct Model<E: Entity> {
    entity: E,
    query: QueryState,
    references: BTreeMap<String, Vec<Record>>,
    db: Db,
    meta: Arc<EntityMetadata>,
}

impl<E: Entity> Model<E> {
    /// Bind an entity to a database handle.
    ///
    /// # Errors
    ///
    /// [`OrmError::Configuration`](crate::OrmError::Configuration) when the
    /// entity's declared metadata is invalid.
    pub fn new(db: &Db, entity: E) -> OrmResult<Self> {
        let meta = metadata::<E>()?;
        tracing::debug!(target: "recorm", table = %meta.table, "[Model.{}] initialized", meta.table);
        Ok(Self::from_parts(db.clone(), meta, entity))
    }

    /// A model holding a default entity, typically used to run queries.
    pub fn blank(db: &Db) -> OrmResult<Self> {
        Self::new(db, E::default())
    }

    pub(crate) fn from_parts(db: Db, meta: Arc<EntityMetadata>, entity: E) -> Self {
        Self {
            query: QueryState::new(meta.table.clone()),
            entity,
            references: BTreeMap::new(),
            db,
            meta,
        }
    }

    pub fn entity(&self) -> &E {
        &self.entity
    }

    pub fn entity_mut(&mut self) -> &mut E {
        &mut self.entity
    }

    pub fn into_entity(self) -> E {
        self.entity
    }

    /// Parsed metadata of the entity type.
    pub fn metadata(&self) -> &EntityMetadata {
        &self.meta
    }

    /// The entity's table.
    pub fn table(&self) -> &str {
        &self.meta.table
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    /// Current query state.
    pub fn query(&self) -> &QueryState {
        &self.query
    }

    /// Read a field by column name.
    pub fn get(&self, column: &str) -> OrmResult<Value> {
        self.entity.column(column)
    }

    /// Write a field by column name.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) -> OrmResult<&mut Self> {
        self.entity.set_column(column, value.into())?;
        Ok(self)
    }

    // ==================== Builder ====================

    /// Columns to select.
    pub fn select(&mut self, columns: &[&str]) -> OrmResult<&mut Self> {
        self.query.select(columns)?;
        Ok(self)
    }

    /// Table (or table expression) to select from.
    ///
    /// Rows read from a table other than the entity's own are returned
    /// untyped unless [`FindOptions::with_same_type`] is set.
    pub fn from(&mut self, table: &str) -> OrmResult<&mut Self> {
        self.query.from(table)?;
        Ok(self)
    }

    /// Append a WHERE fragment.
    ///
    /// Each marker in `template` is replaced, in order, by the next value:
    /// NULL becomes `NULL`, other scalars go through the database's escape.
    /// Fragments accumulate across calls, so a second condition has to
    /// carry its own `and`/`or`:
    ///
    /// ```ignore
    /// model.where_("age > ?", params![18])?.where_(" and name = ?", params!["Alice"])?;
    /// ```
    ///
    /// # Errors
    ///
    /// [`OrmError::Argument`](crate::OrmError::Argument) when the number of
    /// markers differs from the number of flattened values, or a value is
    /// not a scalar.
    pub fn where_(
        &mut self,
        template: &str,
        values: impl IntoIterator<Item = Param>,
    ) -> OrmResult<&mut Self> {
        let fragment = self.substitute(template, values, "where")?;
        self.query.push_where(&fragment);
        Ok(self)
    }

    /// Columns to group by.
    pub fn group(&mut self, columns: &[&str]) -> OrmResult<&mut Self> {
        self.query.group(columns)?;
        Ok(self)
    }

    /// Append a HAVING fragment; same substitution rules as [`where_`](Self::where_).
    pub fn having(
        &mut self,
        template: &str,
        values: impl IntoIterator<Item = Param>,
    ) -> OrmResult<&mut Self> {
        let fragment = self.substitute(template, values, "having")?;
        self.query.push_having(&fragment);
        Ok(self)
    }

    /// Ordering terms, e.g. `&["created_at DESC", "id"]`.
    pub fn order(&mut self, columns: &[&str]) -> OrmResult<&mut Self> {
        self.query.order(columns)?;
        Ok(self)
    }

    /// `LIMIT skip` or `LIMIT skip, count`.
    pub fn limit(&mut self, skip: i64, count: Option<i64>) -> OrmResult<&mut Self> {
        self.query.limit(skip, count)?;
        Ok(self)
    }

    /// Build an `IN` template for [`where_`](Self::where_) with one marker per value.
    pub fn make_where_in(&self, column: &str, values: impl IntoIterator<Item = Param>) -> String {
        qb::make_where_in(column, values, self.db.config().placeholder)
    }

    pub fn reset_select(&mut self) -> &mut Self {
        self.query.reset_select();
        self
    }

    pub fn reset_from(&mut self) -> &mut Self {
        self.query.reset_from();
        self
    }

    pub fn reset_where(&mut self) -> &mut Self {
        self.query.reset_where();
        self
    }

    pub fn reset_group(&mut self) -> &mut Self {
        self.query.reset_group();
        self
    }

    pub fn reset_having(&mut self) -> &mut Self {
        self.query.reset_having();
        self
    }

    pub fn reset_order(&mut self) -> &mut Self {
        self.query.reset_order();
        self
    }

    pub fn reset_limit(&mut self) -> &mut Self {
        self.query.reset_limit();
        self
    }

    /// Reset every clause.
    pub fn reset_query(&mut self) -> &mut Self {
        tracing::trace!(target: "recorm", table = %self.meta.table, "[Model.{}] query reset", self.meta.table);
        self.query.reset();
        self
    }

    fn substitute(
        &self,
        template: &str,
        values: impl IntoIterator<Item = Param>,
        clause: &str,
    ) -> OrmResult<String> {
        let db = &self.db;
        qb::substitute(
            template,
            values,
            db.config().placeholder,
            &|value: &Value| db.escape(value),
            clause,
        )
    }

    // ==================== Transactions ====================

    /// Begin a transaction on the shared connection.
    pub fn start_transaction(&self) -> bool {
        tracing::info!(target: "recorm", table = %self.meta.table, "[Model.{}] (transaction) start", self.meta.table);
        self.db.database().trans_begin()
    }

    /// Commit the shared connection's transaction; any model may commit it.
    pub fn commit_transaction(&self) -> bool {
        tracing::info!(target: "recorm", table = %self.meta.table, "[Model.{}] (transaction) commit", self.meta.table);
        self.db.database().trans_commit()
    }

    /// Roll back the shared connection's transaction.
    pub fn rollback_transaction(&self) -> bool {
        tracing::info!(target: "recorm", table = %self.meta.table, "[Model.{}] (transaction) rollback", self.meta.table);
        self.db.database().trans_rollback()
    }

    // ==================== Export ====================

    /// Message of the last failed statement, or an empty string.
    pub fn error_message(&self) -> String {
        self.db.error_message()
    }

    /// Field values plus loaded references as JSON.
    ///
    /// References appear under `"references"` only when some were loaded.
    pub fn to_json(&self) -> OrmResult<serde_json::Value> {
        let mut object = self.fields_json()?;
        if !self.references.is_empty() {
            object.insert(
                "references".to_string(),
                serde_json::to_value(&self.references)?,
            );
        }
        Ok(serde_json::Value::Object(object))
    }

    fn fields_json(&self) -> OrmResult<serde_json::Map<String, serde_json::Value>> {
        match serde_json::to_value(self.entity.to_row()?)? {
            serde_json::Value::Object(map) => Ok(map),
            _ => Ok(serde_json::Map::new()),
        }
    }
}

impl<E: Entity> Deref for Model<E> {
    type Target = E;

    fn deref(&self) -> &Self::Target {
        &self.entity
    }
}

impl<E: Entity> DerefMut for Model<E> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.entity
    }
}

impl<E: Entity + Clone> Clone for Model<E> {
    fn clone(&self) -> Self {
        Self {
            entity: self.entity.clone(),
            query: self.query.clone(),
            references: self.references.clone(),
            db: self.db.clone(),
            meta: Arc::clone(&self.meta),
        }
    }
}

impl<E: Entity + fmt::Debug> fmt::Debug for Model<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("table", &self.meta.table)
            .field("entity", &self.entity)
            .field("query", &self.query.to_sql())
            .field("references", &self.references)
            .field("last_db_error", &self.db.error_message())
            .finish()
    }
}

/// The field map as JSON, in registry order.
impl<E: Entity> fmt::Display for Model<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let row = self.entity.to_row().map_err(|_| fmt::Error)?;
        let json = serde_json::to_string(&row).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
