//! Writes: save, delete, clean_table and the bulk upsert.
//!
//! Persistence never returns an error to the caller. Statement failures are
//! logged with the collaborator's message and reported as `Failed`/`false`.

use super::Model;
use crate::client::Db;
use crate::entity::{Entity, metadata};
use crate::error::{OrmError, OrmResult};
use crate::qb::{delete_sql, insert_sql, update_sql, upsert_sql};
use crate::row::Row;
use crate::value::{Param, Value};

/// Outcome of [`Model::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// Inserted; the database reported this auto-increment id.
    InsertId(i64),
    /// Updated, or inserted without a generated id.
    Saved,
    /// Nothing was written.
    Failed,
}

impl SaveResult {
    pub fn is_success(self) -> bool {
        !matches!(self, SaveResult::Failed)
    }

    pub fn insert_id(self) -> Option<i64> {
        match self {
            SaveResult::InsertId(id) => Some(id),
            _ => None,
        }
    }
}

impl<E: Entity> Model<E> {
    /// Insert or update the entity.
    ///
    /// When a primary key is declared and every key column holds a non-empty
    /// value, the row's existence is probed with [`count`](Self::count); an
    /// existing row is updated by key. Otherwise the entity is inserted and,
    /// if an auto-increment column is declared, the generated id is written
    /// back into it.
    ///
    /// The probe goes through the query state, which is reset first.
    pub fn save(&mut self) -> SaveResult {
        let table = self.meta.table.clone();
        tracing::info!(target: "recorm", table = %table, op = "save", "[Model.{table}] (save)");
        match self.try_save(&table) {
            Ok(result) => result,
            Err(err) => {
                tracing::info!(
                    target: "recorm",
                    table = %table,
                    op = "save",
                    error = %err,
                    "[Model.{table}] (save) - catch: {err}"
                );
                SaveResult::Failed
            }
        }
    }

    fn try_save(&mut self, table: &str) -> OrmResult<SaveResult> {
        let data = self.entity.to_row()?;

        let key = self.key_condition(&data)?;
        let exists = match &key {
            Some(condition) => {
                self.reset_query();
                self.query.push_where(condition);
                self.count() > 0
            }
            None => false,
        };
        tracing::debug!(
            target: "recorm",
            table,
            op = "save",
            "[Model.{table}] (save) - row exists = {}",
            if exists { "yes" } else { "no" }
        );

        match key {
            Some(condition) if exists => {
                let sql = update_sql(table, &data, &condition, &|v: &Value| self.db.escape(v));
                match self.db.run(table, "save", &sql) {
                    Ok(_) => Ok(SaveResult::Saved),
                    Err(err) => {
                        self.log_failure("save", &err);
                        Ok(SaveResult::Failed)
                    }
                }
            }
            _ => {
                let sql = insert_sql(table, &data, &|v: &Value| self.db.escape(v));
                if let Err(err) = self.db.run(table, "save", &sql) {
                    self.log_failure("save", &err);
                    return Ok(SaveResult::Failed);
                }

                let insert_id = self.db.database().insert_id();
                tracing::debug!(target: "recorm", table, op = "save", "[Model.{table}] (save) - insert_id = {insert_id}");
                if insert_id == 0 {
                    return Ok(SaveResult::Saved);
                }
                if let Some(ai) = self.meta.auto_increment_column.clone() {
                    self.entity
                        .set_column(&ai, Value::Int(insert_id))
                        .map_err(|e| OrmError::persistence(format!("{ai}: {e}")))?;
                }
                Ok(SaveResult::InsertId(insert_id))
            }
        }
    }

    /// `pk1 = v1 AND pk2 = v2`, or `None` when no key is declared or any
    /// key column is empty.
    fn key_condition(&self, data: &Row) -> OrmResult<Option<String>> {
        if self.meta.primary_key.is_empty() {
            return Ok(None);
        }
        let mut values = Vec::with_capacity(self.meta.primary_key.len());
        for pk in &self.meta.primary_key {
            match data.get(pk) {
                Some(value) if !value.is_empty() => values.push(value.clone()),
                _ => return Ok(None),
            }
        }
        self.equality_condition(&self.meta.primary_key, values, "save")
            .map(Some)
    }

    fn equality_condition(
        &self,
        columns: &[String],
        values: Vec<Value>,
        clause: &str,
    ) -> OrmResult<String> {
        let marker = self.db.config().placeholder;
        let template = columns
            .iter()
            .map(|c| format!("{c} = {marker}"))
            .collect::<Vec<_>>()
            .join(" AND ");
        self.substitute(&template, values.into_iter().map(Param::Scalar), clause)
    }

    /// Delete rows matching the entity's current values in `columns`.
    ///
    /// With no columns the primary key is used; entities without one fall
    /// back to an `id` column. Returns whether the statement succeeded.
    pub fn delete(&mut self, columns: &[&str]) -> bool {
        let table = self.meta.table.clone();
        let columns: Vec<String> = if !columns.is_empty() {
            columns.iter().map(|c| c.to_string()).collect()
        } else if !self.meta.primary_key.is_empty() {
            self.meta.primary_key.clone()
        } else {
            vec!["id".to_string()]
        };

        let condition = columns
            .iter()
            .map(|c| self.entity.column(c))
            .collect::<OrmResult<Vec<_>>>()
            .and_then(|values| self.equality_condition(&columns, values, "delete"));
        let condition = match condition {
            Ok(condition) => condition,
            Err(err) => {
                tracing::error!(target: "recorm", table = %table, op = "delete", error = %err, "[Model.{table}] (delete) - {err}");
                return false;
            }
        };

        let sql = delete_sql(&table, Some(&condition));
        tracing::info!(target: "recorm", table = %table, op = "delete", "[Model.{table}] (delete) - {sql}");
        self.execute_write("delete", &sql)
    }

    /// Delete every row of the entity's table.
    pub fn clean_table(&mut self) -> bool {
        let table = self.meta.table.clone();
        let sql = delete_sql(&table, None);
        tracing::info!(target: "recorm", table = %table, op = "delete all", "[Model.{table}] (delete all) - {sql}");
        self.execute_write("delete all", &sql)
    }

    fn execute_write(&self, op: &str, sql: &str) -> bool {
        match self.db.run(&self.meta.table, op, sql) {
            Ok(_) => true,
            Err(err) => {
                self.log_failure(op, &err);
                false
            }
        }
    }

    fn log_failure(&self, op: &str, err: &OrmError) {
        let table = &self.meta.table;
        tracing::error!(
            target: "recorm",
            table = %table,
            op,
            error = %err,
            "[Model.{table}] ({op}) - Error: {}",
            self.db.error_message()
        );
    }
}

/// Insert or update many entities in one statement.
///
/// Issues `INSERT .. VALUES (..), (..) ON DUPLICATE KEY UPDATE c = VALUES(c)`
/// without probing. Returns `Ok(false)` when the statement fails and
/// `Ok(true)` for an empty slice.
///
/// # Errors
///
/// [`OrmError::Configuration`] when the entity declares no primary key or its
/// metadata is invalid.
pub fn upsert_many<E: Entity>(db: &Db, entities: &[E]) -> OrmResult<bool> {
    let meta = metadata::<E>()?;
    let primary_key = meta.require_primary_key("upsert_many")?;
    if entities.is_empty() {
        return Ok(true);
    }

    let rows = entities
        .iter()
        .map(E::to_row)
        .collect::<OrmResult<Vec<_>>>()?;
    let sql = upsert_sql(
        &meta.table,
        &meta.columns,
        primary_key,
        &rows,
        &|v: &Value| db.escape(v),
    );

    let table = &meta.table;
    match db.run(table, "upsert_many", &sql) {
        Ok(_) => Ok(true),
        Err(err) => {
            tracing::error!(
                target: "recorm",
                table = %table,
                op = "upsert_many",
                error = %err,
                "[Model.{table}] (upsert_many) - Error: {}",
                db.error_message()
            );
            Ok(false)
        }
    }
}
