//! Reads: find, find_one, load, count.

use super::Model;
use crate::config::CountStrategy;
use crate::entity::Entity;
use crate::registry::Registry;
use crate::row::Row;
use crate::value::Value;

/// Options for [`Model::find`] and friends.
#[derive(Debug, Clone, Copy, Default)]
pub struct FindOptions<'r> {
    /// Load the references of every typed result through this registry.
    pub load_references: Option<&'r Registry>,
    /// Cast rows into the entity type even when the query reads another table.
    pub same_type: bool,
}

impl<'r> FindOptions<'r> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_references(mut self, registry: &'r Registry) -> Self {
        self.load_references = Some(registry);
        self
    }

    pub fn with_same_type(mut self) -> Self {
        self.same_type = true;
        self
    }
}

/// One result of a find.
#[derive(Debug)]
pub enum Fetched<E: Entity> {
    /// A typed entity with fresh query state.
    Entity(Model<E>),
    /// A row that was not cast into the entity type.
    Row(Row),
}

impl<E: Entity> Fetched<E> {
    pub fn is_entity(&self) -> bool {
        matches!(self, Fetched::Entity(_))
    }

    pub fn as_model(&self) -> Option<&Model<E>> {
        match self {
            Fetched::Entity(model) => Some(model),
            Fetched::Row(_) => None,
        }
    }

    pub fn as_row(&self) -> Option<&Row> {
        match self {
            Fetched::Row(row) => Some(row),
            Fetched::Entity(_) => None,
        }
    }

    pub fn into_model(self) -> Option<Model<E>> {
        match self {
            Fetched::Entity(model) => Some(model),
            Fetched::Row(_) => None,
        }
    }

    pub fn into_entity(self) -> Option<E> {
        self.into_model().map(Model::into_entity)
    }
}

impl<E: Entity> Model<E> {
    /// Run the SELECT built so far.
    ///
    /// Results are typed when the query reads the entity's own table or
    /// `options.same_type` is set; otherwise they come back as rows. A row
    /// that cannot be cast is logged and returned untyped. On execution
    /// failure the collaborator's message is logged and the result is empty.
    ///
    /// The query state is reset afterwards, whatever the outcome.
    pub fn find(&mut self, options: FindOptions<'_>) -> Vec<Fetched<E>> {
        let sql = self.query.to_sql();
        let typed = options.same_type || self.query.targets_default_table();
        self.reset_query();

        let table = self.meta.table.clone();
        let result = match self.db.run(&table, "find", &sql) {
            Ok(result) => result,
            Err(err) => {
                tracing::error!(
                    target: "recorm",
                    table = %table,
                    op = "find",
                    error = %err,
                    "[Model.{table}] (find) - Error: {}",
                    self.db.error_message()
                );
                return Vec::new();
            }
        };

        if options.load_references.is_some() {
            tracing::debug!(target: "recorm", table = %table, op = "find", "[Model.{table}] (find) - Loading References");
        }

        result
            .rows
            .into_iter()
            .map(|row| {
                if !typed {
                    return Fetched::Row(row);
                }
                match E::from_row(&row) {
                    Ok(entity) => {
                        let mut model =
                            Model::from_parts(self.db.clone(), self.meta.clone(), entity);
                        if let Some(registry) = options.load_references {
                            model.load_references(registry);
                        }
                        Fetched::Entity(model)
                    }
                    Err(err) => {
                        tracing::warn!(
                            target: "recorm",
                            table = %table,
                            op = "find",
                            error = %err,
                            "[Model.{table}] (find) - row returned untyped"
                        );
                        Fetched::Row(row)
                    }
                }
            })
            .collect()
    }

    /// [`find`](Self::find) restricted to one row; `None` when nothing matches.
    pub fn find_one(&mut self, options: FindOptions<'_>) -> Option<Fetched<E>> {
        self.query.limit_one();
        self.find(options).into_iter().next()
    }

    /// Replace this model's entity (and references) with the first match.
    ///
    /// Returns `false` when nothing matched or the match is untyped.
    pub fn load(&mut self, options: FindOptions<'_>) -> bool {
        match self.find_one(options) {
            Some(Fetched::Entity(found)) => {
                self.entity = found.entity;
                self.references = found.references;
                true
            }
            _ => false,
        }
    }

    /// Number of rows the query built so far would return.
    ///
    /// Never fails: any failure counts as zero. Resets the query state.
    pub fn count(&mut self) -> usize {
        match self.db.config().count_strategy {
            CountStrategy::Materialize => self.find(FindOptions::default()).len(),
            CountStrategy::CountQuery => {
                let sql = self.query.to_count_sql();
                self.reset_query();

                let table = self.meta.table.clone();
                match self.db.run(&table, "count", &sql) {
                    Ok(result) => result
                        .rows
                        .first()
                        .and_then(|row| row.get("count").or_else(|| row.iter().next().map(|(_, v)| v)))
                        .and_then(Value::as_i64)
                        .and_then(|n| usize::try_from(n).ok())
                        .unwrap_or(0),
                    Err(err) => {
                        tracing::error!(
                            target: "recorm",
                            table = %table,
                            op = "count",
                            error = %err,
                            "[Model.{table}] (count) - Error: {}",
                            self.db.error_message()
                        );
                        0
                    }
                }
            }
        }
    }
}
