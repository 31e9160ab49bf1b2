//! Table name → repository registry used to resolve references.
//!
//! Entities derived with `#[derive(Entity)]` submit an [`EntityRegistration`]
//! through `inventory`; [`Registry::discover`] registers all of them against
//! one [`Db`]. Registries can also be filled by hand.

use crate::client::Db;
use crate::entity::{Entity, Record, metadata};
use crate::error::OrmResult;
use crate::model::{Fetched, FindOptions, Model};
use crate::params;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Read access to one table, independent of its entity type.
pub trait Repository: Send + Sync {
    /// Table this repository reads.
    fn table(&self) -> &str;

    /// Rows where `column` equals `value`.
    fn find_by(&self, column: &str, value: &Value) -> Vec<Record>;

    /// Number of rows where `column` equals `value`.
    fn count_by(&self, column: &str, value: &Value) -> usize;
}

/// [`Repository`] backed by an entity type; each call runs on a fresh model.
pub struct EntityRepository<E: Entity> {
    db: Db,
    table: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> EntityRepository<E> {
    pub fn new(db: &Db) -> OrmResult<Self> {
        Ok(Self {
            db: db.clone(),
            table: metadata::<E>()?.table.clone(),
            _entity: PhantomData,
        })
    }

    fn filtered(&self, column: &str, value: &Value) -> Option<Model<E>> {
        let mut model = match Model::<E>::blank(&self.db) {
            Ok(model) => model,
            Err(err) => {
                tracing::error!(target: "recorm", table = %self.table, error = %err, "repository model unavailable");
                return None;
            }
        };
        let condition = format!("{column} = {}", self.db.config().placeholder);
        if let Err(err) = model.where_(&condition, params![value]) {
            tracing::error!(target: "recorm", table = %self.table, error = %err, "repository filter rejected");
            return None;
        }
        Some(model)
    }
}

impl<E: Entity> Repository for EntityRepository<E> {
    fn table(&self) -> &str {
        &self.table
    }

    fn find_by(&self, column: &str, value: &Value) -> Vec<Record> {
        let Some(mut model) = self.filtered(column, value) else {
            return Vec::new();
        };
        model
            .find(FindOptions::default())
            .into_iter()
            .filter_map(|fetched| match fetched {
                Fetched::Entity(found) => match found.entity().to_row() {
                    Ok(fields) => Some(Record::new(self.table.clone(), fields)),
                    Err(err) => {
                        tracing::warn!(target: "recorm", table = %self.table, error = %err, "unreadable row skipped");
                        None
                    }
                },
                Fetched::Row(fields) => Some(Record::new(self.table.clone(), fields)),
            })
            .collect()
    }

    fn count_by(&self, column: &str, value: &Value) -> usize {
        self.filtered(column, value)
            .map_or(0, |mut model| model.count())
    }
}

/// Registration entry submitted by `#[derive(Entity)]`.
pub struct EntityRegistration {
    /// Registers the entity's repository against a database handle.
    pub register_fn: fn(&mut Registry, &Db),
}

inventory::collect!(EntityRegistration);

/// Resolves table names to repositories.
#[derive(Clone, Default)]
pub struct Registry {
    repositories: HashMap<String, Arc<dyn Repository>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every derived entity linked into the binary.
    pub fn discover(db: &Db) -> Self {
        let mut registry = Self::new();
        for reg in inventory::iter::<EntityRegistration> {
            (reg.register_fn)(&mut registry, db);
        }
        registry
    }

    /// Register a repository under its table name, replacing any previous one.
    pub fn register(&mut self, repository: Arc<dyn Repository>) -> &mut Self {
        self.repositories
            .insert(repository.table().to_string(), repository);
        self
    }

    /// Register an entity type.
    ///
    /// Entities whose metadata is invalid are reported and left out.
    pub fn register_entity<E: Entity>(&mut self, db: &Db) -> &mut Self {
        match EntityRepository::<E>::new(db) {
            Ok(repository) => {
                self.register(Arc::new(repository));
            }
            Err(err) => {
                tracing::warn!(
                    target: "recorm",
                    entity = E::schema().type_name,
                    error = %err,
                    "entity not registered"
                );
            }
        }
        self
    }

    /// Repository for a table.
    pub fn resolve(&self, table: &str) -> Option<Arc<dyn Repository>> {
        self.repositories.get(table).cloned()
    }

    pub fn contains(&self, table: &str) -> bool {
        self.repositories.contains_key(table)
    }

    /// Registered table names, sorted.
    pub fn tables(&self) -> Vec<&str> {
        let mut tables: Vec<&str> = self.repositories.keys().map(String::as_str).collect();
        tables.sort_unstable();
        tables
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("tables", &self.tables())
            .finish()
    }
}
