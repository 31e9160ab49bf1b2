//! Reference loading and access.

use super::Model;
use crate::entity::{Entity, Record};
use crate::registry::Registry;
use crate::schema::{ReferenceDef, parse_references};
use std::collections::BTreeMap;

impl<E: Entity> Model<E> {
    /// Load every declared reference through `registry`.
    ///
    /// For each reference whose local column holds a value, the target
    /// table's repository is asked for the rows where the target column
    /// equals it; they are stored under `"{local_column}:{target_table}"`.
    /// Previously loaded references are discarded first. Runs one query per
    /// reference.
    ///
    /// Returns `false` when the entity declares no references.
    pub fn load_references(&mut self, registry: &Registry) -> bool {
        let Some(references) = self.meta.references.clone() else {
            return false;
        };
        self.load_declared(registry, &references);
        true
    }

    /// Like [`load_references`](Self::load_references) for an explicit
    /// `local:table.column[,...]` declaration instead of the entity's own.
    pub fn load_references_from(&mut self, registry: &Registry, declaration: &str) -> bool {
        let Some(references) = parse_references(declaration, &self.meta.type_name) else {
            return false;
        };
        let references: Vec<ReferenceDef> = references
            .into_iter()
            .filter(|r| {
                let bound = self.meta.has_column(&r.local_column);
                if !bound {
                    tracing::warn!(
                        target: "recorm",
                        table = %self.meta.table,
                        reference = %r,
                        "reference column is not a bound column, ignored"
                    );
                }
                bound
            })
            .collect();
        self.load_declared(registry, &references);
        true
    }

    fn load_declared(&mut self, registry: &Registry, references: &[ReferenceDef]) {
        let table = self.meta.table.clone();
        self.references.clear();

        for reference in references {
            let value = match self.entity.column(&reference.local_column) {
                Ok(value) if !value.is_null() => value,
                Ok(_) => continue,
                Err(err) => {
                    tracing::warn!(target: "recorm", table = %table, reference = %reference, error = %err, "reference skipped");
                    continue;
                }
            };
            let Some(repository) = registry.resolve(&reference.target_table) else {
                tracing::warn!(
                    target: "recorm",
                    table = %table,
                    reference = %reference,
                    "[Model.{table}] no repository registered for '{}', reference skipped",
                    reference.target_table
                );
                continue;
            };

            let records = repository.find_by(&reference.target_column, &value);
            self.references.insert(reference.key(), records);
        }
    }

    /// All loaded references, keyed `"{local_column}:{target_table}"`.
    pub fn references(&self) -> &BTreeMap<String, Vec<Record>> {
        &self.references
    }

    /// Records loaded for one reference key.
    pub fn reference(&self, key: &str) -> Option<&[Record]> {
        self.references.get(key).map(Vec::as_slice)
    }

    /// One record loaded for a reference key.
    pub fn reference_at(&self, key: &str, index: usize) -> Option<&Record> {
        self.references.get(key)?.get(index)
    }

    /// Drop all loaded references.
    pub fn clear_references(&mut self) {
        self.references.clear();
    }
}
