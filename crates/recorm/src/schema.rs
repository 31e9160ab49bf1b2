//! Entity metadata: declaration, parsing and validation.
//!
//! An entity declares its metadata as a static [`EntitySchema`] using the
//! same compact string forms the declarations have always had:
//!
//! - table: `"users"`
//! - primary key: `"id"` or `"tenant_id, user_id"`
//! - auto-increment column: `"id"`
//! - references: `"group_id:groups.id,owner_id:users.id"`
//!
//! The declaration is parsed once per type into [`EntityMetadata`] and cached
//! in a process-wide table keyed by type identity. Missing or malformed
//! *required* metadata is a [`OrmError::Configuration`]; malformed *optional*
//! metadata logs a warning and disables the feature.

use crate::error::{OrmError, OrmResult};
use crate::ident::{is_valid_identifier, parse_identifier_list, validate_identifier};
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// Static metadata declared by an entity type.
///
/// Usually generated by `#[derive(Entity)]`; can be written by hand with the
/// `const` builder methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySchema {
    /// Rust type name, used as the table name fallback.
    pub type_name: &'static str,
    /// Declared table name.
    pub table: Option<&'static str>,
    /// Comma-separated primary key columns.
    pub primary_key: Option<&'static str>,
    /// Auto-increment column.
    pub auto_increment: Option<&'static str>,
    /// `local:table.column` reference clauses, comma-separated.
    pub references: Option<&'static str>,
    /// The field registry: every persisted column, in declaration order.
    pub columns: &'static [&'static str],
}

impl EntitySchema {
    pub const fn new(type_name: &'static str, columns: &'static [&'static str]) -> Self {
        Self {
            type_name,
            table: None,
            primary_key: None,
            auto_increment: None,
            references: None,
            columns,
        }
    }

    pub const fn table(mut self, table: &'static str) -> Self {
        self.table = Some(table);
        self
    }

    pub const fn primary_key(mut self, pk: &'static str) -> Self {
        self.primary_key = Some(pk);
        self
    }

    pub const fn auto_increment(mut self, column: &'static str) -> Self {
        self.auto_increment = Some(column);
        self
    }

    pub const fn references(mut self, refs: &'static str) -> Self {
        self.references = Some(refs);
        self
    }
}

/// A declared foreign-key join: `local_column` equals `target_table.target_column`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceDef {
    pub local_column: String,
    pub target_table: String,
    pub target_column: String,
}

impl ReferenceDef {
    /// Key under which loaded rows are stored: `"{local_column}:{target_table}"`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.local_column, self.target_table)
    }
}

impl fmt::Display for ReferenceDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}.{}",
            self.local_column, self.target_table, self.target_column
        )
    }
}

/// Parsed and validated entity metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMetadata {
    pub type_name: String,
    pub table: String,
    /// Empty when no primary key is declared.
    pub primary_key: Vec<String>,
    pub auto_increment_column: Option<String>,
    /// `None` when no (well-formed) references are declared.
    pub references: Option<Vec<ReferenceDef>>,
    pub columns: Vec<String>,
}

impl EntityMetadata {
    /// Parse and validate a schema declaration.
    pub fn from_schema(schema: &EntitySchema) -> OrmResult<Self> {
        let owner = schema.type_name;

        if schema.columns.is_empty() {
            return Err(OrmError::configuration(format!(
                "{owner}::columns - Columns not bound"
            )));
        }
        let mut seen = HashSet::with_capacity(schema.columns.len());
        for column in schema.columns {
            validate_identifier(column, &format!("{owner} column"))?;
            if !seen.insert(*column) {
                return Err(OrmError::configuration(format!(
                    "{owner}::columns - Column '{column}' bound twice"
                )));
            }
        }

        let table = table_name(schema);
        let primary_key = primary_key(schema).unwrap_or_default();
        for pk in &primary_key {
            if !seen.contains(pk.as_str()) {
                return Err(OrmError::configuration(format!(
                    "{owner}::pk - Primary key column '{pk}' is not a bound column"
                )));
            }
        }

        let auto_increment_column = auto_increment_column(schema);
        if let Some(ai) = &auto_increment_column {
            if !seen.contains(ai.as_str()) {
                return Err(OrmError::configuration(format!(
                    "{owner}::ai - Auto increment column '{ai}' is not a bound column"
                )));
            }
        }

        let references = references(schema).map(|refs| {
            refs.into_iter()
                .filter(|r| {
                    let bound = seen.contains(r.local_column.as_str());
                    if !bound {
                        tracing::warn!(
                            target: "recorm",
                            entity = owner,
                            reference = %r,
                            "{owner}::ref - Reference column is not a bound column, ignored"
                        );
                    }
                    bound
                })
                .collect::<Vec<_>>()
        });

        Ok(Self {
            type_name: owner.to_string(),
            table,
            primary_key,
            auto_increment_column,
            references,
            columns: schema.columns.iter().map(|c| c.to_string()).collect(),
        })
    }

    /// Whether `column` is in the field registry.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Primary key columns, or an error naming the operation that needs them.
    pub fn require_primary_key(&self, operation: &str) -> OrmResult<&[String]> {
        if self.primary_key.is_empty() {
            Err(OrmError::configuration(format!(
                "{}::pk - {operation} requires a primary key",
                self.type_name
            )))
        } else {
            Ok(&self.primary_key)
        }
    }
}

/// Table name: the declared value if it is an identifier, else the type name.
pub fn table_name(schema: &EntitySchema) -> String {
    match schema.table {
        Some(table) if is_valid_identifier(table) => table.to_string(),
        Some(table) => {
            tracing::warn!(
                target: "recorm",
                entity = schema.type_name,
                "{}::table - Malformed table name '{table}', using type name",
                schema.type_name
            );
            schema.type_name.to_string()
        }
        None => schema.type_name.to_string(),
    }
}

/// Primary key columns, or `None` if undeclared or malformed.
pub fn primary_key(schema: &EntitySchema) -> Option<Vec<String>> {
    let declared = schema.primary_key.filter(|pk| !pk.trim().is_empty())?;
    let parsed = parse_identifier_list(declared);
    if parsed.is_none() {
        tracing::warn!(
            target: "recorm",
            entity = schema.type_name,
            "{}::pk Malformed primary keys '{declared}'",
            schema.type_name
        );
    }
    parsed
}

/// Auto-increment column, or `None` if undeclared or malformed.
pub fn auto_increment_column(schema: &EntitySchema) -> Option<String> {
    let declared = schema.auto_increment.filter(|ai| !ai.is_empty())?;
    let declared = declared.trim();
    if is_valid_identifier(declared) {
        Some(declared.to_string())
    } else {
        tracing::warn!(
            target: "recorm",
            entity = schema.type_name,
            "{}::ai Malformed auto increment key '{declared}'",
            schema.type_name
        );
        None
    }
}

/// Declared references, or `None` if undeclared or malformed.
pub fn references(schema: &EntitySchema) -> Option<Vec<ReferenceDef>> {
    let declared = schema.references.filter(|r| !r.trim().is_empty())?;
    parse_references(declared, schema.type_name)
}

/// Parse a `local:table.column[,...]` declaration.
///
/// Every malformed clause is reported; if any clause is malformed the whole
/// declaration yields `None`.
pub fn parse_references(declared: &str, owner: &str) -> Option<Vec<ReferenceDef>> {
    let mut refs = Vec::new();
    let mut malformed = false;

    for clause in declared.split(',') {
        match parse_reference_clause(clause) {
            Some(r) => refs.push(r),
            None => {
                malformed = true;
                tracing::warn!(
                    target: "recorm",
                    entity = owner,
                    "{owner}::ref - Malformed reference clause '{}'",
                    clause.trim()
                );
            }
        }
    }

    if malformed || refs.is_empty() {
        tracing::warn!(
            target: "recorm",
            entity = owner,
            "{owner}::ref - Malformed references"
        );
        return None;
    }
    Some(refs)
}

fn parse_reference_clause(clause: &str) -> Option<ReferenceDef> {
    let parts: Vec<&str> = clause.split(':').collect();
    let [local, target] = parts.as_slice() else {
        return None;
    };
    let target: Vec<&str> = target.split('.').collect();
    let [table, column] = target.as_slice() else {
        return None;
    };

    let (local, table, column) = (local.trim(), table.trim(), column.trim());
    if ![local, table, column].iter().all(|s| is_valid_identifier(s)) {
        return None;
    }

    Some(ReferenceDef {
        local_column: local.to_string(),
        target_table: table.to_string(),
        target_column: column.to_string(),
    })
}

type MetadataTable = RwLock<HashMap<TypeId, Arc<EntityMetadata>>>;

fn metadata_table() -> &'static MetadataTable {
    static TABLE: OnceLock<MetadataTable> = OnceLock::new();
    TABLE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Metadata for a type, parsed on first use and cached afterwards.
///
/// Failed validations are not cached: each use reports the error again.
pub fn metadata_for(type_id: TypeId, schema: &EntitySchema) -> OrmResult<Arc<EntityMetadata>> {
    if let Some(meta) = metadata_table()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&type_id)
    {
        return Ok(Arc::clone(meta));
    }

    let meta = Arc::new(EntityMetadata::from_schema(schema)?);
    let mut table = metadata_table()
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    Ok(Arc::clone(table.entry(type_id).or_insert(meta)))
}
