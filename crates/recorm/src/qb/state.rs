//! Per-model SELECT state.

use crate::error::{OrmError, OrmResult};
use std::fmt;

/// `LIMIT` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// `LIMIT rows`
    Rows(u64),
    /// `LIMIT skip, rows`
    Range { skip: u64, rows: u64 },
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Rows(rows) => write!(f, "{rows}"),
            Limit::Range { skip, rows } => write!(f, "{skip}, {rows}"),
        }
    }
}

/// Mutable query state owned by one model instance.
///
/// Defaults: `columns = ["*"]`, `table` = the entity's table, every other
/// clause unset. `where`/`having` fragments accumulate: each push is
/// appended verbatim, so joining with `AND`/`OR` is up to the template text.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    default_table: String,
    columns: Vec<String>,
    table: String,
    where_clause: Option<String>,
    group: Option<Vec<String>>,
    having: Option<String>,
    order: Option<Vec<String>>,
    limit: Option<Limit>,
}

fn name_list(items: &[&str], clause: &str) -> OrmResult<Vec<String>> {
    if items.is_empty() {
        return Err(OrmError::argument(format!(
            "{clause} requires column names as string arguments. At least 1 column is required"
        )));
    }
    if let Some(pos) = items.iter().position(|c| c.trim().is_empty()) {
        return Err(OrmError::argument(format!(
            "{clause} - argument {} is an empty column name",
            pos + 1
        )));
    }
    Ok(items.iter().map(|c| c.to_string()).collect())
}

impl QueryState {
    /// Fresh state for a table.
    pub fn new(default_table: impl Into<String>) -> Self {
        let default_table = default_table.into();
        Self {
            columns: vec!["*".to_string()],
            table: default_table.clone(),
            default_table,
            where_clause: None,
            group: None,
            having: None,
            order: None,
            limit: None,
        }
    }

    // ==================== Mutators ====================

    /// Replace the selected columns.
    pub fn select(&mut self, columns: &[&str]) -> OrmResult<&mut Self> {
        self.columns = name_list(columns, "select")?;
        Ok(self)
    }

    /// Select from another table (or table expression).
    pub fn from(&mut self, table: &str) -> OrmResult<&mut Self> {
        if table.trim().is_empty() {
            return Err(OrmError::argument(
                "from - accepts table name(s) as a non-empty string argument",
            ));
        }
        self.table = table.to_string();
        Ok(self)
    }

    /// Append an already substituted WHERE fragment.
    pub fn push_where(&mut self, fragment: &str) -> &mut Self {
        self.where_clause
            .get_or_insert_with(String::new)
            .push_str(fragment);
        self
    }

    /// Replace the GROUP BY columns.
    pub fn group(&mut self, columns: &[&str]) -> OrmResult<&mut Self> {
        self.group = Some(name_list(columns, "group")?);
        Ok(self)
    }

    /// Append an already substituted HAVING fragment.
    pub fn push_having(&mut self, fragment: &str) -> &mut Self {
        self.having
            .get_or_insert_with(String::new)
            .push_str(fragment);
        self
    }

    /// Replace the ORDER BY terms (`"name"`, `"created_at DESC"`).
    pub fn order(&mut self, columns: &[&str]) -> OrmResult<&mut Self> {
        self.order = Some(name_list(columns, "order")?);
        Ok(self)
    }

    /// Set `LIMIT first` (a row count) or `LIMIT first, second` (offset, row count).
    pub fn limit(&mut self, first: i64, second: Option<i64>) -> OrmResult<&mut Self> {
        let first = u64::try_from(first).map_err(|_| {
            OrmError::argument(format!("limit - argument 1 must be >= 0, got {first}"))
        })?;
        let second = second
            .map(|c| {
                u64::try_from(c).map_err(|_| {
                    OrmError::argument(format!("limit - argument 2 must be >= 0, got {c}"))
                })
            })
            .transpose()?;
        self.limit = Some(match second {
            Some(rows) => Limit::Range { skip: first, rows },
            None => Limit::Rows(first),
        });
        Ok(self)
    }

    /// Restrict the result to one row, keeping an explicit offset.
    pub fn limit_one(&mut self) -> &mut Self {
        self.limit = Some(match self.limit {
            Some(Limit::Range { skip, .. }) => Limit::Range { skip, rows: 1 },
            _ => Limit::Rows(1),
        });
        self
    }

    // ==================== Resets ====================

    /// Reset columns to `*`.
    pub fn reset_select(&mut self) -> &mut Self {
        self.columns = vec!["*".to_string()];
        self
    }

    /// Reset the table to the entity's table.
    pub fn reset_from(&mut self) -> &mut Self {
        self.table.clone_from(&self.default_table);
        self
    }

    pub fn reset_where(&mut self) -> &mut Self {
        self.where_clause = None;
        self
    }

    pub fn reset_group(&mut self) -> &mut Self {
        self.group = None;
        self
    }

    pub fn reset_having(&mut self) -> &mut Self {
        self.having = None;
        self
    }

    pub fn reset_order(&mut self) -> &mut Self {
        self.order = None;
        self
    }

    pub fn reset_limit(&mut self) -> &mut Self {
        self.limit = None;
        self
    }

    /// Reset every clause to its default.
    pub fn reset(&mut self) -> &mut Self {
        self.reset_select()
            .reset_from()
            .reset_where()
            .reset_group()
            .reset_having()
            .reset_order()
            .reset_limit()
    }

    // ==================== Accessors ====================

    /// Table the query currently reads from.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The entity's own table.
    pub fn default_table(&self) -> &str {
        &self.default_table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn where_clause(&self) -> Option<&str> {
        self.where_clause.as_deref()
    }

    pub fn having_clause(&self) -> Option<&str> {
        self.having.as_deref()
    }

    pub fn limit_clause(&self) -> Option<Limit> {
        self.limit
    }

    /// Whether the query reads the entity's own table.
    pub fn targets_default_table(&self) -> bool {
        self.table == self.default_table
    }

    /// Whether every clause is at its default.
    pub fn is_default(&self) -> bool {
        *self == Self::new(self.default_table.clone())
    }

    // ==================== Assembly ====================

    /// Assemble `SELECT .. FROM .. [WHERE] [GROUP BY] [HAVING] [ORDER BY] [LIMIT]`.
    pub fn to_sql(&self) -> String {
        let mut sql = String::with_capacity(64);
        sql.push_str("SELECT ");
        sql.push_str(&self.columns.join(", "));
        sql.push_str(" FROM ");
        sql.push_str(&self.table);

        if let Some(w) = self.where_clause.as_deref().filter(|w| !w.is_empty()) {
            sql.push_str(" WHERE ");
            sql.push_str(w);
        }
        if let Some(group) = self.group.as_ref() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&group.join(", "));
        }
        if let Some(h) = self.having.as_deref().filter(|h| !h.is_empty()) {
            sql.push_str(" HAVING ");
            sql.push_str(h);
        }
        if let Some(order) = self.order.as_ref() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.join(", "));
        }
        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ");
            sql.push_str(&limit.to_string());
        }
        sql
    }

    /// Count the rows [`to_sql`](Self::to_sql) would return.
    ///
    /// A plain `SELECT *` with no GROUP BY, HAVING or LIMIT is counted
    /// directly: `SELECT COUNT(*) AS count FROM <table> [WHERE ..]`. Anything
    /// else is wrapped in a derived table; a default `*` column list becomes
    /// `1` there so joined tables sharing column names stay valid.
    pub fn to_count_sql(&self) -> String {
        let direct = self.group.is_none()
            && self.having.as_deref().is_none_or(str::is_empty)
            && self.limit.is_none()
            && self.has_default_columns();

        if direct {
            let mut sql = format!("SELECT COUNT(*) AS count FROM {}", self.table);
            if let Some(w) = self.where_clause.as_deref().filter(|w| !w.is_empty()) {
                sql.push_str(" WHERE ");
                sql.push_str(w);
            }
            return sql;
        }

        let mut inner = self.clone();
        if inner.has_default_columns() {
            inner.columns = vec!["1".to_string()];
        }
        format!(
            "SELECT COUNT(*) AS count FROM ({}) AS recorm_count",
            inner.to_sql()
        )
    }

    fn has_default_columns(&self) -> bool {
        matches!(self.columns.as_slice(), [c] if c == "*")
    }
}
