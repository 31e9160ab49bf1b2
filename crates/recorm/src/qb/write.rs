//! INSERT / UPDATE / DELETE statements.
//!
//! Rows passed here carry already-validated column names; values are
//! rendered through the supplied escape function.

use crate::row::Row;
use crate::value::Value;

fn column_list(row: &Row) -> String {
    row.columns().collect::<Vec<_>>().join(", ")
}

fn value_list(row: &Row, escape: &dyn Fn(&Value) -> String) -> String {
    row.iter()
        .map(|(_, v)| escape(v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `INSERT INTO t (c1, c2) VALUES (v1, v2)`
pub fn insert_sql(table: &str, row: &Row, escape: &dyn Fn(&Value) -> String) -> String {
    format!(
        "INSERT INTO {table} ({}) VALUES ({})",
        column_list(row),
        value_list(row, escape)
    )
}

/// `UPDATE t SET c1 = v1, c2 = v2 WHERE <condition>`
pub fn update_sql(
    table: &str,
    row: &Row,
    condition: &str,
    escape: &dyn Fn(&Value) -> String,
) -> String {
    let assignments = row
        .iter()
        .map(|(c, v)| format!("{c} = {}", escape(v)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("UPDATE {table} SET {assignments} WHERE {condition}")
}

/// `DELETE FROM t [WHERE <condition>]`
pub fn delete_sql(table: &str, condition: Option<&str>) -> String {
    match condition {
        Some(condition) => format!("DELETE FROM {table} WHERE {condition}"),
        None => format!("DELETE FROM {table}"),
    }
}

/// Multi-row `INSERT .. ON DUPLICATE KEY UPDATE c = VALUES(c)`.
///
/// Every row must carry `columns` in order. Non-key columns are updated on
/// conflict; if every column is part of the key, the key columns are
/// reassigned so the statement stays valid.
pub fn upsert_sql(
    table: &str,
    columns: &[String],
    primary_key: &[String],
    rows: &[Row],
    escape: &dyn Fn(&Value) -> String,
) -> String {
    let tuples = rows
        .iter()
        .map(|row| {
            let values = columns
                .iter()
                .map(|c| escape(row.get(c).unwrap_or(&Value::Null)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("({values})")
        })
        .collect::<Vec<_>>()
        .join(", ");

    let mut update: Vec<&String> = columns
        .iter()
        .filter(|c| !primary_key.contains(c))
        .collect();
    if update.is_empty() {
        update = columns.iter().collect();
    }
    let update = update
        .iter()
        .map(|c| format!("{c} = VALUES({c})"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {table} ({}) VALUES {tuples} ON DUPLICATE KEY UPDATE {update}",
        columns.join(", ")
    )
}
