//! Scripted in-memory [`Database`] for tests.
//!
//! `MockDatabase` records every statement it receives and answers from a
//! queue of prepared responses. When the queue is empty a statement
//! succeeds with no rows.
//!
//! ```ignore
//! let mock = Arc::new(MockDatabase::new());
//! mock.push_rows(vec![Row::from_pairs([("id", Value::Int(1)), ("name", Value::from("Alice"))])]);
//! let db = Db::from_arc(mock.clone());
//! // ...
//! assert_eq!(mock.statements(), vec!["SELECT * FROM users"]);
//! ```

use crate::client::Database;
use crate::error::{OrmError, OrmResult};
use crate::row::{ResultSet, Row};
use crate::value::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
enum Response {
    Result(ResultSet),
    Failure(String),
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A scripted collaborator.
#[derive(Debug, Default)]
pub struct MockDatabase {
    statements: Mutex<Vec<String>>,
    responses: Mutex<VecDeque<Response>>,
    last_error: Mutex<String>,
    insert_id: AtomicI64,
    transactions: Mutex<Vec<&'static str>>,
    fail_transactions: AtomicBool,
}

impl MockDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful result.
    pub fn push_result(&self, result: ResultSet) -> &Self {
        lock(&self.responses).push_back(Response::Result(result));
        self
    }

    /// Queue a successful result carrying `rows`.
    pub fn push_rows(&self, rows: Vec<Row>) -> &Self {
        self.push_result(ResultSet::with_rows(rows))
    }

    /// Queue the single-row answer of a `COUNT(*) AS count` query.
    pub fn push_count(&self, count: i64) -> &Self {
        self.push_rows(vec![Row::from_pairs([("count", Value::Int(count))])])
    }

    /// Queue a failure; `last_error_message` reports `message` afterwards.
    pub fn push_failure(&self, message: impl Into<String>) -> &Self {
        lock(&self.responses).push_back(Response::Failure(message.into()));
        self
    }

    /// Id reported by `insert_id`.
    pub fn set_insert_id(&self, id: i64) -> &Self {
        self.insert_id.store(id, Ordering::Relaxed);
        self
    }

    /// Make every transaction primitive report failure.
    pub fn fail_transactions(&self) -> &Self {
        self.fail_transactions.store(true, Ordering::Relaxed);
        self
    }

    /// Every statement executed so far, in order.
    pub fn statements(&self) -> Vec<String> {
        lock(&self.statements).clone()
    }

    /// The most recent statement.
    pub fn last_statement(&self) -> Option<String> {
        lock(&self.statements).last().cloned()
    }

    /// Forget recorded statements.
    pub fn clear_statements(&self) {
        lock(&self.statements).clear();
    }

    /// Transaction calls so far: `"begin"`, `"commit"`, `"rollback"`.
    pub fn transaction_log(&self) -> Vec<&'static str> {
        lock(&self.transactions).clone()
    }

    fn transaction_call(&self, call: &'static str) -> bool {
        lock(&self.transactions).push(call);
        let ok = !self.fail_transactions.load(Ordering::Relaxed);
        if !ok {
            *lock(&self.last_error) = format!("{call} failed");
        }
        ok
    }
}

impl Database for MockDatabase {
    fn execute(&self, sql: &str) -> OrmResult<ResultSet> {
        lock(&self.statements).push(sql.to_string());
        match lock(&self.responses).pop_front() {
            Some(Response::Failure(message)) => {
                let err = OrmError::execution(message.clone());
                *lock(&self.last_error) = message;
                Err(err)
            }
            Some(Response::Result(result)) => {
                lock(&self.last_error).clear();
                Ok(result)
            }
            None => {
                lock(&self.last_error).clear();
                Ok(ResultSet::default())
            }
        }
    }

    fn insert_id(&self) -> i64 {
        self.insert_id.load(Ordering::Relaxed)
    }

    fn last_error_message(&self) -> String {
        lock(&self.last_error).clone()
    }

    fn trans_begin(&self) -> bool {
        self.transaction_call("begin")
    }

    fn trans_commit(&self) -> bool {
        self.transaction_call("commit")
    }

    fn trans_rollback(&self) -> bool {
        self.transaction_call("rollback")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_queue_in_order() {
        let mock = MockDatabase::new();
        mock.push_count(3).push_failure("table missing");

        let rows = mock.execute("SELECT 1").unwrap().rows;
        assert_eq!(rows[0].get("count"), Some(&Value::Int(3)));

        assert!(mock.execute("SELECT 2").is_err());
        assert_eq!(mock.last_error_message(), "table missing");

        assert!(mock.execute("SELECT 3").unwrap().rows.is_empty());
        assert_eq!(mock.last_error_message(), "");
        assert_eq!(mock.statements(), vec!["SELECT 1", "SELECT 2", "SELECT 3"]);
    }
}
