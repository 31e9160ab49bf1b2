//! Transaction helper.
//!
//! Transactions belong to the shared connection, not to a model: any model
//! built from the same [`Db`] takes part. No nesting or isolation semantics
//! are added on top of the collaborator's primitives.
//!
//! ```ignore
//! recorm::transaction(&db, |db| {
//!     let mut from = Model::new(db, Account { id: Some(1), balance: 50, ..Default::default() })?;
//!     let mut to = Model::new(db, Account { id: Some(2), balance: 150, ..Default::default() })?;
//!     if !from.save().is_success() || !to.save().is_success() {
//!         return Err(OrmError::persistence("transfer failed"));
//!     }
//!     Ok(())
//! })?;
//! ```

use crate::client::Db;
use crate::error::{OrmError, OrmResult};

/// Run `body` inside a transaction.
///
/// - Begins a transaction on the underlying connection.
/// - Commits on `Ok(_)`.
/// - Rolls back on `Err(_)` and returns the body's error.
pub fn transaction<T, F>(db: &Db, body: F) -> OrmResult<T>
where
    F: FnOnce(&Db) -> OrmResult<T>,
{
    let database = db.database();
    if !database.trans_begin() {
        return Err(OrmError::execution(format!(
            "failed to begin transaction: {}",
            db.error_message()
        )));
    }
    tracing::info!(target: "recorm", "transaction started");

    match body(db) {
        Ok(value) => {
            if !database.trans_commit() {
                return Err(OrmError::execution(format!(
                    "failed to commit transaction: {}",
                    db.error_message()
                )));
            }
            tracing::info!(target: "recorm", "transaction committed");
            Ok(value)
        }
        Err(error) => {
            if database.trans_rollback() {
                tracing::info!(target: "recorm", error = %error, "transaction rolled back");
                Err(error)
            } else {
                Err(OrmError::Other(format!(
                    "{error} (rollback failed: {})",
                    db.error_message()
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDatabase;
    use std::sync::Arc;

    #[test]
    fn commits_on_ok() {
        let mock = Arc::new(MockDatabase::new());
        let db = Db::from_arc(mock.clone());

        let value = transaction(&db, |_| Ok(7)).unwrap();
        assert_eq!(value, 7);
        assert_eq!(mock.transaction_log(), vec!["begin", "commit"]);
    }

    #[test]
    fn rolls_back_on_err() {
        let mock = Arc::new(MockDatabase::new());
        let db = Db::from_arc(mock.clone());

        let err = transaction(&db, |_| -> OrmResult<()> { Err(OrmError::persistence("boom")) })
            .unwrap_err();
        assert!(matches!(err, OrmError::Persistence(_)));
        assert_eq!(mock.transaction_log(), vec!["begin", "rollback"]);
    }

    #[test]
    fn begin_failure_skips_body() {
        let mock = Arc::new(MockDatabase::new());
        mock.fail_transactions();
        let db = Db::from_arc(mock.clone());

        let mut ran = false;
        let err = transaction(&db, |_| {
            ran = true;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, OrmError::Execution(_)));
        assert!(!ran);
    }
}
