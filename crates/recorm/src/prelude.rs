//! Convenient imports for typical `recorm` usage.
//!
//! ```ignore
//! use recorm::prelude::*;
//! ```

pub use crate::{
    Database, Db, Entity, Fetched, FindOptions, Model, ModelConfig, OrmError, OrmResult, Param,
    Record, Registry, Row, SaveResult, Value, params, transaction, upsert_many,
};
