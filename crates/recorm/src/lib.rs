//! # recorm
//!
//! An active-record query builder and upsert engine.
//!
//! ## Features
//!
//! - **Declarative metadata**: table, primary key, auto-increment column and
//!   references declared once per entity with `#[derive(Entity)]`
//! - **Fluent query state**: `select`/`from`/`where_`/`group`/`having`/`order`/`limit`,
//!   reset after every executed read
//! - **Injection-safe templates**: positional markers substituted with escaped literals
//! - **Upsert by probe**: `save()` updates when the key exists, inserts otherwise
//! - **Reference loading**: declared foreign keys resolved through a [`Registry`]
//! - **Total persistence**: save/delete never error; failures are logged and reported as values
//!
//! ## Usage
//!
//! ```ignore
//! use recorm::prelude::*;
//!
//! #[derive(Debug, Clone, Default, Entity)]
//! #[orm(table = "users", pk = "id", ai = "id")]
//! struct User {
//!     id: Option<i64>,
//!     name: String,
//!     age: i32,
//! }
//!
//! let db = Db::new(connection);
//!
//! let mut users = Model::<User>::blank(&db)?;
//! let found = users
//!     .where_("age > ? and name = ?", params![18, "Alice"])?
//!     .find(FindOptions::default());
//!
//! let mut bob = Model::new(&db, User { name: "Bob".into(), age: 30, ..Default::default() })?;
//! bob.save();
//! bob.age = 31;
//! bob.save();
//! ```
//!
//! The [`Database`] trait is the only seam to a real connection; recorm
//! ships no driver. [`mock::MockDatabase`] is a scripted implementation for
//! tests.

extern crate self as recorm;

pub mod client;
pub mod config;
pub mod entity;
pub mod error;
pub mod ident;
pub mod mock;
pub mod model;
pub mod monitor;
pub mod prelude;
pub mod qb;
pub mod registry;
pub mod row;
pub mod schema;
pub mod transaction;
pub mod value;

pub use client::{Database, Db, escape_literal};
pub use config::{CountStrategy, ModelConfig, SqlLogLevel};
pub use entity::{Entity, Record, metadata};
pub use error::{OrmError, OrmResult};
pub use model::{Fetched, FindOptions, Model, SaveResult, upsert_many};
pub use monitor::SqlLogger;
pub use registry::{EntityRegistration, EntityRepository, Registry, Repository};
pub use row::{ResultSet, Row};
pub use schema::{EntityMetadata, EntitySchema, ReferenceDef};
pub use transaction::transaction;
pub use value::{FromValue, Param, ToValue, Value};

#[cfg(feature = "derive")]
pub use recorm_derive::Entity;

// Re-export inventory for use by derive macros
pub use inventory;
