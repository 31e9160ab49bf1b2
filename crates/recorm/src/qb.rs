//! Query builder state and statement assembly.
//!
//! - [`QueryState`]: the mutable per-model SELECT state (columns, table,
//!   where, group, having, order, limit) and its fixed-order assembly.
//! - [`substitute`]: expands `?` markers in a condition template into escaped
//!   literals.
//! - [`insert_sql`], [`update_sql`], [`delete_sql`], [`upsert_sql`]: the write
//!   statements used by the persistence engine.
//!
//! ```ignore
//! let mut state = QueryState::new("users");
//! let cond = substitute("age > ? and name = ?", params![18, "Alice"], '?', &escape_literal, "where")?;
//! state.push_where(&cond).order(&["name"])?.limit(0, Some(10))?;
//! assert_eq!(
//!     state.to_sql(),
//!     "SELECT * FROM users WHERE age > 18 and name = 'Alice' ORDER BY name LIMIT 0, 10"
//! );
//! ```

pub mod state;
pub mod template;
pub mod write;


pub use state::{Limit, QueryState};
pub use template::{count_markers, make_where_in, substitute};
pub use write::{delete_sql, insert_sql, update_sql, upsert_sql};
