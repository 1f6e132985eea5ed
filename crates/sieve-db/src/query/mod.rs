//! The query builder.
//!
//! Start with [`SelectQuery::from`] and chain methods to construct SELECT queries.
//!
//! # Example
//!
//! ```rust
//! use sieve_db::{Column, Expression as _, SelectQuery, SortDirection};
//!
//! let (sql, params) = SelectQuery::from("users")
//!     .columns(["id", "username", "email"])
//!     .filter(Column::new("active").eq(1))
//!     .order_by(Column::new("created_at"), SortDirection::Desc)
//!     .limit(10)
//!     .build();
//!
//! assert_eq!(
//!     sql,
//!     "SELECT id, username, email FROM users WHERE active = ? ORDER BY created_at DESC LIMIT 10"
//! );
//! assert_eq!(params.len(), 1);
//! ```

pub mod clause;
pub mod select;

pub use clause::SortDirection;
pub use select::SelectQuery;
