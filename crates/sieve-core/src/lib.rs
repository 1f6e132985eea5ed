//! Request-driven query filtering.
//!
//! A [`Filter`] reads [`RequestParams`] and adds one predicate per declared
//! filter to any [`QueryBuilder`](sieve_db::QueryBuilder), then orders the
//! result by a column the caller actually filtered on.

pub mod error;
pub mod filter;
pub mod filterable;
pub mod operator;
pub mod request;

pub use error::{FilterError, FilterResult};
pub use filter::{Filter, FilterSummary, OrderCallback};
pub use filterable::Filterable;
pub use operator::{Operator, ValueShape};
pub use request::{ParamValue, RequestParams};
