//! Represents a database column.
//!
//! Filters name their columns at runtime, so unlike a schema-generated column
//! a `Column` owns its name. It implements [`Expression`], so it can be used
//! directly in filters.

use crate::{traits::Expression, value::Value};

/// A reference to a database column, optionally wrapped in a SQL function.
///
/// # Example
///
/// ```rust
/// use sieve_db::{Column, Expression as _};
///
/// let mut params = vec![];
/// assert_eq!(Column::date("created_at").to_sql(&mut params), "DATE(created_at)");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    name: String,
    function: Option<&'static str>,
}

impl Column {
    /// Creates a new column reference.
    ///
    /// # Parameters
    ///
    /// - `name`: the actual column name in the database (e.g., `"user_name"`)
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            function: None,
        }
    }

    /// The column truncated to its calendar date, `DATE(name)`.
    pub fn date(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            function: Some("DATE"),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Expression for Column {
    fn to_sql(&self, _params: &mut Vec<Value>) -> String {
        match self.function {
            Some(function) => format!("{}({})", function, self.name),
            None => self.name.clone(),
        }
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        Column::new(name)
    }
}

impl From<String> for Column {
    fn from(name: String) -> Self {
        Column::new(name)
    }
}
