//! Core traits that power the query builder.
//!
//! These traits define the contract for:
//! - Building SQL expressions (`Expression`)
//! - Accumulating predicates and ordering on a query (`QueryBuilder`)

use crate::{
    expr::{
        ops::{BetweenOp, BinaryOp, InOp, LikeMode, LikeOp, LogicalOp, NullOp},
        Column,
    },
    query::SortDirection,
    value::Value,
};

/// A trait for types that can be converted into SQL expressions.
///
/// This enables ergonomic query construction using operators like `.eq()`, `.like()`, etc.
/// Implementors include:
/// - [`Column`]: a table column
/// - [`BinaryOp`], [`LikeOp`], etc.: compound expressions
///
/// When `to_sql` is called, it appends bound parameters to the provided `params` vector
/// and returns the SQL fragment (with `?` placeholders).
pub trait Expression: Sized {
    /// Converts this expression into a SQL string fragment and appends bound parameters.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sieve_db::{Column, Expression as _, Value};
    ///
    /// let expr = Column::new("name").eq("User");
    /// let mut params = vec![];
    /// let sql = expr.to_sql(&mut params);
    /// assert_eq!(sql, "name = ?");
    /// assert_eq!(params, [Value::Text("User".into())]);
    /// ```
    fn to_sql(&self, params: &mut Vec<Value>) -> String;

    /// Creates a SQL `=` condition.
    fn eq<T: Into<Value>>(self, value: T) -> BinaryOp<Self> {
        BinaryOp::new(self, "=", value.into())
    }

    /// Creates a SQL `<>` condition.
    fn ne<T: Into<Value>>(self, value: T) -> BinaryOp<Self> {
        BinaryOp::new(self, "<>", value.into())
    }

    /// Creates a SQL `>` condition.
    fn gt<T: Into<Value>>(self, value: T) -> BinaryOp<Self> {
        BinaryOp::new(self, ">", value.into())
    }

    /// Creates a SQL `<` condition.
    fn lt<T: Into<Value>>(self, value: T) -> BinaryOp<Self> {
        BinaryOp::new(self, "<", value.into())
    }

    /// Creates a SQL `>=` condition.
    fn gte<T: Into<Value>>(self, value: T) -> BinaryOp<Self> {
        BinaryOp::new(self, ">=", value.into())
    }

    /// Creates a SQL `<=` condition.
    fn lte<T: Into<Value>>(self, value: T) -> BinaryOp<Self> {
        BinaryOp::new(self, "<=", value.into())
    }

    /// Creates a SQL `LIKE '%value%'` condition.
    fn like(self, pattern: impl Into<String>) -> LikeOp<Self> {
        LikeOp::new(self, pattern.into(), LikeMode::Contains, false)
    }

    /// Creates a case-insensitive `LIKE '%value%'` condition.
    fn ilike(self, pattern: impl Into<String>) -> LikeOp<Self> {
        LikeOp::new(self, pattern.into(), LikeMode::Contains, true)
    }

    /// Creates a SQL `LIKE 'value%'` condition.
    fn starts_with(self, pattern: impl Into<String>) -> LikeOp<Self> {
        LikeOp::new(self, pattern.into(), LikeMode::StartsWith, false)
    }

    /// Creates a SQL `LIKE '%value'` condition.
    fn ends_with(self, pattern: impl Into<String>) -> LikeOp<Self> {
        LikeOp::new(self, pattern.into(), LikeMode::EndsWith, false)
    }

    /// Creates a SQL `BETWEEN` condition.
    fn between<T: Into<Value>, U: Into<Value>>(self, low: T, high: U) -> BetweenOp<Self> {
        BetweenOp::new(self, low.into(), high.into(), false)
    }

    /// Creates a SQL `NOT BETWEEN` condition.
    fn not_between<T: Into<Value>, U: Into<Value>>(self, low: T, high: U) -> BetweenOp<Self> {
        BetweenOp::new(self, low.into(), high.into(), true)
    }

    /// Creates a SQL `IN` condition.
    fn in_<T, I>(self, values: I) -> InOp<Self>
    where
        T: Into<Value>,
        I: IntoIterator<Item = T>,
    {
        let values = values.into_iter().map(|v| v.into()).collect();
        InOp::new(self, values, false)
    }

    /// Creates a SQL `NOT IN` condition.
    fn not_in<T, I>(self, values: I) -> InOp<Self>
    where
        T: Into<Value>,
        I: IntoIterator<Item = T>,
    {
        let values = values.into_iter().map(|v| v.into()).collect();
        InOp::new(self, values, true)
    }

    /// Creates a SQL `IS NULL` condition.
    fn null(self) -> NullOp<Self> {
        NullOp::new(self, true)
    }

    /// Creates a SQL `IS NOT NULL` condition.
    fn not_null(self) -> NullOp<Self> {
        NullOp::new(self, false)
    }

    /// Combines two expressions with `AND`.
    fn and<E: Expression>(self, other: E) -> LogicalOp<Self, E> {
        LogicalOp::new(self, other, "AND")
    }

    /// Combines two expressions with `OR`.
    fn or<E: Expression>(self, other: E) -> LogicalOp<Self, E> {
        LogicalOp::new(self, other, "OR")
    }
}

/// Something that accumulates `WHERE` predicates and `ORDER BY` terms.
///
/// Filters mutate the builder in place and never execute it; running the
/// query is left to whoever owns the builder.
pub trait QueryBuilder {
    /// Adds a predicate, combined with the existing ones by `AND`.
    fn and_where<E: Expression + 'static>(&mut self, expr: E);

    /// Appends an ordering term.
    fn order_by(&mut self, column: Column, direction: SortDirection);
}
