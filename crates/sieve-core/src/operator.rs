//! The operator dispatch table.
//!
//! Every built-in filter is one [`Operator`] variant. Parsing a name gives the
//! variant, and [`Operator::apply`] turns a request value into exactly one
//! predicate on the query builder, or nothing when the value has the wrong
//! shape.

use std::{fmt, str::FromStr};

use serde::Serialize;
use sieve_db::{Column, Expression, QueryBuilder, Value};

use crate::{error::FilterError, request::ParamValue};

/// What an operator expects to find in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueShape {
    Scalar,
    Range,
    List,
    Any,
}

impl ValueShape {
    pub fn describe(self) -> &'static str {
        match self {
            ValueShape::Scalar => "scalar",
            ValueShape::Range => "list of two scalars",
            ValueShape::List => "list of scalars",
            ValueShape::Any => "any non-empty value",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum Operator {
    Equal,
    Distinct,
    GreaterThan,
    GreaterOrEqualThan,
    LessThan,
    LessOrEqualThan,
    Like,
    Llike,
    Rlike,
    Between,
    NotBetween,
    In,
    NotIn,
    Null,
    NotNull,
    Date,
    DateBetween,
}

impl Operator {
    pub const ALL: [Operator; 17] = [
        Operator::Equal,
        Operator::Distinct,
        Operator::GreaterThan,
        Operator::GreaterOrEqualThan,
        Operator::LessThan,
        Operator::LessOrEqualThan,
        Operator::Like,
        Operator::Llike,
        Operator::Rlike,
        Operator::Between,
        Operator::NotBetween,
        Operator::In,
        Operator::NotIn,
        Operator::Null,
        Operator::NotNull,
        Operator::Date,
        Operator::DateBetween,
    ];

    /// Canonical name, as accepted by [`Filter::apply`](crate::Filter::apply).
    /// Canonical names of every operator, in [`Operator::ALL`] order.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|op| op.name()).collect()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Operator::Equal => "equal",
            Operator::Distinct => "distinct",
            Operator::GreaterThan => "greaterThan",
            Operator::GreaterOrEqualThan => "greaterOrEqualThan",
            Operator::LessThan => "lessThan",
            Operator::LessOrEqualThan => "lessOrEqualThan",
            Operator::Like => "like",
            Operator::Llike => "llike",
            Operator::Rlike => "rlike",
            Operator::Between => "between",
            Operator::NotBetween => "notBetween",
            Operator::In => "in",
            Operator::NotIn => "notIn",
            Operator::Null => "null",
            Operator::NotNull => "notNull",
            Operator::Date => "date",
            Operator::DateBetween => "dateBetween",
        }
    }

    /// snake_case spelling, also accepted when parsing.
    pub const fn alias(self) -> &'static str {
        match self {
            Operator::GreaterThan => "greater_than",
            Operator::GreaterOrEqualThan => "greater_or_equal_than",
            Operator::LessThan => "less_than",
            Operator::LessOrEqualThan => "less_or_equal_than",
            Operator::NotBetween => "not_between",
            Operator::NotIn => "not_in",
            Operator::NotNull => "not_null",
            Operator::DateBetween => "date_between",
            other => other.name(),
        }
    }

    pub const fn shape(self) -> ValueShape {
        match self {
            Operator::Between | Operator::NotBetween | Operator::DateBetween => ValueShape::Range,
            Operator::In | Operator::NotIn => ValueShape::List,
            Operator::Null | Operator::NotNull => ValueShape::Any,
            _ => ValueShape::Scalar,
        }
    }

    /// The predicate rendered for a column `col`, for display.
    pub const fn sql_template(self) -> &'static str {
        match self {
            Operator::Equal => "col = ?",
            Operator::Distinct => "col <> ?",
            Operator::GreaterThan => "col > ?",
            Operator::GreaterOrEqualThan => "col >= ?",
            Operator::LessThan => "col < ?",
            Operator::LessOrEqualThan => "col <= ?",
            Operator::Like => "col LIKE '%v%'",
            Operator::Llike => "col LIKE '%v'",
            Operator::Rlike => "col LIKE 'v%'",
            Operator::Between => "col BETWEEN ? AND ?",
            Operator::NotBetween => "col NOT BETWEEN ? AND ?",
            Operator::In => "col IN (?, ...)",
            Operator::NotIn => "col NOT IN (?, ...)",
            Operator::Null => "col IS NULL",
            Operator::NotNull => "col IS NOT NULL",
            Operator::Date => "DATE(col) = ?",
            Operator::DateBetween => "DATE(col) BETWEEN ? AND ?",
        }
    }

    /// Adds this operator's predicate on `key` to `query`.
    ///
    /// `value` must already be known to be present and non-blank. Returns
    /// `false`, leaving `query` untouched, when the value has the wrong shape.
    pub fn apply<Q: QueryBuilder>(self, query: &mut Q, key: &str, value: &ParamValue) -> bool {
        let column = Column::new(key);

        match self {
            Operator::Equal => with_scalar(value, |v| query.and_where(column.eq(v))),
            Operator::Distinct => with_scalar(value, |v| query.and_where(column.ne(v))),
            Operator::GreaterThan => with_scalar(value, |v| query.and_where(column.gt(v))),
            Operator::GreaterOrEqualThan => {
                with_scalar(value, |v| query.and_where(column.gte(v)))
            }
            Operator::LessThan => with_scalar(value, |v| query.and_where(column.lt(v))),
            Operator::LessOrEqualThan => with_scalar(value, |v| query.and_where(column.lte(v))),
            Operator::Like => with_scalar(value, |v| query.and_where(column.like(v.to_text()))),
            Operator::Llike => {
                with_scalar(value, |v| query.and_where(column.ends_with(v.to_text())))
            }
            Operator::Rlike => {
                with_scalar(value, |v| query.and_where(column.starts_with(v.to_text())))
            }
            Operator::Between => {
                with_range(value, |low, high| query.and_where(column.between(low, high)))
            }
            Operator::NotBetween => {
                with_range(value, |low, high| {
                    query.and_where(column.not_between(low, high))
                })
            }
            Operator::In => with_list(value, |values| query.and_where(column.in_(values))),
            Operator::NotIn => with_list(value, |values| query.and_where(column.not_in(values))),
            Operator::Null => {
                query.and_where(column.null());
                true
            }
            Operator::NotNull => {
                query.and_where(column.not_null());
                true
            }
            Operator::Date => {
                with_scalar(value, |v| query.and_where(Column::date(key).eq(v)))
            }
            Operator::DateBetween => {
                with_range(value, |low, high| {
                    query.and_where(Column::date(key).between(low, high))
                })
            }
        }
    }
}

fn with_scalar(value: &ParamValue, f: impl FnOnce(Value)) -> bool {
    match value.as_scalar() {
        Some(v) => {
            f(v);
            true
        }
        None => false,
    }
}

fn with_range(value: &ParamValue, f: impl FnOnce(Value, Value)) -> bool {
    match value.as_range() {
        Some((low, high)) => {
            f(low, high);
            true
        }
        None => false,
    }
}

fn with_list(value: &ParamValue, f: impl FnOnce(Vec<Value>)) -> bool {
    match value.as_scalars() {
        Some(values) => {
            f(values);
            true
        }
        None => false,
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Operator> for &'static str {
    fn from(op: Operator) -> Self {
        op.name()
    }
}

impl FromStr for Operator {
    type Err = FilterError;

    /// Exact, case-sensitive match on the canonical name or its alias.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.name() == s || op.alias() == s)
            .ok_or_else(|| FilterError::UnsupportedOperator(s.to_string()))
    }
}
