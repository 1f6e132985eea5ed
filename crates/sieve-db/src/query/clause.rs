//! Internal representation of query clauses.
//!
//! [`WhereClause`] and [`OrderClause`] are used internally by [`super::SelectQuery`];
//! [`SortDirection`] is public since callers pick it.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A WHERE clause represented as a closure that generates SQL and binds parameters.
pub(crate) struct WhereClause {
    pub sql_fn: Box<dyn Fn(&mut Vec<Value>) -> String>,
}

/// An ORDER BY clause.
pub(crate) struct OrderClause {
    pub column: String,
    pub direction: SortDirection,
}

/// Sort direction for queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is neither `asc` nor `desc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSortDirectionError(pub String);

impl fmt::Display for ParseSortDirectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid sort direction `{}`, expected asc or desc", self.0)
    }
}

impl std::error::Error for ParseSortDirectionError {}

impl FromStr for SortDirection {
    type Err = ParseSortDirectionError;

    /// Case-insensitive; surrounding whitespace is not trimmed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(ParseSortDirectionError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sort_direction() {
        assert_eq!("asc".parse(), Ok(SortDirection::Asc));
        assert_eq!("DESC".parse(), Ok(SortDirection::Desc));
        assert_eq!("AsC".parse(), Ok(SortDirection::Asc));
        assert!("up".parse::<SortDirection>().is_err());
        assert!(" asc".parse::<SortDirection>().is_err());
    }

    #[test]
    fn test_sort_direction_rendering() {
        assert_eq!(SortDirection::Asc.as_sql(), "ASC");
        assert_eq!(SortDirection::Desc.to_string(), "desc");
        assert_eq!(SortDirection::default(), SortDirection::Desc);
    }
}
