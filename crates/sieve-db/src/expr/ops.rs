//! SQL expression operators.
//!
//! These structs represent compound expressions like `col = ?`, `col LIKE ?`, etc.
//! Each implements [`Expression`] and recursively builds SQL fragments.

use crate::{traits::Expression, value::Value};

/// Represents a binary comparison (e.g., `=`, `>`, `<=`).
pub struct BinaryOp<L> {
    left: L,
    op: &'static str,
    right: Value,
}

impl<L> BinaryOp<L> {
    pub fn new(left: L, op: &'static str, right: Value) -> Self {
        Self {
            left,
            op,
            right,
        }
    }
}

impl<L: Expression> Expression for BinaryOp<L> {
    fn to_sql(&self, params: &mut Vec<Value>) -> String {
        let left_sql = self.left.to_sql(params);
        params.push(self.right.clone());
        format!("{} {} ?", left_sql, self.op)
    }
}

/// Where the wildcards go around a `LIKE` pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeMode {
    /// `%value%`
    Contains,
    /// `value%`
    StartsWith,
    /// `%value`
    EndsWith,
}

impl LikeMode {
    pub fn pattern(self, value: &str) -> String {
        match self {
            LikeMode::Contains => format!("%{value}%"),
            LikeMode::StartsWith => format!("{value}%"),
            LikeMode::EndsWith => format!("%{value}"),
        }
    }
}

/// Represents a `LIKE` or case-insensitive `LIKE` pattern match.
///
/// The value is not escaped: `%` and `_` inside it keep their wildcard meaning.
pub struct LikeOp<L> {
    left: L,
    pattern: String,
    mode: LikeMode,
    case_insensitive: bool,
}

impl<L> LikeOp<L> {
    pub const fn new(left: L, pattern: String, mode: LikeMode, case_insensitive: bool) -> Self {
        Self {
            left,
            pattern,
            mode,
            case_insensitive,
        }
    }
}

impl<L: Expression> Expression for LikeOp<L> {
    fn to_sql(&self, params: &mut Vec<Value>) -> String {
        let left_sql = self.left.to_sql(params);
        params.push(self.mode.pattern(&self.pattern).into());
        if self.case_insensitive {
            format!("LOWER({}) LIKE LOWER(?)", left_sql)
        } else {
            format!("{} LIKE ?", left_sql)
        }
    }
}

/// Represents a `BETWEEN` or `NOT BETWEEN` range check. Both bounds are inclusive.
pub struct BetweenOp<L> {
    left: L,
    low: Value,
    high: Value,
    negated: bool,
}

impl<L> BetweenOp<L> {
    pub fn new(left: L, low: Value, high: Value, negated: bool) -> Self {
        Self {
            left,
            low,
            high,
            negated,
        }
    }
}

impl<L: Expression> Expression for BetweenOp<L> {
    fn to_sql(&self, params: &mut Vec<Value>) -> String {
        let left_sql = self.left.to_sql(params);
        params.push(self.low.clone());
        params.push(self.high.clone());
        let op = if self.negated {
            "NOT BETWEEN"
        } else {
            "BETWEEN"
        };
        format!("{} {} ? AND ?", left_sql, op)
    }
}

/// Represents an `IN` or `NOT IN` clause.
///
/// An empty list renders as a constant (`1 = 0` for `IN`, `1 = 1` for `NOT IN`)
/// since `IN ()` is rejected by most databases.
pub struct InOp<L> {
    left: L,
    values: Vec<Value>,
    negated: bool,
}

impl<L> InOp<L> {
    pub fn new(left: L, values: Vec<Value>, negated: bool) -> Self {
        Self {
            left,
            values,
            negated,
        }
    }
}

impl<L: Expression> Expression for InOp<L> {
    fn to_sql(&self, params: &mut Vec<Value>) -> String {
        if self.values.is_empty() {
            return if self.negated { "1 = 1" } else { "1 = 0" }.to_string();
        }

        let left_sql = self.left.to_sql(params);
        let placeholders = vec!["?"; self.values.len()].join(", ");
        for v in &self.values {
            params.push(v.clone());
        }
        let op = if self.negated { "NOT IN" } else { "IN" };
        format!("{} {} ({})", left_sql, op, placeholders)
    }
}

/// Represents an `IS NULL` or `IS NOT NULL` check.
pub struct NullOp<L> {
    left: L,
    is_null: bool,
}

impl<L> NullOp<L> {
    pub fn new(left: L, is_null: bool) -> Self {
        Self {
            left,
            is_null,
        }
    }
}

impl<L: Expression> Expression for NullOp<L> {
    fn to_sql(&self, params: &mut Vec<Value>) -> String {
        let left_sql = self.left.to_sql(params);
        let op = if self.is_null {
            "IS NULL"
        } else {
            "IS NOT NULL"
        };
        format!("{} {}", left_sql, op)
    }
}

/// Combines two expressions with `AND` or `OR`.
pub struct LogicalOp<L, R> {
    left: L,
    right: R,
    op: &'static str,
}

impl<L, R> LogicalOp<L, R> {
    pub fn new(left: L, right: R, op: &'static str) -> Self {
        Self {
            left,
            right,
            op,
        }
    }
}

impl<L: Expression, R: Expression> Expression for LogicalOp<L, R> {
    fn to_sql(&self, params: &mut Vec<Value>) -> String {
        let left_sql = self.left.to_sql(params);
        let right_sql = self.right.to_sql(params);
        format!("({} {} {})", left_sql, self.op, right_sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Column;

    fn render<E: Expression>(expr: E) -> (String, Vec<Value>) {
        let mut params = vec![];
        let sql = expr.to_sql(&mut params);
        (sql, params)
    }

    #[test]
    fn test_binary_op() {
        let (sql, params) = render(Column::new("age").gte(18));
        assert_eq!(sql, "age >= ?");
        assert_eq!(params, [Value::Integer(18)]);

        let (sql, _) = render(Column::new("status").ne("draft"));
        assert_eq!(sql, "status <> ?");
    }

    #[test]
    fn test_like_modes() {
        let (sql, params) = render(Column::new("name").like("ab"));
        assert_eq!(sql, "name LIKE ?");
        assert_eq!(params, [Value::from("%ab%")]);

        let (_, params) = render(Column::new("name").starts_with("ab"));
        assert_eq!(params, [Value::from("ab%")]);

        let (_, params) = render(Column::new("name").ends_with("ab"));
        assert_eq!(params, [Value::from("%ab")]);

        let (sql, _) = render(Column::new("name").ilike("AB"));
        assert_eq!(sql, "LOWER(name) LIKE LOWER(?)");
    }

    #[test]
    fn test_between() {
        let (sql, params) = render(Column::new("price").between(10, 20));
        assert_eq!(sql, "price BETWEEN ? AND ?");
        assert_eq!(params, [Value::Integer(10), Value::Integer(20)]);

        let (sql, _) = render(Column::date("created_at").not_between("2024-01-01", "2024-02-01"));
        assert_eq!(sql, "DATE(created_at) NOT BETWEEN ? AND ?");
    }

    #[test]
    fn test_in_op() {
        let (sql, params) = render(Column::new("id").in_([1, 2, 3]));
        assert_eq!(sql, "id IN (?, ?, ?)");
        assert_eq!(params.len(), 3);

        let (sql, _) = render(Column::new("id").not_in(["a"]));
        assert_eq!(sql, "id NOT IN (?)");
    }

    #[test]
    fn test_in_op_empty() {
        let (sql, params) = render(Column::new("id").in_(Vec::<i64>::new()));
        assert_eq!(sql, "1 = 0");
        assert!(params.is_empty());

        let (sql, _) = render(Column::new("id").not_in(Vec::<i64>::new()));
        assert_eq!(sql, "1 = 1");
    }

    #[test]
    fn test_null_and_logical() {
        let (sql, params) = render(
            Column::new("deleted_at")
                .null()
                .or(Column::new("restored").eq(true)),
        );
        assert_eq!(sql, "(deleted_at IS NULL OR restored = ?)");
        assert_eq!(params, [Value::Integer(1)]);
    }
}
