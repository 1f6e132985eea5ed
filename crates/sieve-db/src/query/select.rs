//! The main query builder implementation.

use diesel::{
    query_builder::{BoxedSqlQuery, SqlQuery},
    sql_query,
    sql_types::{BigInt, Double, Nullable, Text},
    sqlite::Sqlite,
    QueryableByName, RunQueryDsl, SqliteConnection,
};
use tracing::trace;

use crate::{
    error::Result,
    expr::Column,
    query::clause::{OrderClause, SortDirection, WhereClause},
    traits::{Expression, QueryBuilder},
    value::Value,
};

/// An ergonomic SQL query builder.
///
/// Constructed via [`SelectQuery::from`], then chained with `.filter()`, `.order_by()`, etc.
/// Every `.filter()` adds one predicate; predicates are joined with `AND`.
///
/// # Example
///
/// ```rust
/// use sieve_db::{Column, DbConnection, Expression as _, SelectQuery};
/// use diesel::{sql_query, RunQueryDsl};
///
/// let mut db = DbConnection::open_in_memory().unwrap();
/// sql_query("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")
///     .execute(db.conn())
///     .unwrap();
/// sql_query("INSERT INTO users (name) VALUES ('ada'), ('grace')")
///     .execute(db.conn())
///     .unwrap();
///
/// let count = SelectQuery::from("users")
///     .filter(Column::new("id").gt(1))
///     .count(db.conn())
///     .unwrap();
/// assert_eq!(count, 1);
/// ```
pub struct SelectQuery {
    table: String,
    columns: Vec<String>,
    joins: Vec<String>,
    wheres: Vec<WhereClause>,
    orders: Vec<OrderClause>,
    limit: Option<u32>,
    offset: Option<u32>,
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

impl SelectQuery {
    /// Starts a new query on the given table.
    ///
    /// # Parameters
    ///
    /// - `table`: table name (e.g., `"users"`)
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: vec![],
            joins: vec![],
            wheres: vec![],
            orders: vec![],
            limit: None,
            offset: None,
        }
    }

    /// Select specific columns from the table.
    pub fn columns<I, S>(mut self, cols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(cols.into_iter().map(Into::into));
        self
    }

    /// Adds a JOIN clause.
    ///
    /// # Example
    /// ```ignore
    /// .join("JOIN profiles ON users.id = profiles.user_id")
    /// ```
    pub fn join(mut self, join: impl Into<String>) -> Self {
        self.joins.push(join.into());
        self
    }

    /// Applies the WHERE condition.
    pub fn filter<Expr: Expression + 'static>(mut self, expr: Expr) -> Self {
        self.and_where(expr);
        self
    }

    /// Adds an ORDER BY clause.
    pub fn order_by(mut self, column: impl Into<Column>, direction: SortDirection) -> Self {
        QueryBuilder::order_by(&mut self, column.into(), direction);
        self
    }

    /// Limit the number of results
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set query offset
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Set pagination params. Pages are 1-based; page 0 is treated as page 1.
    pub fn page(mut self, page: u32, per_page: u32) -> Self {
        self.limit = Some(per_page);
        self.offset = Some(page.saturating_sub(1) * per_page);
        self
    }

    /// Number of predicates added so far.
    pub fn filter_count(&self) -> usize {
        self.wheres.len()
    }

    /// Ordering terms in the order they were added, as `(column, direction)`.
    pub fn orderings(&self) -> Vec<(&str, SortDirection)> {
        self.orders
            .iter()
            .map(|o| (o.column.as_str(), o.direction))
            .collect()
    }

    /// Renders the `SELECT` statement and its bind parameters.
    pub fn build(&self) -> (String, Vec<Value>) {
        let mut params = vec![];

        let select = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(", ")
        };

        let mut sql = format!("SELECT {} FROM {}", select, self.table);
        self.push_joins_and_wheres(&mut sql, &mut params);

        if !self.orders.is_empty() {
            sql.push_str(" ORDER BY ");
            let orders = self
                .orders
                .iter()
                .map(|o| format!("{} {}", o.column, o.direction.as_sql()))
                .collect::<Vec<_>>();
            sql.push_str(&orders.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        if let Some(offset) = self.offset {
            // SQLite rejects OFFSET without LIMIT
            if self.limit.is_none() {
                sql.push_str(" LIMIT -1");
            }
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        (sql, params)
    }

    /// Renders `SELECT COUNT(*)` with the same joins and predicates, ignoring
    /// ordering and pagination.
    pub fn build_count(&self) -> (String, Vec<Value>) {
        let mut params = vec![];
        let mut sql = format!("SELECT COUNT(*) AS count FROM {}", self.table);
        self.push_joins_and_wheres(&mut sql, &mut params);
        (sql, params)
    }

    fn push_joins_and_wheres(&self, sql: &mut String, params: &mut Vec<Value>) {
        for join in &self.joins {
            sql.push_str(&format!(" {}", join));
        }

        if !self.wheres.is_empty() {
            sql.push_str(" WHERE ");
            let conditions = self
                .wheres
                .iter()
                .map(|w| (w.sql_fn)(params))
                .collect::<Vec<_>>();
            sql.push_str(&conditions.join(" AND "));
        }
    }

    /// Runs the query and maps every row with `T`'s [`QueryableByName`] impl.
    pub fn load<T>(&self, conn: &mut SqliteConnection) -> Result<Vec<T>>
    where
        T: QueryableByName<Sqlite> + 'static,
    {
        let (sql, params) = self.build();
        trace!(sql = %sql, params = ?params, "loading rows");
        Ok(bind_params(sql, params).load(conn)?)
    }

    /// Counts the rows matching the query's predicates.
    pub fn count(&self, conn: &mut SqliteConnection) -> Result<i64> {
        let (sql, params) = self.build_count();
        trace!(sql = %sql, params = ?params, "counting rows");
        let row: CountRow = bind_params(sql, params).get_result(conn)?;
        Ok(row.count)
    }
}

impl QueryBuilder for SelectQuery {
    fn and_where<E: Expression + 'static>(&mut self, expr: E) {
        self.wheres.push(WhereClause {
            sql_fn: Box::new(move |params| expr.to_sql(params)),
        });
    }

    fn order_by(&mut self, column: Column, direction: SortDirection) {
        let mut params = vec![];
        self.orders.push(OrderClause {
            column: column.to_sql(&mut params),
            direction,
        });
    }
}

fn bind_params(sql: String, params: Vec<Value>) -> BoxedSqlQuery<'static, Sqlite, SqlQuery> {
    params
        .into_iter()
        .fold(sql_query(sql).into_boxed::<Sqlite>(), |query, value| match value {
            Value::Null => query.bind::<Nullable<Text>, _>(None::<String>),
            Value::Integer(v) => query.bind::<BigInt, _>(v),
            Value::Real(v) => query.bind::<Double, _>(v),
            Value::Text(v) => query.bind::<Text, _>(v),
        })
}
