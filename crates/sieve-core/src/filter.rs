//! Request-driven filtering of a query builder.

use serde::Serialize;
use sieve_config::config::Config;
use sieve_db::{Column, QueryBuilder, SortDirection};
use tracing::{debug, trace};

use crate::{
    error::FilterResult,
    operator::Operator,
    request::{ParamValue, RequestParams},
};

/// Orders the query by a constrained field on the filter's behalf.
///
/// Receives the requested field name, the resolved direction and the builder.
pub type OrderCallback<'a, Q> = Box<dyn Fn(&str, SortDirection, &mut Q) + 'a>;

enum Constraint<'a, Q> {
    Column,
    Ordering(OrderCallback<'a, Q>),
}

/// What a filter did, once it is done.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSummary {
    /// Constrained keys in the order they were first declared.
    pub constraints: Vec<String>,
    pub has_custom_filters: bool,
}

/// Applies request parameters to a query builder.
///
/// Each operator call records its key as constrained and then, if the request
/// carries a usable value for it, adds one predicate. Only constrained keys
/// may be used as the request's order-by column; anything else orders by the
/// configured default.
///
/// ```
/// use sieve_config::config::Config;
/// use sieve_core::{Filter, RequestParams};
/// use sieve_db::SelectQuery;
///
/// let request = RequestParams::from_query_string("name=jo&order_by=name&order_dir=asc");
/// let mut query = SelectQuery::from("users");
///
/// Filter::new(&mut query, &request, &Config::default_config())
///     .like("name")
///     .equal("email")
///     .order();
///
/// let (sql, _) = query.build();
/// assert_eq!(sql, "SELECT * FROM users WHERE name LIKE ? ORDER BY name ASC");
/// ```
pub struct Filter<'a, Q> {
    query: &'a mut Q,
    request: &'a RequestParams,
    order_by: String,
    order_dir: SortDirection,
    order_by_key: String,
    order_dir_key: String,
    constraints: Vec<(String, Constraint<'a, Q>)>,
    has_custom_filter: bool,
}

macro_rules! operator_methods {
    ($($(#[$doc:meta])* $method:ident => $op:ident),+ $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $method(&mut self, key: &str) -> &mut Self {
                self.apply_operator(Operator::$op, key)
            }
        )+
    };
}

impl<'a, Q: QueryBuilder> Filter<'a, Q> {
    pub fn new(query: &'a mut Q, request: &'a RequestParams, config: &Config) -> Self {
        let order_dir = config.order_dir().parse().unwrap_or_default();

        Self {
            query,
            request,
            order_by: config.order_by().to_string(),
            order_dir,
            order_by_key: config.order_by_key().to_string(),
            order_dir_key: config.order_dir_key().to_string(),
            constraints: Vec::new(),
            has_custom_filter: false,
        }
    }

    /// Applies the operator called `name` to `key`.
    ///
    /// An unknown name is an error and leaves both the builder and the
    /// constraint set untouched.
    pub fn apply(&mut self, name: &str, key: &str) -> FilterResult<&mut Self> {
        let operator = name.parse::<Operator>()?;
        Ok(self.apply_operator(operator, key))
    }

    pub fn apply_operator(&mut self, operator: Operator, key: &str) -> &mut Self {
        self.constrain(key, Constraint::Column);

        let request = self.request;
        match request.get(key) {
            Some(value) if !value.is_blank() => {
                if operator.apply(&mut *self.query, key, value) {
                    debug!(operator = operator.name(), key, "filter applied");
                } else {
                    debug!(
                        operator = operator.name(),
                        key,
                        expected = operator.shape().describe(),
                        "value has the wrong shape, filter skipped"
                    );
                }
            }
            _ => trace!(operator = operator.name(), key, "no value, filter skipped"),
        }

        self
    }

    operator_methods! {
        equal => Equal,
        /// `key <> value`
        distinct => Distinct,
        greater_than => GreaterThan,
        greater_or_equal_than => GreaterOrEqualThan,
        less_than => LessThan,
        less_or_equal_than => LessOrEqualThan,
        /// `key LIKE '%value%'`
        like => Like,
        /// `key LIKE '%value'`
        llike => Llike,
        /// `key LIKE 'value%'`
        rlike => Rlike,
        /// Needs a two-item list.
        between => Between,
        not_between => NotBetween,
        /// Needs a list. An empty list matches nothing.
        in_ => In,
        /// Needs a list. An empty list matches everything.
        not_in => NotIn,
        /// Any non-empty value switches the check on.
        null => Null,
        not_null => NotNull,
        /// Compares the date part of `key`.
        date => Date,
        date_between => DateBetween,
    }

    /// Runs `callback` with the builder if the request carries `key`.
    ///
    /// Unlike the built-in operators, an empty string still counts as present.
    pub fn custom<F>(&mut self, key: &str, callback: F) -> &mut Self
    where
        F: FnOnce(&mut Q, &str, &ParamValue),
    {
        self.custom_filter(key, Constraint::Column, callback)
    }

    /// Like [`Filter::custom`], but ordering by `key` is handed to `order`
    /// instead of a plain `ORDER BY key`.
    pub fn custom_with_order<F, O>(&mut self, key: &str, callback: F, order: O) -> &mut Self
    where
        F: FnOnce(&mut Q, &str, &ParamValue),
        O: Fn(&str, SortDirection, &mut Q) + 'a,
    {
        self.custom_filter(key, Constraint::Ordering(Box::new(order)), callback)
    }

    fn custom_filter<F>(&mut self, key: &str, constraint: Constraint<'a, Q>, callback: F) -> &mut Self
    where
        F: FnOnce(&mut Q, &str, &ParamValue),
    {
        self.constrain(key, constraint);
        self.has_custom_filter = true;

        let request = self.request;
        if let Some(value) = request.get(key) {
            debug!(key, "custom filter applied");
            callback(&mut *self.query, key, value);
        }

        self
    }

    /// Adds the `ORDER BY` term.
    ///
    /// The request's order-by field is honoured only if it was constrained;
    /// otherwise the configured default column is used. The direction falls
    /// back to the configured one independently.
    pub fn order(&mut self) -> &mut Self {
        let direction = self.order_direction();
        let field = self.order_by_field();
        let constraint = field
            .as_deref()
            .and_then(|field| self.constraints.iter().find(|(key, _)| key == field));

        match constraint {
            Some((key, Constraint::Ordering(order))) => {
                debug!(field = %key, %direction, "ordering delegated to custom filter");
                order(key, direction, &mut *self.query);
            }
            Some((key, Constraint::Column)) => {
                debug!(field = %key, %direction, "ordering by requested field");
                self.query.order_by(Column::new(key.as_str()), direction);
            }
            None => {
                if let Some(field) = &field {
                    debug!(field = %field, "requested order field is not filterable");
                }
                self.query
                    .order_by(Column::new(self.order_by.as_str()), direction);
            }
        }

        self
    }

    /// The non-empty order-by field named in the request, constrained or not.
    pub fn order_by_field(&self) -> Option<String> {
        self.request
            .get(&self.order_by_key)
            .and_then(ParamValue::as_text)
            .filter(|field| !field.is_empty())
    }

    /// The request's direction if it is `asc` or `desc` in any case, else
    /// the configured default.
    pub fn order_direction(&self) -> SortDirection {
        self.request
            .get(&self.order_dir_key)
            .and_then(ParamValue::as_text)
            .and_then(|dir| dir.parse().ok())
            .unwrap_or(self.order_dir)
    }

    pub fn has_custom_filters(&self) -> bool {
        self.has_custom_filter
    }

    pub fn is_constrained(&self, key: &str) -> bool {
        self.constraints.iter().any(|(k, _)| k == key)
    }

    /// Constrained keys in declaration order.
    pub fn constraints(&self) -> Vec<&str> {
        self.constraints.iter().map(|(key, _)| key.as_str()).collect()
    }

    pub fn request(&self) -> &RequestParams {
        self.request
    }

    pub fn query(&mut self) -> &mut Q {
        &mut *self.query
    }

    pub fn summary(&self) -> FilterSummary {
        FilterSummary {
            constraints: self.constraints.iter().map(|(key, _)| key.clone()).collect(),
            has_custom_filters: self.has_custom_filter,
        }
    }

    /// Re-constraining a key replaces its entry in place.
    fn constrain(&mut self, key: &str, constraint: Constraint<'a, Q>) {
        match self.constraints.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = constraint,
            None => self.constraints.push((key.to_string(), constraint)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use sieve_db::{Expression, SelectQuery, Value};

    use super::*;
    use crate::error::FilterError;

    fn config() -> Config {
        Config::default_config()
    }

    fn request(query: &str) -> RequestParams {
        RequestParams::from_query_string(query)
    }

    #[test]
    fn test_present_value_adds_predicate() {
        let request = request("name=foo&age=21");
        let mut query = SelectQuery::from("users");

        Filter::new(&mut query, &request, &config())
            .like("name")
            .greater_than("age");

        let (sql, params) = query.build();
        assert_eq!(sql, "SELECT * FROM users WHERE name LIKE ? AND age > ?");
        assert_eq!(
            params,
            [Value::Text("%foo%".into()), Value::Text("21".into())]
        );
    }

    #[test]
    fn test_absent_and_empty_values_are_skipped() {
        let request = request("name=&age=");
        let mut query = SelectQuery::from("users");

        let mut filter = Filter::new(&mut query, &request, &config());
        filter.equal("name").equal("age").equal("missing").null("age");
        assert!(filter.is_constrained("missing"));
        drop(filter);

        assert_eq!(query.filter_count(), 0);
    }

    #[test]
    fn test_explicit_null_is_skipped() {
        let request = RequestParams::new().with("name", ParamValue::Null);
        let mut query = SelectQuery::from("users");

        Filter::new(&mut query, &request, &config()).equal("name");
        assert_eq!(query.filter_count(), 0);
    }

    #[test]
    fn test_zero_enables_filter() {
        let request = RequestParams::new()
            .with("a", "0")
            .with("b", 0)
            .with("c", false);
        let mut query = SelectQuery::from("t");

        Filter::new(&mut query, &request, &config())
            .equal("a")
            .equal("b")
            .equal("c");
        assert_eq!(query.filter_count(), 3);
    }

    #[test]
    fn test_wrong_shape_is_skipped_without_error() {
        let request = request("age=18&id=5&name[]=x");
        let mut query = SelectQuery::from("users");

        Filter::new(&mut query, &request, &config())
            .between("age")
            .in_("id")
            .not_in("id")
            .date_between("age")
            .equal("name");

        assert_eq!(query.filter_count(), 0);
    }

    #[test]
    fn test_apply_by_name() {
        let request = request("age[]=18&age[]=30&status=active");
        let mut query = SelectQuery::from("users");

        let mut filter = Filter::new(&mut query, &request, &config());
        filter.apply("between", "age").unwrap();
        filter.apply("not_in", "status").unwrap();
        assert_eq!(filter.summary().constraints, ["age", "status"]);
        drop(filter);

        let (sql, _) = query.build();
        assert_eq!(sql, "SELECT * FROM users WHERE age BETWEEN ? AND ?");
    }

    #[test]
    fn test_json_range_object_keeps_bound_order() {
        let request = RequestParams::from_json(serde_json::json!({
            "created": {"start": "2024-01-01", "end": "2024-12-31"},
        }))
        .unwrap();
        let mut query = SelectQuery::from("posts");

        Filter::new(&mut query, &request, &config()).between("created");

        let (sql, params) = query.build();
        assert_eq!(sql, "SELECT * FROM posts WHERE created BETWEEN ? AND ?");
        assert_eq!(
            params,
            [
                Value::Text("2024-01-01".into()),
                Value::Text("2024-12-31".into())
            ]
        );
    }

    #[test]
    fn test_unknown_operator_leaves_everything_untouched() {
        let request = request("name=foo");
        let mut query = SelectQuery::from("users");

        let mut filter = Filter::new(&mut query, &request, &config());
        let err = filter.apply("fuzzy", "name").err();
        assert!(matches!(err, Some(FilterError::UnsupportedOperator(name)) if name == "fuzzy"));
        assert!(!filter.is_constrained("name"));
        drop(filter);

        assert_eq!(query.filter_count(), 0);
        assert!(query.orderings().is_empty());
    }

    #[test]
    fn test_order_by_constrained_field() {
        let request = request("order_by=name&order_dir=asc");
        let mut query = SelectQuery::from("users");

        Filter::new(&mut query, &request, &config())
            .like("name")
            .order();

        assert_eq!(query.orderings(), [("name", SortDirection::Asc)]);
    }

    #[test]
    fn test_order_by_unconstrained_field_falls_back() {
        let request = request("order_by=password&order_dir=asc");
        let mut query = SelectQuery::from("users");

        Filter::new(&mut query, &request, &config())
            .like("name")
            .order();

        assert_eq!(query.orderings(), [("id", SortDirection::Asc)]);
    }

    #[test]
    fn test_order_defaults() {
        let request = RequestParams::new();
        let mut query = SelectQuery::from("users");

        Filter::new(&mut query, &request, &config()).order();

        assert_eq!(query.orderings(), [("id", SortDirection::Desc)]);
    }

    #[test]
    fn test_invalid_direction_only_resets_direction() {
        let request = request("order_by=name&order_dir=sideways");
        let mut query = SelectQuery::from("users");

        Filter::new(&mut query, &request, &config())
            .equal("name")
            .order();

        assert_eq!(query.orderings(), [("name", SortDirection::Desc)]);
    }

    #[test]
    fn test_direction_is_case_insensitive() {
        let request = request("order_dir=ASC");
        let mut query = SelectQuery::from("users");

        Filter::new(&mut query, &request, &config()).order();

        assert_eq!(query.orderings(), [("id", SortDirection::Asc)]);
    }

    #[test]
    fn test_order_uses_configured_keys() {
        let config = Config::from_toml(
            "order_by = \"created_at\"\norder_dir = \"asc\"\norder_by_key = \"sort\"\norder_dir_key = \"dir\"",
        )
        .unwrap();
        let request = request("sort=name&dir=desc&order_by=email");
        let mut query = SelectQuery::from("users");

        Filter::new(&mut query, &request, &config)
            .equal("name")
            .equal("email")
            .order();
        assert_eq!(query.orderings(), [("name", SortDirection::Desc)]);

        let request = RequestParams::new();
        let mut query = SelectQuery::from("users");
        Filter::new(&mut query, &request, &config).order();
        assert_eq!(query.orderings(), [("created_at", SortDirection::Asc)]);
    }

    #[test]
    fn test_order_called_twice_appends() {
        let request = RequestParams::new();
        let mut query = SelectQuery::from("users");

        Filter::new(&mut query, &request, &config()).order().order();

        assert_eq!(query.orderings().len(), 2);
    }

    #[test]
    fn test_custom_runs_once_when_present() {
        let request = request("q=");
        let mut query = SelectQuery::from("users");
        let calls = Cell::new(0);

        let mut filter = Filter::new(&mut query, &request, &config());
        filter.custom("q", |query, key, value| {
            calls.set(calls.get() + 1);
            assert_eq!(key, "q");
            assert_eq!(value, &ParamValue::from(""));
            query.and_where(Column::new("name").eq("x"));
        });
        assert!(filter.has_custom_filters());
        drop(filter);

        assert_eq!(calls.get(), 1);
        assert_eq!(query.filter_count(), 1);
    }

    #[test]
    fn test_custom_not_called_when_absent() {
        let request = RequestParams::new();
        let mut query = SelectQuery::from("users");
        let calls = Cell::new(0);

        let mut filter = Filter::new(&mut query, &request, &config());
        filter.custom("q", |_, _, _| calls.set(calls.get() + 1));

        assert!(filter.has_custom_filters());
        assert!(filter.is_constrained("q"));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_custom_order_callback() {
        let request = request("order_by=author&order_dir=asc");
        let mut query = SelectQuery::from("posts");

        Filter::new(&mut query, &request, &config())
            .custom_with_order(
                "author",
                |_, _, _| {},
                |field, direction, query: &mut SelectQuery| {
                    assert_eq!(field, "author");
                    query.order_by(Column::new("authors.name"), direction);
                },
            )
            .order();

        assert_eq!(query.orderings(), [("authors.name", SortDirection::Asc)]);
    }

    #[test]
    fn test_plain_custom_orders_by_column() {
        let request = request("order_by=author");
        let mut query = SelectQuery::from("posts");

        Filter::new(&mut query, &request, &config())
            .custom("author", |_, _, _| {})
            .order();

        assert_eq!(query.orderings(), [("author", SortDirection::Desc)]);
    }

    #[test]
    fn test_reconstraining_keeps_declaration_order() {
        let request = RequestParams::new();
        let mut query = SelectQuery::from("users");

        let mut filter = Filter::new(&mut query, &request, &config());
        filter.equal("a").equal("b").like("a");

        assert_eq!(filter.summary().constraints, ["a", "b"]);
        assert!(!filter.summary().has_custom_filters);
    }

    #[test]
    fn test_order_by_field_accessor() {
        let request = request("order_by=&order_dir=Desc");
        let mut query = SelectQuery::from("users");
        let filter = Filter::new(&mut query, &request, &config());

        assert_eq!(filter.order_by_field(), None);
        assert_eq!(filter.order_direction(), SortDirection::Desc);
    }
}
