use sieve_config::config::Config;
use sieve_db::QueryBuilder;

use crate::{
    error::FilterResult,
    filter::{Filter, FilterSummary},
    request::RequestParams,
};

/// A model whose queries can be narrowed by request parameters.
///
/// Implementors declare their filters in [`Filterable::set_filters`];
/// [`Filterable::apply_filters`] runs them and always adds the ordering.
///
/// ```
/// use sieve_config::config::Config;
/// use sieve_core::{Filter, FilterResult, Filterable, RequestParams};
/// use sieve_db::SelectQuery;
///
/// struct User;
///
/// impl Filterable for User {
///     type Query = SelectQuery;
///
///     fn set_filters(&self, filter: &mut Filter<'_, SelectQuery>) -> FilterResult<()> {
///         filter.like("name").apply("greaterThan", "age")?;
///         Ok(())
///     }
/// }
///
/// let mut query = SelectQuery::from("users");
/// let request = RequestParams::from_query_string("age=30");
/// let summary = User
///     .apply_filters(&mut query, &request, &Config::default_config())
///     .unwrap();
///
/// assert_eq!(summary.constraints, ["name", "age"]);
/// assert_eq!(
///     query.build().0,
///     "SELECT * FROM users WHERE age > ? ORDER BY id DESC"
/// );
/// ```
pub trait Filterable {
    type Query: QueryBuilder;

    fn set_filters(&self, _filter: &mut Filter<'_, Self::Query>) -> FilterResult<()> {
        Ok(())
    }

    fn apply_filters(
        &self,
        query: &mut Self::Query,
        request: &RequestParams,
        config: &Config,
    ) -> FilterResult<FilterSummary> {
        let mut filter = Filter::new(query, request, config);
        self.set_filters(&mut filter)?;
        filter.order();
        Ok(filter.summary())
    }
}
