use nu_ansi_term::Color::{Blue, Cyan, Green, Yellow};
use serde::Serialize;
use sieve_config::config::{get_config, Config};
use sieve_core::{Filter, FilterError, FilterResult, FilterSummary, RequestParams};
use sieve_db::{Column, DbConnection, Expression, QueryBuilder, SelectQuery, Value};
use tracing::{debug, info};

use crate::utils::{split_pair, Colored};

pub struct QueryOptions {
    pub table: String,
    pub request: Option<String>,
    pub filters: Vec<String>,
    pub custom_order: Vec<String>,
    pub db: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Serialize)]
struct QueryReport {
    sql: String,
    params: Vec<Value>,
    #[serde(flatten)]
    summary: FilterSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<i64>,
}

fn parse_pairs(defs: &[String]) -> FilterResult<Vec<(&str, &str)>> {
    defs.iter()
        .map(|def| split_pair(def).ok_or_else(|| FilterError::InvalidDefinition(def.clone())))
        .collect()
}

/// Builds the filtered and ordered query without running it.
pub fn build_query(
    options: &QueryOptions,
    config: &Config,
) -> FilterResult<(SelectQuery, FilterSummary)> {
    let filters = parse_pairs(&options.filters)?;
    let custom = parse_pairs(&options.custom_order)?;

    let request = RequestParams::from_query_string(options.request.as_deref().unwrap_or_default());
    debug!(params = request.len(), "parsed request");

    let mut query = SelectQuery::from(options.table.as_str());
    if let Some(limit) = options.limit {
        query = query.limit(limit);
    }
    if let Some(offset) = options.offset {
        query = query.offset(offset);
    }

    let summary = {
        let mut filter = Filter::new(&mut query, &request, config);
        for (key, operator) in filters {
            filter.apply(operator, key)?;
        }

        for (key, column) in custom {
            let match_column = column.to_string();
            let order_column = column.to_string();
            filter.custom_with_order(
                key,
                move |query, _, value| {
                    if let Some(value) = value.as_scalar() {
                        query.and_where(Column::new(match_column).eq(value));
                    }
                },
                move |_, direction, query| {
                    query.order_by(Column::new(order_column.as_str()), direction)
                },
            );
        }

        filter.order();
        filter.summary()
    };

    Ok((query, summary))
}

pub fn run_query(options: QueryOptions, json: bool) -> FilterResult<()> {
    let config = get_config();
    let (query, summary) = build_query(&options, &config)?;
    let (sql, params) = query.build();

    let count = match &options.db {
        Some(path) => {
            let mut db = DbConnection::open(path)?;
            Some(query.count(db.conn())?)
        }
        None => None,
    };

    if json {
        let report = QueryReport {
            sql,
            params,
            summary,
            count,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    info!("{}", Colored(Cyan, &sql));

    if !params.is_empty() {
        let params = params
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        info!("{}: {}", Colored(Blue, "params"), params);
    }

    if summary.constraints.is_empty() {
        info!("{}: none", Colored(Blue, "filters"));
    } else {
        info!(
            "{}: {}",
            Colored(Blue, "filters"),
            summary.constraints.join(", ")
        );
    }

    if let Some(count) = count {
        info!("{} matching rows", Colored(Green, count));
    } else if summary.has_custom_filters {
        info!("{}", Colored(Yellow, "custom filters declared"));
    }

    Ok(())
}
