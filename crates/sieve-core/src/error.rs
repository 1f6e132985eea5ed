//! Error types for sieve-core.

use miette::Diagnostic;
use sieve_config::error::ConfigError;
use sieve_db::DbError;
use thiserror::Error;

use crate::operator::Operator;

#[derive(Error, Diagnostic, Debug)]
pub enum FilterError {
    #[error(
        "Filter method not found: {0} (supported: {supported})",
        supported = Operator::names().join(", ")
    )]
    #[diagnostic(
        code(sieve::unsupported_operator),
        help("Run `sieve operators` to see the value each operator takes")
    )]
    UnsupportedOperator(String),

    #[error("Invalid filter definition `{0}`")]
    #[diagnostic(
        code(sieve::invalid_definition),
        help("Filters are written as key=operator, e.g. name=like")
    )]
    InvalidDefinition(String),

    #[error("Request parameters must be an object, got {0}")]
    #[diagnostic(code(sieve::invalid_request))]
    InvalidRequest(String),

    #[error("JSON error: {0}")]
    #[diagnostic(code(sieve::json))]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DbError),
}

pub type FilterResult<T> = std::result::Result<T, FilterError>;
