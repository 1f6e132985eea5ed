use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(sieve_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(sieve_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Configuration file already exists")]
    #[diagnostic(
        code(sieve_config::already_exists),
        help("Remove the existing config file or use a different location")
    )]
    ConfigAlreadyExists,

    #[error("Invalid order direction: {0}")]
    #[diagnostic(
        code(sieve_config::invalid_order_dir),
        help("Set order_dir to either \"asc\" or \"desc\"")
    )]
    InvalidOrderDirection(String),

    #[error("Configuration key `{0}` cannot be empty")]
    #[diagnostic(code(sieve_config::empty_key))]
    EmptyKey(String),

    #[error("order_by_key and order_dir_key both use the request key `{0}`")]
    #[diagnostic(
        code(sieve_config::duplicate_request_key),
        help("Use distinct request keys for the order column and the order direction")
    )]
    DuplicateRequestKey(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(sieve_config::io))]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    #[diagnostic(code(sieve_config::toml))]
    Toml(#[from] toml_edit::TomlError),

    #[error("Encountered unexpected TOML item: {0}")]
    #[diagnostic(code(sieve_config::unexpected_toml_item))]
    UnexpectedTomlItem(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
