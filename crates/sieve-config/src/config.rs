use std::{
    fs,
    path::{Path, PathBuf},
    sync::{LazyLock, RwLock},
};

use documented::{Documented, DocumentedFields};
use serde::{Deserialize, Serialize};
use toml_edit::DocumentMut;
use tracing::{debug, info};

use crate::{
    annotations::annotate_toml_table,
    error::{ConfigError, Result},
};

pub const DEFAULT_ORDER_BY: &str = "id";
pub const DEFAULT_ORDER_DIR: &str = "desc";
pub const DEFAULT_ORDER_BY_KEY: &str = "order_by";
pub const DEFAULT_ORDER_DIR_KEY: &str = "order_dir";

/// Search filter configuration
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, Documented, DocumentedFields)]
#[serde(default)]
pub struct Config {
    /// Column used to order results when the request does not name a filtered column.
    /// Default: "id"
    pub order_by: Option<String>,

    /// Order direction used when the request omits one or sends something other
    /// than "asc" or "desc".
    /// Default: "desc"
    pub order_dir: Option<String>,

    /// Request parameter that carries the column to order by.
    /// Default: "order_by"
    pub order_by_key: Option<String>,

    /// Request parameter that carries the order direction.
    /// Default: "order_dir"
    pub order_dir_key: Option<String>,
}

pub static CONFIG: LazyLock<RwLock<Option<Config>>> = LazyLock::new(|| RwLock::new(None));

pub static CONFIG_PATH: LazyLock<RwLock<PathBuf>> =
    LazyLock::new(|| RwLock::new(default_config_path()));

/// `$SIEVE_CONFIG`, or `config.toml` under the XDG config home.
pub fn default_config_path() -> PathBuf {
    match std::env::var("SIEVE_CONFIG") {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => xdg_config_home().join("sieve").join("config.toml"),
    }
}

fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/".to_string());
            PathBuf::from(home).join(".config")
        })
}

fn config_path() -> PathBuf {
    CONFIG_PATH
        .read()
        .map(|path| path.to_path_buf())
        .unwrap_or_else(|_| default_config_path())
}

/// Loads the configuration from [`CONFIG_PATH`] into the global slot.
pub fn init() -> Result<()> {
    let config = Config::new()?;
    if let Ok(mut global_config) = CONFIG.write() {
        *global_config = Some(config);
    }
    Ok(())
}

/// Returns the global configuration, or the defaults if [`init`] never ran.
pub fn get_config() -> Config {
    CONFIG
        .read()
        .ok()
        .and_then(|config| config.clone())
        .unwrap_or_else(Config::default_config)
}

impl Config {
    pub fn default_config() -> Self {
        Self {
            order_by: Some(DEFAULT_ORDER_BY.to_string()),
            order_dir: Some(DEFAULT_ORDER_DIR.to_string()),
            order_by_key: Some(DEFAULT_ORDER_BY_KEY.to_string()),
            order_dir_key: Some(DEFAULT_ORDER_DIR_KEY.to_string()),
        }
    }

    /// Creates a new configuration by loading it from the configuration file.
    /// If the configuration file is not found, it uses the default configuration.
    pub fn new() -> Result<Self> {
        Self::load(config_path())
    }

    /// Loads the file at `path` over the defaults. A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let mut config = match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no config at {}, using defaults", path.display());
                Self::default_config()
            }
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;

        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.resolve()?;
        Ok(config)
    }

    /// Fills in unset keys with their defaults and validates the result.
    pub fn resolve(&mut self) -> Result<()> {
        self.order_by.get_or_insert_with(|| DEFAULT_ORDER_BY.to_string());
        self.order_by_key
            .get_or_insert_with(|| DEFAULT_ORDER_BY_KEY.to_string());
        self.order_dir_key
            .get_or_insert_with(|| DEFAULT_ORDER_DIR_KEY.to_string());

        let dir = self
            .order_dir
            .get_or_insert_with(|| DEFAULT_ORDER_DIR.to_string());
        *dir = dir.to_lowercase();
        if !matches!(dir.as_str(), "asc" | "desc") {
            return Err(ConfigError::InvalidOrderDirection(dir.clone()));
        }

        for (name, value) in [
            ("order_by", self.order_by()),
            ("order_by_key", self.order_by_key()),
            ("order_dir_key", self.order_dir_key()),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyKey(name.to_string()));
            }
        }

        if self.order_by_key() == self.order_dir_key() {
            return Err(ConfigError::DuplicateRequestKey(
                self.order_by_key().to_string(),
            ));
        }

        Ok(())
    }

    pub fn order_by(&self) -> &str {
        self.order_by.as_deref().unwrap_or(DEFAULT_ORDER_BY)
    }

    /// Lowercase `asc` or `desc` once [`Config::resolve`] has run.
    pub fn order_dir(&self) -> &str {
        self.order_dir.as_deref().unwrap_or(DEFAULT_ORDER_DIR)
    }

    pub fn order_by_key(&self) -> &str {
        self.order_by_key.as_deref().unwrap_or(DEFAULT_ORDER_BY_KEY)
    }

    pub fn order_dir_key(&self) -> &str {
        self.order_dir_key.as_deref().unwrap_or(DEFAULT_ORDER_DIR_KEY)
    }

    pub fn to_annotated_document(&self) -> Result<DocumentMut> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut doc = toml_string.parse::<DocumentMut>()?;

        annotate_toml_table::<Config>(doc.as_table_mut(), true)?;

        Ok(doc)
    }
}

/// Writes the documented default configuration to [`CONFIG_PATH`].
///
/// Refuses to overwrite an existing file.
pub fn generate_default_config() -> Result<PathBuf> {
    let config_path = config_path();
    write_default_config(&config_path)?;
    Ok(config_path)
}

pub fn write_default_config(config_path: &Path) -> Result<()> {
    if config_path.exists() {
        return Err(ConfigError::ConfigAlreadyExists);
    }

    let annotated_doc = Config::default_config().to_annotated_document()?;

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(config_path, annotated_doc.to_string())?;
    info!(
        "Default configuration file generated with documentation at: {}",
        config_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;
    use crate::test_utils::with_env;

    #[test]
    fn test_default_config_creation() {
        let config = Config::default_config();

        assert_eq!(config.order_by(), "id");
        assert_eq!(config.order_dir(), "desc");
        assert_eq!(config.order_by_key(), "order_by");
        assert_eq!(config.order_dir_key(), "order_dir");
    }

    #[test]
    fn test_partial_file_merges_over_defaults() {
        let config = Config::from_toml("order_by = \"created_at\"\n").unwrap();

        assert_eq!(config.order_by(), "created_at");
        assert_eq!(config.order_dir(), "desc");
        assert_eq!(config.order_by_key(), "order_by");
        assert_eq!(config.order_dir_key(), "order_dir");
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default_config());
    }

    #[test]
    fn test_order_dir_is_normalised() {
        let config = Config::from_toml("order_dir = \"ASC\"").unwrap();
        assert_eq!(config.order_dir(), "asc");
    }

    #[test]
    fn test_invalid_order_dir() {
        let result = Config::from_toml("order_dir = \"sideways\"");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidOrderDirection(dir)) if dir == "sideways"
        ));
    }

    #[test]
    fn test_empty_key_rejected() {
        let result = Config::from_toml("order_by_key = \"  \"");
        assert!(matches!(result, Err(ConfigError::EmptyKey(key)) if key == "order_by_key"));
    }

    #[test]
    fn test_duplicate_request_keys_rejected() {
        let result = Config::from_toml("order_by_key = \"sort\"\norder_dir_key = \"sort\"");
        assert!(matches!(result, Err(ConfigError::DuplicateRequestKey(_))));
    }

    #[test]
    fn test_bad_toml() {
        let result = Config::from_toml("order_by = ");
        assert!(matches!(result, Err(ConfigError::TomlDeError(_))));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default_config());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "order_by = \"name\"\norder_dir_key = \"dir\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.order_by(), "name");
        assert_eq!(config.order_dir_key(), "dir");
    }

    #[test]
    fn test_write_default_config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        write_default_config(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("# Request parameter that carries the order direction."));
        assert!(content.contains("order_by_key = \"order_by\""));
        assert_eq!(Config::load(&path).unwrap(), Config::default_config());
    }

    #[test]
    fn test_write_default_config_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "").unwrap();

        let result = write_default_config(&path);
        assert!(matches!(result, Err(ConfigError::ConfigAlreadyExists)));
    }

    #[test]
    #[serial]
    fn test_config_path_env_override() {
        with_env(&[("SIEVE_CONFIG", Some("/custom/sieve.toml"))], || {
            assert_eq!(default_config_path(), PathBuf::from("/custom/sieve.toml"));
        });
    }

    #[test]
    #[serial]
    fn test_config_path_xdg() {
        with_env(
            &[("SIEVE_CONFIG", None), ("XDG_CONFIG_HOME", Some("/xdg"))],
            || {
                assert_eq!(
                    default_config_path(),
                    PathBuf::from("/xdg/sieve/config.toml")
                );
            },
        );
    }

    #[test]
    #[serial]
    fn test_config_path_home_fallback() {
        with_env(
            &[
                ("SIEVE_CONFIG", None),
                ("XDG_CONFIG_HOME", None),
                ("HOME", Some("/home/tester")),
            ],
            || {
                assert_eq!(
                    default_config_path(),
                    PathBuf::from("/home/tester/.config/sieve/config.toml")
                );
            },
        );
    }

    #[test]
    fn test_get_config_without_init() {
        let config = get_config();
        assert_eq!(config.order_by_key(), "order_by");
    }
}
