//! Configuration file.
//!
//! ```toml
//! [server]
//! url = "https://api.farmgate.example/api"
//! token = "..."
//! timeout_secs = 30
//! max_retries = 3
//!
//! [table]
//! page_size = 20
//! placeholder = "-"
//! fuzzy_search = false
//! ```
//!
//! Every key is optional. Command-line flags win over the file.

use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::error::CliError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub table: TableConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Backend base URL.
    pub url: Option<String>,
    /// Bearer token. Requests are anonymous without one.
    pub token: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries for rate limits, 5xx and network errors.
    pub max_retries: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            timeout_secs: 30,
            max_retries: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub page_size: usize,
    /// Shown for missing values.
    pub placeholder: String,
    /// Match the search box fuzzily instead of by substring.
    pub fuzzy_search: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size: farmgate_table::DEFAULT_PAGE_SIZE,
            placeholder: "-".to_string(),
            fuzzy_search: false,
        }
    }
}

impl Config {
    /// Loads `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        if !path.exists() {
            log::debug!("[config] {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents).map_err(|source| CliError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse(
            r#"
            [server]
            url = "https://api.farmgate.example/api"

            [table]
            page_size = 25
            "#,
        )
        .unwrap();

        assert_eq!(config.server.url.as_deref(), Some("https://api.farmgate.example/api"));
        assert_eq!(config.server.timeout_secs, 30);
        assert_eq!(config.table.page_size, 25);
        assert_eq!(config.table.placeholder, "-");
        assert!(!config.table.fuzzy_search);
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_wrong_type_is_error() {
        assert!(Config::parse("[table]\npage_size = \"lots\"").is_err());
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = std::env::temp_dir().join("farmgate-no-such-config.toml");
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }
}
