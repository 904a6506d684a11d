//! CLI error type.

use std::path::PathBuf;

use farmgate_table::TableError;
use thiserror::Error;

/// Everything that can stop a command. Printed as one line on stderr.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Backend(#[from] farmgate_lib::error::Error),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("no server URL: pass --url or set [server] url in the config file")]
    MissingUrl,
}
