//! CLI error types.

use mdup_blocks::DocumentError;
use mdup_config::ConfigError;
use mdup_notion::{NotionError, UploadError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Document(#[from] DocumentError),

    #[error("{0}")]
    Upload(#[from] UploadError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// Some continuation pages were not created.
    #[error("upload stopped at continuation page {page}: {source}")]
    Incomplete {
        page: usize,
        #[source]
        source: NotionError,
    },

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Runtime(String),
}
