//! Error types for Notion upload.

use std::path::PathBuf;

use mdup_blocks::BlockKind;

/// Error from Notion API operations.
#[derive(Debug, thiserror::Error)]
pub enum NotionError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed: {0}")]
    Http(#[from] ureq::Error),

    /// The API rejected the request.
    #[error("Notion API error {status} ({code}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Machine-readable error code, e.g. `validation_error`.
        code: String,
        /// Human-readable message.
        message: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response did not have the expected shape.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),
}

impl NotionError {
    /// Whether the API rejected the request because of blocks of `kind`.
    #[must_use]
    pub fn rejects_block_kind(&self, kind: BlockKind) -> bool {
        match self {
            Self::Api {
                status, message, ..
            } => *status == 400 && message.contains(kind.as_str()),
            _ => false,
        }
    }
}

/// Error hosting a local image.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// The image file could not be read.
    #[error("Cannot read image {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP request failed.
    #[error("HTTP request failed")]
    Http(#[from] ureq::Error),

    /// The hosting service returned an error status.
    #[error("image hosting error: {status} - {body}")]
    Api { status: u16, body: String },

    /// The hosting response carried no URL.
    #[error("image hosting response has no URL")]
    MissingUrl,
}

/// Error from a page upload.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The main page could not be created. Nothing was uploaded.
    #[error("failed to create main page: {0}")]
    MainPage(#[source] NotionError),

    /// Upload settings are unusable.
    #[error("{0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status: u16, message: &str) -> NotionError {
        NotionError::Api {
            status,
            code: "validation_error".to_owned(),
            message: message.to_owned(),
        }
    }

    #[test]
    fn test_rejects_block_kind() {
        let err = api_error(400, "body.children[3].callout should be defined");
        assert!(err.rejects_block_kind(BlockKind::Callout));
        assert!(!err.rejects_block_kind(BlockKind::Equation));
    }

    #[test]
    fn test_rejects_block_kind_requires_bad_request() {
        assert!(!api_error(500, "callout").rejects_block_kind(BlockKind::Callout));
        let err = NotionError::InvalidResponse("callout".to_owned());
        assert!(!err.rejects_block_kind(BlockKind::Callout));
    }

    #[test]
    fn test_api_error_message() {
        let err = api_error(400, "Title is not a property");
        assert_eq!(
            err.to_string(),
            "Notion API error 400 (validation_error): Title is not a property"
        );
    }
}
