//! Error types for document input.

use std::path::PathBuf;

/// Failure to obtain the document text.
///
/// Conversion itself never fails: malformed markup degrades to plain text.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// The input file could not be read.
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
