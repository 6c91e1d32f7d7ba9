//! Markdown to typed content block conversion.
//!
//! A document is split into metadata and body ([`parse_document`]), the body
//! is converted into an ordered list of [`Block`]s ([`Converter`]), and the
//! page title and summary are derived from both ([`derive_page_info`]).
//!
//! # Conversion paths
//!
//! Bodies following the execution transcript convention (see
//! [`transcript`]) are re-segmented into records with a collapsible result.
//! Everything else goes through the standard path: block math first, then a
//! pulldown-cmark token walk with math, callout, image and link rules.
//!
//! Conversion never fails. Constructs without a block form are skipped with
//! a warning and oversized text is split or truncated.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use mdup_blocks::{ConvertOptions, Converter, OfflineResolver, parse_document};
//!
//! let doc = parse_document("---\ntitle: Hello\n---\n# Heading\n\nSome text.\n");
//! let converter = Converter::new(ConvertOptions::default(), &OfflineResolver);
//! let blocks = converter.convert(&doc.body, Path::new("."));
//! assert_eq!(blocks.len(), 2);
//! ```

mod block;
mod callout;
mod convert;
mod error;
mod language;
mod math;
mod metadata;
mod page_info;
mod resolver;
pub mod text;
mod tokens;
pub mod transcript;
mod validate;

pub use block::{Block, BlockKind, Color, RichText, callouts_to_quotes, contains_callouts};
pub use callout::{DEFAULT_CALLOUT_ICON, callout_icon};
pub use convert::{ConvertOptions, Converter};
pub use error::DocumentError;
pub use language::{PLAIN_TEXT, normalize_language};
pub use math::{DEFAULT_INDICATOR_THRESHOLD, FenceKind, classify_fence};
pub use metadata::{
    KEY_CONNECTION_HOST, KEY_EXECUTION_TIME, KEY_PROMPT_FILE, Metadata, ParsedDocument,
    parse_document, read_document, split_front_matter,
};
pub use page_info::{PageInfo, derive_page_info};
pub use resolver::{OfflineResolver, ResourceResolver};
