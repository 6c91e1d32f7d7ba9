//! Document store seam.

use mdup_blocks::Block;
use serde::Deserialize;

use crate::error::NotionError;

/// Where a new page is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parent {
    /// The configured database, with title and summary properties.
    Database,
    /// Under an existing page.
    Page(String),
}

/// A page ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDraft {
    pub title: String,
    /// Empty for no summary.
    pub summary: String,
    pub blocks: Vec<Block>,
    pub parent: Parent,
}

/// A created page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageHandle {
    pub id: String,
    pub url: String,
}

/// Creates pages in a document store.
pub trait PageStore {
    fn create_page(&self, draft: &PageDraft) -> Result<PageHandle, NotionError>;
}
