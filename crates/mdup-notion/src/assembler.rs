//! Splitting a block list into a main page and continuation pages.
//!
//! The main page is created first in the configured database. Remaining
//! blocks go to continuation pages created under it, in order. A main page
//! failure aborts the upload. A continuation failure stops the upload but
//! keeps the pages created so far.

use mdup_blocks::{Block, BlockKind, callouts_to_quotes, contains_callouts};
use mdup_blocks::text::truncate_with_ellipsis;
use tracing::{info, warn};

use crate::error::{NotionError, UploadError};
use crate::store::{PageDraft, PageHandle, PageStore, Parent};

/// Limits applied when assembling pages.
#[derive(Debug, Clone, Copy)]
pub struct AssembleOptions {
    /// Maximum top-level blocks per page.
    pub max_blocks_per_page: usize,
    /// Maximum chars of the main page summary.
    pub max_summary_length: usize,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            max_blocks_per_page: 100,
            max_summary_length: 1000,
        }
    }
}

/// A page of the upload plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPage {
    pub title: String,
    pub summary: String,
    pub blocks: Vec<Block>,
    /// Continuation number, `None` for the main page.
    pub continuation: Option<usize>,
}

/// Outcome of an upload.
#[derive(Debug)]
pub struct UploadReport {
    pub main: PageHandle,
    pub continuations: Vec<PageHandle>,
    /// Continuation number and error of the page where the upload stopped.
    pub failed: Option<(usize, NotionError)>,
}

impl UploadReport {
    /// Whether every planned page was created.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_none()
    }
}

/// Split blocks into pages of at most `max_blocks_per_page` blocks.
///
/// Always yields at least the main page.
pub fn plan_pages(
    title: &str,
    summary: &str,
    blocks: Vec<Block>,
    options: AssembleOptions,
) -> Result<Vec<PlannedPage>, UploadError> {
    if options.max_blocks_per_page == 0 {
        return Err(UploadError::Config(
            "max_blocks_per_page must be greater than 0".to_owned(),
        ));
    }

    let summary = truncate_with_ellipsis(summary, options.max_summary_length).into_owned();
    let mut chunks = Vec::new();
    let mut remaining = blocks.into_iter().peekable();
    loop {
        let chunk: Vec<Block> = remaining.by_ref().take(options.max_blocks_per_page).collect();
        chunks.push(chunk);
        if remaining.peek().is_none() {
            break;
        }
    }

    Ok(chunks
        .into_iter()
        .enumerate()
        .map(|(index, blocks)| match index {
            0 => PlannedPage {
                title: title.to_owned(),
                summary: summary.clone(),
                blocks,
                continuation: None,
            },
            n => PlannedPage {
                title: format!("{title} (continued {n})"),
                summary: String::new(),
                blocks,
                continuation: Some(n),
            },
        })
        .collect())
}

/// Uploads planned pages in dependency order.
pub struct PageAssembler<'a, S: PageStore + ?Sized> {
    store: &'a S,
    options: AssembleOptions,
}

impl<'a, S: PageStore + ?Sized> PageAssembler<'a, S> {
    #[must_use]
    pub fn new(store: &'a S, options: AssembleOptions) -> Self {
        Self { store, options }
    }

    /// Create the main page and its continuations.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::MainPage`] when the main page cannot be
    /// created. Continuation failures are reported in the returned
    /// [`UploadReport`].
    pub fn assemble(
        &self,
        title: &str,
        summary: &str,
        blocks: Vec<Block>,
    ) -> Result<UploadReport, UploadError> {
        let mut pages = plan_pages(title, summary, blocks, self.options)?.into_iter();
        let Some(main) = pages.next() else {
            return Err(UploadError::Config("no pages planned".to_owned()));
        };
        let total = pages.len() + 1;
        if total > 1 {
            info!("Splitting '{}' into {} pages", title, total);
        }

        let main = self
            .submit(PageDraft {
                title: main.title,
                summary: main.summary,
                blocks: main.blocks,
                parent: Parent::Database,
            })
            .map_err(UploadError::MainPage)?;

        let mut report = UploadReport {
            main,
            continuations: Vec::new(),
            failed: None,
        };
        for page in pages {
            let number = page.continuation.unwrap_or_default();
            let draft = PageDraft {
                title: page.title,
                summary: page.summary,
                blocks: page.blocks,
                parent: Parent::Page(report.main.id.clone()),
            };
            match self.submit(draft) {
                Ok(handle) => report.continuations.push(handle),
                Err(err) => {
                    warn!("Continuation page {} failed, stopping: {}", number, err);
                    report.failed = Some((number, err));
                    break;
                }
            }
        }
        Ok(report)
    }

    /// Create a page, retrying once with callouts as quotes when the store
    /// rejects callouts.
    fn submit(&self, mut draft: PageDraft) -> Result<PageHandle, NotionError> {
        match self.store.create_page(&draft) {
            Ok(handle) => Ok(handle),
            Err(err)
                if contains_callouts(&draft.blocks)
                    && err.rejects_block_kind(BlockKind::Callout) =>
            {
                let replaced = callouts_to_quotes(&mut draft.blocks);
                warn!(
                    "Store rejected callouts on '{}', retrying with {} quotes: {}",
                    draft.title, replaced, err
                );
                self.store.create_page(&draft)
            }
            Err(err) => Err(err),
        }
    }
}
