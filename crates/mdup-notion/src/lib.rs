//! Notion page upload.
//!
//! [`NotionClient`] creates pages over the Notion REST API,
//! [`PageAssembler`] splits a block list into a main page and linked
//! continuation pages, and [`ImgbbResolver`] hosts local images referenced
//! by documents.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use mdup_blocks::Block;
//! use mdup_config::Config;
//! use mdup_notion::{AssembleOptions, NotionClient, PageAssembler};
//!
//! let config = Config::load(None, None)?;
//! let client = NotionClient::from_config(&config.notion, &config.require_notion()?);
//! let assembler = PageAssembler::new(&client, AssembleOptions::default());
//!
//! let report = assembler.assemble("Title", "", vec![Block::paragraph("Hello")])?;
//! println!("{}", report.main.url);
//! # Ok(())
//! # }
//! ```

mod assembler;
mod client;
mod error;
mod images;
mod store;
mod wire;

pub use assembler::{AssembleOptions, PageAssembler, PlannedPage, UploadReport, plan_pages};
pub use client::NotionClient;
pub use error::{ImageError, NotionError, UploadError};
pub use images::ImgbbResolver;
pub use store::{PageDraft, PageHandle, PageStore, Parent};
