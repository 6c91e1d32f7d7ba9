//! `mdup <FILE>` upload implementation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::Args;
use mdup_blocks::{
    Block, BlockKind, ConvertOptions, Converter, OfflineResolver, PageInfo, ResourceResolver,
    derive_page_info, read_document,
};
use mdup_config::{CliSettings, Config};
use mdup_notion::{
    AssembleOptions, ImgbbResolver, NotionClient, PageAssembler, UploadReport, plan_pages,
};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for uploading a document.
#[derive(Args)]
pub(crate) struct UploadArgs {
    /// Path to the markdown file.
    #[arg(required_unless_present = "show_config")]
    pub file: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover mdup.toml).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Target database ID (overrides config).
    #[arg(long, env = "MDUP_DATABASE_ID")]
    database: Option<String>,

    /// Maximum blocks per page (overrides config).
    #[arg(long)]
    page_size: Option<usize>,

    /// Convert and show the page plan without uploading.
    #[arg(long)]
    dry_run: bool,

    /// With --dry-run, write the converted blocks as JSON to stdout.
    #[arg(long, requires = "dry_run")]
    json: bool,
}

impl UploadArgs {
    /// Settings overriding the configuration file.
    pub(crate) fn cli_settings(&self) -> CliSettings {
        CliSettings {
            database_id: self.database.clone(),
            max_blocks_per_page: self.page_size,
        }
    }

    /// Convert the document and upload it, or print the plan on dry runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or document cannot be loaded,
    /// or the main page cannot be created.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let Some(file) = self.file.as_deref() else {
            return Err(CliError::Validation("a markdown file is required".to_owned()));
        };
        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;

        let doc = read_document(file)?;
        let info = derive_page_info(&doc, &file_stem(file));
        output.info(&format!("Converting {}...", file.display()));

        let resolver: Box<dyn ResourceResolver> = if self.dry_run {
            Box::new(OfflineResolver)
        } else {
            Box::new(ImgbbResolver::from_config(&config.images))
        };
        let converter = Converter::new(convert_options(&config), resolver.as_ref());
        let blocks = converter.convert(&doc.body, &base_dir(file));
        tracing::info!(blocks = blocks.len(), "Converted document");

        let options = assemble_options(&config);
        if self.dry_run {
            if self.json {
                output.data(&serde_json::to_string_pretty(&blocks)?);
            }
            print_dry_run(&output, &info, blocks, options)?;
            return Ok(());
        }

        let credentials = config.require_notion()?;
        let client = NotionClient::from_config(&config.notion, &credentials);
        let report =
            PageAssembler::new(&client, options).assemble(&info.title, &info.summary, blocks)?;
        print_report(&output, &report);

        match report.failed {
            Some((page, source)) => Err(CliError::Incomplete { page, source }),
            None => Ok(()),
        }
    }
}

/// Conversion options derived from configuration.
pub(crate) fn convert_options(config: &Config) -> ConvertOptions {
    ConvertOptions {
        max_rich_text_length: config.limits.max_rich_text_length,
        max_document_blocks: config.limits.max_document_blocks,
        max_toggle_children: config.limits.max_toggle_children,
        video_domains: config.media.video_domains.clone(),
        math_indicator_threshold: config.math.indicator_threshold,
        placeholder_url: config.images.placeholder_url.clone(),
    }
}

fn assemble_options(config: &Config) -> AssembleOptions {
    AssembleOptions {
        max_blocks_per_page: config.limits.max_blocks_per_page,
        max_summary_length: config.limits.max_summary_length,
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "Untitled".to_owned(), |stem| stem.to_string_lossy().into_owned())
}

/// Directory relative image paths are resolved against.
fn base_dir(file: &Path) -> PathBuf {
    let dir = file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf())
}

/// Count of blocks per kind, container children included.
pub(crate) fn kind_histogram(blocks: &[Block]) -> BTreeMap<BlockKind, usize> {
    let mut histogram = BTreeMap::new();
    for block in blocks {
        *histogram.entry(block.kind()).or_insert(0) += 1;
        if let Block::Toggle { children, .. } = block {
            for (kind, count) in kind_histogram(children) {
                *histogram.entry(kind).or_insert(0) += count;
            }
        }
    }
    histogram
}

fn print_dry_run(
    output: &Output,
    info: &PageInfo,
    blocks: Vec<Block>,
    options: AssembleOptions,
) -> Result<(), CliError> {
    output.highlight("\n[DRY RUN] Nothing uploaded.");
    output.field("Title", &info.title);
    if !info.summary.is_empty() {
        output.field("Summary", &info.summary);
    }

    output.info(&format!("\nBlocks ({}):", blocks.len()));
    for (kind, count) in kind_histogram(&blocks) {
        output.info(&format!("  {:<20} {count}", kind.as_str()));
    }

    let pages = plan_pages(&info.title, &info.summary, blocks, options)?;
    output.info(&format!("\nPages ({}):", pages.len()));
    for page in &pages {
        output.info(&format!("  -> {} ({} blocks)", page.title, page.blocks.len()));
    }
    Ok(())
}

fn print_report(output: &Output, report: &UploadReport) {
    output.success("\nPage created successfully!");
    output.field("ID", &report.main.id);
    output.field("URL", &report.main.url);

    for (index, page) in report.continuations.iter().enumerate() {
        output.info(&format!("  -> continued {}: {}", index + 1, page.url));
    }

    if let Some((page, err)) = &report.failed {
        output.warning(&format!(
            "\nWarning: continuation page {page} could not be created: {err}"
        ));
    }
}
