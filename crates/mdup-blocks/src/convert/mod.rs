//! Markdown to block conversion.
//!
//! [`Converter::convert`] normalizes wiki links, routes the body to the
//! transcript or standard path, then runs the validation pass. Each call
//! owns a fresh [`ConversionContext`], so converting the same body twice
//! yields the same blocks.

mod standard;
mod transcript;

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;

use crate::block::Block;
use crate::math::DEFAULT_INDICATOR_THRESHOLD;
use crate::resolver::ResourceResolver;
use crate::text::{self, is_web_url};
use crate::validate;

use standard::Nesting;

/// Tunables for a conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Maximum chars in one rich text span.
    pub max_rich_text_length: usize,
    /// Maximum top-level blocks kept after validation.
    pub max_document_blocks: usize,
    /// Maximum children kept inside a collapsible container.
    pub max_toggle_children: usize,
    /// Hosts whose links become embeds.
    pub video_domains: Vec<String>,
    /// Distinct indicator count that turns a code fence into an equation.
    pub math_indicator_threshold: usize,
    /// Image URL used when a local image cannot be hosted.
    pub placeholder_url: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            max_rich_text_length: 2000,
            max_document_blocks: 1000,
            max_toggle_children: 50,
            video_domains: vec![
                "youtube.com".to_owned(),
                "youtu.be".to_owned(),
                "vimeo.com".to_owned(),
            ],
            math_indicator_threshold: DEFAULT_INDICATOR_THRESHOLD,
            placeholder_url: "https://via.placeholder.com/600x400?text=Image+Upload+Failed"
                .to_owned(),
        }
    }
}

/// State scoped to a single conversion run.
pub(crate) struct ConversionContext {
    base_dir: PathBuf,
    /// Hosted URL per resolved local image path.
    images: HashMap<PathBuf, String>,
}

impl ConversionContext {
    fn new(base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            images: HashMap::new(),
        }
    }
}

/// Converts markdown bodies into blocks.
pub struct Converter<'a> {
    options: ConvertOptions,
    resolver: &'a dyn ResourceResolver,
}

impl<'a> Converter<'a> {
    pub fn new(options: ConvertOptions, resolver: &'a dyn ResourceResolver) -> Self {
        Self { options, resolver }
    }

    #[must_use]
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert a document body into validated blocks.
    ///
    /// `base_dir` anchors relative image paths. Never fails: fragments that
    /// cannot be interpreted degrade to plain text.
    pub fn convert(&self, body: &str, base_dir: &Path) -> Vec<Block> {
        let body = text::normalize_wiki_links(body);
        let mut ctx = ConversionContext::new(base_dir);

        let blocks = if crate::transcript::is_transcript(&body) {
            tracing::info!("Converting as execution transcript");
            self.convert_transcript(&mut ctx, &body)
        } else {
            tracing::debug!("Converting as standard markdown");
            self.convert_standard(&mut ctx, &body, Nesting::TopLevel)
        };

        validate::validate_blocks(blocks, &self.options)
    }

    /// Hosted URL for an image reference.
    ///
    /// Absolute URLs pass through. Local references are percent-decoded,
    /// resolved against the base directory, and hosted at most once per run.
    fn resolve_image(&self, ctx: &mut ConversionContext, src: &str) -> String {
        if is_web_url(src) || src.starts_with("data:") {
            return src.to_owned();
        }

        let decoded = percent_decode_str(src).decode_utf8_lossy();
        let local = decoded.strip_prefix("file://").unwrap_or(&*decoded);
        let path = normalize_path(&ctx.base_dir.join(local));

        if let Some(url) = ctx.images.get(&path) {
            tracing::debug!(path = %path.display(), "Reusing hosted image");
            return url.clone();
        }

        let url = match self.resolver.resolve(&path) {
            Some(url) if !url.trim().is_empty() => {
                tracing::info!(path = %path.display(), %url, "Hosted image");
                url
            }
            _ => {
                tracing::warn!(path = %path.display(), "Image could not be hosted, using placeholder");
                self.options.placeholder_url.clone()
            }
        };
        ctx.images.insert(path, url.clone());
        url
    }
}

/// Drop `.` components so equivalent spellings share a cache entry.
fn normalize_path(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}
