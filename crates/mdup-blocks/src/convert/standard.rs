//! Standard markdown conversion: a block-math aware token walk.

use std::sync::LazyLock;

use regex::Regex;

use super::{ConversionContext, Converter};
use crate::block::{Block, Color};
use crate::callout::parse_typed_callout;
use crate::language::normalize_language;
use crate::math::{self, FenceKind, InlinePiece, MathSegment};
use crate::text::{is_video_link, is_web_url, split_long_text};
use crate::tokens::{InlineText, ListItem, Token, tokenize};
use crate::transcript::markers::is_section_heading;

/// Icon of callouts made from prompt quotes.
pub(super) const PROMPT_ICON: &str = "💬";

static PROMPT_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bPrompt\b").unwrap());

/// Where converted blocks will live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Nesting {
    TopLevel,
    /// Inside a collapsible container: no collapsible headings.
    InContainer,
}

impl Converter<'_> {
    pub(super) fn convert_standard(
        &self,
        ctx: &mut ConversionContext,
        text: &str,
        nesting: Nesting,
    ) -> Vec<Block> {
        let mut blocks = Vec::new();
        for segment in math::split_block_math(text) {
            match segment {
                MathSegment::Equation(expression) => blocks.push(Block::equation(expression)),
                MathSegment::Text(text) => {
                    for token in tokenize(text) {
                        self.convert_token(ctx, token, nesting, &mut blocks);
                    }
                }
            }
        }
        blocks
    }

    fn convert_token(
        &self,
        ctx: &mut ConversionContext,
        token: Token,
        nesting: Nesting,
        out: &mut Vec<Block>,
    ) {
        match token {
            Token::Heading { level, content } => self.heading(level, &content, nesting, out),
            Token::List(items) => {
                for item in &items {
                    self.list_item(item, out);
                }
            }
            Token::Paragraph(content) => self.paragraph(ctx, &content, out),
            Token::Fence { info, content } => self.fence(&info, &content, out),
            Token::Quote(content) => self.quote(&content, out),
            Token::Rule => out.push(Block::Divider),
            Token::Other(kind) => {
                tracing::warn!(kind, "Skipping unsupported markdown construct");
            }
        }
    }

    fn heading(&self, level: u8, content: &InlineText, nesting: Nesting, out: &mut Vec<Block>) {
        let text = content.text.as_str();
        if level > 3 {
            self.push_text(text, out, Block::paragraph);
            return;
        }
        let toggleable = nesting == Nesting::TopLevel && is_section_heading(text);
        out.push(Block::heading(level, text, toggleable));
    }

    fn list_item(&self, item: &ListItem, out: &mut Vec<Block>) {
        let text = &item.content.text;
        let make = |color: Option<Color>| {
            move |piece: String| {
                if item.ordered {
                    Block::numbered(piece, color)
                } else {
                    Block::bulleted(piece, color)
                }
            }
        };

        if item.content.starts_bold && text.contains(':') {
            self.push_text(text, out, make(Some(Color::GrayBackground)));
            return;
        }
        if self.push_links(&item.content, out) {
            return;
        }
        self.push_text(text, out, make(None));
    }

    /// Paragraph rules, first match wins: residual block math, inline
    /// math, embedded images, links, plain text.
    fn paragraph(&self, ctx: &mut ConversionContext, content: &InlineText, out: &mut Vec<Block>) {
        let text = content.text.as_str();

        if let Some(expression) = math::find_block_math(text) {
            out.push(Block::equation(expression));
            return;
        }

        if let Some(pieces) = math::split_inline_math(text) {
            for piece in pieces {
                match piece {
                    InlinePiece::Text(text) => {
                        self.push_text(&text, out, Block::paragraph);
                    }
                    InlinePiece::Equation(expression) => out.push(Block::equation(expression)),
                }
            }
            return;
        }

        if !content.images.is_empty() {
            for image in &content.images {
                tracing::debug!(src = %image.src, alt = %image.alt, "Resolving image");
                let url = self.resolve_image(ctx, &image.src);
                out.push(Block::image(url));
            }
            self.push_text(text, out, Block::paragraph);
            return;
        }

        if self.push_links(content, out) {
            return;
        }
        self.push_text(text, out, Block::paragraph);
    }

    fn fence(&self, info: &str, content: &str, out: &mut Vec<Block>) {
        let threshold = self.options.math_indicator_threshold;
        if math::classify_fence(info, content, threshold) == FenceKind::Equation {
            tracing::debug!(info, "Code fence classified as math");
            out.push(Block::equation(content.trim()));
            return;
        }

        let language = normalize_language(info);
        let pieces = split_long_text(content, self.options.max_rich_text_length);
        if pieces.is_empty() {
            out.push(Block::code(language, ""));
            return;
        }

        let total = pieces.len();
        if total > 1 {
            tracing::info!(language, pieces = total, "Splitting long code block");
        }
        for (index, mut piece) in pieces.into_iter().enumerate() {
            if piece.ends_with('\n') {
                piece.pop();
            }
            out.push(Block::code(language.as_str(), piece));
            // The marker after piece n reads "n/total".
            if index + 1 < total {
                out.push(Block::paragraph(format!("(split {}/{total})", index + 1)));
            }
        }
    }

    fn quote(&self, content: &InlineText, out: &mut Vec<Block>) {
        let text = content.text.as_str();
        if let Some(callout) = parse_typed_callout(text) {
            self.push_text(&callout.text, out, |piece| {
                Block::callout(piece, callout.icon, None)
            });
            return;
        }
        if text.contains("プロンプト") || PROMPT_WORD.is_match(text) {
            self.push_text(text, out, |piece| {
                Block::callout(piece, PROMPT_ICON, Some(Color::BlueBackground))
            });
            return;
        }
        if self.push_links(content, out) {
            return;
        }
        self.push_text(text, out, Block::quote);
    }

    /// Emit web links as a paragraph with the display text followed by a
    /// bookmark, or an embed for video hosts. Text around the links becomes
    /// plain paragraphs. Returns false when the text has no web links.
    fn push_links(&self, content: &InlineText, out: &mut Vec<Block>) -> bool {
        let text = content.text.as_str();
        let links: Vec<_> = content
            .links
            .iter()
            .filter(|link| is_web_url(&link.url))
            .collect();
        if links.is_empty() {
            return false;
        }

        let mut last = 0;
        for link in links {
            self.push_text(&text[last..link.span.start], out, Block::paragraph);
            let label = if link.text.is_empty() {
                link.url.as_str()
            } else {
                link.text.as_str()
            };
            self.push_text(label, out, Block::paragraph);
            if is_video_link(&link.url, &self.options.video_domains) {
                out.push(Block::embed(link.url.as_str()));
            } else {
                out.push(Block::bookmark(link.url.as_str()));
            }
            last = link.span.end;
        }
        self.push_text(&text[last..], out, Block::paragraph);
        true
    }

    /// Emit trimmed text as one or more blocks within the length cap.
    pub(super) fn push_text(
        &self,
        text: &str,
        out: &mut Vec<Block>,
        make: impl Fn(String) -> Block,
    ) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        for piece in split_long_text(text, self.options.max_rich_text_length) {
            let piece = piece.trim_end();
            if !piece.is_empty() {
                out.push(make(piece.to_owned()));
            }
        }
    }
}
