//! Math detection: block spans, inline spans and fence classification.

use std::sync::LazyLock;

use regex::Regex;

use crate::language;
use crate::text::fenced_ranges;

static BLOCK_MATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\$\$\s*(.*?)\s*\$\$").unwrap());

/// `$x$` where the content neither starts nor ends with whitespace.
static INLINE_MATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([^$\s](?:[^$\n]*[^$\s])?)\$").unwrap());

/// Markers of a complete LaTeX document rather than an expression.
const DOCUMENT_MARKERS: &[&str] = &[
    r"\documentclass",
    r"\usepackage",
    r"\begin{document}",
    r"\end{document}",
    r"\title{",
    r"\author{",
    r"\maketitle",
    r"\section{",
    r"\subsection{",
    r"\chapter{",
    r"\tableofcontents",
    r"\bibliography",
];

/// Environments that make a fence math on their own.
const MATH_ENVIRONMENTS: &[&str] = &[
    r"\begin{equation",
    r"\begin{align",
    r"\begin{gather",
    r"\begin{matrix",
    r"\begin{pmatrix",
    r"\begin{bmatrix",
];

/// Tokens typical of math expressions, counted once each.
const INDICATORS: &[&str] = &[
    r"\begin{equation",
    r"\begin{align",
    r"\begin{gather",
    r"\begin{matrix",
    r"\begin{pmatrix",
    r"\begin{bmatrix",
    r"\begin{cases",
    r"\frac{",
    r"\sum",
    r"\int",
    r"\lim",
    r"\prod",
    r"\nabla",
    r"\partial",
    r"\alpha",
    r"\beta",
    r"\gamma",
    r"\delta",
    r"\epsilon",
    r"\theta",
    r"\lambda",
    r"\mu",
    r"\pi",
    r"\sigma",
    r"\phi",
    r"\omega",
    r"\left",
    r"\right",
    r"\mathbf",
    r"\mathcal",
    r"\mathrm",
    r"\cdot",
    r"\times",
    r"\div",
    r"\cap",
    r"\cup",
    r"\subset",
    r"\in",
    r"\forall",
    r"\exists",
    r"\Rightarrow",
];

/// Default distinct indicator count that makes a fence math.
pub const DEFAULT_INDICATOR_THRESHOLD: usize = 3;

/// A piece of text around block math spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MathSegment<'a> {
    Text(&'a str),
    Equation(String),
}

/// Split text at `$$ ... $$` spans, leaving fenced code untouched.
///
/// Spans do not overlap; each is matched lazily from the earliest `$$`.
pub(crate) fn split_block_math(text: &str) -> Vec<MathSegment<'_>> {
    if !text.contains("$$") {
        return vec![MathSegment::Text(text)];
    }

    let fences = fenced_ranges(text);
    let mut segments = Vec::new();
    let mut last = 0;
    let mut pos = 0;

    while let Some(caps) = BLOCK_MATH.captures_at(text, pos) {
        let Some(whole) = caps.get(0) else { break };
        let overlaps_fence = fences
            .iter()
            .any(|fence| whole.start() < fence.end && fence.start < whole.end());
        if overlaps_fence {
            pos = next_char_boundary(text, whole.start() + 1);
            continue;
        }
        if whole.start() > last {
            segments.push(MathSegment::Text(&text[last..whole.start()]));
        }
        segments.push(MathSegment::Equation(caps[1].to_owned()));
        last = whole.end();
        pos = whole.end();
    }

    if last < text.len() {
        segments.push(MathSegment::Text(&text[last..]));
    }
    segments
}

fn next_char_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

/// First `$$ ... $$` expression in text, if any.
pub(crate) fn find_block_math(text: &str) -> Option<String> {
    BLOCK_MATH
        .captures(text)
        .map(|caps| caps[1].to_owned())
        .filter(|expr| !expr.is_empty())
}

/// A piece of a paragraph split at inline math.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InlinePiece {
    Text(String),
    Equation(String),
}

/// Split a paragraph at `$x$` spans, preserving order.
///
/// Returns `None` when the text has no inline math. Text pieces that are
/// empty after trimming are dropped. A closing `$` followed by a digit does
/// not end a span, so prices like `$5 and $10` stay text.
pub(crate) fn split_inline_math(text: &str) -> Option<Vec<InlinePiece>> {
    let mut pieces = Vec::new();
    let mut last = 0;
    let mut pos = 0;
    let mut found = false;

    while let Some(caps) = INLINE_MATH.captures_at(text, pos) {
        let Some(whole) = caps.get(0) else { break };
        let followed_by_digit = text[whole.end()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit());
        if followed_by_digit {
            pos = whole.start() + 1;
            continue;
        }
        push_text_piece(&mut pieces, &text[last..whole.start()]);
        pieces.push(InlinePiece::Equation(caps[1].to_owned()));
        found = true;
        last = whole.end();
        pos = whole.end();
    }

    if !found {
        return None;
    }
    push_text_piece(&mut pieces, &text[last..]);
    Some(pieces)
}

fn push_text_piece(pieces: &mut Vec<InlinePiece>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        pieces.push(InlinePiece::Text(trimmed.to_owned()));
    }
}

/// How a code fence should be emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceKind {
    Code,
    Equation,
}

/// Decide whether a fence holds a math expression or code.
///
/// Checked in order: a `math` tag, full-document markers (always code), a
/// `latex`/`tex` tag, an explicit math environment, then the distinct
/// indicator count against `threshold`.
#[must_use]
pub fn classify_fence(info: &str, content: &str, threshold: usize) -> FenceKind {
    if language::is_math_tag(info) {
        return FenceKind::Equation;
    }
    if DOCUMENT_MARKERS.iter().any(|marker| content.contains(marker)) {
        return FenceKind::Code;
    }
    if language::is_latex_tag(info) {
        return FenceKind::Equation;
    }
    if MATH_ENVIRONMENTS.iter().any(|env| content.contains(env)) {
        return FenceKind::Equation;
    }
    if indicator_count(content) >= threshold {
        return FenceKind::Equation;
    }
    FenceKind::Code
}

/// Number of distinct math indicators present in `content`.
///
/// A command only counts when not followed by another letter, so `\int`
/// does not match inside `\interval`.
fn indicator_count(content: &str) -> usize {
    INDICATORS
        .iter()
        .filter(|indicator| contains_command(content, indicator))
        .count()
}

fn contains_command(content: &str, command: &str) -> bool {
    let open_ended = command.ends_with('{');
    content.match_indices(command).any(|(start, matched)| {
        open_ended
            || !content[start + matched.len()..]
                .chars()
                .next()
                .is_some_and(char::is_alphabetic)
    })
}
