//! Stateless text helpers.
//!
//! All lengths are counted in `char`s.

use std::borrow::Cow;
use std::ops::Range;
use std::sync::LazyLock;

use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use regex::{Captures, Regex};

static WIKI_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([^\[\]|\n]+?)(?:\|([^\[\]\n]+?))?\]\]").unwrap()
});

/// Ellipsis marker appended to truncated text.
pub const ELLIPSIS: &str = "...";

/// A markdown link found in text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub text: String,
    pub url: String,
    /// Byte range of the link in the text it was found in.
    pub span: Range<usize>,
}

/// Extract inline links in order of appearance.
///
/// Links are parsed as markdown, so destinations may contain balanced
/// parentheses and link text may span lines. Image syntax (`![alt](src)`)
/// is not a link.
#[must_use]
pub fn extract_links(text: &str) -> Vec<Link> {
    let mut links = Vec::new();
    let mut open: Option<(Range<usize>, String, String)> = None;
    for (event, range) in Parser::new(text).into_offset_iter() {
        match event {
            Event::Start(Tag::Link { dest_url, .. }) => {
                open = Some((range, dest_url.trim().to_owned(), String::new()));
            }
            Event::End(TagEnd::Link) => {
                if let Some((span, url, label)) = open.take() {
                    links.push(Link {
                        text: label.trim().to_owned(),
                        url,
                        span,
                    });
                }
            }
            Event::Text(part) | Event::Code(part) => {
                if let Some((_, _, label)) = open.as_mut() {
                    label.push_str(&part);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some((_, _, label)) = open.as_mut() {
                    label.push('\n');
                }
            }
            _ => {}
        }
    }
    links
}

/// Replace every link with its display text (or URL when the text is empty).
#[must_use]
pub fn strip_links(text: &str) -> Cow<'_, str> {
    let links = extract_links(text);
    if links.is_empty() {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for link in links {
        out.push_str(&text[last..link.span.start]);
        out.push_str(if link.text.is_empty() { &link.url } else { &link.text });
        last = link.span.end;
    }
    out.push_str(&text[last..]);
    Cow::Owned(out)
}

/// Whether a URL is absolute http(s).
#[must_use]
pub fn is_web_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

/// Split text into ordered pieces of at most `max_len` chars.
///
/// Pieces break at line boundaries where possible and keep their line
/// endings, so concatenating the pieces reproduces the input exactly. A
/// single line longer than the limit is hard-split.
#[must_use]
pub fn split_long_text(text: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(1);
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();
        if current_len + line_len <= max_len {
            current.push_str(line);
            current_len += line_len;
            continue;
        }
        if !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if line_len <= max_len {
            current.push_str(line);
            current_len = line_len;
            continue;
        }
        let mut chars = line.chars().peekable();
        while chars.peek().is_some() {
            let chunk: String = chars.by_ref().take(max_len).collect();
            let chunk_len = chunk.chars().count();
            if chunk_len == max_len {
                pieces.push(chunk);
            } else {
                current = chunk;
                current_len = chunk_len;
            }
        }
    }

    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Truncate to `max_len` chars, replacing the tail with [`ELLIPSIS`].
#[must_use]
pub fn truncate_with_ellipsis(text: &str, max_len: usize) -> Cow<'_, str> {
    if text.chars().count() <= max_len {
        return Cow::Borrowed(text);
    }
    let marker_len = ELLIPSIS.len();
    if max_len <= marker_len {
        return Cow::Owned(text.chars().take(max_len).collect());
    }
    let mut truncated: String = text.chars().take(max_len - marker_len).collect();
    truncated.push_str(ELLIPSIS);
    Cow::Owned(truncated)
}

/// Host part of an absolute URL, lowercased.
fn url_host(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host = authority.rsplit('@').next()?;
    let host = host.split(':').next()?;
    (!host.is_empty()).then(|| host.to_ascii_lowercase())
}

/// Whether the URL's host is one of `domains` or a subdomain of one.
#[must_use]
pub fn is_video_link(url: &str, domains: &[String]) -> bool {
    let Some(host) = url_host(url) else {
        return false;
    };
    domains.iter().any(|domain| {
        let domain = domain.to_ascii_lowercase();
        host == domain
            || host
                .strip_suffix(domain.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

/// Replace `[[target]]` with `target` and `[[target|alias]]` with `alias`.
///
/// Lines inside fenced code blocks are left untouched.
#[must_use]
pub fn normalize_wiki_links(text: &str) -> String {
    if !text.contains("[[") {
        return text.to_owned();
    }
    let mut fence = FenceTracker::default();
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        if fence.update(line) {
            out.push_str(line);
            continue;
        }
        let replaced = WIKI_LINK.replace_all(line, |caps: &Captures<'_>| {
            caps.get(2)
                .or_else(|| caps.get(1))
                .map_or("", |m| m.as_str())
                .trim()
                .to_owned()
        });
        out.push_str(&replaced);
    }
    out
}

/// Tracks whether consecutive lines are inside a fenced code block.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    open: Option<(char, usize)>,
}

impl FenceTracker {
    /// Feed the next line. Returns whether the line belongs to a fence
    /// (opening marker, content or closing marker).
    pub(crate) fn update(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();
        match self.open {
            Some((ch, len)) => {
                let run = trimmed.chars().take_while(|&c| c == ch).count();
                if run >= len && trimmed[run * ch.len_utf8()..].trim().is_empty() {
                    self.open = None;
                }
                true
            }
            None => {
                let Some(ch) = trimmed.chars().next().filter(|c| matches!(c, '`' | '~')) else {
                    return false;
                };
                let run = trimmed.chars().take_while(|&c| c == ch).count();
                if run < 3 {
                    return false;
                }
                self.open = Some((ch, run));
                true
            }
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.open.is_some()
    }
}

/// Byte ranges of fenced code blocks, markers included.
pub(crate) fn fenced_ranges(text: &str) -> Vec<Range<usize>> {
    let mut ranges: Vec<Range<usize>> = Vec::new();
    let mut fence = FenceTracker::default();
    let mut offset = 0;
    let mut extending = false;
    for line in text.split_inclusive('\n') {
        let end = offset + line.len();
        if fence.update(line) {
            match ranges.last_mut() {
                Some(last) if extending => last.end = end,
                _ => ranges.push(offset..end),
            }
            extending = fence.is_open();
        } else {
            extending = false;
        }
        offset = end;
    }
    ranges
}

/// Preview of text for titles: whitespace collapsed, at most `max_chars`
/// chars followed by [`ELLIPSIS`] when shortened.
#[must_use]
pub fn preview(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let mut short: String = collapsed.chars().take(max_chars).collect();
    short.push_str(ELLIPSIS);
    short
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_links() {
        let links = extract_links("See [docs](https://a.io/x) and [ref]( other.md ).");
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].text, "docs");
        assert_eq!(links[0].url, "https://a.io/x");
        assert_eq!(links[0].span, 4..26);
        assert_eq!(links[1].url, "other.md");
    }

    #[test]
    fn test_extract_links_skips_images() {
        let links = extract_links("![alt](a.png) [b](https://b.io)");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].text, "b");
    }

    #[test]
    fn test_extract_links_parenthesized_url() {
        let text = "See [Rust](https://en.wikipedia.org/wiki/Rust_(language)) now.";
        let links = extract_links(text);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://en.wikipedia.org/wiki/Rust_(language)");
        assert_eq!(
            &text[links[0].span.clone()],
            "[Rust](https://en.wikipedia.org/wiki/Rust_(language))"
        );
    }

    #[test]
    fn test_extract_links_text_across_lines() {
        let links = extract_links("[two\nlines](https://a.io)");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].text, "two\nlines");
    }

    #[test]
    fn test_strip_links() {
        assert_eq!(strip_links("a [b](c.md) [](https://d.io)"), "a b https://d.io");
        assert!(matches!(strip_links("no links"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_split_long_text_short_input() {
        assert_eq!(split_long_text("hello", 10), vec!["hello"]);
        assert!(split_long_text("", 10).is_empty());
    }

    #[test]
    fn test_split_long_text_on_lines() {
        let text = "aaaa\nbbbb\ncccc\n";
        let pieces = split_long_text(text, 10);
        assert_eq!(pieces, vec!["aaaa\nbbbb\n", "cccc\n"]);
    }

    #[test]
    fn test_split_long_text_hard_splits_long_line() {
        let pieces = split_long_text("abcdefghij\nxy", 4);
        assert_eq!(pieces, vec!["abcd", "efgh", "ij\n", "xy"]);
        assert!(pieces.iter().all(|p| p.chars().count() <= 4));
    }

    #[test]
    fn test_split_long_text_round_trip() {
        let inputs = [
            "line one\nline two\n\nline four which is rather long\n",
            "日本語のテキスト\n改行あり\nさらに長い行がここにあります",
            "no newline at all but quite long text here",
            "\n\n\n",
        ];
        for input in inputs {
            for max in [1, 3, 7, 16, 100] {
                let pieces = split_long_text(input, max);
                assert_eq!(pieces.concat(), input, "max={max}");
                assert!(pieces.iter().all(|p| p.chars().count() <= max));
            }
        }
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("short", 10), "short");
        assert_eq!(truncate_with_ellipsis("abcdefghij", 8), "abcde...");
        assert_eq!(truncate_with_ellipsis("abcdefghij", 2), "ab");
        assert_eq!(truncate_with_ellipsis("あいうえおか", 5), "あい...");
    }

    #[test]
    fn test_is_video_link() {
        let domains = vec![
            "youtube.com".to_owned(),
            "youtu.be".to_owned(),
            "vimeo.com".to_owned(),
        ];
        assert!(is_video_link("https://youtu.be/abc", &domains));
        assert!(is_video_link("https://www.youtube.com/watch?v=1", &domains));
        assert!(is_video_link("http://user@VIMEO.com:443/1", &domains));
        assert!(!is_video_link("https://notyoutube.com/x", &domains));
        assert!(!is_video_link("https://example.com/youtube.com", &domains));
        assert!(!is_video_link("youtube.com/x", &domains));
    }

    #[test]
    fn test_normalize_wiki_links() {
        assert_eq!(
            normalize_wiki_links("See [[Page One]] and [[target|the alias]]."),
            "See Page One and the alias."
        );
    }

    #[test]
    fn test_normalize_wiki_links_skips_fences() {
        let text = "[[A]]\n```bash\nif [[ -f x ]]; then\n```\n[[B]]\n";
        assert_eq!(
            normalize_wiki_links(text),
            "A\n```bash\nif [[ -f x ]]; then\n```\nB\n"
        );
    }

    #[test]
    fn test_fenced_ranges() {
        let text = "a\n```\ncode\n```\nb\n~~~~\nopen";
        let ranges = fenced_ranges(text);
        assert_eq!(ranges.len(), 2);
        assert_eq!(&text[ranges[0].clone()], "```\ncode\n```\n");
        assert_eq!(&text[ranges[1].clone()], "~~~~\nopen");
    }

    #[test]
    fn test_fence_tracker_requires_matching_marker() {
        let mut fence = FenceTracker::default();
        assert!(fence.update("````md"));
        assert!(fence.update("```"));
        assert!(fence.is_open());
        assert!(fence.update("````"));
        assert!(!fence.is_open());
        assert!(!fence.update("``inline``"));
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("  hello\n  world ", 20), "hello world");
        assert_eq!(preview("abcdefgh", 5), "abcde...");
    }
}
