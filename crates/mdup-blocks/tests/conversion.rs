//! End-to-end conversion properties.

use std::path::Path;

use mdup_blocks::text::split_long_text;
use mdup_blocks::transcript::{is_transcript, signal_count};
use mdup_blocks::{
    Block, BlockKind, ConvertOptions, Converter, OfflineResolver, derive_page_info,
    parse_document, read_document,
};
use pretty_assertions::assert_eq;

fn convert(body: &str) -> Vec<Block> {
    Converter::new(ConvertOptions::default(), &OfflineResolver).convert(body, Path::new("."))
}

const TRANSCRIPT: &str = "\
---
title: Nightly run
---
## 📊 実行記録: 2025-08-16 02:53:52

**接続先:** host01
**プロンプトファイル:** nightly.md

### 💬 プロンプト
> Check disk usage

### ✨ 結果
Disk usage is at 40%.

```bash
df -h
```
";

#[test]
fn test_document_without_front_matter() {
    let text = "# Title\n\nNo header here: really.\n";

    let doc = parse_document(text);

    assert!(doc.metadata.is_empty());
    assert_eq!(doc.body, text);
}

#[test]
fn test_split_long_text_reassembles() {
    let text = "line one\nline two is longer\n\nx".repeat(40);
    for max in [1, 7, 16, 100, 5000] {
        let pieces = split_long_text(&text, max);
        assert!(pieces.iter().all(|p| p.chars().count() <= max));
        assert_eq!(pieces.concat(), text);
    }
}

#[test]
fn test_conversion_is_idempotent() {
    let body = "# Doc\n\nText with [link](https://example.com).\n\n$$ a+b $$\n\n- one\n- two\n";

    assert_eq!(convert(body), convert(body));
    let doc = parse_document(TRANSCRIPT);
    assert_eq!(convert(&doc.body), convert(&doc.body));
}

#[test]
fn test_math_fence_gives_one_equation() {
    let blocks = convert("```math\n\\sum_{i=0}^{n} i\n```\n");

    assert_eq!(blocks, vec![Block::equation("\\sum_{i=0}^{n} i")]);
}

#[test]
fn test_block_math_keeps_order() {
    let blocks = convert("First.\n\n$$ x^2 $$\n\nSecond.\n");

    let kinds: Vec<_> = blocks.iter().map(Block::kind).collect();
    assert_eq!(
        kinds,
        vec![BlockKind::Paragraph, BlockKind::Equation, BlockKind::Paragraph]
    );
    assert_eq!(blocks[1], Block::equation("x^2"));
}

#[test]
fn test_transcript_routing_threshold() {
    let three = "## Execution Record: 2025-01-01 00:00:00\n**Connection Host:** a\n### Result\nok\n";
    let two = "### Prompt\nhi\n### Result\nok\n";

    assert_eq!(signal_count(three), 3);
    assert!(is_transcript(three));
    assert_eq!(signal_count(two), 2);
    assert!(!is_transcript(two));

    let blocks = convert(two);
    assert!(blocks.iter().all(|block| block.kind() != BlockKind::Toggle));
    let blocks = convert(three);
    assert_eq!(blocks.last().map(Block::kind), Some(BlockKind::Toggle));
}

#[test]
fn test_video_links_embed_and_others_bookmark() {
    let blocks = convert("- [clip](https://youtu.be/xyz)\n- [site](https://example.org/a)\n");

    assert_eq!(
        blocks,
        vec![
            Block::paragraph("clip"),
            Block::embed("https://youtu.be/xyz"),
            Block::paragraph("site"),
            Block::bookmark("https://example.org/a"),
        ]
    );
}

#[test]
fn test_transcript_file_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nightly.md");
    std::fs::write(&path, TRANSCRIPT).unwrap();

    let doc = read_document(&path).unwrap();
    let blocks = convert(&doc.body);
    let info = derive_page_info(&doc, "nightly");

    assert_eq!(doc.metadata.get("title"), Some("Nightly run"));
    assert_eq!(doc.metadata.get("connection_host"), Some("host01"));
    assert_eq!(
        info.title,
        "Execution record - Check disk usage (2025-08-16 02:53:52)"
    );
    let Some(Block::Toggle { children, .. }) = blocks.last() else {
        panic!("expected a result container, got {blocks:?}");
    };
    assert_eq!(
        *children,
        vec![
            Block::paragraph("Disk usage is at 40%."),
            Block::code("bash", "df -h"),
        ]
    );
}

#[test]
fn test_block_json_shape() {
    let blocks = convert("## Title\n\n---\n\n```\nx\n```\n");

    let json = serde_json::to_value(&blocks).unwrap();

    assert_eq!(json[0]["kind"], "heading_2");
    assert_eq!(json[1]["kind"], "divider");
    assert_eq!(json[2]["code"]["language"], "plain text");
}

#[test]
fn test_missing_document_is_error() {
    let err = read_document(Path::new("/nonexistent/doc.md")).unwrap_err();

    assert!(err.to_string().starts_with("Cannot read /nonexistent/doc.md"));
}
