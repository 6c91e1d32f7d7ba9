//! Final pass enforcing block constraints before upload.

use crate::block::Block;
use crate::convert::ConvertOptions;
use crate::text::truncate_with_ellipsis;

/// Drop blocks without payload, truncate oversized spans and cap counts.
///
/// The top level is capped at `max_document_blocks`, container children at
/// `max_toggle_children`. Every removal is logged.
pub(crate) fn validate_blocks(blocks: Vec<Block>, options: &ConvertOptions) -> Vec<Block> {
    let mut valid = sanitize(blocks, options);
    if valid.len() > options.max_document_blocks {
        tracing::warn!(
            blocks = valid.len(),
            limit = options.max_document_blocks,
            "Discarding blocks beyond the document limit"
        );
        valid.truncate(options.max_document_blocks);
    }
    valid
}

fn sanitize(blocks: Vec<Block>, options: &ConvertOptions) -> Vec<Block> {
    blocks
        .into_iter()
        .filter_map(|block| sanitize_block(block, options))
        .collect()
}

fn sanitize_block(mut block: Block, options: &ConvertOptions) -> Option<Block> {
    if !block.has_payload() {
        tracing::warn!(kind = %block.kind(), "Dropping block without content");
        return None;
    }

    let kind = block.kind();
    if let Some(spans) = block.rich_text_mut() {
        for span in spans.iter_mut() {
            let length = span.content.chars().count();
            if length > options.max_rich_text_length {
                tracing::warn!(%kind, length, "Truncating oversized text");
                span.content =
                    truncate_with_ellipsis(&span.content, options.max_rich_text_length).into_owned();
            }
        }
    }

    if let Block::Toggle { children, .. } = &mut block {
        let mut kept = sanitize(std::mem::take(children), options);
        if kept.len() > options.max_toggle_children {
            tracing::warn!(
                children = kept.len(),
                limit = options.max_toggle_children,
                "Discarding container children beyond the limit"
            );
            kept.truncate(options.max_toggle_children);
        }
        *children = kept;
    }

    Some(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::RichText;
    use pretty_assertions::assert_eq;

    fn options() -> ConvertOptions {
        ConvertOptions {
            max_rich_text_length: 10,
            max_document_blocks: 4,
            max_toggle_children: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_drops_blocks_without_payload() {
        let blocks = vec![
            Block::paragraph("  "),
            Block::image(""),
            Block::Divider,
            Block::equation(""),
            Block::paragraph("kept"),
        ];

        let valid = validate_blocks(blocks, &options());

        assert_eq!(valid, vec![Block::Divider, Block::paragraph("kept")]);
    }

    #[test]
    fn test_truncates_long_spans() {
        let blocks = vec![Block::Paragraph {
            rich_text: vec![RichText::new("short"), RichText::new("much too long text")],
        }];

        let valid = validate_blocks(blocks, &options());

        assert_eq!(
            valid,
            vec![Block::Paragraph {
                rich_text: vec![RichText::new("short"), RichText::new("much to...")],
            }]
        );
    }

    #[test]
    fn test_caps_top_level_blocks() {
        let blocks = (0..6).map(|i| Block::paragraph(format!("p{i}"))).collect();

        let valid = validate_blocks(blocks, &options());

        assert_eq!(valid.len(), 4);
        assert_eq!(valid[3], Block::paragraph("p3"));
    }

    #[test]
    fn test_container_children_sanitized_and_capped() {
        let children = vec![
            Block::paragraph(""),
            Block::paragraph("first child text"),
            Block::paragraph("second"),
            Block::paragraph("third"),
        ];
        let blocks = vec![Block::toggle("Show result", children)];

        let valid = validate_blocks(blocks, &options());

        assert_eq!(
            valid,
            vec![Block::toggle(
                "Show re...",
                vec![Block::paragraph("first c..."), Block::paragraph("second")]
            )]
        );
    }

    #[test]
    fn test_empty_code_block_kept() {
        let blocks = vec![Block::code("plain text", "")];

        let valid = validate_blocks(blocks, &options());

        assert_eq!(valid, vec![Block::code("plain text", "")]);
    }
}
