//! Notion REST representation of blocks and page properties.

use mdup_blocks::{Block, Color, RichText};
use serde_json::{Map, Value, json};

const DEFAULT_COLOR: &str = "default";

fn rich_text(spans: &[RichText]) -> Value {
    spans
        .iter()
        .map(|span| json!({ "type": "text", "text": { "content": span.content } }))
        .collect()
}

fn color(color: Option<Color>) -> &'static str {
    color.map_or(DEFAULT_COLOR, Color::as_str)
}

/// Notion block object for a block.
pub(crate) fn block_json(block: &Block) -> Value {
    let kind = block.kind().as_str();
    let payload = match block {
        Block::Paragraph { rich_text: spans } => json!({ "rich_text": rich_text(spans) }),
        Block::Heading {
            rich_text: spans,
            is_toggleable,
            ..
        } => json!({ "rich_text": rich_text(spans), "is_toggleable": is_toggleable }),
        Block::BulletedListItem {
            rich_text: spans,
            color: c,
        }
        | Block::NumberedListItem {
            rich_text: spans,
            color: c,
        }
        | Block::Quote {
            rich_text: spans,
            color: c,
        } => json!({ "rich_text": rich_text(spans), "color": color(*c) }),
        Block::Code {
            language,
            rich_text: spans,
        } => json!({ "language": language, "rich_text": rich_text(spans) }),
        Block::Equation { expression } => json!({ "expression": expression }),
        Block::Image { url } => json!({ "type": "external", "external": { "url": url } }),
        Block::Callout {
            rich_text: spans,
            icon,
            color: c,
        } => json!({
            "rich_text": rich_text(spans),
            "icon": { "type": "emoji", "emoji": icon },
            "color": color(*c),
        }),
        Block::Divider => json!({}),
        Block::Bookmark { url } | Block::Embed { url } => json!({ "url": url }),
        Block::Toggle {
            rich_text: spans,
            children,
        } => json!({ "rich_text": rich_text(spans), "children": blocks_json(children) }),
    };

    let mut object = Map::new();
    object.insert("object".to_owned(), Value::from("block"));
    object.insert("type".to_owned(), Value::from(kind));
    object.insert(kind.to_owned(), payload);
    Value::Object(object)
}

pub(crate) fn blocks_json(blocks: &[Block]) -> Value {
    blocks.iter().map(block_json).collect()
}

/// Single text span value for title and rich text properties.
pub(crate) fn text_value(content: &str) -> Value {
    json!([{ "type": "text", "text": { "content": content } }])
}
