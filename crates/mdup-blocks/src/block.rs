//! Typed content blocks.
//!
//! A [`Block`] is one unit of page content. Its serialized form is keyed by
//! the kind name, mirroring the document store's nested-object convention:
//!
//! ```json
//! { "kind": "paragraph", "paragraph": { "rich_text": [{ "content": "Hi" }] } }
//! ```

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

/// One plain text segment within a text-bearing block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RichText {
    pub content: String,
}

impl RichText {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Highlight color supported by text-bearing blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    GrayBackground,
    BlueBackground,
    YellowBackground,
    RedBackground,
    GreenBackground,
}

impl Color {
    /// Wire name of the color.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GrayBackground => "gray_background",
            Self::BlueBackground => "blue_background",
            Self::YellowBackground => "yellow_background",
            Self::RedBackground => "red_background",
            Self::GreenBackground => "green_background",
        }
    }
}

/// Block kind discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlockKind {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    BulletedListItem,
    NumberedListItem,
    Code,
    Equation,
    Image,
    Quote,
    Callout,
    Divider,
    Bookmark,
    Embed,
    Toggle,
}

impl BlockKind {
    /// Wire tag of the kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::Heading1 => "heading_1",
            Self::Heading2 => "heading_2",
            Self::Heading3 => "heading_3",
            Self::BulletedListItem => "bulleted_list_item",
            Self::NumberedListItem => "numbered_list_item",
            Self::Code => "code",
            Self::Equation => "equation",
            Self::Image => "image",
            Self::Quote => "quote",
            Self::Callout => "callout",
            Self::Divider => "divider",
            Self::Bookmark => "bookmark",
            Self::Embed => "embed",
            Self::Toggle => "toggle",
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed content block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph {
        rich_text: Vec<RichText>,
    },
    Heading {
        /// Heading level, 1 to 3.
        level: u8,
        rich_text: Vec<RichText>,
        is_toggleable: bool,
    },
    BulletedListItem {
        rich_text: Vec<RichText>,
        color: Option<Color>,
    },
    NumberedListItem {
        rich_text: Vec<RichText>,
        color: Option<Color>,
    },
    Code {
        language: String,
        rich_text: Vec<RichText>,
    },
    Equation {
        expression: String,
    },
    Image {
        url: String,
    },
    Quote {
        rich_text: Vec<RichText>,
        color: Option<Color>,
    },
    Callout {
        rich_text: Vec<RichText>,
        icon: String,
        color: Option<Color>,
    },
    Divider,
    Bookmark {
        url: String,
    },
    Embed {
        url: String,
    },
    /// Collapsible container. Children never contain further toggles.
    Toggle {
        rich_text: Vec<RichText>,
        children: Vec<Block>,
    },
}

fn spans(text: impl Into<String>) -> Vec<RichText> {
    vec![RichText::new(text)]
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph {
            rich_text: spans(text),
        }
    }

    /// Heading clamped to levels 1..=3.
    pub fn heading(level: u8, text: impl Into<String>, is_toggleable: bool) -> Self {
        Self::Heading {
            level: level.clamp(1, 3),
            rich_text: spans(text),
            is_toggleable,
        }
    }

    pub fn bulleted(text: impl Into<String>, color: Option<Color>) -> Self {
        Self::BulletedListItem {
            rich_text: spans(text),
            color,
        }
    }

    pub fn numbered(text: impl Into<String>, color: Option<Color>) -> Self {
        Self::NumberedListItem {
            rich_text: spans(text),
            color,
        }
    }

    pub fn code(language: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Code {
            language: language.into(),
            rich_text: spans(content),
        }
    }

    pub fn equation(expression: impl Into<String>) -> Self {
        Self::Equation {
            expression: expression.into(),
        }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self::Image { url: url.into() }
    }

    pub fn quote(text: impl Into<String>) -> Self {
        Self::Quote {
            rich_text: spans(text),
            color: None,
        }
    }

    pub fn callout(text: impl Into<String>, icon: impl Into<String>, color: Option<Color>) -> Self {
        Self::Callout {
            rich_text: spans(text),
            icon: icon.into(),
            color,
        }
    }

    pub fn bookmark(url: impl Into<String>) -> Self {
        Self::Bookmark { url: url.into() }
    }

    pub fn embed(url: impl Into<String>) -> Self {
        Self::Embed { url: url.into() }
    }

    pub fn toggle(text: impl Into<String>, children: Vec<Block>) -> Self {
        Self::Toggle {
            rich_text: spans(text),
            children,
        }
    }

    #[must_use]
    pub fn kind(&self) -> BlockKind {
        match self {
            Self::Paragraph { .. } => BlockKind::Paragraph,
            Self::Heading { level: 1, .. } => BlockKind::Heading1,
            Self::Heading { level: 2, .. } => BlockKind::Heading2,
            Self::Heading { .. } => BlockKind::Heading3,
            Self::BulletedListItem { .. } => BlockKind::BulletedListItem,
            Self::NumberedListItem { .. } => BlockKind::NumberedListItem,
            Self::Code { .. } => BlockKind::Code,
            Self::Equation { .. } => BlockKind::Equation,
            Self::Image { .. } => BlockKind::Image,
            Self::Quote { .. } => BlockKind::Quote,
            Self::Callout { .. } => BlockKind::Callout,
            Self::Divider => BlockKind::Divider,
            Self::Bookmark { .. } => BlockKind::Bookmark,
            Self::Embed { .. } => BlockKind::Embed,
            Self::Toggle { .. } => BlockKind::Toggle,
        }
    }

    /// Rich text spans of text-bearing blocks.
    #[must_use]
    pub fn rich_text(&self) -> Option<&[RichText]> {
        match self {
            Self::Paragraph { rich_text }
            | Self::Heading { rich_text, .. }
            | Self::BulletedListItem { rich_text, .. }
            | Self::NumberedListItem { rich_text, .. }
            | Self::Code { rich_text, .. }
            | Self::Quote { rich_text, .. }
            | Self::Callout { rich_text, .. }
            | Self::Toggle { rich_text, .. } => Some(rich_text),
            Self::Equation { .. }
            | Self::Image { .. }
            | Self::Divider
            | Self::Bookmark { .. }
            | Self::Embed { .. } => None,
        }
    }

    pub fn rich_text_mut(&mut self) -> Option<&mut Vec<RichText>> {
        match self {
            Self::Paragraph { rich_text }
            | Self::Heading { rich_text, .. }
            | Self::BulletedListItem { rich_text, .. }
            | Self::NumberedListItem { rich_text, .. }
            | Self::Code { rich_text, .. }
            | Self::Quote { rich_text, .. }
            | Self::Callout { rich_text, .. }
            | Self::Toggle { rich_text, .. } => Some(rich_text),
            Self::Equation { .. }
            | Self::Image { .. }
            | Self::Divider
            | Self::Bookmark { .. }
            | Self::Embed { .. } => None,
        }
    }

    /// Concatenated text of all spans.
    #[must_use]
    pub fn plain_text(&self) -> String {
        match self {
            Self::Equation { expression } => expression.clone(),
            Self::Image { url } | Self::Bookmark { url } | Self::Embed { url } => url.clone(),
            _ => self
                .rich_text()
                .map(|spans| spans.iter().map(|s| s.content.as_str()).collect())
                .unwrap_or_default(),
        }
    }

    /// Whether the kind-specific payload is present.
    ///
    /// A divider has no payload and is always valid. A collapsible container
    /// is valid when it has a label, even with no children.
    #[must_use]
    pub fn has_payload(&self) -> bool {
        match self {
            Self::Divider => true,
            Self::Equation { expression } => !expression.trim().is_empty(),
            Self::Image { url } | Self::Bookmark { url } | Self::Embed { url } => {
                !url.trim().is_empty()
            }
            Self::Code { rich_text, .. } => !rich_text.is_empty(),
            _ => self
                .rich_text()
                .is_some_and(|spans| spans.iter().any(|s| !s.content.trim().is_empty())),
        }
    }
}

/// Replace callouts with quotes, prefixing the icon onto the first span.
///
/// Applied recursively to container children. Returns the number of
/// callouts replaced.
pub fn callouts_to_quotes(blocks: &mut [Block]) -> usize {
    let mut replaced = 0;
    for block in blocks.iter_mut() {
        match block {
            Block::Callout {
                rich_text,
                icon,
                color,
            } => {
                let mut rich_text = std::mem::take(rich_text);
                match rich_text.first_mut() {
                    Some(first) => first.content = format!("{icon} {}", first.content),
                    None => rich_text.push(RichText::new(icon.clone())),
                }
                *block = Block::Quote {
                    rich_text,
                    color: *color,
                };
                replaced += 1;
            }
            Block::Toggle { children, .. } => replaced += callouts_to_quotes(children),
            _ => {}
        }
    }
    replaced
}

/// Whether any block (including container children) is a callout.
#[must_use]
pub fn contains_callouts(blocks: &[Block]) -> bool {
    blocks.iter().any(|block| match block {
        Block::Callout { .. } => true,
        Block::Toggle { children, .. } => contains_callouts(children),
        _ => false,
    })
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let tag = self.kind().as_str();
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("kind", tag)?;
        map.serialize_entry(tag, &Payload(self))?;
        map.end()
    }
}

/// Kind-specific payload object of a block.
struct Payload<'a>(&'a Block);

impl Serialize for Payload<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self.0 {
            Block::Paragraph { rich_text } => {
                map.serialize_entry("rich_text", rich_text)?;
            }
            Block::Heading {
                rich_text,
                is_toggleable,
                ..
            } => {
                map.serialize_entry("rich_text", rich_text)?;
                map.serialize_entry("is_toggleable", is_toggleable)?;
            }
            Block::BulletedListItem { rich_text, color }
            | Block::NumberedListItem { rich_text, color }
            | Block::Quote { rich_text, color } => {
                map.serialize_entry("rich_text", rich_text)?;
                if let Some(color) = color {
                    map.serialize_entry("color", color)?;
                }
            }
            Block::Code {
                language,
                rich_text,
            } => {
                map.serialize_entry("language", language)?;
                map.serialize_entry("rich_text", rich_text)?;
            }
            Block::Equation { expression } => {
                map.serialize_entry("expression", expression)?;
            }
            Block::Image { url } | Block::Bookmark { url } | Block::Embed { url } => {
                map.serialize_entry("url", url)?;
            }
            Block::Callout {
                rich_text,
                icon,
                color,
            } => {
                map.serialize_entry("rich_text", rich_text)?;
                map.serialize_entry("icon", icon)?;
                if let Some(color) = color {
                    map.serialize_entry("color", color)?;
                }
            }
            Block::Divider => {}
            Block::Toggle {
                rich_text,
                children,
            } => {
                map.serialize_entry("rich_text", rich_text)?;
                map.serialize_entry("children", children)?;
            }
        }
        map.end()
    }
}
