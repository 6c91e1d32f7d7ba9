//! Block-level tokens folded from pulldown-cmark events.
//!
//! Inline structure is flattened into text. Links keep only their display
//! text and are recorded alongside it with their destination. Math keeps its
//! dollar delimiters so later stages can apply the math rules to plain
//! strings. Emphasis markers are dropped.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::text::Link;

/// Inline content of a paragraph, heading, list item or quote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct InlineText {
    pub text: String,
    /// Links in order, spans indexing into `text`.
    pub links: Vec<Link>,
    pub images: Vec<ImageRef>,
    /// Whether the content opens with bold text.
    pub starts_bold: bool,
}

impl InlineText {
    /// Append `line` on a new line, after `prefix`.
    fn append_line(&mut self, prefix: &str, line: InlineText) {
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        self.text.push_str(prefix);
        let offset = self.text.len();
        self.text.push_str(&line.text);
        self.links.extend(line.links.into_iter().map(|mut link| {
            link.span = link.span.start + offset..link.span.end + offset;
            link
        }));
        self.images.extend(line.images);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImageRef {
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ListItem {
    pub ordered: bool,
    pub content: InlineText,
}

/// Closed set of block-level tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Heading { level: u8, content: InlineText },
    /// Items of a list in document order, nested lists flattened.
    List(Vec<ListItem>),
    Paragraph(InlineText),
    Fence { info: String, content: String },
    /// Quote content, one line per inner block.
    Quote(InlineText),
    Rule,
    /// Unsupported construct, named for diagnostics.
    Other(&'static str),
}

fn parser_options() -> Options {
    Options::ENABLE_MATH | Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH
}

/// Tokenize markdown into block-level tokens.
pub(crate) fn tokenize(markdown: &str) -> Vec<Token> {
    let mut tokenizer = Tokenizer::default();
    for event in Parser::new_ext(markdown, parser_options()) {
        tokenizer.process_event(event);
    }
    tokenizer.tokens
}

#[derive(Default)]
struct InlineBuffer {
    content: InlineText,
    /// Text offset and destination of each open link.
    open_links: Vec<(usize, String)>,
    image: Option<ImageRef>,
}

impl InlineBuffer {
    fn push_str(&mut self, text: &str) {
        match self.image.as_mut() {
            Some(image) => image.alt.push_str(text),
            None => self.content.text.push_str(text),
        }
    }

    fn start_strong(&mut self) {
        if self.content.text.trim().is_empty() && self.content.images.is_empty() {
            self.content.starts_bold = true;
        }
    }

    fn start_link(&mut self, dest: &str) {
        self.open_links
            .push((self.content.text.len(), dest.trim().to_owned()));
    }

    /// Record the finished link. Links without text show their URL.
    fn end_link(&mut self) {
        let Some((start, url)) = self.open_links.pop() else {
            return;
        };
        if self.content.text[start..].trim().is_empty() {
            self.content.text.push_str(&url);
        }
        let span = start..self.content.text.len();
        self.content.links.push(Link {
            text: self.content.text[span.clone()].trim().to_owned(),
            url,
            span,
        });
    }

    fn start_image(&mut self, src: &str) {
        self.image = Some(ImageRef {
            src: src.to_owned(),
            alt: String::new(),
        });
    }

    fn end_image(&mut self) {
        if let Some(image) = self.image.take() {
            self.content.images.push(image);
        }
    }

    /// Take the content with surrounding whitespace trimmed.
    fn finish(&mut self) -> InlineText {
        let mut content = std::mem::take(&mut self.content);
        let lead = content.text.len() - content.text.trim_start().len();
        content.text = content.text.trim().to_owned();
        let len = content.text.len();
        for link in &mut content.links {
            link.span = clamp(link.span.start, lead, len)..clamp(link.span.end, lead, len);
        }
        self.open_links.clear();
        self.image = None;
        content
    }
}

fn clamp(offset: usize, lead: usize, len: usize) -> usize {
    offset.saturating_sub(lead).min(len)
}

#[derive(Default)]
struct QuoteState {
    depth: usize,
    content: InlineText,
    current: InlineBuffer,
    /// Next number of each open list, `None` for bullet lists.
    lists: Vec<Option<u64>>,
    /// Marker for the first line of the current list item.
    marker: Option<String>,
}

impl QuoteState {
    /// End the current line of the quote.
    fn flush(&mut self) {
        let line = self.current.finish();
        if line.text.is_empty() && line.images.is_empty() {
            return;
        }
        let marker = self.marker.take().unwrap_or_default();
        self.content.append_line(&marker, line);
    }

    fn start_item(&mut self) {
        self.flush();
        self.marker = Some(match self.lists.last_mut() {
            Some(Some(number)) => {
                let marker = format!("{number}. ");
                *number += 1;
                marker
            }
            _ => "• ".to_owned(),
        });
    }
}

#[derive(Default)]
struct ListState {
    depth: usize,
    ordered: Vec<bool>,
    items: Vec<(bool, InlineBuffer)>,
    /// Indices into `items` of the currently open items.
    open: Vec<usize>,
}

#[derive(Default)]
struct CodeState {
    active: bool,
    info: String,
    buffer: String,
}

#[derive(Default)]
struct Tokenizer {
    tokens: Vec<Token>,
    quote: QuoteState,
    list: ListState,
    code: CodeState,
    heading: Option<(u8, InlineBuffer)>,
    paragraph: Option<InlineBuffer>,
    /// Nesting depth inside an unsupported container.
    skip: usize,
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

impl Tokenizer {
    fn in_container(&self) -> bool {
        self.quote.depth > 0 || self.list.depth > 0
    }

    /// Buffer receiving inline content in the current context.
    fn inline(&mut self) -> Option<&mut InlineBuffer> {
        if self.quote.depth > 0 {
            return Some(&mut self.quote.current);
        }
        if self.list.depth > 0 {
            let index = *self.list.open.last()?;
            return self.list.items.get_mut(index).map(|(_, buffer)| buffer);
        }
        if let Some((_, buffer)) = self.heading.as_mut() {
            return Some(buffer);
        }
        self.paragraph.as_mut()
    }

    fn push_inline(&mut self, text: &str) {
        if let Some(buffer) = self.inline() {
            buffer.push_str(text);
        }
    }

    /// Separate block-level content nested in a quote or list item.
    fn break_line(&mut self) {
        if self.quote.depth > 0 {
            self.quote.flush();
        } else if self.list.depth > 0 {
            self.push_inline("\n");
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        if self.skip > 0 {
            match event {
                Event::Start(_) => self.skip += 1,
                Event::End(_) => self.skip -= 1,
                _ => {}
            }
            return;
        }
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.push_inline(&code),
            Event::InlineMath(math) => self.push_inline(&format!("${math}$")),
            Event::DisplayMath(math) => self.push_inline(&format!("$${math}$$")),
            Event::Html(html) | Event::InlineHtml(html) => self.push_inline(&html),
            Event::SoftBreak | Event::HardBreak => self.text("\n"),
            Event::Rule => {
                if !self.in_container() {
                    self.tokens.push(Token::Rule);
                }
            }
            Event::TaskListMarker(checked) => {
                self.push_inline(if checked { "☑ " } else { "☐ " });
            }
            Event::FootnoteReference(_) => {}
        }
    }

    fn skip_container(&mut self, name: &'static str) {
        self.skip = 1;
        if !self.in_container() {
            self.tokens.push(Token::Other(name));
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if !self.in_container() {
                    self.paragraph = Some(InlineBuffer::default());
                }
            }
            Tag::Heading { level, .. } => {
                if self.in_container() {
                    self.break_line();
                    return;
                }
                self.heading = Some((heading_level(level), InlineBuffer::default()));
            }
            Tag::BlockQuote(_) => {
                if self.list.depth == 0 {
                    self.quote.flush();
                    self.quote.depth += 1;
                }
            }
            Tag::CodeBlock(kind) => {
                self.break_line();
                self.code.active = true;
                self.code.buffer.clear();
                self.code.info = match kind {
                    CodeBlockKind::Fenced(info) => info.trim().to_owned(),
                    CodeBlockKind::Indented => String::new(),
                };
            }
            Tag::List(start) => {
                if self.quote.depth > 0 {
                    self.quote.flush();
                    self.quote.lists.push(start);
                    return;
                }
                self.list.depth += 1;
                self.list.ordered.push(start.is_some());
            }
            Tag::Item => {
                if self.quote.depth > 0 {
                    self.quote.start_item();
                    return;
                }
                let ordered = self.list.ordered.last().copied().unwrap_or(false);
                self.list.open.push(self.list.items.len());
                self.list.items.push((ordered, InlineBuffer::default()));
            }
            Tag::Table(_) => self.skip_container("table"),
            Tag::HtmlBlock => self.skip_container("html"),
            Tag::FootnoteDefinition(_) => self.skip_container("footnote"),
            Tag::MetadataBlock(_) => self.skip_container("metadata"),
            Tag::DefinitionList => self.skip_container("definition list"),
            Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::TableHead
            | Tag::TableRow
            | Tag::TableCell
            | Tag::Emphasis
            | Tag::Strikethrough
            | Tag::Superscript
            | Tag::Subscript => {}
            Tag::Strong => {
                if let Some(buffer) = self.inline() {
                    buffer.start_strong();
                }
            }
            Tag::Link { dest_url, .. } => {
                if let Some(buffer) = self.inline() {
                    buffer.start_link(&dest_url);
                }
            }
            Tag::Image { dest_url, .. } => {
                if let Some(buffer) = self.inline() {
                    buffer.start_image(&dest_url);
                }
            }
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if self.in_container() {
                    self.break_line();
                } else if let Some(mut buffer) = self.paragraph.take() {
                    self.tokens.push(Token::Paragraph(buffer.finish()));
                }
            }
            TagEnd::Heading(_) => match self.heading.take() {
                Some((level, mut buffer)) => self.tokens.push(Token::Heading {
                    level,
                    content: buffer.finish(),
                }),
                None => self.break_line(),
            },
            TagEnd::BlockQuote(_) => {
                if self.quote.depth == 0 {
                    return;
                }
                self.quote.flush();
                self.quote.depth -= 1;
                if self.quote.depth == 0 {
                    let content = std::mem::take(&mut self.quote.content);
                    self.quote.lists.clear();
                    self.quote.marker = None;
                    self.tokens.push(Token::Quote(content));
                }
            }
            TagEnd::CodeBlock => self.end_code_block(),
            TagEnd::List(_) => {
                if self.quote.depth > 0 {
                    self.quote.lists.pop();
                    return;
                }
                if self.list.depth == 0 {
                    return;
                }
                self.list.depth -= 1;
                self.list.ordered.pop();
                if self.list.depth == 0 {
                    let items = std::mem::take(&mut self.list.items)
                        .into_iter()
                        .map(|(ordered, mut buffer)| ListItem {
                            ordered,
                            content: buffer.finish(),
                        })
                        .filter(|item| !item.content.text.is_empty())
                        .collect();
                    self.list.open.clear();
                    self.tokens.push(Token::List(items));
                }
            }
            TagEnd::Item => {
                if self.quote.depth > 0 {
                    self.quote.flush();
                } else if self.list.depth > 0 {
                    self.list.open.pop();
                }
            }
            TagEnd::Link => {
                if let Some(buffer) = self.inline() {
                    buffer.end_link();
                }
            }
            TagEnd::Image => {
                if let Some(buffer) = self.inline() {
                    buffer.end_image();
                }
            }
            TagEnd::Table
            | TagEnd::TableHead
            | TagEnd::TableRow
            | TagEnd::TableCell
            | TagEnd::HtmlBlock
            | TagEnd::FootnoteDefinition
            | TagEnd::MetadataBlock(_)
            | TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition
            | TagEnd::Emphasis
            | TagEnd::Strong
            | TagEnd::Strikethrough
            | TagEnd::Superscript
            | TagEnd::Subscript => {}
        }
    }

    fn end_code_block(&mut self) {
        self.code.active = false;
        let content = std::mem::take(&mut self.code.buffer);
        let info = std::mem::take(&mut self.code.info);
        let content = content.strip_suffix('\n').unwrap_or(&content).to_owned();
        if self.in_container() {
            self.push_inline(&content);
            self.break_line();
            return;
        }
        self.tokens.push(Token::Fence { info, content });
    }

    fn text(&mut self, text: &str) {
        if self.code.active {
            self.code.buffer.push_str(text);
        } else {
            self.push_inline(text);
        }
    }
}
