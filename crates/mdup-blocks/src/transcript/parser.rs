//! Line-indexed state machine splitting a transcript into records.

use std::sync::LazyLock;

use regex::Regex;

use super::markers::{self, Vocabulary};
use crate::text::FenceTracker;

/// Level-1 heading or thematic break ending a result section.
static SECTION_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:#[ \t].*|[ \t]{0,3}(?:(?:-[ \t]*){3,}|(?:\*[ \t]*){3,}|(?:_[ \t]*){3,}))$")
        .unwrap()
});

static CALLOUT_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[![A-Za-z]+\]").unwrap());

/// One execution record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptRecord {
    /// Header heading text without the `##` marker.
    pub header: String,
    pub execution_time: String,
    /// Metadata lines with bold markers removed.
    pub metadata: Vec<String>,
    /// Prompt heading text as written, when present.
    pub prompt_heading: Option<String>,
    /// Prompt text with quote markers and the callout marker removed.
    pub prompt: String,
    /// Result heading text as written, when present.
    pub result_heading: Option<String>,
    /// Result markdown with surrounding blank lines removed.
    pub result: String,
    pub vocabulary: Vocabulary,
}

/// A piece of a transcript document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Markdown outside any record.
    Markdown(String),
    Record(TranscriptRecord),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    SeekingHeader,
    InMetadata,
    InPrompt,
    InResult,
}

/// Split a transcript body into records and surrounding markdown.
#[must_use]
pub fn parse(body: &str) -> Vec<Segment> {
    let mut parser = Parser::new();
    for line in body.lines() {
        parser.feed(line);
    }
    parser.finish()
}

struct Parser {
    state: State,
    fence: FenceTracker,
    segments: Vec<Segment>,
    markdown: String,
    record: Option<RecordBuilder>,
}

struct RecordBuilder {
    header: String,
    execution_time: String,
    metadata: Vec<String>,
    prompt_heading: Option<String>,
    prompt: String,
    result_heading: Option<String>,
    result: String,
}

impl Parser {
    fn new() -> Self {
        Self {
            state: State::SeekingHeader,
            fence: FenceTracker::default(),
            segments: Vec::new(),
            markdown: String::new(),
            record: None,
        }
    }

    fn feed(&mut self, line: &str) {
        // Structural lines only count outside fenced code.
        let outside = !self.fence.update(line);

        if outside && let Some(caps) = markers::EXECUTION_HEADER.captures(line) {
            let execution_time = caps[1].to_owned();
            self.start_record(line, execution_time);
            return;
        }

        match self.state {
            State::SeekingHeader => push_line(&mut self.markdown, line),
            State::InMetadata => self.feed_metadata(line, outside),
            State::InPrompt => {
                if outside && markers::RESULT_HEADING.is_match(line) {
                    self.enter_result(line);
                } else if outside && SECTION_BOUNDARY.is_match(line) {
                    self.end_record(line);
                } else if let Some(record) = self.record.as_mut() {
                    push_line(&mut record.prompt, line);
                }
            }
            State::InResult => {
                if outside && SECTION_BOUNDARY.is_match(line) {
                    self.end_record(line);
                } else if let Some(record) = self.record.as_mut() {
                    push_line(&mut record.result, line);
                }
            }
        }
    }

    fn feed_metadata(&mut self, line: &str, outside: bool) {
        if !outside {
            self.state = State::InPrompt;
            if let Some(record) = self.record.as_mut() {
                push_line(&mut record.prompt, line);
            }
            return;
        }
        if markers::PROMPT_HEADING.is_match(line) {
            self.state = State::InPrompt;
            if let Some(record) = self.record.as_mut() {
                record.prompt_heading = Some(heading_text(line));
            }
        } else if markers::RESULT_HEADING.is_match(line) {
            self.enter_result(line);
        } else if SECTION_BOUNDARY.is_match(line) {
            self.end_record(line);
        } else if markers::LABEL_LINE.is_match(line) {
            if let Some(record) = self.record.as_mut() {
                record.metadata.push(clean_label_line(line));
            }
        } else if !line.trim().is_empty() {
            // Unlabelled text ends the metadata block.
            self.state = State::InPrompt;
            if let Some(record) = self.record.as_mut() {
                push_line(&mut record.prompt, line);
            }
        }
    }

    fn start_record(&mut self, line: &str, execution_time: String) {
        self.close_record();
        if !self.markdown.trim().is_empty() {
            self.segments
                .push(Segment::Markdown(std::mem::take(&mut self.markdown)));
        }
        self.markdown.clear();
        self.record = Some(RecordBuilder {
            header: heading_text(line),
            execution_time,
            metadata: Vec::new(),
            prompt_heading: None,
            prompt: String::new(),
            result_heading: None,
            result: String::new(),
        });
        self.state = State::InMetadata;
    }

    fn enter_result(&mut self, line: &str) {
        self.state = State::InResult;
        if let Some(record) = self.record.as_mut() {
            record.result_heading = Some(heading_text(line));
        }
    }

    /// Close the current record at a boundary line, which stays in the
    /// surrounding markdown.
    fn end_record(&mut self, line: &str) {
        self.close_record();
        self.state = State::SeekingHeader;
        push_line(&mut self.markdown, line);
    }

    fn close_record(&mut self) {
        if let Some(builder) = self.record.take() {
            self.segments.push(Segment::Record(builder.build()));
        }
    }

    fn finish(mut self) -> Vec<Segment> {
        self.close_record();
        if !self.markdown.trim().is_empty() {
            self.segments.push(Segment::Markdown(self.markdown));
        }
        self.segments
    }
}

impl RecordBuilder {
    fn build(self) -> TranscriptRecord {
        TranscriptRecord {
            vocabulary: Vocabulary::of_header(&self.header),
            header: self.header,
            execution_time: self.execution_time,
            metadata: self.metadata,
            prompt_heading: self.prompt_heading,
            prompt: clean_prompt(&self.prompt),
            result_heading: self.result_heading,
            result: trim_blank_lines(&self.result).to_owned(),
        }
    }
}

fn push_line(buffer: &mut String, line: &str) {
    buffer.push_str(line);
    buffer.push('\n');
}

fn heading_text(line: &str) -> String {
    line.trim_start().trim_start_matches('#').trim().to_owned()
}

/// `- **接続先:** host` becomes `接続先: host`.
fn clean_label_line(line: &str) -> String {
    let trimmed = line.trim();
    let trimmed = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
        .or_else(|| trimmed.strip_prefix("+ "))
        .unwrap_or(trimmed);
    trimmed.replace("**", "").trim().to_owned()
}

/// Strip quote markers, then drop a leading `[!TYPE]` marker line together
/// with the bold label line right after it.
fn clean_prompt(raw: &str) -> String {
    let lines: Vec<&str> = raw
        .lines()
        .map(|line| {
            let line = line.trim_start();
            match line.strip_prefix('>') {
                Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
                None => line,
            }
        })
        .collect();

    let mut start = lines
        .iter()
        .position(|line| !line.trim().is_empty())
        .unwrap_or(lines.len());
    if lines
        .get(start)
        .is_some_and(|line| CALLOUT_MARKER.is_match(line.trim()))
    {
        start += 1;
        if lines
            .get(start)
            .is_some_and(|line| line.trim_start().starts_with("**"))
        {
            start += 1;
        }
    }

    trim_blank_lines(&lines[start..].join("\n")).to_owned()
}

/// Remove leading and trailing blank lines, keeping inner indentation.
fn trim_blank_lines(text: &str) -> &str {
    let start = text
        .char_indices()
        .find(|&(_, c)| !c.is_whitespace())
        .map_or(text.len(), |(i, _)| text[..i].rfind('\n').map_or(0, |nl| nl + 1));
    text[start..].trim_end()
}
