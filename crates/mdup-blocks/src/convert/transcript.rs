//! Transcript conversion: records become heading, metadata, prompt callout
//! and a collapsible result.

use super::standard::{Nesting, PROMPT_ICON};
use super::{ConversionContext, Converter};
use crate::block::{Block, Color};
use crate::text::strip_links;
use crate::transcript::{self, Segment, TranscriptRecord};

impl Converter<'_> {
    pub(super) fn convert_transcript(&self, ctx: &mut ConversionContext, body: &str) -> Vec<Block> {
        let mut blocks = Vec::new();
        for segment in transcript::parse(body) {
            match segment {
                Segment::Markdown(text) => {
                    blocks.extend(self.convert_standard(ctx, &text, Nesting::TopLevel));
                }
                Segment::Record(record) => self.record_blocks(ctx, &record, &mut blocks),
            }
        }
        blocks
    }

    fn record_blocks(
        &self,
        ctx: &mut ConversionContext,
        record: &TranscriptRecord,
        out: &mut Vec<Block>,
    ) {
        let vocabulary = record.vocabulary;
        tracing::debug!(time = %record.execution_time, "Converting transcript record");

        out.push(Block::heading(2, record.header.as_str(), false));
        for line in &record.metadata {
            self.push_text(&strip_links(line), out, |piece| {
                Block::bulleted(piece, Some(Color::GrayBackground))
            });
        }

        let prompt_heading = record
            .prompt_heading
            .as_deref()
            .unwrap_or(vocabulary.prompt_heading());
        out.push(Block::heading(3, prompt_heading, false));
        self.push_text(&strip_links(&record.prompt), out, |piece| {
            Block::callout(piece, PROMPT_ICON, Some(Color::BlueBackground))
        });

        let result_heading = record
            .result_heading
            .as_deref()
            .unwrap_or(vocabulary.result_heading());
        out.push(Block::heading(3, result_heading, false));
        let children = self.convert_standard(ctx, &record.result, Nesting::InContainer);
        out.push(Block::toggle(vocabulary.result_toggle_label(), children));
    }
}
