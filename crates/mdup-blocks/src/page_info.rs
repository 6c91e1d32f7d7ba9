//! Page title and summary derivation.

use crate::metadata::{KEY_CONNECTION_HOST, KEY_EXECUTION_TIME, KEY_PROMPT_FILE, ParsedDocument};
use crate::text::preview;
use crate::transcript::{self, Segment, TranscriptRecord, Vocabulary};

const TITLE_PREFIX: &str = "Execution record";
const TITLE_PREVIEW_CHARS: usize = 30;
const SUMMARY_PREVIEW_CHARS: usize = 80;
const SUMMARY_SEPARATOR: &str = " | ";

/// Title and summary of the page created for a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    pub title: String,
    /// May be empty.
    pub summary: String,
}

/// Derive page info from a parsed document.
///
/// `fallback_title` is used when nothing in the document names it,
/// typically the file stem.
#[must_use]
pub fn derive_page_info(doc: &ParsedDocument, fallback_title: &str) -> PageInfo {
    let metadata_title = doc
        .metadata
        .get("title")
        .filter(|title| !title.trim().is_empty());

    if !transcript::is_transcript(&doc.body) {
        let summary = doc
            .metadata
            .get("abstract")
            .or_else(|| doc.metadata.get("summary"))
            .unwrap_or_default();
        return PageInfo {
            title: metadata_title.unwrap_or(fallback_title).to_owned(),
            summary: summary.to_owned(),
        };
    }

    let record = first_record(&doc.body);
    let execution_time = doc
        .metadata
        .get(KEY_EXECUTION_TIME)
        .or_else(|| record.as_ref().map(|r| r.execution_time.as_str()))
        .filter(|time| !time.is_empty());
    let prompt = record
        .as_ref()
        .map(|r| preview(&r.prompt, TITLE_PREVIEW_CHARS))
        .unwrap_or_default();

    let title = match execution_time {
        Some(time) if !prompt.is_empty() => format!("{TITLE_PREFIX} - {prompt} ({time})"),
        Some(time) => format!("{TITLE_PREFIX} - {time}"),
        None => metadata_title.unwrap_or(fallback_title).to_owned(),
    };

    PageInfo {
        title,
        summary: transcript_summary(doc, record.as_ref()),
    }
}

fn first_record(body: &str) -> Option<TranscriptRecord> {
    transcript::parse(body)
        .into_iter()
        .find_map(|segment| match segment {
            Segment::Record(record) => Some(record),
            Segment::Markdown(_) => None,
        })
}

fn transcript_summary(doc: &ParsedDocument, record: Option<&TranscriptRecord>) -> String {
    let vocabulary = record.map_or(Vocabulary::English, |r| r.vocabulary);
    let [host_label, file_label, prompt_label, result_label] = vocabulary.summary_labels();

    let mut parts = Vec::new();
    if let Some(host) = doc.metadata.get(KEY_CONNECTION_HOST) {
        parts.push(format!("{host_label}: {host}"));
    }
    if let Some(file) = doc.metadata.get(KEY_PROMPT_FILE) {
        parts.push(format!("{file_label}: {file}"));
    }
    if let Some(record) = record {
        let prompt = preview(&record.prompt, SUMMARY_PREVIEW_CHARS);
        if !prompt.is_empty() {
            parts.push(format!("{prompt_label}: {prompt}"));
        }
        let result = preview(&record.result.replace(['#', '>'], " "), SUMMARY_PREVIEW_CHARS);
        if !result.is_empty() {
            parts.push(format!("{result_label}: {result}"));
        }
    }
    parts.join(SUMMARY_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::parse_document;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_standard_document() {
        let doc = parse_document("---\ntitle: Release notes\nabstract: What changed\n---\nBody\n");

        let info = derive_page_info(&doc, "notes");

        assert_eq!(
            info,
            PageInfo {
                title: "Release notes".to_owned(),
                summary: "What changed".to_owned(),
            }
        );
    }

    #[test]
    fn test_standard_document_fallbacks() {
        let doc = parse_document("---\nsummary: Short\n---\nBody\n");
        assert_eq!(derive_page_info(&doc, "file-stem").title, "file-stem");
        assert_eq!(derive_page_info(&doc, "file-stem").summary, "Short");

        let doc = parse_document("Just text");
        assert_eq!(
            derive_page_info(&doc, "plain"),
            PageInfo {
                title: "plain".to_owned(),
                summary: String::new(),
            }
        );
    }

    #[test]
    fn test_transcript_document() {
        let body = "\
## 📊 実行記録: 2025-08-16 02:53:52
**接続先:** host01
**プロンプトファイル:** daily.md
### 💬 プロンプト
> Summarize all of the server logs from today please
### ✨ 結果
## Summary
Everything is fine.
";
        let doc = parse_document(body);

        let info = derive_page_info(&doc, "log");

        assert_eq!(
            info.title,
            "Execution record - Summarize all of the server lo... (2025-08-16 02:53:52)"
        );
        assert_eq!(
            info.summary,
            "接続先: host01 | プロンプトファイル: daily.md | \
             プロンプト: Summarize all of the server logs from today please | \
             結果: Summary Everything is fine."
        );
    }

    #[test]
    fn test_transcript_without_prompt_uses_time() {
        let body = "\
## Execution Record: 2025-01-01 10:00:00
**Connection Host:** box
### Result
ok
";
        let doc = parse_document(body);

        let info = derive_page_info(&doc, "run");

        assert_eq!(info.title, "Execution record - 2025-01-01 10:00:00");
        assert_eq!(info.summary, "Connection Host: box | Result: ok");
    }
}
