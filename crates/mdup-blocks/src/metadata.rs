//! Front matter and transcript metadata extraction.
//!
//! A document may start with a `---` delimited header of `key: value` lines.
//! The body is additionally mined for execution transcript labels; keys found
//! there are only added when the header did not already set them.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::DocumentError;
use crate::transcript::markers;

/// Key for the execution timestamp mined from a transcript header.
pub const KEY_EXECUTION_TIME: &str = "execution_time";
/// Key for the connection host mined from a transcript label.
pub const KEY_CONNECTION_HOST: &str = "connection_host";
/// Key for the prompt file mined from a transcript label.
pub const KEY_PROMPT_FILE: &str = "prompt_file";

static FRONT_MATTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A---[ \t]*\r?\n(.*?)\r?\n---[ \t]*(?:\r?\n|\z)(.*)\z").unwrap()
});

/// Ordered key/value mapping with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<(String, String)>,
}

impl Metadata {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set a value, replacing an existing entry in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Add a value only when the key is not present yet.
    ///
    /// Returns whether the value was added.
    pub fn insert_if_absent(&mut self, key: &str, value: impl Into<String>) -> bool {
        if self.get(key).is_some() {
            return false;
        }
        self.entries.push((key.to_owned(), value.into()));
        true
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A document split into metadata and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    pub metadata: Metadata,
    pub body: String,
}

/// Read and split a document from disk.
pub fn read_document(path: &Path) -> Result<ParsedDocument, DocumentError> {
    let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_document(&text))
}

/// Split front matter and mine transcript metadata from the body.
#[must_use]
pub fn parse_document(text: &str) -> ParsedDocument {
    let (mut metadata, body) = split_front_matter(text);
    mine_transcript_metadata(&body, &mut metadata);
    ParsedDocument { metadata, body }
}

/// Split a leading `---` header from the body.
///
/// Without a header the metadata is empty and the body is the input verbatim.
#[must_use]
pub fn split_front_matter(text: &str) -> (Metadata, String) {
    let Some(caps) = FRONT_MATTER.captures(text) else {
        return (Metadata::default(), text.to_owned());
    };

    let mut metadata = Metadata::default();
    for line in caps[1].lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        metadata.insert(key, unquote(value.trim()));
    }

    (metadata, caps[2].to_owned())
}

/// Strip one pair of matching surrounding quotes.
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn mine_transcript_metadata(body: &str, metadata: &mut Metadata) {
    let mined = [
        (KEY_EXECUTION_TIME, &*markers::EXECUTION_HEADER),
        (KEY_CONNECTION_HOST, &*markers::CONNECTION_HOST),
        (KEY_PROMPT_FILE, &*markers::PROMPT_FILE),
    ];
    for (key, pattern) in mined {
        let Some(value) = pattern
            .captures(body)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|v| !v.is_empty())
        else {
            continue;
        };
        if !metadata.insert_if_absent(key, value) {
            tracing::debug!(key, "Front matter already sets transcript key, keeping it");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_front_matter() {
        let text = "---\ntitle: Hello\nauthor: Jo: Smith\n---\n# Body\n";
        let (metadata, body) = split_front_matter(text);

        assert_eq!(metadata.get("title"), Some("Hello"));
        assert_eq!(metadata.get("author"), Some("Jo: Smith"));
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn test_split_without_front_matter_is_verbatim() {
        let text = "# Title\n\n---\nkey: value\n---\n";
        let (metadata, body) = split_front_matter(text);

        assert!(metadata.is_empty());
        assert_eq!(body, text);
    }

    #[test]
    fn test_split_unterminated_header_is_verbatim() {
        let text = "---\ntitle: Hello\nno closing delimiter";
        let (metadata, body) = split_front_matter(text);

        assert!(metadata.is_empty());
        assert_eq!(body, text);
    }

    #[test]
    fn test_split_header_at_end_of_file() {
        let (metadata, body) = split_front_matter("---\ntitle: Only\n---");

        assert_eq!(metadata.get("title"), Some("Only"));
        assert_eq!(body, "");
    }

    #[test]
    fn test_split_strips_quotes_and_skips_junk() {
        let text = "---\ntitle: \"Quoted\"\njust text\n: no key\n---\nbody";
        let (metadata, _) = split_front_matter(text);

        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata.get("title"), Some("Quoted"));
    }

    #[test]
    fn test_parse_document_mines_transcript_keys() {
        let text = "## 実行記録: 2025-08-16 02:53:52\n\n**接続先:** host01 (ssh)\n**プロンプトファイル:** prompts/daily.md\n";
        let doc = parse_document(text);

        assert_eq!(
            doc.metadata.get(KEY_EXECUTION_TIME),
            Some("2025-08-16 02:53:52")
        );
        assert_eq!(doc.metadata.get(KEY_CONNECTION_HOST), Some("host01"));
        assert_eq!(doc.metadata.get(KEY_PROMPT_FILE), Some("prompts/daily.md"));
    }

    #[test]
    fn test_parse_document_english_labels() {
        let text = "## Execution Record: 2025-01-02 03:04:05\n**Connection Host:** web-1\n";
        let doc = parse_document(text);

        assert_eq!(
            doc.metadata.get(KEY_EXECUTION_TIME),
            Some("2025-01-02 03:04:05")
        );
        assert_eq!(doc.metadata.get(KEY_CONNECTION_HOST), Some("web-1"));
        assert_eq!(doc.metadata.get(KEY_PROMPT_FILE), None);
    }

    #[test]
    fn test_front_matter_wins_over_mined_keys() {
        let text = "---\nconnection_host: configured\n---\n**接続先:** mined\n";
        let doc = parse_document(text);

        assert_eq!(doc.metadata.get(KEY_CONNECTION_HOST), Some("configured"));
    }

    #[test]
    fn test_metadata_insert_keeps_order() {
        let mut metadata = Metadata::default();
        metadata.insert("b", "1");
        metadata.insert("a", "2");
        metadata.insert("b", "3");

        let entries: Vec<_> = metadata.iter().collect();
        assert_eq!(entries, vec![("b", "3"), ("a", "2")]);
        assert!(!metadata.insert_if_absent("a", "4"));
        assert_eq!(metadata.get("a"), Some("2"));
    }

    #[test]
    fn test_read_document_missing_file() {
        let err = read_document(Path::new("/nonexistent/doc.md")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/doc.md"));
    }

    #[test]
    fn test_read_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "---\ntitle: T\n---\nBody").unwrap();

        let doc = read_document(&path).unwrap();

        assert_eq!(doc.metadata.get("title"), Some("T"));
        assert_eq!(doc.body, "Body");
    }
}
