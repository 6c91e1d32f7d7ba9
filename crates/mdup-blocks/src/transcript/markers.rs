//! Label patterns of the execution transcript convention.
//!
//! Both the Japanese labels and their English equivalents are accepted.
//! Headings may carry a decorative leading emoji.

use std::sync::LazyLock;

use regex::Regex;

/// `## 実行記録: 2025-08-16 02:53:52`, capturing the timestamp.
pub(crate) static EXECUTION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^##[ \t]+(?:📊[ \t]*)?(?:実行記録|Execution Record)[ \t]*[:：][ \t]*(\d{4}-\d{2}-\d{2}[ T]\d{2}:\d{2}:\d{2})",
    )
    .unwrap()
});

/// `**接続先:** host`, capturing the host.
pub(crate) static CONNECTION_HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*(?:接続先|Connection Host)(?:[:：]\*\*|\*\*[:：])[ \t]*(\S+)").unwrap()
});

/// `**プロンプトファイル:** path`, capturing the rest of the line.
pub(crate) static PROMPT_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*(?:プロンプトファイル|Prompt File)(?:[:：]\*\*|\*\*[:：])[ \t]*([^\n]*)").unwrap()
});

pub(crate) static PROMPT_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^#{2,4}[ \t]+(?:💬[ \t]*)?(?:プロンプト|Prompt)[ \t]*$").unwrap()
});

pub(crate) static RESULT_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^#{2,4}[ \t]+(?:✨[ \t]*)?(?:結果|Result)[ \t]*$").unwrap()
});

/// A bold `**label:**` line, optionally written as a list item.
pub(crate) static LABEL_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*(?:[-*+][ \t]+)?\*\*[^*\n]+\*\*").unwrap());

/// Heading texts that mark transcript sections in standard documents.
const SECTION_MARKERS: &[&str] = &[
    "📊 実行記録:",
    "💬 プロンプト",
    "✨ 結果",
    "📊 Execution Record:",
    "💬 Prompt",
    "✨ Result",
];

/// Whether a heading text names a transcript section.
pub(crate) fn is_section_heading(text: &str) -> bool {
    SECTION_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Label language of a transcript record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vocabulary {
    Japanese,
    English,
}

impl Vocabulary {
    pub(crate) fn of_header(header: &str) -> Self {
        if header.contains("実行記録") {
            Self::Japanese
        } else {
            Self::English
        }
    }

    /// Label of the collapsible result container.
    pub(crate) fn result_toggle_label(self) -> &'static str {
        match self {
            Self::Japanese => "結果を表示",
            Self::English => "Show result",
        }
    }

    pub(crate) fn prompt_heading(self) -> &'static str {
        match self {
            Self::Japanese => "💬 プロンプト",
            Self::English => "💬 Prompt",
        }
    }

    pub(crate) fn result_heading(self) -> &'static str {
        match self {
            Self::Japanese => "✨ 結果",
            Self::English => "✨ Result",
        }
    }

    /// Labels of the page summary parts: host, prompt file, prompt, result.
    pub(crate) fn summary_labels(self) -> [&'static str; 4] {
        match self {
            Self::Japanese => ["接続先", "プロンプトファイル", "プロンプト", "結果"],
            Self::English => ["Connection Host", "Prompt File", "Prompt", "Result"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_header_variants() {
        for line in [
            "## 実行記録: 2025-08-16 02:53:52",
            "## 📊 実行記録: 2025-08-16 02:53:52",
            "## Execution Record: 2025-08-16T02:53:52",
        ] {
            assert!(EXECUTION_HEADER.is_match(line), "{line}");
        }
        assert!(!EXECUTION_HEADER.is_match("### 実行記録: 2025-08-16 02:53:52"));
        assert!(!EXECUTION_HEADER.is_match("## 実行記録: yesterday"));
    }

    #[test]
    fn test_label_patterns() {
        assert_eq!(&CONNECTION_HOST.captures("**接続先:** db-1 extra").unwrap()[1], "db-1");
        assert_eq!(
            &CONNECTION_HOST.captures("**Connection Host**: web").unwrap()[1],
            "web"
        );
        assert_eq!(
            PROMPT_FILE.captures("**Prompt File:** a b.md").unwrap()[1].trim(),
            "a b.md"
        );
    }

    #[test]
    fn test_section_headings() {
        assert!(PROMPT_HEADING.is_match("### 💬 プロンプト"));
        assert!(PROMPT_HEADING.is_match("### Prompt"));
        assert!(!PROMPT_HEADING.is_match("### Prompt engineering"));
        assert!(RESULT_HEADING.is_match("### ✨ 結果"));
        assert!(RESULT_HEADING.is_match("## Result"));
        assert!(is_section_heading("💬 Prompt"));
        assert!(!is_section_heading("Prompt"));
    }

    #[test]
    fn test_label_line() {
        assert!(LABEL_LINE.is_match("**接続先:** host"));
        assert!(LABEL_LINE.is_match("- **Status:** ok"));
        assert!(!LABEL_LINE.is_match("plain text"));
    }
}
