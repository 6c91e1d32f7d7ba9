//! Execution transcript convention.
//!
//! A transcript records an automated run: an execution header with a
//! timestamp, bold-labelled metadata lines, a prompt section and a result
//! section. [`is_transcript`] decides whether a body follows the convention
//! and [`parse`] splits it into records and surrounding markdown.

pub(crate) mod markers;
mod parser;

pub use markers::Vocabulary;
pub use parser::{Segment, TranscriptRecord, parse};

use crate::text::FenceTracker;

/// Signals required before a body is treated as a transcript.
pub const TRANSCRIPT_SIGNAL_THRESHOLD: usize = 3;

/// Count the distinct transcript signals present in a body.
///
/// The signals are the execution header, the connection host label, the
/// prompt file label, the prompt heading and the result heading. Lines in
/// fenced code blocks are not searched.
#[must_use]
pub fn signal_count(body: &str) -> usize {
    let mut fence = FenceTracker::default();
    let searched: String = body
        .split_inclusive('\n')
        .filter(|line| !fence.update(line))
        .collect();
    [
        &*markers::EXECUTION_HEADER,
        &*markers::CONNECTION_HOST,
        &*markers::PROMPT_FILE,
        &*markers::PROMPT_HEADING,
        &*markers::RESULT_HEADING,
    ]
    .into_iter()
    .filter(|pattern| pattern.is_match(&searched))
    .count()
}

#[must_use]
pub fn is_transcript(body: &str) -> bool {
    signal_count(body) >= TRANSCRIPT_SIGNAL_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "## 実行記録: 2025-08-16 02:53:52\n\
        **接続先:** host01\n\
        **プロンプトファイル:** daily.md\n\n\
        ### 💬 プロンプト\n> hello\n\n\
        ### ✨ 結果\nworld\n";

    #[test]
    fn test_signal_count_full() {
        assert_eq!(signal_count(FULL), 5);
        assert!(is_transcript(FULL));
    }

    #[test]
    fn test_two_signals_is_not_transcript() {
        let body = "## 実行記録: 2025-08-16 02:53:52\n**接続先:** host01\n\nJust notes.";
        assert_eq!(signal_count(body), 2);
        assert!(!is_transcript(body));
    }

    #[test]
    fn test_signals_in_code_fence_ignored() {
        let body = format!("# Usage\n\nAn example record:\n\n```markdown\n{FULL}```\n");
        assert_eq!(signal_count(&body), 0);
        assert!(!is_transcript(&body));
    }

    #[test]
    fn test_three_signals_is_transcript() {
        let body = "## Execution Record: 2025-08-16 02:53:52\n\n### Prompt\nhi\n\n### Result\nok";
        assert_eq!(signal_count(body), 3);
        assert!(is_transcript(body));
    }
}
