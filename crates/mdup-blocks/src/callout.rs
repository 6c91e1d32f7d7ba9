//! Type-tagged callouts (`> [!NOTE] Title`).

use std::sync::LazyLock;

use regex::Regex;

static CALLOUT_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[!([A-Za-z]+)\][+-]?[ \t]*(.*)$").unwrap());

/// Icon for callouts of an unknown type.
pub const DEFAULT_CALLOUT_ICON: &str = "📌";

/// Icon for a callout type, matched case-insensitively.
#[must_use]
pub fn callout_icon(kind: &str) -> &'static str {
    match kind.to_ascii_uppercase().as_str() {
        "NOTE" => "📝",
        "TIP" => "💡",
        "INFO" => "ℹ️",
        "TODO" => "☑️",
        "IMPORTANT" => "❗",
        "WARNING" | "CAUTION" => "⚠️",
        "ERROR" | "FAILURE" => "❌",
        "DANGER" => "🚨",
        "EXAMPLE" => "📋",
        "QUOTE" | "PROMPT" => "💬",
        "ABSTRACT" => "📄",
        "SUCCESS" => "✅",
        "QUESTION" => "❓",
        "BUG" => "🐛",
        "FAQ" => "❔",
        "RESULT" => "✨",
        _ => DEFAULT_CALLOUT_ICON,
    }
}

/// A parsed type-tagged callout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TypedCallout {
    pub icon: &'static str,
    /// Title line followed by the body lines.
    pub text: String,
}

/// Parse quote text whose first line is a `[!TYPE]` marker.
///
/// The title defaults to the type in title case.
pub(crate) fn parse_typed_callout(quote: &str) -> Option<TypedCallout> {
    let (first, body) = quote.split_once('\n').unwrap_or((quote, ""));
    let caps = CALLOUT_HEADER.captures(first.trim())?;
    let kind = &caps[1];
    let title = match caps[2].trim() {
        "" => title_case(kind),
        title => title.to_owned(),
    };
    let body = body.trim();
    let text = if body.is_empty() {
        title
    } else {
        format!("{title}\n{body}")
    };
    Some(TypedCallout {
        icon: callout_icon(kind),
        text,
    })
}

fn title_case(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
