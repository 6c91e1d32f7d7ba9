//! Code fence language tags.

/// Language used for fences without a tag or with a diagram tag.
pub const PLAIN_TEXT: &str = "plain text";

/// Normalize a code fence info string to a document store language name.
///
/// Only the first word of the info string counts. Aliases map to their
/// canonical names, diagram languages the store cannot highlight become
/// [`PLAIN_TEXT`], and anything else passes through lowercased.
#[must_use]
pub fn normalize_language(info: &str) -> String {
    let tag = info
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .trim_start_matches('{')
        .trim_end_matches('}')
        .to_lowercase();

    let canonical = match tag.as_str() {
        "" | "text" | "txt" | "plain" => PLAIN_TEXT,
        "sh" | "shell" | "zsh" | "console" => "bash",
        "js" | "jsx" | "mjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "py" | "python3" => "python",
        "rb" => "ruby",
        "rs" => "rust",
        "c++" | "cc" | "hpp" => "c++",
        "cs" | "c#" => "c#",
        "kt" | "kts" => "kotlin",
        "hs" => "haskell",
        "yml" => "yaml",
        "md" => "markdown",
        "tex" => "latex",
        "dockerfile" => "docker",
        "ps1" | "pwsh" => "powershell",
        "puml" | "plantuml" | "paul" | "gnuplot" | "mermaid" => PLAIN_TEXT,
        _ => return tag,
    };
    canonical.to_owned()
}

/// Info string tags that always mean a math expression.
pub(crate) fn is_math_tag(info: &str) -> bool {
    first_word(info) == "math"
}

/// Info string tags that suggest a math expression unless the content is a
/// full document.
pub(crate) fn is_latex_tag(info: &str) -> bool {
    matches!(first_word(info).as_str(), "latex" | "tex")
}

fn first_word(info: &str) -> String {
    info.split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase()
}
