//! `mdup --show-config` implementation.

use std::path::Path;

use mdup_config::{CliSettings, Config};

use crate::error::CliError;
use crate::output::Output;

/// Print where configuration came from and which values are set.
///
/// Secret values are never printed.
pub(crate) fn execute(config_path: Option<&Path>, settings: &CliSettings) -> Result<(), CliError> {
    let output = Output::new();
    let config = Config::load(config_path, Some(settings))?;

    output.highlight("Configuration");
    match &config.config_path {
        Some(path) => output.field("Loaded from", &path.display().to_string()),
        None => output.field("Loaded from", "(defaults, no mdup.toml found)"),
    }

    for (label, value) in summary_lines(&config) {
        output.field(&label, &value);
    }
    Ok(())
}

fn secret_source(inline: Option<&str>, file: Option<&Path>) -> String {
    match (inline.filter(|v| !v.trim().is_empty()), file) {
        (Some(_), _) => "set".to_owned(),
        (None, Some(path)) => format!("from {}", path.display()),
        (None, None) => "not set".to_owned(),
    }
}

/// Labelled config values, secrets reduced to where they come from.
fn summary_lines(config: &Config) -> Vec<(String, String)> {
    let notion = &config.notion;
    let limits = &config.limits;
    vec![
        (
            "notion.token".to_owned(),
            secret_source(notion.token.as_deref(), notion.token_file.as_deref()),
        ),
        (
            "notion.database_id".to_owned(),
            secret_source(notion.database_id.as_deref(), notion.database_id_file.as_deref()),
        ),
        ("notion.api_url".to_owned(), notion.api_url.clone()),
        ("notion.api_version".to_owned(), notion.api_version.clone()),
        ("notion.title_property".to_owned(), notion.title_property.clone()),
        ("notion.summary_property".to_owned(), notion.summary_property.clone()),
        (
            "limits.max_blocks_per_page".to_owned(),
            limits.max_blocks_per_page.to_string(),
        ),
        (
            "limits.max_rich_text_length".to_owned(),
            limits.max_rich_text_length.to_string(),
        ),
        (
            "limits.max_toggle_children".to_owned(),
            limits.max_toggle_children.to_string(),
        ),
        (
            "limits.max_summary_length".to_owned(),
            limits.max_summary_length.to_string(),
        ),
        (
            "limits.max_document_blocks".to_owned(),
            limits.max_document_blocks.to_string(),
        ),
        (
            "media.video_domains".to_owned(),
            config.media.video_domains.join(", "),
        ),
        (
            "images.imgbb_api_key".to_owned(),
            secret_source(config.images.imgbb_api_key.as_deref(), None),
        ),
        (
            "images.placeholder_url".to_owned(),
            config.images.placeholder_url.clone(),
        ),
        (
            "math.indicator_threshold".to_owned(),
            config.math.indicator_threshold.to_string(),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use pretty_assertions::assert_eq;

    fn value<'a>(lines: &'a [(String, String)], label: &str) -> &'a str {
        lines
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
            .unwrap()
    }

    #[test]
    fn test_secrets_never_printed() {
        let mut config = Config::default();
        config.notion.token = Some("secret_abc".to_owned());
        config.notion.database_id_file = Some(PathBuf::from("/home/u/.config/id"));
        config.images.imgbb_api_key = Some("imgbb-secret".to_owned());

        let lines = summary_lines(&config);

        assert_eq!(value(&lines, "notion.token"), "set");
        assert_eq!(value(&lines, "notion.database_id"), "from /home/u/.config/id");
        assert_eq!(value(&lines, "images.imgbb_api_key"), "set");
        assert!(lines.iter().all(|(_, v)| !v.contains("secret")));
    }

    #[test]
    fn test_defaults() {
        let lines = summary_lines(&Config::default());

        assert_eq!(value(&lines, "notion.token"), "not set");
        assert_eq!(value(&lines, "limits.max_blocks_per_page"), "100");
        assert_eq!(value(&lines, "media.video_domains"), "youtube.com, youtu.be, vimeo.com");
    }
}
