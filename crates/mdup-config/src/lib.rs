//! Configuration management for mdup.
//!
//! Parses `mdup.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `notion.token`
//! - `notion.database_id`
//! - `notion.api_url`
//! - `images.imgbb_api_key`
//! - `images.placeholder_url`
//!
//! The `notion.token_file` and `notion.database_id_file` paths additionally
//! support a leading `~`.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Maximum number of child blocks the document store accepts in one request.
pub const MAX_CHILDREN_PER_REQUEST: usize = 100;

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "mdup.toml";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override target database ID.
    pub database_id: Option<String>,
    /// Override maximum top-level blocks per page.
    pub max_blocks_per_page: Option<usize>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Document store connection settings.
    pub notion: NotionConfig,
    /// Size limits applied during conversion and upload.
    pub limits: LimitsConfig,
    /// Link classification settings.
    pub media: MediaConfig,
    /// Image hosting settings.
    pub images: ImagesConfig,
    /// Math-versus-code heuristics.
    pub math: MathConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Notion connection configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NotionConfig {
    /// Integration token.
    pub token: Option<String>,
    /// File holding the integration token (used when `token` is unset).
    pub token_file: Option<PathBuf>,
    /// Target database ID for main pages.
    pub database_id: Option<String>,
    /// File holding the database ID (used when `database_id` is unset).
    pub database_id_file: Option<PathBuf>,
    /// API base URL.
    pub api_url: String,
    /// Value sent in the `Notion-Version` header.
    pub api_version: String,
    /// Database property receiving the page title.
    pub title_property: String,
    /// Database property receiving the page summary.
    pub summary_property: String,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            token: None,
            token_file: None,
            database_id: None,
            database_id_file: None,
            api_url: "https://api.notion.com".to_owned(),
            api_version: "2022-06-28".to_owned(),
            title_property: "Title".to_owned(),
            summary_property: "Memo".to_owned(),
        }
    }
}

/// Resolved credentials for talking to the document store.
#[derive(Debug, Clone)]
pub struct NotionCredentials {
    /// Integration token.
    pub token: String,
    /// Target database ID.
    pub database_id: String,
}

/// Size limits.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum top-level blocks on one page.
    pub max_blocks_per_page: usize,
    /// Maximum characters in one rich text span.
    pub max_rich_text_length: usize,
    /// Maximum children inside a collapsible container.
    pub max_toggle_children: usize,
    /// Maximum characters in a page summary.
    pub max_summary_length: usize,
    /// Maximum top-level blocks produced by one conversion run.
    pub max_document_blocks: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_blocks_per_page: 100,
            max_rich_text_length: 2000,
            max_toggle_children: 50,
            max_summary_length: 1000,
            max_document_blocks: 1000,
        }
    }
}

/// Link classification configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Hosts whose links become embeds instead of bookmarks.
    pub video_domains: Vec<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            video_domains: vec![
                "youtube.com".to_owned(),
                "youtu.be".to_owned(),
                "vimeo.com".to_owned(),
            ],
        }
    }
}

/// Image hosting configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// `ImgBB` API key. Local images are not uploaded when unset.
    pub imgbb_api_key: Option<String>,
    /// URL substituted when an image cannot be hosted.
    pub placeholder_url: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            imgbb_api_key: None,
            placeholder_url: "https://via.placeholder.com/600x400?text=Image+Upload+Failed"
                .to_owned(),
        }
    }
}

/// Math detection configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MathConfig {
    /// Distinct indicator count at which a code fence is treated as math.
    pub indicator_threshold: usize,
}

impl Default for MathConfig {
    fn default() -> Self {
        Self {
            indicator_threshold: 3,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`notion.token`").
        field: String,
        /// Error message (e.g., "${`NOTION_TOKEN`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

fn require_positive(value: usize, field: &str) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Validation(format!(
            "{field} must be greater than 0"
        )));
    }
    Ok(())
}

fn require_at_most(value: usize, max: usize, field: &str) -> Result<(), ConfigError> {
    if value > max {
        return Err(ConfigError::Validation(format!(
            "{field} cannot exceed {max}"
        )));
    }
    Ok(())
}

/// Read a secret from an inline value or a file, preferring the inline value.
fn read_secret(
    inline: Option<&str>,
    file: Option<&Path>,
    field: &str,
) -> Result<String, ConfigError> {
    if let Some(value) = inline.filter(|v| !v.trim().is_empty()) {
        return Ok(value.trim().to_owned());
    }
    let Some(path) = file else {
        return Err(ConfigError::Validation(format!(
            "notion.{field} or notion.{field}_file is required"
        )));
    };
    let content = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::Validation(format!(
            "cannot read notion.{field}_file {}: {e}",
            path.display()
        ))
    })?;
    let value = content.trim().to_owned();
    require_non_empty(&value, &format!("notion.{field}_file"))?;
    Ok(value)
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdup.toml` in current directory and parents.
    /// CLI settings take precedence over config file values and the merged
    /// result is validated.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the merged configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(database_id) = &settings.database_id {
            self.notion.database_id = Some(database_id.clone());
        }
        if let Some(max_blocks) = settings.max_blocks_per_page {
            self.limits.max_blocks_per_page = max_blocks;
        }
    }

    /// Get validated document store credentials.
    ///
    /// Inline `token`/`database_id` values win over their `*_file`
    /// counterparts. File contents are trimmed.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a credential is missing, empty or
    /// its file cannot be read.
    pub fn require_notion(&self) -> Result<NotionCredentials, ConfigError> {
        let token = read_secret(
            self.notion.token.as_deref(),
            self.notion.token_file.as_deref(),
            "token",
        )?;
        let database_id = read_secret(
            self.notion.database_id.as_deref(),
            self.notion.database_id_file.as_deref(),
            "database_id",
        )?;
        Ok(NotionCredentials { token, database_id })
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_notion()?;
        self.validate_limits()?;
        self.validate_images()?;
        require_positive(self.math.indicator_threshold, "math.indicator_threshold")?;
        Ok(())
    }

    fn validate_notion(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.notion.api_url, "notion.api_url")?;
        require_http_url(&self.notion.api_url, "notion.api_url")?;
        require_non_empty(&self.notion.api_version, "notion.api_version")?;
        require_non_empty(&self.notion.title_property, "notion.title_property")?;
        require_non_empty(&self.notion.summary_property, "notion.summary_property")?;
        Ok(())
    }

    fn validate_limits(&self) -> Result<(), ConfigError> {
        let limits = &self.limits;
        require_positive(limits.max_blocks_per_page, "limits.max_blocks_per_page")?;
        require_positive(limits.max_rich_text_length, "limits.max_rich_text_length")?;
        require_positive(limits.max_toggle_children, "limits.max_toggle_children")?;
        require_positive(limits.max_summary_length, "limits.max_summary_length")?;
        require_positive(limits.max_document_blocks, "limits.max_document_blocks")?;
        require_at_most(
            limits.max_blocks_per_page,
            MAX_CHILDREN_PER_REQUEST,
            "limits.max_blocks_per_page",
        )?;
        require_at_most(
            limits.max_toggle_children,
            MAX_CHILDREN_PER_REQUEST,
            "limits.max_toggle_children",
        )?;
        Ok(())
    }

    fn validate_images(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.images.placeholder_url, "images.placeholder_url")?;
        require_http_url(&self.images.placeholder_url, "images.placeholder_url")?;
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    ///
    /// Optional values that expand to an empty string are treated as unset.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        fn expand_optional(
            value: &mut Option<String>,
            field: &str,
        ) -> Result<(), ConfigError> {
            if let Some(raw) = value.as_deref() {
                let expanded = expand::expand_env(raw, field)?;
                *value = (!expanded.is_empty()).then_some(expanded);
            }
            Ok(())
        }

        let notion = &mut self.notion;
        expand_optional(&mut notion.token, "notion.token")?;
        expand_optional(&mut notion.database_id, "notion.database_id")?;
        notion.api_url = expand::expand_env(&notion.api_url, "notion.api_url")?;
        if let Some(path) = &notion.token_file {
            notion.token_file = Some(expand::expand_path(path, "notion.token_file")?);
        }
        if let Some(path) = &notion.database_id_file {
            notion.database_id_file = Some(expand::expand_path(path, "notion.database_id_file")?);
        }

        expand_optional(&mut self.images.imgbb_api_key, "images.imgbb_api_key")?;
        self.images.placeholder_url =
            expand::expand_env(&self.images.placeholder_url, "images.placeholder_url")?;

        Ok(())
    }

    /// Resolve relative secret file paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: &mut Option<PathBuf>| {
            if let Some(p) = path.as_mut()
                && p.is_relative()
            {
                *p = config_dir.join(&*p);
            }
        };
        resolve(&mut self.notion.token_file);
        resolve(&mut self.notion.database_id_file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.notion.api_url, "https://api.notion.com");
        assert_eq!(config.notion.api_version, "2022-06-28");
        assert_eq!(config.notion.title_property, "Title");
        assert_eq!(config.notion.summary_property, "Memo");
        assert_eq!(config.limits.max_blocks_per_page, 100);
        assert_eq!(config.limits.max_rich_text_length, 2000);
        assert_eq!(config.limits.max_toggle_children, 50);
        assert_eq!(config.limits.max_summary_length, 1000);
        assert_eq!(config.limits.max_document_blocks, 1000);
        assert_eq!(
            config.media.video_domains,
            vec!["youtube.com", "youtu.be", "vimeo.com"]
        );
        assert_eq!(config.math.indicator_threshold, 3);
        assert!(config.images.imgbb_api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.limits.max_blocks_per_page, 100);
        assert!(config.notion.token.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[notion]
token = "secret_abc"
database_id = "db123"
title_property = "Name"

[limits]
max_blocks_per_page = 50
max_rich_text_length = 1500

[media]
video_domains = ["example.tv"]

[images]
imgbb_api_key = "key"

[math]
indicator_threshold = 2
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.notion.token.as_deref(), Some("secret_abc"));
        assert_eq!(config.notion.database_id.as_deref(), Some("db123"));
        assert_eq!(config.notion.title_property, "Name");
        assert_eq!(config.notion.summary_property, "Memo");
        assert_eq!(config.limits.max_blocks_per_page, 50);
        assert_eq!(config.limits.max_rich_text_length, 1500);
        assert_eq!(config.limits.max_toggle_children, 50);
        assert_eq!(config.media.video_domains, vec!["example.tv"]);
        assert_eq!(config.images.imgbb_api_key.as_deref(), Some("key"));
        assert_eq!(config.math.indicator_threshold, 2);
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let mut config = Config::default();
        config.limits.max_rich_text_length = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("limits.max_rich_text_length"));
    }

    #[test]
    fn test_validate_rejects_oversized_page() {
        let mut config = Config::default();
        config.limits.max_blocks_per_page = 101;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cannot exceed 100"));
    }

    #[test]
    fn test_validate_rejects_non_http_api_url() {
        let mut config = Config::default();
        config.notion.api_url = "ftp://api.notion.com".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("notion.api_url"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default();
        let overrides = CliSettings {
            database_id: Some("cli-db".to_owned()),
            max_blocks_per_page: Some(20),
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.notion.database_id.as_deref(), Some("cli-db"));
        assert_eq!(config.limits.max_blocks_per_page, 20);
        assert_eq!(config.limits.max_toggle_children, 50); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_empty_keeps_values() {
        let mut config = Config::default();
        config.notion.database_id = Some("file-db".to_owned());

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.notion.database_id.as_deref(), Some("file-db"));
        assert_eq!(config.limits.max_blocks_per_page, 100);
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let result = Config::load(Some(Path::new("/nonexistent/mdup.toml")), None);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_from_file_records_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[limits]\nmax_blocks_per_page = 10\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.config_path, Some(path));
        assert_eq!(config.limits.max_blocks_per_page, 10);
    }

    #[test]
    fn test_load_validates_cli_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "").unwrap();
        let overrides = CliSettings {
            max_blocks_per_page: Some(0),
            ..Default::default()
        };

        let result = Config::load(Some(&path), Some(&overrides));

        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_load_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[limits\n").unwrap();

        let result = Config::load(Some(&path), None);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_require_notion_inline() {
        let mut config = Config::default();
        config.notion.token = Some(" secret_abc ".to_owned());
        config.notion.database_id = Some("db123".to_owned());

        let creds = config.require_notion().unwrap();

        assert_eq!(creds.token, "secret_abc");
        assert_eq!(creds.database_id, "db123");
    }

    #[test]
    fn test_require_notion_from_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("token"), "secret_file\n").unwrap();
        std::fs::write(dir.path().join("db"), "  db-from-file \n").unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            "[notion]\ntoken_file = \"token\"\ndatabase_id_file = \"db\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        let creds = config.require_notion().unwrap();

        assert_eq!(creds.token, "secret_file");
        assert_eq!(creds.database_id, "db-from-file");
    }

    #[test]
    fn test_require_notion_inline_wins_over_file() {
        let mut config = Config::default();
        config.notion.token = Some("inline".to_owned());
        config.notion.token_file = Some(PathBuf::from("/nonexistent/token"));
        config.notion.database_id = Some("db".to_owned());

        assert_eq!(config.require_notion().unwrap().token, "inline");
    }

    #[test]
    fn test_require_notion_missing_token() {
        let mut config = Config::default();
        config.notion.database_id = Some("db".to_owned());

        let err = config.require_notion().unwrap_err();

        assert!(err.to_string().contains("notion.token"));
    }

    #[test]
    fn test_require_notion_unreadable_file() {
        let mut config = Config::default();
        config.notion.token_file = Some(PathBuf::from("/nonexistent/token"));
        config.notion.database_id = Some("db".to_owned());

        let err = config.require_notion().unwrap_err();

        assert!(err.to_string().contains("notion.token_file"));
    }

    #[test]
    fn test_resolve_paths_keeps_absolute() {
        let mut config = Config::default();
        config.notion.token_file = Some(PathBuf::from("/etc/mdup/token"));
        config.notion.database_id_file = Some(PathBuf::from("db"));

        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.notion.token_file,
            Some(PathBuf::from("/etc/mdup/token"))
        );
        assert_eq!(
            config.notion.database_id_file,
            Some(PathBuf::from("/project/db"))
        );
    }

    #[test]
    fn test_expand_env_vars_in_load() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("MDUP_TEST_TOKEN", "from-env");
            std::env::remove_var("MDUP_TEST_IMGBB");
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"
[notion]
token = "${MDUP_TEST_TOKEN}"

[images]
imgbb_api_key = "${MDUP_TEST_IMGBB:-}"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.notion.token.as_deref(), Some("from-env"));
        assert!(config.images.imgbb_api_key.is_none());
        unsafe {
            std::env::remove_var("MDUP_TEST_TOKEN");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MDUP_TEST_MISSING_DB");
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[notion]\ndatabase_id = \"${MDUP_TEST_MISSING_DB}\"\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("notion.database_id"));
    }
}
