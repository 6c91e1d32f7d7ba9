//! Local image hosting through `ImgBB`.

use std::path::Path;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use mdup_blocks::ResourceResolver;
use mdup_config::ImagesConfig;
use serde::Deserialize;
use ureq::Agent;

use crate::error::ImageError;

const UPLOAD_URL: &str = "https://api.imgbb.com/1/upload";

/// Upload timeout in seconds.
const UPLOAD_TIMEOUT: u64 = 60;

#[derive(Deserialize)]
struct UploadResponse {
    data: UploadData,
}

#[derive(Deserialize)]
struct UploadData {
    #[serde(default)]
    url: String,
}

/// Hosts local images on `ImgBB`.
///
/// Without an API key every lookup yields no URL.
pub struct ImgbbResolver {
    agent: Agent,
    upload_url: String,
    api_key: Option<String>,
}

impl ImgbbResolver {
    #[must_use]
    pub fn from_config(config: &ImagesConfig) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(UPLOAD_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            upload_url: UPLOAD_URL.to_owned(),
            api_key: config.imgbb_api_key.clone().filter(|key| !key.is_empty()),
        }
    }

    /// Upload one file and return its hosted URL.
    pub fn upload(&self, path: &Path, api_key: &str) -> Result<String, ImageError> {
        let data = std::fs::read(path).map_err(|source| ImageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let image = STANDARD.encode(&data);

        let response = self
            .agent
            .post(&self.upload_url)
            .send_form([("key", api_key), ("image", image.as_str())])?;

        let status = response.status().as_u16();
        let mut body_reader = response.into_body();

        if status >= 400 {
            let body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(ImageError::Api { status, body });
        }

        let parsed: UploadResponse = body_reader.read_json()?;
        if parsed.data.url.is_empty() {
            return Err(ImageError::MissingUrl);
        }
        Ok(parsed.data.url)
    }
}

impl ResourceResolver for ImgbbResolver {
    fn resolve(&self, path: &Path) -> Option<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::debug!(path = %path.display(), "No ImgBB API key, skipping upload");
            return None;
        };
        if !path.is_file() {
            tracing::warn!(path = %path.display(), "Image file not found");
            return None;
        }
        match self.upload(path, api_key) {
            Ok(url) => Some(url),
            Err(err) => {
                tracing::error!(path = %path.display(), error = %err, "Image upload failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(api_key: Option<&str>) -> ImgbbResolver {
        let config = ImagesConfig {
            imgbb_api_key: api_key.map(str::to_owned),
            ..ImagesConfig::default()
        };
        ImgbbResolver::from_config(&config)
    }

    #[test]
    fn test_without_api_key_resolves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        std::fs::write(&path, b"png").unwrap();

        assert!(resolver(None).resolve(&path).is_none());
        assert!(resolver(Some("")).resolve(&path).is_none());
    }

    #[test]
    fn test_missing_file_resolves_nothing() {
        let dir = tempfile::tempdir().unwrap();

        assert!(resolver(Some("key")).resolve(&dir.path().join("gone.png")).is_none());
    }

    #[test]
    fn test_upload_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.png");

        let err = resolver(Some("key")).upload(&path, "key").unwrap_err();

        assert!(matches!(err, ImageError::Io { .. }));
    }

    #[test]
    fn test_upload_response_parsing() {
        let parsed: UploadResponse =
            serde_json::from_str(r#"{"data":{"url":"https://i.ibb.co/x.png"},"success":true}"#)
                .unwrap();
        assert_eq!(parsed.data.url, "https://i.ibb.co/x.png");
    }
}
