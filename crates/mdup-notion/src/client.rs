//! Notion REST API client.
//!
//! Provides a sync HTTP client creating pages with bearer token
//! authentication.

use std::time::Duration;

use mdup_config::{NotionConfig, NotionCredentials};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::info;
use ureq::Agent;

use crate::error::NotionError;
use crate::store::{PageDraft, PageHandle, PageStore, Parent};
use crate::wire::{blocks_json, text_value};

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Property holding the title of pages created under another page.
const PAGE_TITLE_PROPERTY: &str = "title";

/// Notion REST API client.
pub struct NotionClient {
    agent: Agent,
    base_url: String,
    api_version: String,
    token: String,
    database_id: String,
    title_property: String,
    summary_property: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl NotionClient {
    /// Create client from config values.
    #[must_use]
    pub fn from_config(config: &NotionConfig, credentials: &NotionCredentials) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: config.api_url.trim_end_matches('/').to_owned(),
            api_version: config.api_version.clone(),
            token: credentials.token.clone(),
            database_id: credentials.database_id.clone(),
            title_property: config.title_property.clone(),
            summary_property: config.summary_property.clone(),
        }
    }

    /// Request body creating `draft`.
    fn page_payload(&self, draft: &PageDraft) -> Value {
        let mut properties = Map::new();
        let parent = match &draft.parent {
            Parent::Database => {
                properties.insert(
                    self.title_property.clone(),
                    json!({ "title": text_value(&draft.title) }),
                );
                if !draft.summary.is_empty() {
                    properties.insert(
                        self.summary_property.clone(),
                        json!({ "rich_text": text_value(&draft.summary) }),
                    );
                }
                json!({ "database_id": self.database_id })
            }
            Parent::Page(page_id) => {
                properties.insert(
                    PAGE_TITLE_PROPERTY.to_owned(),
                    json!({ "title": text_value(&draft.title) }),
                );
                json!({ "page_id": page_id })
            }
        };

        json!({
            "parent": parent,
            "properties": properties,
            "children": blocks_json(&draft.blocks),
        })
    }
}

impl PageStore for NotionClient {
    fn create_page(&self, draft: &PageDraft) -> Result<PageHandle, NotionError> {
        let url = format!("{}/v1/pages", self.base_url);
        info!(
            "Creating page '{}' with {} blocks",
            draft.title,
            draft.blocks.len()
        );

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &format!("Bearer {}", self.token))
            .header("Notion-Version", &self.api_version)
            .header("Accept", "application/json")
            .send_json(self.page_payload(draft))?;

        let status = response.status().as_u16();
        let mut body_reader = response.into_body();

        if status >= 400 {
            let error_body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(api_error(status, &error_body));
        }

        let page: PageHandle = body_reader.read_json()?;
        if page.id.is_empty() {
            return Err(NotionError::InvalidResponse("page id is empty".to_owned()));
        }
        info!("Created page {} ({})", page.id, page.url);
        Ok(page)
    }
}

/// Error for a failed response, using the API's error object when present.
fn api_error(status: u16, body: &str) -> NotionError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) if !parsed.message.is_empty() => NotionError::Api {
            status,
            code: parsed.code,
            message: parsed.message,
        },
        _ => NotionError::Api {
            status,
            code: String::new(),
            message: body.to_owned(),
        },
    }
}
