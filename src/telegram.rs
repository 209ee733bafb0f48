//! Typed client for a Bot-API-compatible Telegram gateway.
//!
//! All calls share the gateway's JSON envelope (`ok` / `result` /
//! `description`). Photo downloads follow the two-step flow: resolve the
//! file path with `getFile`, then fetch the bytes from the file endpoint.
//!
//! Credentials come from the environment: `TELEGRAM_API_ID` and
//! `TELEGRAM_API_HASH` form the gateway token, `TELEGRAM_SESSION_NAME`
//! labels the scraper session.

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::config::ScraperConfig;

pub struct TelegramAuth {
    api_id: String,
    api_hash: String,
    pub session_name: String,
}

impl TelegramAuth {
    pub fn from_env() -> Result<Self> {
        let api_id = std::env::var("TELEGRAM_API_ID")
            .map_err(|_| anyhow::anyhow!("TELEGRAM_API_ID not set"))?;
        let api_hash = std::env::var("TELEGRAM_API_HASH")
            .map_err(|_| anyhow::anyhow!("TELEGRAM_API_HASH not set"))?;
        let session_name = std::env::var("TELEGRAM_SESSION_NAME")
            .unwrap_or_else(|_| "telegram-warehouse".to_string());

        Ok(Self {
            api_id,
            api_hash,
            session_name,
        })
    }

    fn token(&self) -> String {
        format!("{}:{}", self.api_id, self.api_hash)
    }
}

/// A chat resolved from a public username.
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// One message as returned by the gateway's history call.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayMessage {
    pub message_id: i64,
    /// Unix timestamp in seconds.
    pub date: i64,
    #[serde(default)]
    pub text: Option<String>,
    /// Photo sizes, smallest first; absent when the message has no photo.
    #[serde(default)]
    pub photo: Option<Vec<PhotoSize>>,
    #[serde(default)]
    pub views: Option<i64>,
    #[serde(default)]
    pub forwards: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub width: i64,
    pub height: i64,
    #[serde(default)]
    pub file_size: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct FileInfo {
    #[serde(default)]
    file_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    result: Option<T>,
}

pub struct TelegramClient {
    http: reqwest::Client,
    base: String,
    token: String,
}

impl TelegramClient {
    pub fn new(config: &ScraperConfig, auth: &TelegramAuth) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        debug!(
            session = %auth.session_name,
            base = %config.api_base,
            "gateway client ready"
        );

        Ok(Self {
            http,
            base: config.api_base.trim_end_matches('/').to_string(),
            token: auth.token(),
        })
    }

    /// Resolve a public channel username to its chat.
    pub async fn get_chat(&self, username: &str) -> Result<Chat> {
        self.call(
            "getChat",
            &[("chat_id", format!("@{}", username.trim_start_matches('@')))],
        )
        .await
        .with_context(|| format!("Failed to resolve channel '{}'", username))
    }

    /// Fetch up to `limit` most recent messages of a chat, newest first.
    pub async fn channel_history(&self, chat_id: i64, limit: usize) -> Result<Vec<GatewayMessage>> {
        self.call(
            "getChatHistory",
            &[
                ("chat_id", chat_id.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
        .with_context(|| format!("Failed to fetch history for chat {}", chat_id))
    }

    /// Download the largest size of a photo to `dest`.
    pub async fn download_photo(&self, sizes: &[PhotoSize], dest: &Path) -> Result<()> {
        // The gateway lists sizes smallest first; the last one is the largest.
        let largest = sizes
            .last()
            .ok_or_else(|| anyhow::anyhow!("photo has no sizes"))?;

        let info: FileInfo = self
            .call("getFile", &[("file_id", largest.file_id.clone())])
            .await?;
        let file_path = info
            .file_path
            .ok_or_else(|| anyhow::anyhow!("getFile returned no file_path"))?;

        let url = format!("{}/file/bot{}/{}", self.base, self.token, file_path);
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            bail!("file download returned HTTP {}", response.status());
        }

        let bytes = response.bytes().await?;
        tokio::fs::write(dest, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", dest.display()))?;

        debug!(path = %dest.display(), size = bytes.len(), "downloaded photo");
        Ok(())
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/bot{}/{}", self.base, self.token, method);

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();
        let envelope: Envelope<T> = response
            .json()
            .await
            .with_context(|| format!("Invalid gateway response for {}", method))?;

        if !envelope.ok {
            bail!(
                "gateway error for {} (HTTP {}): {}",
                method,
                status,
                envelope.description.unwrap_or_else(|| "unknown".to_string())
            );
        }

        envelope
            .result
            .ok_or_else(|| anyhow::anyhow!("gateway response for {} has no result", method))
    }
}
