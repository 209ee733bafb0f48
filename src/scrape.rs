//! Channel scraping.
//!
//! One pass over the configured channels: fetch recent messages through the
//! gateway, download attached photos, and write one JSON array per channel
//! into the dated directory for the current UTC day. A failing channel is
//! logged and skipped; a failing photo download is logged and the message is
//! kept with a null image path.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::RawMessage;
use crate::telegram::{TelegramAuth, TelegramClient};

pub async fn run_scrape(config: &Config) -> Result<()> {
    let auth = TelegramAuth::from_env()?;
    let client = TelegramClient::new(&config.scraper, &auth)?;

    std::fs::create_dir_all(&config.data.messages_dir).with_context(|| {
        format!(
            "Failed to create messages directory {}",
            config.data.messages_dir.display()
        )
    })?;
    std::fs::create_dir_all(&config.data.images_dir).with_context(|| {
        format!(
            "Failed to create images directory {}",
            config.data.images_dir.display()
        )
    })?;

    info!(channels = config.scraper.channels.len(), "starting scrape");

    for username in &config.scraper.channels {
        if let Err(e) = scrape_channel(config, &client, username).await {
            error!(channel = %username, error = %e, "channel scrape failed");
        }
    }

    info!("scrape finished");
    Ok(())
}

async fn scrape_channel(config: &Config, client: &TelegramClient, username: &str) -> Result<()> {
    info!(channel = %username, "scraping channel");

    let chat = client.get_chat(username).await?;
    let channel_name = username.to_lowercase();

    let today = Utc::now().format("%Y-%m-%d").to_string();
    let date_dir = config.data.messages_dir.join(&today);
    std::fs::create_dir_all(&date_dir)
        .with_context(|| format!("Failed to create {}", date_dir.display()))?;
    let json_path = date_dir.join(format!("{}.json", channel_name));

    let history = client
        .channel_history(chat.id, config.scraper.limit)
        .await?;

    let mut records = Vec::with_capacity(history.len());

    for message in &history {
        let has_media = message.photo.is_some();
        let mut image_path = None;

        if let Some(sizes) = &message.photo {
            let image_dir = config.data.images_dir.join(&channel_name);
            std::fs::create_dir_all(&image_dir)
                .with_context(|| format!("Failed to create {}", image_dir.display()))?;
            let dest = image_dir.join(format!("{}.jpg", message.message_id));

            match client.download_photo(sizes, &dest).await {
                Ok(()) => image_path = Some(dest.to_string_lossy().into_owned()),
                Err(e) => {
                    warn!(
                        channel = %channel_name,
                        message_id = message.message_id,
                        error = %e,
                        "photo download failed"
                    );
                }
            }
        }

        records.push(RawMessage {
            message_id: message.message_id,
            channel_name: channel_name.clone(),
            message_date: DateTime::from_timestamp(message.date, 0),
            message_text: message.text.clone().unwrap_or_default(),
            has_media,
            image_path,
            views: message.views,
            forwards: message.forwards,
        });
    }

    // An empty channel still gets its (empty-array) file for the day.
    let json = serde_json::to_string_pretty(&records)?;
    std::fs::write(&json_path, json)
        .with_context(|| format!("Failed to write {}", json_path.display()))?;

    info!(
        channel = %channel_name,
        messages = records.len(),
        path = %json_path.display(),
        "saved channel messages"
    );

    Ok(())
}
