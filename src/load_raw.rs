use anyhow::{bail, Context, Result};
use globset::Glob;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

use crate::config::Config;
use crate::db;
use crate::models::RawMessage;

/// Load every scraped JSON file into `raw.telegram_messages` in a single
/// transaction, committed once after all files are processed. Re-running
/// loads duplicates; raw tables are append-only by design.
pub async fn run_load_messages(config: &Config) -> Result<()> {
    let files = scan_message_files(&config.data.messages_dir)?;

    let pool = db::connect().await?;
    let mut tx = pool.begin().await?;
    let mut rows = 0u64;

    for path in &files {
        info!(file = %path.display(), "loading message file");
        let records = read_message_file(path)?;

        for record in &records {
            sqlx::query(
                r#"
                INSERT INTO raw.telegram_messages (
                    message_id,
                    channel_name,
                    message_date,
                    message_text,
                    has_media,
                    image_path,
                    views,
                    forwards
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(record.message_id)
            .bind(&record.channel_name)
            .bind(record.message_date)
            .bind(&record.message_text)
            .bind(record.has_media)
            .bind(&record.image_path)
            .bind(record.views)
            .bind(record.forwards)
            .execute(&mut *tx)
            .await?;

            rows += 1;
        }
    }

    tx.commit().await?;

    info!(files = files.len(), rows, "finished loading raw messages");

    pool.close().await;
    Ok(())
}

/// Collect the per-channel JSON files: one subdirectory per scrape date,
/// each holding `<channel>.json` files. Sorted for deterministic ordering.
pub fn scan_message_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        bail!("Messages directory does not exist: {}", root.display());
    }

    let matcher = Glob::new("*/*.json")?.compile_matcher();
    let mut files = Vec::new();

    for entry in WalkDir::new(root).min_depth(2).max_depth(2) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        if !matcher.is_match(relative) {
            continue;
        }

        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

/// Parse one per-channel JSON file. Malformed records (including malformed
/// timestamps) are a hard error; nothing is skipped.
pub fn read_message_file(path: &Path) -> Result<Vec<RawMessage>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let records: Vec<RawMessage> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    Ok(records)
}
