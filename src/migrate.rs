use anyhow::Result;

use crate::db;

pub async fn run_migrations() -> Result<()> {
    let pool = db::connect().await?;

    sqlx::query("CREATE SCHEMA IF NOT EXISTS raw")
        .execute(&pool)
        .await?;

    // Raw tables keep every scraped row as-is: no keys, no deduplication.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS raw.telegram_messages (
            message_id BIGINT,
            channel_name TEXT,
            message_date TIMESTAMPTZ,
            message_text TEXT,
            has_media BOOLEAN,
            image_path TEXT,
            views BIGINT,
            forwards BIGINT
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS raw.image_detections (
            message_id BIGINT,
            channel_name TEXT,
            detected_class TEXT,
            confidence_score DOUBLE PRECISION
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_telegram_messages_channel \
         ON raw.telegram_messages (channel_name)",
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_telegram_messages_date \
         ON raw.telegram_messages (message_date)",
    )
    .execute(&pool)
    .await?;

    pool.close().await;
    Ok(())
}
