//! Raw-table statistics.
//!
//! Quick summary of what has been loaded: total row counts and a
//! per-channel breakdown. Used by `tgwh stats` for operator confidence
//! after scrapes and loads.

use anyhow::Result;
use sqlx::Row;

use crate::db;

struct ChannelStats {
    channel_name: String,
    message_count: i64,
    with_media: i64,
    detection_count: i64,
    last_message: Option<String>,
}

pub async fn run_stats() -> Result<()> {
    let pool = db::connect().await?;

    let total_messages: i64 = sqlx::query_scalar("SELECT count(*) FROM raw.telegram_messages")
        .fetch_one(&pool)
        .await?;

    let total_detections: i64 = sqlx::query_scalar("SELECT count(*) FROM raw.image_detections")
        .fetch_one(&pool)
        .await?;

    println!("Telegram Warehouse — Raw Table Stats");
    println!("====================================");
    println!();
    println!("  Messages:    {}", total_messages);
    println!("  Detections:  {}", total_detections);

    let channel_rows = sqlx::query(
        r#"
        SELECT
            m.channel_name,
            count(*) AS message_count,
            count(*) FILTER (WHERE m.has_media) AS with_media,
            to_char(max(m.message_date), 'YYYY-MM-DD') AS last_message
        FROM raw.telegram_messages m
        GROUP BY m.channel_name
        ORDER BY message_count DESC
        "#,
    )
    .fetch_all(&pool)
    .await?;

    let detection_rows = sqlx::query(
        "SELECT channel_name, count(*) AS detection_count \
         FROM raw.image_detections GROUP BY channel_name",
    )
    .fetch_all(&pool)
    .await?;

    let mut channel_stats: Vec<ChannelStats> = Vec::new();
    for row in &channel_rows {
        let channel_name: String = row.get("channel_name");
        let detection_count = detection_rows
            .iter()
            .find(|d| {
                let d_channel: String = d.get("channel_name");
                d_channel == channel_name
            })
            .map(|d| d.get::<i64, _>("detection_count"))
            .unwrap_or(0);

        channel_stats.push(ChannelStats {
            channel_name,
            message_count: row.get("message_count"),
            with_media: row.get("with_media"),
            detection_count,
            last_message: row.get("last_message"),
        });
    }

    if !channel_stats.is_empty() {
        println!();
        println!("  By channel:");
        println!(
            "  {:<24} {:>9} {:>10} {:>11}   {}",
            "CHANNEL", "MESSAGES", "WITH MEDIA", "DETECTIONS", "LAST MESSAGE"
        );
        println!("  {}", "-".repeat(76));

        for s in &channel_stats {
            println!(
                "  {:<24} {:>9} {:>10} {:>11}   {}",
                s.channel_name,
                s.message_count,
                s.with_media,
                s.detection_count,
                s.last_message.as_deref().unwrap_or("never")
            );
        }
    }

    println!();

    pool.close().await;
    Ok(())
}
