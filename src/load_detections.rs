use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::config::Config;
use crate::db;
use crate::models::Detection;

/// Load the detections CSV into `raw.image_detections`. The destination
/// schema and table are created if absent; the whole CSV is read and
/// type-coerced before any insert, so a malformed row fails the run with
/// nothing written. One transaction, committed once at the end.
pub async fn run_load_detections(config: &Config) -> Result<()> {
    let rows = read_detections_csv(&config.data.detections_csv)?;

    let pool = db::connect().await?;

    sqlx::query("CREATE SCHEMA IF NOT EXISTS raw")
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

    let mut tx = pool.begin().await?;

    for row in &rows {
        sqlx::query(
            r#"
            INSERT INTO raw.image_detections (
                message_id,
                channel_name,
                detected_class,
                confidence_score
            )
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(row.message_id)
        .bind(&row.channel_name)
        .bind(&row.detected_class)
        .bind(row.confidence_score)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!(rows = rows.len(), "inserted detection rows");

    pool.close().await;
    Ok(())
}

/// Read and type-coerce every CSV row up front. `message_id` must parse as
/// an integer and `confidence_score` as a float; any malformed row is a
/// hard error.
pub fn read_detections_csv(path: &Path) -> Result<Vec<Detection>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: Detection =
            result.with_context(|| format!("Malformed detection row in {}", path.display()))?;
        rows.push(row);
    }

    Ok(rows)
}
