//! Read queries over the transformed tables.
//!
//! Each public function backs one API endpoint: a single parameterized SQL
//! statement against the marts schema, mapped into a serializable response
//! shape. The marts schema name is validated at config load time and
//! interpolated as an identifier; every user-supplied value is bound.

use anyhow::Result;
use serde::Serialize;
use sqlx::{PgPool, Row};
use std::collections::HashMap;

/// One term with its frequency across all messages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermCount {
    pub term: String,
    pub count: i64,
}

/// One day of posting activity for a channel.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelActivity {
    pub date: String,
    pub message_count: i64,
    pub total_views: i64,
}

/// One keyword-search hit.
#[derive(Debug, Clone, Serialize)]
pub struct MessageHit {
    pub message_id: i64,
    pub channel_name: String,
    pub message_date: String,
    pub message_text: String,
    pub view_count: i64,
    pub forward_count: i64,
    pub has_image: bool,
}

/// Per-channel image usage and category breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct VisualContentStats {
    pub channel_name: String,
    pub total_messages: i64,
    pub messages_with_images: i64,
    pub promotional: i64,
    pub product_display: i64,
    pub lifestyle: i64,
    pub other: i64,
}

/// Most frequent terms across all message text.
///
/// Tokenization happens in-process: non-alphanumeric characters become
/// spaces, everything is lowercased, and the result splits on whitespace.
/// No stop-word filtering; numbers and short tokens count like any other
/// term.
pub async fn top_terms(pool: &PgPool, marts_schema: &str, limit: usize) -> Result<Vec<TermCount>> {
    let sql = format!(
        "SELECT coalesce(message_text, '') AS message_text FROM {}.fct_messages",
        marts_schema
    );

    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    let texts = rows.iter().map(|row| row.get::<String, _>("message_text"));
    Ok(count_top_terms(texts, limit))
}

/// Daily message count and summed views for one channel, matched
/// case-insensitively, ordered by date ascending. An empty result means the
/// channel has no data; the caller turns that into a not-found error.
pub async fn channel_activity(
    pool: &PgPool,
    marts_schema: &str,
    channel_name: &str,
) -> Result<Vec<ChannelActivity>> {
    let sql = format!(
        r#"
        SELECT
            d.full_date::text AS date,
            count(f.message_id) AS message_count,
            coalesce(sum(f.view_count), 0)::bigint AS total_views
        FROM {m}.fct_messages f
        JOIN {m}.dim_channels c
          ON f.channel_key = c.channel_key
        JOIN {m}.dim_dates d
          ON f.date_key = d.date_key
        WHERE lower(c.channel_name) = lower($1)
        GROUP BY d.full_date
        ORDER BY d.full_date
        "#,
        m = marts_schema
    );

    let rows = sqlx::query(&sql)
        .bind(channel_name)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(|row| ChannelActivity {
            date: row.get("date"),
            message_count: row.get("message_count"),
            total_views: row.get("total_views"),
        })
        .collect())
}

/// Case-insensitive substring search over message text, most recent first.
pub async fn search_messages(
    pool: &PgPool,
    marts_schema: &str,
    query: &str,
    limit: i64,
) -> Result<Vec<MessageHit>> {
    let sql = format!(
        r#"
        SELECT
            f.message_id::bigint AS message_id,
            c.channel_name,
            to_char(d.full_date, 'YYYY-MM-DD') AS message_date,
            coalesce(f.message_text, '') AS message_text,
            coalesce(f.view_count, 0)::bigint AS view_count,
            coalesce(f.forward_count, 0)::bigint AS forward_count,
            f.has_image
        FROM {m}.fct_messages f
        JOIN {m}.dim_channels c
          ON f.channel_key = c.channel_key
        JOIN {m}.dim_dates d
          ON f.date_key = d.date_key
        WHERE f.message_text ILIKE '%' || $1 || '%'
        ORDER BY d.full_date DESC
        LIMIT $2
        "#,
        m = marts_schema
    );

    let rows = sqlx::query(&sql)
        .bind(query)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(|row| MessageHit {
            message_id: row.get("message_id"),
            channel_name: row.get("channel_name"),
            message_date: row.get("message_date"),
            message_text: row.get("message_text"),
            view_count: row.get("view_count"),
            forward_count: row.get("forward_count"),
            has_image: row.get("has_image"),
        })
        .collect())
}

/// Per-channel totals and image-category counts.
///
/// Each distinct (message, category) assignment counts once; a message with
/// no detection row counts as `other`.
pub async fn visual_content(pool: &PgPool, marts_schema: &str) -> Result<Vec<VisualContentStats>> {
    let sql = format!(
        r#"
        WITH msg AS (
            SELECT c.channel_name, f.message_id, f.has_image
            FROM {m}.fct_messages f
            JOIN {m}.dim_channels c
              ON f.channel_key = c.channel_key
        ),
        cat AS (
            SELECT DISTINCT
                m.channel_name,
                m.message_id,
                coalesce(i.image_category, 'other') AS image_category
            FROM msg m
            LEFT JOIN {m}.fct_image_detections i
              ON m.message_id = i.message_id
        ),
        totals AS (
            SELECT
                channel_name,
                count(*) AS total_messages,
                count(*) FILTER (WHERE has_image) AS messages_with_images
            FROM msg
            GROUP BY channel_name
        ),
        cats AS (
            SELECT
                channel_name,
                count(*) FILTER (WHERE image_category = 'promotional') AS promotional,
                count(*) FILTER (WHERE image_category = 'product_display') AS product_display,
                count(*) FILTER (WHERE image_category = 'lifestyle') AS lifestyle,
                count(*) FILTER (WHERE image_category = 'other') AS other
            FROM cat
            GROUP BY channel_name
        )
        SELECT
            t.channel_name,
            t.total_messages,
            t.messages_with_images,
            coalesce(s.promotional, 0) AS promotional,
            coalesce(s.product_display, 0) AS product_display,
            coalesce(s.lifestyle, 0) AS lifestyle,
            coalesce(s.other, 0) AS other
        FROM totals t
        LEFT JOIN cats s
          ON t.channel_name = s.channel_name
        ORDER BY t.channel_name
        "#,
        m = marts_schema
    );

    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    Ok(rows
        .iter()
        .map(|row| VisualContentStats {
            channel_name: row.get("channel_name"),
            total_messages: row.get("total_messages"),
            messages_with_images: row.get("messages_with_images"),
            promotional: row.get("promotional"),
            product_display: row.get("product_display"),
            lifestyle: row.get("lifestyle"),
            other: row.get("other"),
        })
        .collect())
}

// ============ Term counting ============

/// Split text into terms: anything outside ASCII alphanumerics is a
/// separator, and terms are lowercased.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect();

    cleaned.split_whitespace().map(str::to_string).collect()
}

/// Count term frequency across texts and return the top `limit` terms,
/// sorted by descending count with a term-ascending tie-break so the
/// ordering is deterministic.
pub fn count_top_terms<I>(texts: I, limit: usize) -> Vec<TermCount>
where
    I: IntoIterator<Item = String>,
{
    let mut counts: HashMap<String, i64> = HashMap::new();

    for text in texts {
        for term in tokenize(&text) {
            *counts.entry(term).or_insert(0) += 1;
        }
    }

    let mut terms: Vec<TermCount> = counts
        .into_iter()
        .map(|(term, count)| TermCount { term, count })
        .collect();

    terms.sort_by(|a, b| b.count.cmp(&a.count).then(a.term.cmp(&b.term)));
    terms.truncate(limit);
    terms
}
