//! Core data records flowing through the pipeline.
//!
//! These types are the contract between the scraper, the JSON files on disk,
//! the detection CSV, and the raw warehouse tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One scraped channel message, serialized verbatim into the per-channel
/// JSON files and loaded as-is into `raw.telegram_messages`.
///
/// `message_id` is source-assigned and only unique within a channel.
/// Records are immutable once loaded; there is no update path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMessage {
    pub message_id: i64,
    pub channel_name: String,
    pub message_date: Option<DateTime<Utc>>,
    pub message_text: String,
    pub has_media: bool,
    pub image_path: Option<String>,
    pub views: Option<i64>,
    pub forwards: Option<i64>,
}

/// One detected object in one image, one CSV row, one row in
/// `raw.image_detections`. An image yields zero or many of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub message_id: i64,
    pub channel_name: String,
    pub detected_class: String,
    pub confidence_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn raw_message_json_round_trip() {
        let message = RawMessage {
            message_id: 4321,
            channel_name: "lobelia4cosmetics".to_string(),
            message_date: Some(Utc.with_ymd_and_hms(2025, 7, 14, 9, 30, 0).unwrap()),
            message_text: "New arrivals in stock".to_string(),
            has_media: true,
            image_path: Some("data/raw/images/lobelia4cosmetics/4321.jpg".to_string()),
            views: Some(1500),
            forwards: Some(12),
        };

        let json = serde_json::to_string_pretty(&message).unwrap();
        let parsed: RawMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, message);
    }

    #[test]
    fn raw_message_tolerates_null_fields() {
        let json = r#"{
            "message_id": 7,
            "channel_name": "tikvahpharma",
            "message_date": null,
            "message_text": "",
            "has_media": false,
            "image_path": null,
            "views": null,
            "forwards": null
        }"#;
        let parsed: RawMessage = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.message_id, 7);
        assert!(parsed.message_date.is_none());
        assert!(parsed.message_text.is_empty());
        assert!(!parsed.has_media);
    }

    #[test]
    fn raw_message_rejects_malformed_timestamp() {
        let json = r#"{
            "message_id": 8,
            "channel_name": "tikvahpharma",
            "message_date": "not-a-date",
            "message_text": "x",
            "has_media": false,
            "image_path": null,
            "views": null,
            "forwards": null
        }"#;
        assert!(serde_json::from_str::<RawMessage>(json).is_err());
    }
}
