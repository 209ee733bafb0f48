use std::fs;

use telegram_warehouse::config::load_config;
use tempfile::TempDir;

fn write_config(content: &str) -> (TempDir, std::path::PathBuf) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("tgwh.toml");
    fs::write(&path, content).unwrap();
    (tmp, path)
}

const MINIMAL: &str = r#"
[data]
messages_dir = "data/raw/telegram_messages"
images_dir = "data/raw/images"
detections_csv = "data/detections.csv"

[scraper]
channels = ["lobelia4cosmetics", "tikvahpharma"]

[server]
bind = "127.0.0.1:8000"
"#;

#[test]
fn minimal_config_gets_defaults() {
    let (_tmp, path) = write_config(MINIMAL);
    let config = load_config(&path).unwrap();

    assert_eq!(config.scraper.channels.len(), 2);
    assert_eq!(config.scraper.limit, 200);
    assert_eq!(config.scraper.api_base, "https://api.telegram.org");
    assert_eq!(config.scraper.timeout_secs, 30);
    assert_eq!(config.warehouse.marts_schema, "analytics");
    assert_eq!(config.detector.command, "yolo-detect");
    assert_eq!(config.transform.command, "dbt");
    assert_eq!(config.transform.args, vec!["run"]);
    assert_eq!(config.transform.detections_select, "fct_image_detections");
}

#[test]
fn explicit_values_override_defaults() {
    let (_tmp, path) = write_config(
        r#"
[data]
messages_dir = "m"
images_dir = "i"
detections_csv = "d.csv"

[scraper]
channels = ["one"]
limit = 50
api_base = "http://localhost:8081"

[warehouse]
marts_schema = "dbt_marts"

[detector]
command = "detector"
args = ["--weights", "yolov8n.onnx"]

[server]
bind = "0.0.0.0:9000"
"#,
    );
    let config = load_config(&path).unwrap();

    assert_eq!(config.scraper.limit, 50);
    assert_eq!(config.scraper.api_base, "http://localhost:8081");
    assert_eq!(config.warehouse.marts_schema, "dbt_marts");
    assert_eq!(config.detector.args, vec!["--weights", "yolov8n.onnx"]);
    assert_eq!(config.server.bind, "0.0.0.0:9000");
}

#[test]
fn rejects_empty_channel_list() {
    let (_tmp, path) = write_config(
        r#"
[data]
messages_dir = "m"
images_dir = "i"
detections_csv = "d.csv"

[scraper]
channels = []

[server]
bind = "127.0.0.1:8000"
"#,
    );
    assert!(load_config(&path).is_err());
}

#[test]
fn rejects_zero_scrape_limit() {
    let (_tmp, path) = write_config(
        r#"
[data]
messages_dir = "m"
images_dir = "i"
detections_csv = "d.csv"

[scraper]
channels = ["one"]
limit = 0

[server]
bind = "127.0.0.1:8000"
"#,
    );
    assert!(load_config(&path).is_err());
}

#[test]
fn rejects_non_identifier_marts_schema() {
    let (_tmp, path) = write_config(
        r#"
[data]
messages_dir = "m"
images_dir = "i"
detections_csv = "d.csv"

[scraper]
channels = ["one"]

[warehouse]
marts_schema = "analytics; drop table raw.telegram_messages"

[server]
bind = "127.0.0.1:8000"
"#,
    );
    assert!(load_config(&path).is_err());
}

#[test]
fn missing_config_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    assert!(load_config(&tmp.path().join("absent.toml")).is_err());
}
