use std::fs;

use telegram_warehouse::load_raw::{read_message_file, scan_message_files};
use tempfile::TempDir;

#[test]
fn scan_picks_only_dated_channel_json() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    fs::create_dir_all(root.join("2025-07-14")).unwrap();
    fs::create_dir_all(root.join("2025-07-15")).unwrap();
    fs::write(root.join("2025-07-14").join("tikvahpharma.json"), "[]").unwrap();
    fs::write(root.join("2025-07-15").join("lobelia4cosmetics.json"), "[]").unwrap();

    // Ignored: wrong extension, wrong depth.
    fs::write(root.join("2025-07-15").join("notes.txt"), "x").unwrap();
    fs::write(root.join("stray.json"), "[]").unwrap();
    fs::create_dir_all(root.join("2025-07-15").join("nested")).unwrap();
    fs::write(root.join("2025-07-15").join("nested").join("deep.json"), "[]").unwrap();

    let files = scan_message_files(root).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| {
            p.strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();

    assert_eq!(
        names,
        vec![
            "2025-07-14/tikvahpharma.json",
            "2025-07-15/lobelia4cosmetics.json"
        ]
    );
}

#[test]
fn scan_fails_on_missing_root() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("does-not-exist");
    assert!(scan_message_files(&missing).is_err());
}

#[test]
fn empty_channel_file_parses_to_zero_records() {
    // A channel with no messages still gets its file, holding an empty array.
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("empty.json");
    fs::write(&path, "[]").unwrap();

    let records = read_message_file(&path).unwrap();
    assert!(records.is_empty());
}

#[test]
fn reads_scraped_records_verbatim() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("tikvahpharma.json");
    fs::write(
        &path,
        r#"[
            {
                "message_id": 101,
                "channel_name": "tikvahpharma",
                "message_date": "2025-07-14T09:30:00Z",
                "message_text": "Paracetamol back in stock",
                "has_media": true,
                "image_path": "data/raw/images/tikvahpharma/101.jpg",
                "views": 420,
                "forwards": 3
            },
            {
                "message_id": 102,
                "channel_name": "tikvahpharma",
                "message_date": null,
                "message_text": "",
                "has_media": false,
                "image_path": null,
                "views": null,
                "forwards": null
            }
        ]"#,
    )
    .unwrap();

    let records = read_message_file(&path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].message_id, 101);
    assert_eq!(records[0].channel_name, "tikvahpharma");
    assert_eq!(records[0].views, Some(420));
    assert!(records[1].message_date.is_none());
    assert!(records[1].message_text.is_empty());
}

#[test]
fn malformed_timestamp_fails_the_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bad.json");
    fs::write(
        &path,
        r#"[
            {
                "message_id": 1,
                "channel_name": "x",
                "message_date": "14/07/2025",
                "message_text": "x",
                "has_media": false,
                "image_path": null,
                "views": null,
                "forwards": null
            }
        ]"#,
    )
    .unwrap();

    assert!(read_message_file(&path).is_err());
}

#[test]
fn malformed_json_fails_the_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    assert!(read_message_file(&path).is_err());
}
