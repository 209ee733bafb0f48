use std::fs;
use std::path::Path;

use anyhow::Result;
use telegram_warehouse::config::DetectorConfig;
use telegram_warehouse::detect::{
    scan_images, write_detections_csv, CommandDetector, DetectedObject, ObjectDetector,
};
use telegram_warehouse::load_detections::read_detections_csv;
use telegram_warehouse::models::Detection;
use tempfile::TempDir;

/// Detector stub returning the same boxes for every image.
struct FixedDetector(Vec<DetectedObject>);

impl ObjectDetector for FixedDetector {
    fn detect(&self, _image: &Path) -> Result<Vec<DetectedObject>> {
        Ok(self.0.clone())
    }
}

fn setup_images(root: &Path) {
    fs::create_dir_all(root.join("tikvahpharma")).unwrap();
    fs::create_dir_all(root.join("lobelia4cosmetics")).unwrap();
    fs::write(root.join("tikvahpharma").join("101.jpg"), b"jpeg").unwrap();
    fs::write(root.join("tikvahpharma").join("102.jpg"), b"jpeg").unwrap();
    fs::write(root.join("lobelia4cosmetics").join("200.jpg"), b"jpeg").unwrap();

    // Ignored: wrong extension, wrong depth.
    fs::write(root.join("tikvahpharma").join("notes.png"), b"png").unwrap();
    fs::write(root.join("stray.jpg"), b"jpeg").unwrap();
}

#[test]
fn scan_flattens_every_box_per_image() {
    let tmp = TempDir::new().unwrap();
    setup_images(tmp.path());

    let detector = FixedDetector(vec![
        DetectedObject {
            label: "person".to_string(),
            confidence: 0.91,
        },
        DetectedObject {
            label: "bottle".to_string(),
            confidence: 0.44,
        },
    ]);

    let rows = scan_images(tmp.path(), &detector).unwrap();
    assert_eq!(rows.len(), 6);

    // Sorted walk: lobelia4cosmetics/200 before tikvahpharma/101, 102.
    assert_eq!(rows[0].channel_name, "lobelia4cosmetics");
    assert_eq!(rows[0].message_id, 200);
    assert_eq!(rows[0].detected_class, "person");
    assert_eq!(rows[1].detected_class, "bottle");
    assert_eq!(rows[2].channel_name, "tikvahpharma");
    assert_eq!(rows[2].message_id, 101);
    assert_eq!(rows[4].message_id, 102);
}

#[test]
fn scan_fails_on_non_numeric_image_name() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("chan")).unwrap();
    fs::write(tmp.path().join("chan").join("cover-photo.jpg"), b"jpeg").unwrap();

    let detector = FixedDetector(Vec::new());
    assert!(scan_images(tmp.path(), &detector).is_err());
}

#[test]
fn scan_fails_on_missing_root() {
    let tmp = TempDir::new().unwrap();
    let detector = FixedDetector(Vec::new());
    assert!(scan_images(&tmp.path().join("nope"), &detector).is_err());
}

#[test]
fn command_detector_parses_json_stdout() {
    let tmp = TempDir::new().unwrap();
    let image = tmp.path().join("7.jpg");
    fs::write(&image, b"jpeg").unwrap();

    let detector = CommandDetector::new(&DetectorConfig {
        command: "sh".to_string(),
        args: vec![
            "-c".to_string(),
            r#"echo '[{"label": "person", "confidence": 0.91}]'"#.to_string(),
        ],
    });

    let objects = detector.detect(&image).unwrap();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].label, "person");
    assert!((objects[0].confidence - 0.91).abs() < 1e-9);
}

#[test]
fn command_detector_propagates_nonzero_exit() {
    let tmp = TempDir::new().unwrap();
    let image = tmp.path().join("7.jpg");
    fs::write(&image, b"jpeg").unwrap();

    let detector = CommandDetector::new(&DetectorConfig {
        command: "sh".to_string(),
        args: vec!["-c".to_string(), "exit 3".to_string()],
    });

    assert!(detector.detect(&image).is_err());
}

#[test]
fn command_detector_rejects_unparseable_output() {
    let tmp = TempDir::new().unwrap();
    let image = tmp.path().join("7.jpg");
    fs::write(&image, b"jpeg").unwrap();

    let detector = CommandDetector::new(&DetectorConfig {
        command: "sh".to_string(),
        args: vec!["-c".to_string(), "echo not-json".to_string()],
    });

    assert!(detector.detect(&image).is_err());
}

#[test]
fn csv_round_trip() {
    let tmp = TempDir::new().unwrap();
    let csv_path = tmp.path().join("detections.csv");

    let rows = vec![
        Detection {
            message_id: 101,
            channel_name: "tikvahpharma".to_string(),
            detected_class: "person".to_string(),
            confidence_score: 0.91,
        },
        Detection {
            message_id: 200,
            channel_name: "lobelia4cosmetics".to_string(),
            detected_class: "bottle".to_string(),
            confidence_score: 0.5,
        },
    ];

    write_detections_csv(&csv_path, &rows).unwrap();
    let read_back = read_detections_csv(&csv_path).unwrap();
    assert_eq!(read_back, rows);
}

#[test]
fn empty_csv_still_has_header() {
    let tmp = TempDir::new().unwrap();
    let csv_path = tmp.path().join("detections.csv");

    write_detections_csv(&csv_path, &[]).unwrap();

    let content = fs::read_to_string(&csv_path).unwrap();
    assert!(content.starts_with("message_id,channel_name,detected_class,confidence_score"));

    let read_back = read_detections_csv(&csv_path).unwrap();
    assert!(read_back.is_empty());
}

#[test]
fn malformed_row_fails_the_whole_read() {
    let tmp = TempDir::new().unwrap();
    let csv_path = tmp.path().join("detections.csv");

    fs::write(
        &csv_path,
        "message_id,channel_name,detected_class,confidence_score\n\
         101,tikvahpharma,person,0.91\n\
         not-a-number,tikvahpharma,bottle,0.5\n",
    )
    .unwrap();

    assert!(read_detections_csv(&csv_path).is_err());
}
