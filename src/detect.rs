//! Object-detection enrichment.
//!
//! Walks the per-channel image tree, runs the configured pretrained detector
//! over each image, and flattens every detected box into one CSV row. The
//! model itself is an external black box behind [`ObjectDetector`]; the
//! bundled implementation shells out to a detector executable that prints a
//! JSON array of detections.

use anyhow::{bail, Context, Result};
use globset::Glob;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;
use walkdir::WalkDir;

use crate::config::{Config, DetectorConfig};
use crate::models::Detection;

/// One detected box as reported by the model.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectedObject {
    pub label: String,
    pub confidence: f64,
}

/// Pretrained detection model. Deterministic for a fixed model and image.
pub trait ObjectDetector {
    fn detect(&self, image: &Path) -> Result<Vec<DetectedObject>>;
}

/// Runs the configured detector executable once per image, with the image
/// path as the final argument, and parses its JSON stdout.
pub struct CommandDetector {
    command: String,
    args: Vec<String>,
}

impl CommandDetector {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
        }
    }
}

impl ObjectDetector for CommandDetector {
    fn detect(&self, image: &Path) -> Result<Vec<DetectedObject>> {
        let output = Command::new(&self.command)
            .args(&self.args)
            .arg(image)
            .output()
            .with_context(|| format!("Failed to run detector '{}'", self.command))?;

        if !output.status.success() {
            bail!(
                "detector failed on {}: {}",
                image.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let objects: Vec<DetectedObject> = serde_json::from_slice(&output.stdout)
            .with_context(|| format!("Unparseable detector output for {}", image.display()))?;

        Ok(objects)
    }
}

pub fn run_detect(config: &Config) -> Result<()> {
    let detector = CommandDetector::new(&config.detector);

    info!(
        command = %config.detector.command,
        images_dir = %config.data.images_dir.display(),
        "running object detection"
    );

    let detections = scan_images(&config.data.images_dir, &detector)?;
    write_detections_csv(&config.data.detections_csv, &detections)?;

    info!(
        detections = detections.len(),
        path = %config.data.detections_csv.display(),
        "saved detections"
    );

    Ok(())
}

/// Run the detector over every `<channel>/<message_id>.jpg` under `root`,
/// in sorted order so the output CSV is deterministic.
pub fn scan_images(root: &Path, detector: &dyn ObjectDetector) -> Result<Vec<Detection>> {
    if !root.exists() {
        bail!("Images directory does not exist: {}", root.display());
    }

    let matcher = Glob::new("*/*.jpg")?.compile_matcher();
    let mut images = Vec::new();

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

        images.push(path.to_path_buf());
    }

    images.sort();

    let mut rows = Vec::new();

    for image in &images {
        let (channel_name, message_id) = parse_image_path(image)?;
        let objects = detector.detect(image)?;

        for object in objects {
            rows.push(Detection {
                message_id,
                channel_name: channel_name.clone(),
                detected_class: object.label,
                confidence_score: object.confidence,
            });
        }
    }

    Ok(rows)
}

/// Images are named `<channel>/<message_id>.jpg`; a non-numeric stem is an
/// error rather than a silently skipped file.
fn parse_image_path(image: &Path) -> Result<(String, i64)> {
    let channel_name = image
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow::anyhow!("image has no channel directory: {}", image.display()))?;

    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let message_id: i64 = stem
        .parse()
        .with_context(|| format!("Image name is not a message id: {}", image.display()))?;

    Ok((channel_name, message_id))
}

/// Write the single detections CSV. The header row is always present, even
/// when there are no detections.
pub fn write_detections_csv(path: &Path, rows: &[Detection]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record([
        "message_id",
        "channel_name",
        "detected_class",
        "confidence_score",
    ])?;

    for row in rows {
        writer.serialize(row)?;
    }

    writer.flush()?;
    Ok(())
}
