use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub data: DataConfig,
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub transform: TransformConfig,
    #[serde(default)]
    pub warehouse: WarehouseConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    /// Root of the dated per-channel JSON tree written by the scraper.
    pub messages_dir: PathBuf,
    /// Root of the per-channel image tree.
    pub images_dir: PathBuf,
    /// Path of the single detections CSV.
    pub detections_csv: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScraperConfig {
    /// Public channel usernames to scrape, without the leading `@`.
    pub channels: Vec<String>,
    #[serde(default = "default_scrape_limit")]
    pub limit: usize,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_scrape_limit() -> usize {
    200
}
fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct DetectorConfig {
    /// Detector executable. Invoked once per image with the image path as the
    /// final argument; must print a JSON array of {label, confidence} objects.
    #[serde(default = "default_detector_command")]
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            command: default_detector_command(),
            args: Vec::new(),
        }
    }
}

fn default_detector_command() -> String {
    "yolo-detect".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct TransformConfig {
    #[serde(default = "default_transform_command")]
    pub command: String,
    #[serde(default = "default_transform_args")]
    pub args: Vec<String>,
    /// Working directory of the transformation project.
    #[serde(default = "default_project_dir")]
    pub project_dir: PathBuf,
    /// Model selector for the partial re-run after detection loading.
    #[serde(default = "default_detections_select")]
    pub detections_select: String,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            command: default_transform_command(),
            args: default_transform_args(),
            project_dir: default_project_dir(),
            detections_select: default_detections_select(),
        }
    }
}

fn default_transform_command() -> String {
    "dbt".to_string()
}
fn default_transform_args() -> Vec<String> {
    vec!["run".to_string()]
}
fn default_project_dir() -> PathBuf {
    PathBuf::from("warehouse")
}
fn default_detections_select() -> String {
    "fct_image_detections".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct WarehouseConfig {
    /// Schema holding the externally-built dimensional and fact tables.
    #[serde(default = "default_marts_schema")]
    pub marts_schema: String,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            marts_schema: default_marts_schema(),
        }
    }
}

fn default_marts_schema() -> String {
    "analytics".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.scraper.channels.is_empty() {
        anyhow::bail!("scraper.channels must list at least one channel");
    }

    if config.scraper.limit == 0 {
        anyhow::bail!("scraper.limit must be > 0");
    }

    if config.scraper.api_base.trim_end_matches('/').is_empty() {
        anyhow::bail!("scraper.api_base must not be empty");
    }

    if config.server.bind.is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    // The marts schema is interpolated into SQL as an identifier, so it must
    // stay a plain identifier.
    let schema = &config.warehouse.marts_schema;
    if schema.is_empty()
        || !schema
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        anyhow::bail!(
            "warehouse.marts_schema must be a plain identifier, got '{}'",
            schema
        );
    }

    if config.detector.command.is_empty() {
        anyhow::bail!("detector.command must not be empty");
    }

    if config.transform.command.is_empty() {
        anyhow::bail!("transform.command must not be empty");
    }

    Ok(config)
}
