//! Sequential pipeline orchestration.
//!
//! Runs the steps in their explicit dependency order: scrape →
//! load-messages → transform → detect → load-detections → partial
//! transform of the detections model. The first failing step aborts the
//! run; downstream steps do not execute. Every step is also triggerable on
//! its own via its subcommand.

use anyhow::Result;
use tracing::info;

use crate::config::Config;
use crate::{detect, load_detections, load_raw, scrape, transform};

pub async fn run_pipeline(config: &Config) -> Result<()> {
    info!("pipeline: scrape");
    scrape::run_scrape(config).await?;

    info!("pipeline: load raw messages");
    load_raw::run_load_messages(config).await?;

    info!("pipeline: transform");
    transform::run_transform(config, None)?;

    info!("pipeline: detect");
    detect::run_detect(config)?;

    info!("pipeline: load detections");
    load_detections::run_load_detections(config).await?;

    info!("pipeline: transform detections model");
    transform::run_transform(config, Some(&config.transform.detections_select))?;

    info!("pipeline finished");
    Ok(())
}
