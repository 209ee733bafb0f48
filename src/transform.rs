use anyhow::{bail, Context, Result};
use std::process::Command;
use tracing::info;

use crate::config::Config;

/// Run the external SQL-transformation tool that builds the dimensional and
/// fact tables from the raw tables. With `select`, only the named model is
/// rebuilt (the partial re-run after detection loading).
pub fn run_transform(config: &Config, select: Option<&str>) -> Result<()> {
    let transform = &config.transform;

    info!(
        command = %transform.command,
        select = select.unwrap_or("all"),
        project_dir = %transform.project_dir.display(),
        "running transformations"
    );

    let mut command = Command::new(&transform.command);
    command.args(&transform.args);
    if let Some(model) = select {
        command.args(["-s", model]);
    }
    command.current_dir(&transform.project_dir);

    let status = command.status().with_context(|| {
        format!(
            "Failed to run transformation tool '{}'",
            transform.command
        )
    })?;

    if !status.success() {
        bail!("transformation tool exited with {}", status);
    }

    Ok(())
}
