//! Chart file output.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::AppError;

pub const CHART_FILENAME: &str = "world_population_growth.svg";

/// Write the SVG document to `<dir>/world_population_growth.svg`, creating
/// `dir` if needed. An existing file is replaced.
pub async fn write_chart(dir: &Path, svg: &str) -> Result<PathBuf, AppError> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(CHART_FILENAME);
    tokio::fs::write(&path, svg).await?;
    info!("Chart written to {:?} ({} bytes)", path, svg.len());
    Ok(path)
}
