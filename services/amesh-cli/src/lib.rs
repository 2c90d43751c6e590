//! Stand-alone amesh renderer writing radar images to disk.

use std::path::{Path, PathBuf};

use amesh::{create_image_png, generate_file_name_now, resolve_location, HttpFetcher, RenderConfig};
use amesh_common::Location;
use anyhow::{Context, Result};
use tracing::info;

/// A rendered image written to disk.
#[derive(Debug, Clone)]
pub struct RenderedFile {
    pub location: Location,
    pub path: PathBuf,
    pub size: usize,
}

/// Resolve `place`, render it and write the PNG into `output_dir`.
///
/// The directory is created when missing.
pub async fn render_to_file(
    fetcher: &dyn HttpFetcher,
    config: &RenderConfig,
    place: &str,
    api_key: &str,
    output_dir: &Path,
) -> Result<RenderedFile> {
    let location = resolve_location(fetcher, config, place, api_key)
        .await
        .with_context(|| format!("Failed to resolve {:?}", place))?;

    let png = create_image_png(fetcher, config, &location)
        .await
        .context("Failed to render radar image")?;

    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let path = output_dir.join(generate_file_name_now(&location));
    tokio::fs::write(&path, &png)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), size = png.len(), "Wrote radar image");

    Ok(RenderedFile {
        location,
        path,
        size: png.len(),
    })
}
