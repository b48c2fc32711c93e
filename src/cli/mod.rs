// src/cli/mod.rs
pub mod args;
pub mod shell;

use crate::domain::ImageUpload;
use anyhow::{Context, Result};
use std::path::Path;

/// Read an image file picked by the user into an upload.
pub async fn read_image(path: &Path) -> Result<ImageUpload> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("Not a file path: {}", path.display()))?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    Ok(ImageUpload::new(filename, bytes))
}
