//! Download directory resolution and output path templates

use crate::error::{Error, Result};
use crate::types::MediaFormat;
use std::path::{Path, PathBuf};

/// Folder name under `~/Downloads` that receives converted media
pub const APP_DIR_NAME: &str = "Youtube Converter";

/// Title placeholder expanded by yt-dlp itself
pub const TITLE_PLACEHOLDER: &str = "%(title)s";

/// Default output directory: `<home>/Downloads/Youtube Converter`
///
/// Falls back to a relative `Downloads/Youtube Converter` when the platform
/// reports no home directory.
pub fn default_download_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Downloads")
        .join(APP_DIR_NAME)
}

/// Create the download directory and its parents if absent
///
/// Safe to call on every startup. A failure here (usually permissions) is
/// meant to abort startup.
pub async fn ensure_download_dir(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path).await.map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!(
                "Failed to create download directory '{}': {}",
                path.display(),
                e
            ),
        ))
    })?;

    tracing::debug!(path = %path.display(), "Download directory ready");
    Ok(())
}

/// Output template handed to yt-dlp: `<dir>/%(title)s.<mp3|mp4>`
pub fn output_template(dir: &Path, format: MediaFormat) -> PathBuf {
    dir.join(format!("{}.{}", TITLE_PLACEHOLDER, format.extension()))
}
