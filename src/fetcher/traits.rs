//! Trait for launching the external download tool

use super::process::FetchProcess;
use crate::types::MediaFormat;
use async_trait::async_trait;
use std::path::Path;

/// Launches the external media-download tool for one job
///
/// Implementations only start the process; reading its output and waiting
/// for it is done by the caller through the returned [`FetchProcess`].
///
/// # Examples
///
/// ```no_run
/// use yt_converter::fetcher::{CliFetcher, Fetcher};
/// use yt_converter::types::MediaFormat;
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = CliFetcher::from_path().expect("yt-dlp not found in PATH");
///
/// let mut process = fetcher.launch(
///     "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
///     MediaFormat::Mp3,
///     Path::new("/tmp/%(title)s.mp3"),
/// )?;
/// while let Some(line) = process.next_line().await {
///     println!("{}", line?);
/// }
/// let status = process.wait().await?;
/// println!("exited with {status}");
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Start the tool for `url` in `format`, writing to `output_template`
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Launch`] when the process cannot be started
    /// (binary missing, not executable). A tool that starts and later fails
    /// is reported through the exit status instead.
    fn launch(
        &self,
        url: &str,
        format: MediaFormat,
        output_template: &Path,
    ) -> crate::Result<FetchProcess>;

    /// Version string reported by the tool, if it can be run
    async fn version(&self) -> Option<String>;

    /// Binary this fetcher executes, for diagnostics
    fn binary(&self) -> String;

    /// Get the name of this implementation
    fn name(&self) -> &'static str;
}
