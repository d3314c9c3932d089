//! yt-dlp invoked as an external binary

use super::process::FetchProcess;
use super::traits::Fetcher;
use crate::config::ToolsConfig;
use crate::types::MediaFormat;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Name looked up on PATH
pub const YTDLP_BINARY: &str = "yt-dlp";

/// Fetcher backed by the `yt-dlp` executable
#[derive(Debug, Clone)]
pub struct CliFetcher {
    binary_path: PathBuf,
    audio_format: String,
}

impl CliFetcher {
    /// Create a fetcher with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self {
            binary_path,
            audio_format: MediaFormat::Mp3.extension().to_string(),
        }
    }

    /// Override the codec requested for audio jobs
    pub fn with_audio_format(mut self, audio_format: impl Into<String>) -> Self {
        self.audio_format = audio_format.into();
        self
    }

    /// Attempt to find yt-dlp in PATH
    pub fn from_path() -> Option<Self> {
        which::which(YTDLP_BINARY).ok().map(Self::new)
    }

    /// Build from configuration
    ///
    /// An explicit `ytdlp_path` wins, then a PATH search (if enabled). When
    /// both come up empty the bare name is kept, so the missing binary shows
    /// up as a launch error on the first job instead of blocking startup.
    pub fn from_config(tools: &ToolsConfig) -> Self {
        let fetcher = if let Some(ref path) = tools.ytdlp_path {
            Self::new(path.clone())
        } else if tools.search_path
            && let Some(fetcher) = Self::from_path()
        {
            fetcher
        } else {
            tracing::warn!(
                binary = YTDLP_BINARY,
                "yt-dlp not found; downloads will fail until it is installed"
            );
            Self::new(PathBuf::from(YTDLP_BINARY))
        };

        fetcher.with_audio_format(tools.audio_format.clone())
    }

    /// Path of the executable
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }
}

/// Command-line arguments for one job
///
/// `mp3` picks the best audio stream and transcodes it to `audio_format`;
/// `mp4` picks the best single-file stream. `--newline` makes yt-dlp emit one
/// progress report per line instead of rewriting the same line.
pub fn build_args(
    url: &str,
    format: MediaFormat,
    output_template: &Path,
    audio_format: &str,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-f".into()];

    match format {
        MediaFormat::Mp3 => {
            args.push("bestaudio".into());
            args.push("--extract-audio".into());
            args.push("--audio-format".into());
            args.push(audio_format.into());
        }
        MediaFormat::Mp4 => args.push("best".into()),
    }

    args.push("--newline".into());
    args.push("--output".into());
    args.push(output_template.as_os_str().to_owned());
    args.push(url.into());
    args
}

#[async_trait]
impl Fetcher for CliFetcher {
    fn launch(
        &self,
        url: &str,
        format: MediaFormat,
        output_template: &Path,
    ) -> crate::Result<FetchProcess> {
        let mut command = Command::new(&self.binary_path);
        command
            .args(build_args(
                url,
                format,
                output_template,
                &self.audio_format,
            ))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group, so cancelling also stops ffmpeg
        #[cfg(unix)]
        command.process_group(0);

        let child = command
            .spawn()
            .map_err(|e| crate::Error::Launch {
                tool: self.binary_path.display().to_string(),
                message: e.to_string(),
            })?;

        FetchProcess::from_child(child).map_err(crate::Error::Io)
    }

    async fn version(&self) -> Option<String> {
        let output = Command::new(&self.binary_path)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .ok()?;

        if !output.status.success() {
            return None;
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!version.is_empty()).then_some(version)
    }

    fn binary(&self) -> String {
        self.binary_path.display().to_string()
    }

    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }
}
