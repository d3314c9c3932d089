//! Core types for yt-converter

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Message returned when a request names no url or an unknown format
pub const INVALID_PARAMETERS_MESSAGE: &str =
    "Invalid parameters. Only mp3 and mp4 formats are allowed.";

/// Message returned when yt-dlp exits with status 0
pub const DOWNLOAD_COMPLETED_MESSAGE: &str = "Download completed successfully.";

/// Unique identifier for a job
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl JobId {
    /// Get the inner u64 value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for JobId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for JobId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Requested output format
///
/// `Mp3` selects the best audio stream and transcodes it to mp3. `Mp4`
/// selects the best combined stream; the extension is a container label,
/// not a codec guarantee.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    /// Audio only, transcoded to mp3
    Mp3,
    /// Best available video
    Mp4,
}

impl MediaFormat {
    /// File extension written into the output template
    pub fn extension(&self) -> &'static str {
        match self {
            MediaFormat::Mp3 => "mp3",
            MediaFormat::Mp4 => "mp4",
        }
    }

    /// Whether this format extracts audio only
    pub fn is_audio(&self) -> bool {
        matches!(self, MediaFormat::Mp3)
    }
}

impl std::fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for MediaFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mp3" => Ok(MediaFormat::Mp3),
            "mp4" => Ok(MediaFormat::Mp4),
            _ => Err(Error::Validation(INVALID_PARAMETERS_MESSAGE.to_string())),
        }
    }
}

/// Request body for `POST /download` and `POST /jobs`
///
/// Both fields are optional on the wire so that a missing or unknown value
/// is reported as a validation error rather than a JSON parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DownloadRequestBody {
    /// Media page URL, passed to yt-dlp as-is
    #[serde(default)]
    pub url: Option<String>,
    /// `"mp3"` or `"mp4"`
    #[serde(default)]
    pub format: Option<String>,
}

/// A validated download request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Non-empty media URL
    pub url: String,
    /// Requested format
    pub format: MediaFormat,
}

impl DownloadRequest {
    /// Build a validated request
    ///
    /// Rejects an absent or blank url and any format other than `mp3`/`mp4`.
    pub fn new(url: impl Into<String>, format: &str) -> Result<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(Error::Validation(INVALID_PARAMETERS_MESSAGE.to_string()));
        }
        Ok(Self {
            url,
            format: format.parse()?,
        })
    }
}

impl TryFrom<DownloadRequestBody> for DownloadRequest {
    type Error = Error;

    fn try_from(body: DownloadRequestBody) -> Result<Self> {
        match (body.url, body.format) {
            (Some(url), Some(format)) => DownloadRequest::new(url, &format),
            _ => Err(Error::Validation(INVALID_PARAMETERS_MESSAGE.to_string())),
        }
    }
}

/// Job status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Subprocess running
    Running,
    /// Subprocess exited with status 0
    Complete,
    /// Launch error, read error, or non-zero exit
    Failed,
    /// Cancelled by a client or by shutdown
    Cancelled,
}

impl JobStatus {
    /// Whether the job has reached a terminal state
    pub fn is_finished(&self) -> bool {
        !matches!(self, JobStatus::Running)
    }
}

/// Snapshot of a job for the inspection endpoints
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JobInfo {
    /// Job ID
    pub id: JobId,
    /// Source URL
    pub url: String,
    /// Requested format
    pub format: MediaFormat,
    /// Current status
    pub status: JobStatus,
    /// Last progress value parsed from yt-dlp output, if any
    pub progress: Option<f64>,
    /// Failure description for failed jobs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the job was accepted
    pub created_at: DateTime<Utc>,
    /// When the job reached a terminal state
    pub finished_at: Option<DateTime<Utc>>,
}

/// Response for a successful `POST /download`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DownloadResponse {
    /// Always "Download completed successfully."
    pub message: String,
}

impl DownloadResponse {
    /// The success response
    pub fn completed() -> Self {
        Self {
            message: DOWNLOAD_COMPLETED_MESSAGE.to_string(),
        }
    }
}

/// Response for `POST /jobs`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JobAccepted {
    /// ID of the started job
    pub id: JobId,
}

/// Event broadcast to real-time subscribers
///
/// Every job event carries the job id so concurrent jobs can be told apart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Subprocess launched for a job
    Started {
        /// Job ID
        id: JobId,
        /// Source URL
        url: String,
        /// Requested format
        format: MediaFormat,
    },

    /// Progress parsed from a line of yt-dlp output
    Progress {
        /// Job ID
        id: JobId,
        /// Fraction complete, nominally 0.0 to 1.0 (not clamped)
        progress: f64,
    },

    /// Subprocess exited successfully
    Complete {
        /// Job ID
        id: JobId,
    },

    /// Job failed
    Failed {
        /// Job ID
        id: JobId,
        /// Error message
        error: String,
    },

    /// Job cancelled before completion
    Cancelled {
        /// Job ID
        id: JobId,
    },

    /// Server shutting down
    Shutdown,
}

impl Event {
    /// Event name used on the SSE and WebSocket channels
    pub fn name(&self) -> &'static str {
        match self {
            Event::Started { .. } => "started",
            Event::Progress { .. } => "progress",
            Event::Complete { .. } => "complete",
            Event::Failed { .. } => "failed",
            Event::Cancelled { .. } => "cancelled",
            Event::Shutdown => "shutdown",
        }
    }

    /// Job this event belongs to, if any
    pub fn job_id(&self) -> Option<JobId> {
        match self {
            Event::Started { id, .. }
            | Event::Progress { id, .. }
            | Event::Complete { id }
            | Event::Failed { id, .. }
            | Event::Cancelled { id } => Some(*id),
            Event::Shutdown => None,
        }
    }
}

/// Information about the external download tool
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FetcherInfo {
    /// Name of the fetcher implementation in use
    pub handler: String,
    /// Binary that will be executed
    pub binary: String,
    /// Output of `--version`, when the binary could be run
    pub version: Option<String>,
}

/// Overall system capabilities
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Capabilities {
    /// External download tool
    pub fetcher: FetcherInfo,
    /// Supported output formats
    pub formats: Vec<MediaFormat>,
    /// Directory receiving finished files
    pub download_dir: String,
}
