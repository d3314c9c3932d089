//! Core converter implementation split into focused submodules.
//!
//! The `Converter` struct and its methods are organized by domain:
//! - [`job`] - Job submission and the subprocess drain loop
//! - [`control`] - Job inspection and cancellation
//! - [`lifecycle`] - Shutdown coordination
//! - [`registry`] - In-memory job table

mod control;
mod job;
mod lifecycle;
mod registry;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

pub use job::JobHandle;

use crate::config::Config;
use crate::error::Result;
use crate::events::EventPublisher;
use crate::fetcher::{CliFetcher, Fetcher, ProgressParser, YtDlpProgressParser};
use crate::types::{Capabilities, Event, FetcherInfo, MediaFormat};
use registry::JobRegistry;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64};

/// Job bookkeeping shared by every clone of the converter
#[derive(Clone)]
pub(crate) struct JobState {
    /// Running and recently finished jobs (protected by Mutex)
    pub(crate) registry: Arc<tokio::sync::Mutex<JobRegistry>>,
    /// Next job ID (starts at 1)
    pub(crate) next_job_id: Arc<AtomicU64>,
    /// Flag to indicate whether new jobs are accepted (set to false during shutdown)
    pub(crate) accepting_new: Arc<AtomicBool>,
}

impl JobState {
    fn new(max_finished_jobs: usize) -> Self {
        Self {
            registry: Arc::new(tokio::sync::Mutex::new(JobRegistry::new(max_finished_jobs))),
            next_job_id: Arc::new(AtomicU64::new(1)),
            accepting_new: Arc::new(AtomicBool::new(true)),
        }
    }
}

/// Main converter instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct Converter {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Event broadcast channel (multiple subscribers supported)
    pub(crate) events: EventPublisher,
    /// External download tool (trait object for pluggable implementations)
    pub(crate) fetcher: Arc<dyn Fetcher>,
    /// Turns tool output lines into progress fractions
    pub(crate) parser: Arc<dyn ProgressParser>,
    /// Job table, ID counter and accept flag
    pub(crate) job_state: JobState,
}

impl Converter {
    /// Create a new Converter instance
    ///
    /// Creates the download directory (with parents) and resolves the yt-dlp
    /// binary from configuration or PATH. A directory that cannot be created
    /// is fatal; a missing yt-dlp is not, and surfaces as a launch error on
    /// the first job.
    pub async fn new(config: Config) -> Result<Self> {
        crate::paths::ensure_download_dir(config.download_dir()).await?;

        let fetcher = CliFetcher::from_config(&config.tools);
        tracing::info!(
            fetcher = fetcher.name(),
            binary = %fetcher.binary_path().display(),
            download_dir = %config.download_dir().display(),
            "Converter initialized"
        );

        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    /// Create a converter around an explicit fetcher
    ///
    /// Does not touch the filesystem; callers are responsible for the
    /// download directory.
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher>) -> Self {
        let events = EventPublisher::new(config.server.api.event_buffer);
        let job_state = JobState::new(config.download.max_finished_jobs);

        Self {
            config: Arc::new(config),
            events,
            fetcher,
            parser: Arc::new(YtDlpProgressParser),
            job_state,
        }
    }

    /// Subscribe to job events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all events independently.
    /// A subscriber that falls behind by more than `event_buffer` events receives
    /// `RecvError::Lagged` and skips ahead.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use yt_converter::{Config, Converter};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let converter = Converter::new(Config::default()).await?;
    ///
    ///     let mut events = converter.subscribe();
    ///     tokio::spawn(async move {
    ///         while let Ok(event) = events.recv().await {
    ///             println!("{}: {:?}", event.name(), event.job_id());
    ///         }
    ///     });
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Query the external tool and supported formats
    ///
    /// Runs `yt-dlp --version`, so this is not free; callers should not poll it.
    pub async fn capabilities(&self) -> Capabilities {
        Capabilities {
            fetcher: FetcherInfo {
                handler: self.fetcher.name().to_string(),
                binary: self.fetcher.binary(),
                version: self.fetcher.version().await,
            },
            formats: vec![MediaFormat::Mp3, MediaFormat::Mp4],
            download_dir: self.config.download_dir().display().to_string(),
        }
    }

    /// Emit an event to all subscribers
    pub(crate) fn emit_event(&self, event: Event) {
        self.events.publish(event);
    }

    /// Spawn the REST API server in a background task
    ///
    /// Listens on the configured bind address (default: 127.0.0.1:5000).
    pub fn spawn_api_server(self: &Arc<Self>) -> tokio::task::JoinHandle<Result<()>> {
        let converter = self.clone();
        let config = self.config.clone();

        tokio::spawn(async move { crate::api::start_api_server(converter, config).await })
    }
}
