//! # yt-converter
//!
//! Local HTTP server that turns media URLs into mp3 or mp4 files with
//! `yt-dlp`, streaming download progress to browsers in real time.
//!
//! ## Overview
//!
//! - A client posts `{ "url", "format" }` to `/download` (blocking) or
//!   `/jobs` (background).
//! - The [`Converter`] launches `yt-dlp` for the job, reads its combined
//!   output line by line, and turns `[download]` lines into progress values.
//! - Every progress value is broadcast as an [`Event`] carrying the job id,
//!   delivered over Server-Sent Events (`/events`) and WebSocket (`/ws`).
//! - Finished files land in `~/Downloads/Youtube Converter`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use yt_converter::{Config, Converter, DownloadRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = Converter::new(Config::default()).await?;
//!
//!     // Subscribe to events
//!     let mut events = converter.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let request = DownloadRequest::new("https://www.youtube.com/watch?v=dQw4w9WgXcQ", "mp3")?;
//!     converter.download(request).await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Job execution and control (decomposed into focused submodules)
pub mod converter;
/// Error types
pub mod error;
/// Real-time event broadcasting
pub mod events;
/// External download tool (yt-dlp) invocation and output parsing
pub mod fetcher;
/// Download directory and output templates
pub mod paths;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use converter::{Converter, JobHandle};
pub use error::{ApiError, Error, Result, ToHttpStatus};
pub use events::EventPublisher;
pub use fetcher::{CliFetcher, Fetcher, ProgressParser, YtDlpProgressParser};
pub use types::{DownloadRequest, Event, JobId, JobInfo, JobStatus, MediaFormat};

/// Helper function to run the converter with graceful signal handling.
///
/// Waits for a termination signal and then calls the converter's `shutdown()` method.
///
/// - **Unix:** listens for SIGTERM and Ctrl+C (SIGINT); Ctrl+C alone if SIGTERM cannot be registered.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use yt_converter::{Config, Converter, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let converter = Converter::new(Config::default()).await?;
///
///     // Run with automatic signal handling
///     run_with_shutdown(converter).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(converter: Converter) -> Result<()> {
    wait_for_signal().await;
    converter.shutdown().await
}

/// Resolve on SIGTERM or Ctrl+C (Ctrl+C only on non-unix platforms)
#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration fails in some sandboxes; Ctrl+C still works there
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            tracing::warn!(error = %e, "SIGTERM handler unavailable, stopping on Ctrl+C only");
            wait_for_ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => tracing::info!(signal = "SIGTERM", "Stopping yt-converter"),
        _ = wait_for_ctrl_c() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!(signal = "SIGINT", "Stopping yt-converter"),
        Err(e) => {
            // Without a handler there is nothing to wait for; keep serving
            tracing::error!(error = %e, "Cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}
