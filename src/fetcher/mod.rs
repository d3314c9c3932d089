//! External download tool handling
//!
//! The core abstraction is the [`Fetcher`] trait, which starts the external
//! tool for one job and hands back a [`FetchProcess`]: a merged line stream
//! over the tool's stdout/stderr plus an awaitable exit status.
//!
//! - [`CliFetcher`]: runs the `yt-dlp` binary
//! - [`parser`]: turns individual output lines into progress fractions
//!
//! ## Usage
//!
//! ```no_run
//! use yt_converter::fetcher::{CliFetcher, Fetcher, ProgressParser, YtDlpProgressParser};
//! use yt_converter::types::MediaFormat;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = CliFetcher::from_path().expect("yt-dlp binary not found");
//!     let parser = YtDlpProgressParser;
//!
//!     let mut process = fetcher.launch(
//!         "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
//!         MediaFormat::Mp4,
//!         Path::new("/tmp/%(title)s.mp4"),
//!     )?;
//!     while let Some(line) = process.next_line().await {
//!         if let Some(progress) = parser.parse_progress(&line?) {
//!             println!("{:.1}%", progress * 100.0);
//!         }
//!     }
//!     println!("exit: {}", process.wait().await?);
//!     Ok(())
//! }
//! ```

mod cli;
pub mod parser;
mod process;
mod traits;

pub use cli::{CliFetcher, YTDLP_BINARY, build_args};
pub use parser::{ProgressParser, YtDlpProgressParser};
pub use process::FetchProcess;
pub use traits::Fetcher;
