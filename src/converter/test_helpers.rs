//! Shared test helpers for creating Converter instances in tests.

use crate::config::Config;
use crate::converter::Converter;
use crate::fetcher::CliFetcher;
use crate::types::{DownloadRequest, Event};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

/// Fake yt-dlp that reports progress three times and succeeds
pub(crate) const PROGRESS_SCRIPT: &str = r#"
echo "[youtube] abc123: Downloading webpage"
echo "[download] Destination: /tmp/Some Title.mp3"
echo "[download]  25.0% of 4.00MiB at 1.00MiB/s ETA 00:03"
echo "[download]   2.00MiB of 4.00MiB"
echo "[download] 100% of 4.00MiB in 00:00:01 at 4.00MiB/s"
exit 0
"#;

/// Fake yt-dlp that succeeds without printing any progress
pub(crate) const SILENT_SUCCESS_SCRIPT: &str = "echo 'nothing to see here'\nexit 0\n";

/// Fake yt-dlp that reports progress and then fails
pub(crate) const FAILING_SCRIPT: &str = r#"
echo "[download]  40.0% of 1.00MiB"
echo "ERROR: unable to download video data: HTTP Error 403: Forbidden" >&2
exit 2
"#;

/// Fake yt-dlp that reports a little progress and then hangs
pub(crate) const HANGING_SCRIPT: &str = r#"
echo "[download]  10.0% of 1.00MiB"
exec sleep 30
"#;

/// Write an executable `yt-dlp` shell script into `dir`
#[cfg(unix)]
pub(crate) fn write_fake_ytdlp(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("yt-dlp");
    std::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Config pointing the download directory into `temp_dir`
pub(crate) fn test_config(temp_dir: &Path) -> Config {
    let mut config = Config::default();
    config.download.download_dir = temp_dir.join("downloads");
    config.tools.search_path = false;
    std::fs::create_dir_all(&config.download.download_dir).unwrap();
    config
}

/// Converter running `binary` as yt-dlp.
/// Returns the converter and the tempdir (which must be kept alive).
pub(crate) fn create_converter_with_binary(
    binary: PathBuf,
    configure: impl FnOnce(&mut Config),
) -> (Converter, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();
    let mut config = test_config(temp_dir.path());
    configure(&mut config);

    let converter = Converter::with_fetcher(config, Arc::new(CliFetcher::new(binary)));
    (converter, temp_dir)
}

/// Converter whose yt-dlp is a shell script with the given body
#[cfg(unix)]
pub(crate) fn create_test_converter(script_body: &str) -> (Converter, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();
    let script = write_fake_ytdlp(temp_dir.path(), script_body);
    let config = test_config(temp_dir.path());

    let converter = Converter::with_fetcher(config, Arc::new(CliFetcher::new(script)));
    (converter, temp_dir)
}

/// Converter whose yt-dlp binary does not exist
pub(crate) fn create_converter_without_ytdlp() -> (Converter, tempfile::TempDir) {
    create_converter_with_binary(PathBuf::from("/nonexistent/path/to/yt-dlp"), |_| {})
}

pub(crate) fn mp3_request() -> DownloadRequest {
    DownloadRequest::new("https://www.youtube.com/watch?v=abc123", "mp3").unwrap()
}

/// Receive events until one matches, failing after 10 seconds
pub(crate) async fn wait_for_event(
    rx: &mut tokio::sync::broadcast::Receiver<Event>,
    mut predicate: impl FnMut(&Event) -> bool,
) -> Event {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let event = rx.recv().await.unwrap();
            if predicate(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}
