//! Shared helpers for integration tests

#![allow(dead_code, unused_imports, clippy::unwrap_used, clippy::expect_used)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use yt_converter::{CliFetcher, Config, Converter};

/// A server bound to an ephemeral port, aborted on drop
pub struct TestServer {
    pub address: SocketAddr,
    pub converter: Arc<Converter>,
    pub temp_dir: tempfile::TempDir,
    handle: JoinHandle<yt_converter::Result<()>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.address, path)
    }

    pub fn download_dir(&self) -> PathBuf {
        self.temp_dir.path().join("downloads")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Start a server whose yt-dlp is `binary`
///
/// `binary` is resolved by the caller; use [`write_fake_ytdlp`] for a script.
pub async fn start_server_with(binary: PathBuf, temp_dir: tempfile::TempDir) -> TestServer {
    let mut config = Config::default();
    config.download.download_dir = temp_dir.path().join("downloads");
    config.tools.search_path = false;
    std::fs::create_dir_all(&config.download.download_dir).unwrap();

    let converter = Arc::new(Converter::with_fetcher(
        config,
        Arc::new(CliFetcher::new(binary)),
    ));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let handle = tokio::spawn({
        let converter = converter.clone();
        let config = converter.get_config();
        async move { yt_converter::api::serve(listener, converter, config).await }
    });

    TestServer {
        address,
        converter,
        temp_dir,
        handle,
    }
}

/// Start a server whose yt-dlp binary does not exist
pub async fn start_server_without_ytdlp() -> TestServer {
    let temp_dir = tempfile::tempdir().unwrap();
    start_server_with(PathBuf::from("/nonexistent/path/to/yt-dlp"), temp_dir).await
}

/// Start a server whose yt-dlp is a shell script with the given body
#[cfg(unix)]
pub async fn start_scripted_server(script: &str) -> TestServer {
    let temp_dir = tempfile::tempdir().unwrap();
    let binary = write_fake_ytdlp(temp_dir.path(), script);
    start_server_with(binary, temp_dir).await
}

/// Write an executable `yt-dlp` shell script into `dir`
#[cfg(unix)]
pub fn write_fake_ytdlp(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("yt-dlp");
    std::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
