//! Live handle on a running download subprocess

use futures::Stream;
use std::io;
use std::pin::Pin;
use std::process::ExitStatus;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio_stream::StreamExt;

type LineStream = Pin<Box<dyn Stream<Item = io::Result<String>> + Send>>;

/// A launched subprocess whose stdout and stderr are read as one line stream
///
/// Lines from both pipes interleave in arrival order. The stream ends once
/// both pipes are closed, which normally happens when the process exits.
/// Dropping the handle kills the process.
pub struct FetchProcess {
    child: Child,
    lines: LineStream,
}

impl FetchProcess {
    /// Wrap a child spawned with piped stdout and stderr
    pub fn from_child(mut child: Child) -> io::Result<Self> {
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("child stdout was not piped"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("child stderr was not piped"))?;

        let lines = lossy_lines(stdout).merge(lossy_lines(stderr));

        Ok(Self {
            child,
            lines: Box::pin(lines),
        })
    }

    /// OS process id, if the process has not been reaped yet
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Next line of combined output, `None` at end of stream
    pub async fn next_line(&mut self) -> Option<io::Result<String>> {
        self.lines.next().await
    }

    /// Wait for the process to exit
    pub async fn wait(&mut self) -> io::Result<ExitStatus> {
        self.child.wait().await
    }

    /// Exit status if the process has already exited, without blocking
    pub fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        self.child.try_wait()
    }

    /// Kill the process and reap it
    ///
    /// On unix the whole process group goes too, so post-processors such as
    /// ffmpeg do not outlive a cancelled job. This only reaches helpers when
    /// the child was spawned as a group leader (see `CliFetcher`).
    pub async fn kill(&mut self) -> io::Result<()> {
        #[cfg(unix)]
        if let Some(pid) = self.child.id() {
            kill_process_group(pid);
        }
        self.child.kill().await
    }
}

impl std::fmt::Debug for FetchProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchProcess")
            .field("pid", &self.child.id())
            .finish_non_exhaustive()
    }
}

#[cfg(unix)]
fn kill_process_group(pid: u32) {
    let Ok(pgid) = libc::pid_t::try_from(pid) else {
        return;
    };
    // ESRCH when the child is not a group leader; the direct kill still follows
    // SAFETY: killpg only sends a signal, no memory is shared with the callee
    unsafe {
        libc::killpg(pgid, libc::SIGKILL);
    }
}

/// Split a pipe into lines without failing on invalid UTF-8
///
/// Titles in tool output are not guaranteed to be valid UTF-8; such bytes are
/// replaced rather than ending the stream. Trailing `\r`/`\n` are stripped.
fn lossy_lines<R>(reader: R) -> impl Stream<Item = io::Result<String>> + Send
where
    R: AsyncRead + Unpin + Send + 'static,
{
    futures::stream::unfold(Some(BufReader::new(reader)), |state| async move {
        let mut reader = state?;
        let mut buf = Vec::new();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => None,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf)
                    .trim_end_matches(['\r', '\n'])
                    .to_string();
                Some((Ok(line), Some(reader)))
            }
            Err(e) => Some((Err(e), None)),
        }
    })
}
