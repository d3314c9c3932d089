//! Job submission and execution
//!
//! A job wraps one yt-dlp invocation: launch, drain the output stream while
//! publishing progress, wait for the exit status, then record the outcome.
//! Each job runs as its own task so that a dropped HTTP connection does not
//! stop the subprocess.

use super::Converter;
use crate::error::{Error, Result};
use crate::fetcher::FetchProcess;
use crate::paths;
use crate::types::{DownloadRequest, Event, JobId, JobInfo, JobStatus};
use chrono::Utc;
use std::process::ExitStatus;
use std::sync::atomic::Ordering;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// A submitted job whose outcome can be awaited
#[derive(Debug)]
pub struct JobHandle {
    /// ID assigned to the job
    pub id: JobId,
    outcome: oneshot::Receiver<Result<()>>,
}

impl JobHandle {
    /// Wait for the job to reach a terminal state
    ///
    /// Dropping the handle instead lets the job run to completion unobserved.
    pub async fn outcome(self) -> Result<()> {
        self.outcome
            .await
            .map_err(|_| Error::Other("job task ended without reporting an outcome".into()))?
    }
}

enum Step {
    Line(String),
    ReadError(std::io::Error),
    Eof,
    Cancelled,
}

impl Converter {
    /// Start a job and return immediately
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShuttingDown`] once shutdown has begun. Launch and
    /// download failures are reported through [`JobHandle::outcome`] and the
    /// event stream, not here.
    pub async fn submit(&self, request: DownloadRequest) -> Result<JobHandle> {
        let cancel = CancellationToken::new();

        // Checked under the registry lock so shutdown cannot miss a job
        // inserted concurrently with it
        let id = {
            let mut registry = self.job_state.registry.lock().await;
            if !self.job_state.accepting_new.load(Ordering::SeqCst) {
                return Err(Error::ShuttingDown);
            }

            let id = JobId(self.job_state.next_job_id.fetch_add(1, Ordering::SeqCst));
            registry.insert(
                JobInfo {
                    id,
                    url: request.url.clone(),
                    format: request.format,
                    status: JobStatus::Running,
                    progress: None,
                    error: None,
                    created_at: Utc::now(),
                    finished_at: None,
                },
                cancel.clone(),
            );
            id
        };

        tracing::info!(
            job_id = %id,
            url = %request.url,
            format = %request.format,
            "Job accepted"
        );

        let (tx, rx) = oneshot::channel();
        let converter = self.clone();
        tokio::spawn(async move {
            let result = converter.run_job(id, &request, cancel).await;
            converter.finish_job(id, &result).await;
            // The submitter may have gone away; the outcome is already recorded
            tx.send(result).ok();
        });

        Ok(JobHandle { id, outcome: rx })
    }

    /// Run a job to completion
    ///
    /// Blocks (asynchronously) until yt-dlp exits. `Ok(())` means exit
    /// status 0, regardless of how much progress was reported.
    pub async fn download(&self, request: DownloadRequest) -> Result<()> {
        self.submit(request).await?.outcome().await
    }

    async fn run_job(
        &self,
        id: JobId,
        request: &DownloadRequest,
        cancel: CancellationToken,
    ) -> Result<()> {
        let template = paths::output_template(self.config.download_dir(), request.format);

        let mut process = self
            .fetcher
            .launch(&request.url, request.format, &template)?;

        tracing::info!(
            job_id = %id,
            pid = ?process.pid(),
            output = %template.display(),
            "yt-dlp launched"
        );
        self.emit_event(Event::Started {
            id,
            url: request.url.clone(),
            format: request.format,
        });

        loop {
            let step = tokio::select! {
                biased;
                _ = cancel.cancelled() => Step::Cancelled,
                line = process.next_line() => match line {
                    Some(Ok(line)) => Step::Line(line),
                    Some(Err(e)) => Step::ReadError(e),
                    None => Step::Eof,
                },
            };

            match step {
                Step::Line(line) => self.handle_line(id, &line).await,
                Step::Eof => break,
                Step::ReadError(e) => {
                    tracing::error!(job_id = %id, error = %e, "Failed to read yt-dlp output");
                    return Err(Error::Io(e));
                }
                Step::Cancelled => return stop_cancelled(id, &mut process).await,
            }
        }

        // Output closed; the process may still be finishing up (e.g. transcoding).
        // An exit that is already available wins over a late cancel.
        let status = tokio::select! {
            biased;
            status = process.wait() => Some(status?),
            _ = cancel.cancelled() => None,
        };

        match status {
            Some(status) => exit_outcome(id, status),
            None => stop_cancelled(id, &mut process).await,
        }
    }

    async fn handle_line(&self, id: JobId, line: &str) {
        tracing::debug!(job_id = %id, line, "yt-dlp");

        let Some(progress) = self.parser.parse_progress(line) else {
            return;
        };

        self.job_state
            .registry
            .lock()
            .await
            .set_progress(id, progress);
        self.events.publish_progress(id, progress);
    }

    async fn finish_job(&self, id: JobId, result: &Result<()>) {
        let (status, error, event) = match result {
            Ok(()) => (JobStatus::Complete, None, Event::Complete { id }),
            Err(Error::Cancelled) => (JobStatus::Cancelled, None, Event::Cancelled { id }),
            Err(e) => (
                JobStatus::Failed,
                Some(e.to_string()),
                Event::Failed {
                    id,
                    error: e.to_string(),
                },
            ),
        };

        self.job_state
            .registry
            .lock()
            .await
            .finish(id, status, error);

        match result {
            Ok(()) => tracing::info!(job_id = %id, "Download completed"),
            Err(Error::Cancelled) => tracing::info!(job_id = %id, "Download cancelled"),
            Err(e) => tracing::error!(job_id = %id, error = %e, "Download failed"),
        }

        self.emit_event(event);
    }
}

fn exit_outcome(id: JobId, status: ExitStatus) -> Result<()> {
    if status.success() {
        Ok(())
    } else {
        tracing::warn!(job_id = %id, exit_code = ?status.code(), "yt-dlp exited with failure");
        Err(Error::DownloadFailed {
            code: status.code(),
        })
    }
}

/// Settle a job whose cancellation token fired
///
/// A process that already exited keeps its real outcome; only a live one is
/// killed and reported as cancelled.
pub(super) async fn stop_cancelled(id: JobId, process: &mut FetchProcess) -> Result<()> {
    match process.try_wait() {
        Ok(Some(status)) => {
            tracing::debug!(job_id = %id, "yt-dlp exited before cancellation took effect");
            exit_outcome(id, status)
        }
        Ok(None) => {
            terminate(id, process).await;
            Err(Error::Cancelled)
        }
        Err(e) => {
            tracing::warn!(job_id = %id, error = %e, "Failed to poll yt-dlp exit status");
            terminate(id, process).await;
            Err(Error::Cancelled)
        }
    }
}

async fn terminate(id: JobId, process: &mut FetchProcess) {
    if let Err(e) = process.kill().await {
        tracing::warn!(job_id = %id, error = %e, "Failed to kill yt-dlp");
    } else {
        tracing::debug!(job_id = %id, "yt-dlp killed");
    }
}
