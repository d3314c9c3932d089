//! Job inspection and cancellation.

use super::Converter;
use crate::error::{Error, Result};
use crate::types::{JobId, JobInfo};

impl Converter {
    /// All running jobs plus the retained finished ones, oldest first
    pub async fn list_jobs(&self) -> Vec<JobInfo> {
        self.job_state.registry.lock().await.list()
    }

    /// Snapshot of a single job
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for ids that were never issued or whose
    /// finished job has been evicted.
    pub async fn get_job(&self, id: JobId) -> Result<JobInfo> {
        self.job_state
            .registry
            .lock()
            .await
            .get(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Cancel a running job
    ///
    /// Signals the job's task, which kills the subprocess and finishes the job
    /// as `cancelled`. Returns once the signal is sent, not once the process
    /// has exited.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the job is unknown
    /// - [`Error::InvalidState`] if the job has already finished
    pub async fn cancel(&self, id: JobId) -> Result<()> {
        let (status, token) = self
            .job_state
            .registry
            .lock()
            .await
            .control(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        if status.is_finished() {
            return Err(Error::InvalidState(format!(
                "job {} has already finished",
                id
            )));
        }

        token.cancel();
        tracing::info!(job_id = %id, "Cancellation requested");
        Ok(())
    }
}
