//! Shutdown coordination.

use crate::error::Result;
use crate::types::Event;
use std::sync::atomic::Ordering;
use std::time::Duration;

use super::Converter;

/// How long shutdown waits for cancelled jobs to finish
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

impl Converter {
    /// Gracefully shut down the converter
    ///
    /// This method performs a graceful shutdown sequence:
    /// 1. Stops accepting new jobs (`submit` returns `ShuttingDown`)
    /// 2. Cancels all running jobs, killing their subprocesses
    /// 3. Waits for the job tasks to finish with a timeout (30 seconds)
    /// 4. Emits the `shutdown` event
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        // 1. Stop accepting new jobs
        self.job_state.accepting_new.store(false, Ordering::SeqCst);
        tracing::info!("Stopped accepting new jobs");

        // 2. Cancel everything still running
        self.cancel_all().await;

        // 3. Wait for job tasks to record their outcome
        match tokio::time::timeout(SHUTDOWN_TIMEOUT, self.wait_for_running_jobs()).await {
            Ok(()) => tracing::info!("All running jobs finished"),
            Err(_) => {
                tracing::warn!("Timeout waiting for jobs to finish, proceeding with shutdown")
            }
        }

        // 4. Emit shutdown event
        self.emit_event(Event::Shutdown);

        tracing::info!("Graceful shutdown complete");
        Ok(())
    }

    /// Whether new jobs are currently accepted
    pub fn is_accepting(&self) -> bool {
        self.job_state.accepting_new.load(Ordering::SeqCst)
    }

    async fn cancel_all(&self) {
        let running = self.job_state.registry.lock().await.running_tokens();
        tracing::debug!(running_count = running.len(), "Cancelling all running jobs");

        for (id, token) in running {
            tracing::debug!(job_id = %id, "Signaling cancellation");
            token.cancel();
        }
    }

    async fn wait_for_running_jobs(&self) {
        loop {
            let running_count = self.job_state.registry.lock().await.running_count();
            if running_count == 0 {
                return;
            }

            tracing::debug!(running_count, "Waiting for running jobs to finish");
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}
