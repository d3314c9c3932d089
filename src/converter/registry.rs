//! In-memory job table

use crate::types::{JobId, JobInfo, JobStatus};
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use tokio_util::sync::CancellationToken;

struct JobEntry {
    info: JobInfo,
    cancel: CancellationToken,
}

/// Running jobs plus a bounded tail of finished ones
///
/// Finished jobs are evicted oldest-first once more than `max_finished` have
/// accumulated. Running jobs are never evicted.
pub(crate) struct JobRegistry {
    jobs: HashMap<JobId, JobEntry>,
    finished: VecDeque<JobId>,
    max_finished: usize,
}

impl JobRegistry {
    pub(crate) fn new(max_finished: usize) -> Self {
        Self {
            jobs: HashMap::new(),
            finished: VecDeque::new(),
            max_finished,
        }
    }

    pub(crate) fn insert(&mut self, info: JobInfo, cancel: CancellationToken) {
        self.jobs.insert(info.id, JobEntry { info, cancel });
    }

    pub(crate) fn get(&self, id: JobId) -> Option<JobInfo> {
        self.jobs.get(&id).map(|entry| entry.info.clone())
    }

    /// Status and cancellation token of a job, if it is still known
    pub(crate) fn control(&self, id: JobId) -> Option<(JobStatus, CancellationToken)> {
        self.jobs
            .get(&id)
            .map(|entry| (entry.info.status, entry.cancel.clone()))
    }

    pub(crate) fn set_progress(&mut self, id: JobId, progress: f64) {
        if let Some(entry) = self.jobs.get_mut(&id) {
            entry.info.progress = Some(progress);
        }
    }

    /// Move a running job to a terminal status
    ///
    /// Returns false if the job is unknown or already finished.
    pub(crate) fn finish(&mut self, id: JobId, status: JobStatus, error: Option<String>) -> bool {
        let Some(entry) = self.jobs.get_mut(&id) else {
            return false;
        };
        if entry.info.status.is_finished() {
            return false;
        }

        entry.info.status = status;
        entry.info.error = error;
        entry.info.finished_at = Some(Utc::now());

        self.finished.push_back(id);
        while self.finished.len() > self.max_finished {
            if let Some(evicted) = self.finished.pop_front() {
                self.jobs.remove(&evicted);
            }
        }
        true
    }

    /// All known jobs, oldest first
    pub(crate) fn list(&self) -> Vec<JobInfo> {
        let mut jobs: Vec<JobInfo> = self.jobs.values().map(|e| e.info.clone()).collect();
        jobs.sort_by_key(|info| info.id);
        jobs
    }

    pub(crate) fn running_tokens(&self) -> Vec<(JobId, CancellationToken)> {
        self.jobs
            .values()
            .filter(|e| !e.info.status.is_finished())
            .map(|e| (e.info.id, e.cancel.clone()))
            .collect()
    }

    pub(crate) fn running_count(&self) -> usize {
        self.jobs
            .values()
            .filter(|e| !e.info.status.is_finished())
            .count()
    }
}
