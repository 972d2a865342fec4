//! Per-video processing job and its state machine.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Stages a running job moves through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStage {
    Validating,
    Extracting,
    Enhancing,
    Remuxing,
    Delivering,
}

/// Job lifecycle. `Failed` is terminal and reachable from any stage; there
/// is no retry, the user must resubmit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Running(JobStage),
    Done,
    Failed { reason: String },
}

/// One end-to-end processing request for a single submitted video.
#[derive(Debug)]
pub struct ProcessingJob {
    pub id: u64,
    pub input_path: PathBuf,
    pub output_path: PathBuf,

    /// Input size in bytes, filled during validation.
    pub size_bytes: u64,

    /// Probed source duration, filled during validation.
    pub duration_secs: f64,

    state: JobState,
}

static NEXT_JOB_ID: AtomicU64 = AtomicU64::new(1);

impl ProcessingJob {
    pub fn new(input_path: &Path, output_path: &Path) -> Self {
        Self {
            id: NEXT_JOB_ID.fetch_add(1, Ordering::Relaxed),
            input_path: input_path.to_path_buf(),
            output_path: output_path.to_path_buf(),
            size_bytes: 0,
            duration_secs: 0.0,
            state: JobState::Running(JobStage::Validating),
        }
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.state, JobState::Running(_))
    }

    /// Move to the next stage. Ignored once the job is terminal.
    pub fn advance(&mut self, stage: JobStage) {
        if self.is_terminal() {
            tracing::warn!(job = self.id, ?stage, "Ignoring advance on terminal job");
            return;
        }
        tracing::info!(job = self.id, from = ?self.state, to = ?stage, "Job stage transition");
        self.state = JobState::Running(stage);
    }

    pub fn complete(&mut self) {
        if self.is_terminal() {
            return;
        }
        tracing::info!(job = self.id, "Job completed");
        self.state = JobState::Done;
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        if self.is_terminal() {
            return;
        }
        let reason = reason.into();
        tracing::error!(job = self.id, from = ?self.state, %reason, "Job failed");
        self.state = JobState::Failed { reason };
    }
}
