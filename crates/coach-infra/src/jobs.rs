//! In-process job queue backed by a bounded tokio mpsc channel.
//!
//! `enqueue` never waits: a full channel drops the job with
//! [`JobError::QueueFull`]. Extraction jobs are safe to lose, the next user
//! message schedules another one.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use coach_core::jobs::{Job, JobError, JobHandler, JobQueue};

/// Sending half of the job channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct TokioJobQueue {
    tx: mpsc::Sender<Job>,
}

/// Receiving half, consumed by [`spawn_worker`].
#[derive(Debug)]
pub struct JobReceiver {
    rx: mpsc::Receiver<Job>,
}

/// Create a queue with room for `capacity` pending jobs.
pub fn job_channel(capacity: usize) -> (TokioJobQueue, JobReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (TokioJobQueue { tx }, JobReceiver { rx })
}

impl JobQueue for TokioJobQueue {
    fn enqueue(&self, job: Job) -> Result<(), JobError> {
        let kind = job.kind();
        self.tx.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => JobError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => JobError::Closed,
        })?;
        tracing::debug!(kind, "job enqueued");
        Ok(())
    }
}

/// Drain the queue on a background task, one job at a time.
///
/// The task ends once every [`TokioJobQueue`] clone has been dropped and
/// the backlog is empty.
pub fn spawn_worker<H: JobHandler>(receiver: JobReceiver, handler: Arc<H>) -> JoinHandle<()> {
    let JobReceiver { mut rx } = receiver;
    tokio::spawn(async move {
        tracing::info!("job worker started");
        while let Some(job) = rx.recv().await {
            let kind = job.kind();
            let user_id = job.user_id();
            tracing::debug!(kind, %user_id, "job started");
            handler.handle(job).await;
            tracing::debug!(kind, %user_id, "job finished");
        }
        tracing::info!("job worker stopped");
    })
}
