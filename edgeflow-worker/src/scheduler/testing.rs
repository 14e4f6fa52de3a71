//! Scripted scheduler used by the run loop and readiness tests

use async_trait::async_trait;
use edgeflow_client::{ClientError, Job, JobId, ProbeOutcome, Result};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::repository::JobRepository;

/// One scripted answer to `GET /jobs/next`
pub enum Reply {
    Job(Job),
    Empty,
    Unavailable,
    Malformed,
}

/// Replays `replies` in order, then cancels `shutdown` on the next poll
pub struct ScriptedScheduler {
    replies: Mutex<VecDeque<Reply>>,
    shutdown: CancellationToken,
    probe_failures: AtomicUsize,
    probe_status: u16,
    probe_job: Mutex<Option<Job>>,
    fail_completions: AtomicBool,
    probes: AtomicUsize,
    polls: AtomicUsize,
    completed: Mutex<Vec<JobId>>,
}

impl ScriptedScheduler {
    pub fn new(replies: Vec<Reply>, shutdown: CancellationToken) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            shutdown,
            probe_failures: AtomicUsize::new(0),
            probe_status: 204,
            probe_job: Mutex::new(None),
            fail_completions: AtomicBool::new(false),
            probes: AtomicUsize::new(0),
            polls: AtomicUsize::new(0),
            completed: Mutex::new(Vec::new()),
        }
    }

    /// Fail the first `n` probes as if the scheduler were down
    pub fn with_probe_failures(self, n: usize) -> Self {
        self.probe_failures.store(n, Ordering::SeqCst);
        self
    }

    pub fn with_probe_status(mut self, status: u16) -> Self {
        self.probe_status = status;
        self
    }

    pub fn with_probe_job(self, job: Job) -> Self {
        *self.probe_job.lock().unwrap() = Some(job);
        self
    }

    pub fn failing_completions(self) -> Self {
        self.fail_completions.store(true, Ordering::SeqCst);
        self
    }

    pub fn completed(&self) -> Vec<JobId> {
        self.completed.lock().unwrap().clone()
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

fn unreachable_error() -> ClientError {
    ClientError::api_error(503, "scheduler unreachable")
}

#[async_trait]
impl JobRepository for ScriptedScheduler {
    async fn probe(&self, _timeout: Duration) -> Result<ProbeOutcome> {
        self.probes.fetch_add(1, Ordering::SeqCst);

        let remaining = self.probe_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.probe_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(unreachable_error());
        }

        Ok(ProbeOutcome {
            status: self.probe_status,
            job: self.probe_job.lock().unwrap().take(),
        })
    }

    async fn next_job(&self) -> Result<Option<Job>> {
        self.polls.fetch_add(1, Ordering::SeqCst);

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Job(job)) => Ok(Some(job)),
            Some(Reply::Empty) => Ok(None),
            Some(Reply::Unavailable) => Err(unreachable_error()),
            Some(Reply::Malformed) => Err(ClientError::ParseError(
                "missing field `imagePath`".to_string(),
            )),
            None => {
                self.shutdown.cancel();
                Ok(None)
            }
        }
    }

    async fn complete_job(&self, job_id: &JobId) -> Result<()> {
        if self.fail_completions.load(Ordering::SeqCst) {
            return Err(ClientError::api_error(500, "completion rejected"));
        }
        self.completed.lock().unwrap().push(job_id.clone());
        Ok(())
    }
}
