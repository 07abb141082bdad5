use crate::{
    error::{Result, ToolError},
    service::{DocumentAiSession, JobStatus, ParseJob},
    submit::JobHandle,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Time source for the poll loop.
pub trait Clock: Send + Sync {
    /// Monotonic reading since an arbitrary origin.
    fn now(&self) -> Duration;
    fn sleep(&self, d: Duration);
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn sleep(&self, d: Duration) {
        (**self).sleep(d)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, d: Duration) {
        std::thread::sleep(d);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout_seconds: u64,
}

impl PollSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Terminal-success observation of a job.
#[derive(Debug, Clone)]
pub struct PollOutcome {
    pub job: ParseJob,
    pub polls: u32,
    pub elapsed: Duration,
}

/// Queries the job until it succeeds, fails, or the timeout elapses.
///
/// Pending and processing statuses sleep for `settings.interval` before the
/// next query. Any status other than those and success stops immediately.
pub fn poll(
    session: &dyn DocumentAiSession,
    clock: &dyn Clock,
    handle: &JobHandle,
    settings: &PollSettings,
) -> Result<PollOutcome> {
    let mut polls = 0u32;
    loop {
        let elapsed = clock.now().saturating_sub(handle.submitted_at);
        if elapsed >= settings.timeout() {
            warn!(
                "parse job {} still running after {}s",
                handle.job_id, settings.timeout_seconds
            );
            return Err(ToolError::Timeout {
                job_id: handle.job_id.clone(),
                timeout_seconds: settings.timeout_seconds,
            });
        }

        let job = session
            .get_parse(&handle.job_id)
            .map_err(ToolError::Service)?;
        polls += 1;
        debug!(
            "poll {} job_id={} status={} elapsed={:?}",
            polls, handle.job_id, job.status, elapsed
        );

        if !job.status.is_terminal() {
            clock.sleep(settings.interval);
            continue;
        }

        if job.status != JobStatus::Successful {
            warn!("parse job {} ended with status {}", handle.job_id, job.status);
            return Err(ToolError::RemoteTerminalFailure {
                status: job.status.to_string(),
            });
        }

        info!("parse job {} successful after {} polls", handle.job_id, polls);
        return Ok(PollOutcome {
            job,
            polls,
            elapsed: clock.now().saturating_sub(handle.submitted_at),
        });
    }
}
