//! The public query surface: remaining time, readiness, and pid-to-job-id
//! resolution, composed from the dispatcher, the classifier, and the
//! end-time cache.

use std::sync::Mutex;

use common::{JobId, Request, JOB_ID_ENV};

use crate::cache::EndTimeCache;
use crate::classify;
use crate::classify::Outcome;
use crate::dispatch::Dispatcher;
use crate::error::QueryError;
use crate::system::{Clock, Environ, SystemClock, SystemEnv};
use crate::transport::Transport;

/// Answer to a readiness query.
///
/// A typical caller loops on `NotReady` and stops on either terminal
/// variant. Backoff between polls is the caller's policy, not this crate's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Allocated resources are usable now.
    Ready,
    /// The job exists but is not ready yet; poll again.
    NotReady,
    /// The job will never become ready (controller code attached).
    Fatal(i32),
}

/// One handle for all job status queries issued by this process.
///
/// Owns the two pieces of process-wide state: the single-slot end-time
/// cache and the once-resolved default job id from the environment. Create
/// it once at startup and share it; the two states have independent
/// lifetimes (60-second TTL vs. process lifetime) and are kept separate.
pub struct JobQuery<T: Transport> {
    dispatcher: Dispatcher<T>,
    cache: EndTimeCache,
    /// Default job id from the environment. Resolved at most once to a
    /// real id; an absent or unparsable variable is re-read on the next
    /// call rather than cached.
    env_job_id: Mutex<Option<JobId>>,
    daemon_host: String,
    clock: Box<dyn Clock>,
    environ: Box<dyn Environ>,
}

impl<T: Transport> JobQuery<T> {
    pub fn new(transport: T) -> Self {
        Self {
            dispatcher: Dispatcher::new(transport),
            cache: EndTimeCache::new(),
            env_job_id: Mutex::new(None),
            daemon_host: common::DEFAULT_DAEMON_HOST.to_string(),
            clock: Box::new(SystemClock),
            environ: Box::new(SystemEnv),
        }
    }

    /// Node daemon to ask for host-local facts. Defaults to localhost.
    pub fn with_daemon_host(mut self, host: impl Into<String>) -> Self {
        self.daemon_host = host.into();
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_environ(mut self, environ: impl Environ + 'static) -> Self {
        self.environ = Box::new(environ);
        self
    }

    /// Scheduled end time of `job_id`, unix seconds, through the cache.
    ///
    /// Passing [`JobId::UNSPECIFIED`] means "my own job": the id is taken
    /// from the environment, which jobs inherit from the scheduler. With no
    /// id from either source this fails with `InvalidJobId` before any
    /// dispatch.
    pub async fn get_end_time(&self, job_id: JobId) -> Result<i64, QueryError> {
        let job_id = self.resolve_input(job_id)?;
        self.cache
            .get_end_time(&self.dispatcher, self.clock.as_ref(), job_id)
            .await
    }

    /// Seconds until the job's scheduled end, never negative.
    ///
    /// `None` means the end time could not be determined at all, which is
    /// different from an expired job reporting 0.
    pub async fn remaining_time(&self, job_id: JobId) -> Option<u64> {
        let end_time = self.get_end_time(job_id).await.ok()?;
        Some((end_time - self.clock.now()).max(0) as u64)
    }

    /// Whether the job's allocated resources are usable right now.
    ///
    /// Transport and protocol failures are errors, distinct from
    /// [`Readiness::NotReady`], so callers can tell "ask again" from
    /// "give up".
    pub async fn is_ready(&self, job_id: JobId) -> Result<Readiness, QueryError> {
        let resp = self
            .dispatcher
            .send_controller(&Request::Ready(job_id))
            .await?;
        match classify::readiness(resp) {
            Outcome::Value(()) => Ok(Readiness::Ready),
            Outcome::Transient(_) => Ok(Readiness::NotReady),
            Outcome::Permanent(code) => Ok(Readiness::Fatal(code)),
            Outcome::Protocol => Err(QueryError::Protocol),
        }
    }

    /// Ask the node-local daemon which job owns `pid` on this host.
    ///
    /// The daemon does not distinguish failure causes usefully here, so
    /// every classified failure collapses to [`QueryError::Unresolved`].
    pub async fn resolve_job_id(&self, pid: u32) -> Result<JobId, QueryError> {
        let resp = self
            .dispatcher
            .send_daemon(&Request::PidToJobId(pid), &self.daemon_host)
            .await?;
        match classify::job_id(resp) {
            Outcome::Value(id) => Ok(id),
            Outcome::Permanent(_) | Outcome::Transient(_) | Outcome::Protocol => {
                Err(QueryError::Unresolved(pid))
            }
        }
    }

    /// Replace the sentinel with the once-resolved environment default.
    fn resolve_input(&self, job_id: JobId) -> Result<JobId, QueryError> {
        if !job_id.is_unspecified() {
            return Ok(job_id);
        }

        let mut cached = self.env_job_id.lock().unwrap();
        if let Some(id) = *cached {
            return Ok(id);
        }

        let from_env = self
            .environ
            .get(JOB_ID_ENV)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .map(JobId)
            .filter(|id| !id.is_unspecified());

        match from_env {
            Some(id) => {
                *cached = Some(id);
                Ok(id)
            }
            None => Err(QueryError::InvalidJobId),
        }
    }
}
