//! Short-lived cache for a job's scheduled end time.
//!
//! A running job polls its own remaining time every few seconds; the
//! controller must not see a round trip for every poll. The cache holds a
//! single slot, the most recently fetched end time for one job, trusted for
//! [`END_TIME_TTL_SECS`]. Querying a different job id overwrites the slot.
//!
//! When a fresh fetch fails and the slot holds any non-zero end time, the
//! stale value is returned instead of the failure, even when it was cached
//! for a different job id. A transient controller hiccup must not make a
//! running job conclude it has already expired. See
//! `stale_fallback_ignores_job_id_mismatch` in the integration tests for
//! the cross-job consequence of this rule.

use tokio::sync::Mutex;

use common::{JobId, Request, END_TIME_TTL_SECS};

use crate::classify;
use crate::classify::Outcome;
use crate::dispatch::Dispatcher;
use crate::error::QueryError;
use crate::system::Clock;
use crate::transport::Transport;

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    job_id: JobId,
    end_time: i64,
    fetched_at: i64,
}

#[derive(Default)]
pub struct EndTimeCache {
    slot: Mutex<Option<CacheEntry>>,
}

impl EndTimeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduled end time for `job_id`, unix seconds.
    ///
    /// `job_id` must already be resolved; the sentinel is rejected upstream.
    /// The slot lock is held across the dispatch so the age check and the
    /// overwrite are atomic per call.
    pub async fn get_end_time<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
        clock: &dyn Clock,
        job_id: JobId,
    ) -> Result<i64, QueryError> {
        let mut slot = self.slot.lock().await;

        if let Some(entry) = slot.as_ref() {
            let age = clock.now() - entry.fetched_at;
            if entry.job_id == job_id && age < END_TIME_TTL_SECS {
                return Ok(entry.end_time);
            }
        }

        let outcome = match dispatcher.send_controller(&Request::EndTime(job_id)).await {
            Ok(resp) => classify::end_time(resp),
            Err(err) => return Self::fall_back(&slot, QueryError::Transport(err)),
        };

        match outcome {
            Outcome::Value(end_time) => {
                *slot = Some(CacheEntry {
                    job_id,
                    end_time,
                    fetched_at: clock.now(),
                });
                Ok(end_time)
            }
            Outcome::Permanent(code) => Self::fall_back(&slot, QueryError::Permanent(code)),
            Outcome::Transient(code) => Self::fall_back(&slot, QueryError::Transient(code)),
            Outcome::Protocol => Self::fall_back(&slot, QueryError::Protocol),
        }
    }

    /// Prefer whatever is cached, stale or not, over surfacing `err`.
    /// Does not refresh the entry's fetch time.
    fn fall_back(slot: &Option<CacheEntry>, err: QueryError) -> Result<i64, QueryError> {
        match slot.as_ref().filter(|e| e.end_time != 0) {
            Some(entry) => {
                log::warn!(
                    "end-time fetch failed ({}), falling back to cached value for job {}",
                    err,
                    entry.job_id
                );
                Ok(entry.end_time)
            }
            None => Err(err),
        }
    }
}
