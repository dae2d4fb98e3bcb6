//! Response classification.
//!
//! Each query has its own view of which reply shapes are acceptable, so
//! there is one classifier per request kind. Controller return codes split
//! into two buckets: the handful of codes that can never clear up on their
//! own, and everything else, which means "ask again later".

use common::{JobId, Response, RC_INVALID_JOB_ID, RC_INVALID_PARTITION};

/// What one round trip amounted to, per call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome<T> {
    /// Happy path.
    Value(T),
    /// Controller code that is not worth retrying.
    Permanent(i32),
    /// Controller code the caller should retry later.
    Transient(i32),
    /// The reply tag made no sense for this request.
    Protocol,
}

fn split_code<T>(code: i32) -> Outcome<T> {
    match code {
        RC_INVALID_JOB_ID | RC_INVALID_PARTITION => Outcome::Permanent(code),
        other => Outcome::Transient(other),
    }
}

/// Classify the reply to an end-time query.
pub fn end_time(resp: Response) -> Outcome<i64> {
    match resp {
        Response::EndTime(ts) => Outcome::Value(ts),
        Response::ReturnCode(code) => split_code(code),
        _ => Outcome::Protocol,
    }
}

/// Classify the reply to a readiness query.
///
/// `Ready(0)` is the only success; the controller reports readiness
/// failures through the generic return-code shape, so a non-zero code in a
/// readiness-shaped reply is treated as "not ready yet".
pub fn readiness(resp: Response) -> Outcome<()> {
    match resp {
        Response::Ready(0) => Outcome::Value(()),
        Response::Ready(code) => Outcome::Transient(code),
        Response::ReturnCode(code) => split_code(code),
        _ => Outcome::Protocol,
    }
}

/// Classify the reply to a pid-to-job-id query.
pub fn job_id(resp: Response) -> Outcome<JobId> {
    match resp {
        Response::JobId(id) => Outcome::Value(id),
        Response::ReturnCode(code) => split_code(code),
        _ => Outcome::Protocol,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognized_codes_are_permanent() {
        assert_eq!(
            end_time(Response::ReturnCode(RC_INVALID_JOB_ID)),
            Outcome::Permanent(RC_INVALID_JOB_ID)
        );
        assert_eq!(
            readiness(Response::ReturnCode(RC_INVALID_PARTITION)),
            Outcome::Permanent(RC_INVALID_PARTITION)
        );
    }

    #[test]
    fn other_codes_are_transient() {
        assert_eq!(end_time(Response::ReturnCode(11)), Outcome::Transient(11));
        assert_eq!(readiness(Response::ReturnCode(500)), Outcome::Transient(500));
        assert_eq!(job_id(Response::ReturnCode(11)), Outcome::Transient(11));
    }

    #[test]
    fn readiness_success_requires_zero() {
        assert_eq!(readiness(Response::Ready(0)), Outcome::Value(()));
        assert_eq!(readiness(Response::Ready(3)), Outcome::Transient(3));
    }

    #[test]
    fn wrong_shape_is_a_protocol_error() {
        assert_eq!(end_time(Response::Ready(0)), Outcome::Protocol);
        assert_eq!(readiness(Response::EndTime(1)), Outcome::Protocol);
        assert_eq!(job_id(Response::EndTime(1)), Outcome::Protocol);
    }

    #[test]
    fn happy_paths() {
        assert_eq!(end_time(Response::EndTime(1234)), Outcome::Value(1234));
        assert_eq!(job_id(Response::JobId(JobId(9))), Outcome::Value(JobId(9)));
    }
}
