use serde::{Deserialize, Serialize};
use crate::job::JobId;

/// One query sent to the controller or a node daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Request {
    /// Scheduled end time of a job (controller).
    EndTime(JobId),
    /// Whether a job's allocated nodes are usable now (controller).
    Ready(JobId),
    /// Which job owns a local process id (node daemon).
    PidToJobId(u32),
}

/// One answer from the controller or a node daemon.
///
/// Exactly one variant comes back per exchange. `Ready(0)` is the only
/// readiness success; any readiness failure arrives as `ReturnCode`
/// instead, carrying one of the controller codes below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Response {
    /// Scheduled end time, unix seconds.
    EndTime(i64),
    /// Job owning the queried pid.
    JobId(JobId),
    /// Readiness answer; 0 means the job can execute now.
    Ready(i32),
    /// Generic controller return code for anything else.
    ReturnCode(i32),
}

// Controller return codes the client gives special treatment. Everything
// else non-zero means "job exists but try again later".
pub const RC_INVALID_JOB_ID: i32 = 2001;
pub const RC_INVALID_PARTITION: i32 = 2002;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_wire_shape_is_stable() {
        let json = serde_json::to_string(&Response::EndTime(1_700_000_000)).unwrap();
        assert_eq!(json, r#"{"EndTime":1700000000}"#);
        let json = serde_json::to_string(&Request::PidToJobId(4242)).unwrap();
        assert_eq!(json, r#"{"PidToJobId":4242}"#);
    }
}
