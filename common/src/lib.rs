pub mod job;
pub mod proto;

pub use job::JobId;
pub use proto::{Request, Response, RC_INVALID_JOB_ID, RC_INVALID_PARTITION};

// Well-known endpoints. The controller owns cluster-wide job state; every
// compute host runs a node daemon on the daemon port for host-local queries.
pub const DEFAULT_CONTROLLER_ADDR: &str = "127.0.0.1:6817";
pub const DEFAULT_DAEMON_PORT: u16 = 6818;
pub const DEFAULT_DAEMON_HOST: &str = "localhost";

/// Environment variable a job's processes inherit with their own job id.
pub const JOB_ID_ENV: &str = "JOBQ_JOB_ID";

/// How long a fetched end time is trusted before re-asking the controller.
pub const END_TIME_TTL_SECS: i64 = 60;
