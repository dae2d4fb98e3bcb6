use serde::{Deserialize, Serialize};

/// Numeric id of a job known to the controller.
///
/// Id 0 is reserved: it means "no job id given, resolve one from the
/// environment" and is never a valid job on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct JobId(pub u32);

impl JobId {
    /// Sentinel meaning "caller did not pass a job id".
    pub const UNSPECIFIED: JobId = JobId(0);

    pub fn is_unspecified(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for JobId {
    fn from(id: u32) -> Self {
        JobId(id)
    }
}
