//! Error types for the query client.

use thiserror::Error;

/// A round trip to the controller or a node daemon failed outright.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("i/o error talking to {endpoint}: {source}")]
    Io {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed reply from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// The peer answered but the reply carried no auth credential.
    #[error("reply from {endpoint} carried no auth credential")]
    MissingCredential { endpoint: String },

    /// The peer answered with an envelope that held no response body.
    #[error("empty reply from {endpoint}")]
    EmptyReply { endpoint: String },
}

/// Everything a query operation can report to its caller.
#[derive(Debug, Error)]
pub enum QueryError {
    /// No job id was given and none could be resolved from the environment.
    #[error("no job id given and none set in {}", common::JOB_ID_ENV)]
    InvalidJobId,

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The reply tag did not match anything this request can produce.
    #[error("unexpected reply shape for this request")]
    Protocol,

    /// Controller code that will not clear up on its own.
    #[error("controller reported permanent failure (code {0})")]
    Permanent(i32),

    /// Controller code worth retrying later.
    #[error("controller reported transient failure (code {0})")]
    Transient(i32),

    /// The node daemon could not map the pid to a job.
    #[error("could not resolve a job id for pid {0}")]
    Unresolved(u32),
}
