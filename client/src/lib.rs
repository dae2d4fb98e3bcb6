pub mod cache;
pub mod classify;
pub mod dispatch;
pub mod error;
pub mod query;
pub mod system;
pub mod transport;

pub use cache::EndTimeCache;
pub use classify::Outcome;
pub use dispatch::Dispatcher;
pub use error::{QueryError, TransportError};
pub use query::{JobQuery, Readiness};
pub use system::{Clock, Environ, SystemClock, SystemEnv};
pub use transport::{AuthCred, RawReply, TcpTransport, Transport};
