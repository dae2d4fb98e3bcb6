//! Request dispatch: one typed request in, one typed response out.
//!
//! No retry and no policy here; failures surface verbatim. The only job
//! beyond the round trip itself is housekeeping on the raw reply: the auth
//! credential is released on every path, and any drained downstream replies
//! are logged and discarded.

use common::{Request, Response};

use crate::error::TransportError;
use crate::transport::{RawReply, Transport};

pub struct Dispatcher<T: Transport> {
    transport: T,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// One exchange with the cluster controller.
    pub async fn send_controller(&self, req: &Request) -> Result<Response, TransportError> {
        let raw = self.transport.exchange_controller(req).await?;
        self.accept("controller", raw)
    }

    /// One exchange with the node daemon on `host`.
    pub async fn send_daemon(
        &self,
        req: &Request,
        host: &str,
    ) -> Result<Response, TransportError> {
        let raw = self.transport.exchange_daemon(req, host).await?;
        self.accept(host, raw)
    }

    /// Validate a raw reply and strip the envelope.
    ///
    /// The credential, when present, is released whatever the outcome.
    fn accept(&self, endpoint: &str, raw: RawReply) -> Result<Response, TransportError> {
        let RawReply {
            body,
            cred,
            downstream,
        } = raw;

        if !downstream.is_empty() {
            log::warn!(
                "dispatch: got {} downstream replies from {}, expecting 0",
                downstream.len(),
                endpoint
            );
        }

        let out = if cred.is_none() {
            log::error!("dispatch: reply from {} carried no auth credential", endpoint);
            Err(TransportError::MissingCredential {
                endpoint: endpoint.to_string(),
            })
        } else {
            body.ok_or_else(|| TransportError::EmptyReply {
                endpoint: endpoint.to_string(),
            })
        };

        if let Some(cred) = cred {
            self.transport.release_cred(cred);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::AuthCred;
    use common::JobId;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Transport that replays a scripted reply and counts credential churn.
    struct ScriptedTransport {
        reply: Mutex<Option<RawReply>>,
        issued: AtomicUsize,
        released: AtomicUsize,
    }

    impl ScriptedTransport {
        fn new(reply: RawReply) -> Self {
            let issued = reply.cred.is_some() as usize;
            Self {
                reply: Mutex::new(Some(reply)),
                issued: AtomicUsize::new(issued),
                released: AtomicUsize::new(0),
            }
        }
    }

    impl Transport for ScriptedTransport {
        async fn exchange_controller(&self, _req: &Request) -> Result<RawReply, TransportError> {
            Ok(self.reply.lock().unwrap().take().unwrap())
        }

        async fn exchange_daemon(
            &self,
            req: &Request,
            _host: &str,
        ) -> Result<RawReply, TransportError> {
            self.exchange_controller(req).await
        }

        fn release_cred(&self, _cred: AuthCred) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn reply(body: Option<Response>, cred: Option<u64>, downstream: Vec<Response>) -> RawReply {
        RawReply {
            body,
            cred: cred.map(AuthCred),
            downstream,
        }
    }

    #[tokio::test]
    async fn strips_envelope_and_releases_cred() {
        let t = ScriptedTransport::new(reply(Some(Response::EndTime(99)), Some(7), vec![]));
        let d = Dispatcher::new(t);
        let resp = d.send_controller(&Request::EndTime(JobId(1))).await.unwrap();
        assert!(matches!(resp, Response::EndTime(99)));
        assert_eq!(d.transport().released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_credential_is_a_transport_error() {
        let t = ScriptedTransport::new(reply(Some(Response::EndTime(99)), None, vec![]));
        let d = Dispatcher::new(t);
        let err = d
            .send_controller(&Request::EndTime(JobId(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::MissingCredential { .. }));
        assert_eq!(d.transport().released.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_body_still_releases_cred() {
        let t = ScriptedTransport::new(reply(None, Some(3), vec![]));
        let d = Dispatcher::new(t);
        let err = d
            .send_controller(&Request::EndTime(JobId(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::EmptyReply { .. }));
        assert_eq!(d.transport().issued.load(Ordering::SeqCst), 1);
        assert_eq!(d.transport().released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn downstream_replies_are_drained_not_fatal() {
        let extra = vec![Response::ReturnCode(0), Response::ReturnCode(0)];
        let t = ScriptedTransport::new(reply(Some(Response::Ready(0)), Some(1), extra));
        let d = Dispatcher::new(t);
        let resp = d.send_daemon(&Request::PidToJobId(42), "node9").await.unwrap();
        assert!(matches!(resp, Response::Ready(0)));
        assert_eq!(d.transport().released.load(Ordering::SeqCst), 1);
    }
}
