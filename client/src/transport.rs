//! Wire transport: one JSON request/reply exchange per call.
//!
//! The byte-level framing lives entirely here. Everything above this module
//! only sees [`Request`], [`RawReply`] and [`TransportError`].

use std::sync::atomic::{AtomicI64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use common::{Request, Response};

use crate::error::TransportError;

/// Auth credential attached to a reply.
///
/// Issued by the transport while decoding the envelope; the dispatcher must
/// hand it back through [`Transport::release_cred`] on every path.
#[derive(Debug)]
pub struct AuthCred(pub u64);

/// One decoded reply envelope, before any classification.
///
/// `downstream` holds replies a node daemon drained from hosts further down
/// a forwarding chain; a direct query expects it empty.
#[derive(Debug, Default)]
pub struct RawReply {
    pub body: Option<Response>,
    pub cred: Option<AuthCred>,
    pub downstream: Vec<Response>,
}

/// On-the-wire reply envelope.
#[derive(Debug, Serialize, Deserialize)]
struct WireReply {
    #[serde(default)]
    cred: Option<u64>,
    #[serde(default)]
    body: Option<Response>,
    #[serde(default)]
    downstream: Vec<Response>,
}

/// One reliable exchange with the controller or a named node daemon.
///
/// Implementations perform exactly one round trip per call and never retry.
#[allow(async_fn_in_trait)]
pub trait Transport: Send + Sync {
    async fn exchange_controller(&self, req: &Request) -> Result<RawReply, TransportError>;

    async fn exchange_daemon(&self, req: &Request, host: &str)
        -> Result<RawReply, TransportError>;

    /// Return a credential taken from a reply. Must be called exactly once
    /// per credential handed out.
    fn release_cred(&self, cred: AuthCred);
}

fn io_err(endpoint: &str, source: std::io::Error) -> TransportError {
    TransportError::Io {
        endpoint: endpoint.to_string(),
        source,
    }
}

/// Production transport: JSON over TCP, one connection per exchange.
pub struct TcpTransport {
    controller_addr: String,
    daemon_port: u16,
    /// Credentials handed out but not yet released. Goes negative or grows
    /// without bound only if the dispatcher mishandles a path.
    outstanding: AtomicI64,
}

impl TcpTransport {
    pub fn new(controller_addr: impl Into<String>, daemon_port: u16) -> Self {
        Self {
            controller_addr: controller_addr.into(),
            daemon_port,
            outstanding: AtomicI64::new(0),
        }
    }

    pub fn outstanding_creds(&self) -> i64 {
        self.outstanding.load(Ordering::SeqCst)
    }

    async fn exchange(&self, endpoint: &str, req: &Request) -> Result<RawReply, TransportError> {
        let mut stream = TcpStream::connect(endpoint)
            .await
            .map_err(|e| io_err(endpoint, e))?;

        let req_bytes = serde_json::to_vec(req).map_err(|source| TransportError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })?;
        stream
            .write_all(&req_bytes)
            .await
            .map_err(|e| io_err(endpoint, e))?;
        stream.shutdown().await.map_err(|e| io_err(endpoint, e))?;

        let mut buf = Vec::with_capacity(4096);
        stream
            .read_to_end(&mut buf)
            .await
            .map_err(|e| io_err(endpoint, e))?;

        let wire: WireReply =
            serde_json::from_slice(&buf).map_err(|source| TransportError::Decode {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let cred = wire.cred.map(|c| {
            self.outstanding.fetch_add(1, Ordering::SeqCst);
            AuthCred(c)
        });

        Ok(RawReply {
            body: wire.body,
            cred,
            downstream: wire.downstream,
        })
    }
}

impl Transport for TcpTransport {
    async fn exchange_controller(&self, req: &Request) -> Result<RawReply, TransportError> {
        self.exchange(&self.controller_addr, req).await
    }

    async fn exchange_daemon(
        &self,
        req: &Request,
        host: &str,
    ) -> Result<RawReply, TransportError> {
        let endpoint = format!("{}:{}", host, self.daemon_port);
        self.exchange(&endpoint, req).await
    }

    fn release_cred(&self, _cred: AuthCred) {
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
    }
}
