use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio_rustls::{TlsAcceptor, TlsStream};
use tracing::debug;

use crate::error::{Result, TransportError};
use crate::stream::SmppStream;
use crate::tls::TlsIdentity;

/// A bound listener producing [`SmppStream`]s.
///
/// Plain vs. secure is decided once, at bind time, by the presence of a
/// [`TlsIdentity`] — composition instead of a listener subclass per transport.
pub struct Binding {
    listener: TcpListener,
    acceptor: Option<TlsAcceptor>,
}

impl Binding {
    /// Bind to an address. When `identity` is given, every accepted
    /// connection goes through a TLS handshake before being handed out.
    pub async fn bind(addr: SocketAddr, identity: Option<TlsIdentity>) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| TransportError::Bind { addr, source })?;
        let acceptor = identity.map(|identity| TlsAcceptor::from(identity.server_config()));
        debug!(%addr, secure = acceptor.is_some(), "transport bound");
        Ok(Self { listener, acceptor })
    }

    /// True when accepted connections are TLS-wrapped.
    pub fn is_secure(&self) -> bool {
        self.acceptor.is_some()
    }

    /// The locally bound address (useful after binding port 0).
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().map_err(Into::into)
    }

    /// Accept the next connection, completing the TLS handshake when secure.
    pub async fn accept(&self) -> Result<(SmppStream, SocketAddr)> {
        let (tcp, peer) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::Accept)?;

        let stream = match &self.acceptor {
            None => SmppStream::Plain(tcp),
            Some(acceptor) => {
                let tls = acceptor.accept(tcp).await.map_err(TransportError::Accept)?;
                SmppStream::Tls(Box::new(TlsStream::Server(tls)))
            }
        };

        debug!(%peer, secure = stream.is_secure(), "connection accepted");
        Ok((stream, peer))
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("secure", &self.is_secure())
            .finish()
    }
}
