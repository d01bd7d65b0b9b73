use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use rustls::pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::{TlsConnector, TlsStream};
use tracing::debug;

use crate::error::{Result, TransportError};

/// A connected SMPP stream — plain TCP or TLS over TCP.
///
/// This is the fundamental I/O type returned by transport operations.
/// The variant is fixed at construction time; callers can query it via
/// [`SmppStream::is_secure`] but never switch transports on a live stream.
pub enum SmppStream {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl SmppStream {
    /// True when the stream carries a completed TLS session.
    pub fn is_secure(&self) -> bool {
        matches!(self, SmppStream::Tls(_))
    }

    /// Address of the remote endpoint.
    pub fn peer_addr(&self) -> Result<SocketAddr> {
        match self {
            SmppStream::Plain(stream) => stream.peer_addr().map_err(Into::into),
            SmppStream::Tls(stream) => stream.get_ref().0.peer_addr().map_err(Into::into),
        }
    }

    /// Address of the local endpoint.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        match self {
            SmppStream::Plain(stream) => stream.local_addr().map_err(Into::into),
            SmppStream::Tls(stream) => stream.get_ref().0.local_addr().map_err(Into::into),
        }
    }
}

impl AsyncRead for SmppStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            SmppStream::Plain(stream) => Pin::new(stream).poll_read(cx, buf),
            SmppStream::Tls(stream) => Pin::new(stream.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for SmppStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        match self.get_mut() {
            SmppStream::Plain(stream) => Pin::new(stream).poll_write(cx, buf),
            SmppStream::Tls(stream) => Pin::new(stream.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            SmppStream::Plain(stream) => Pin::new(stream).poll_flush(cx),
            SmppStream::Tls(stream) => Pin::new(stream.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            SmppStream::Plain(stream) => Pin::new(stream).poll_shutdown(cx),
            SmppStream::Tls(stream) => Pin::new(stream.as_mut()).poll_shutdown(cx),
        }
    }
}

impl std::fmt::Debug for SmppStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let transport = if self.is_secure() { "tls" } else { "tcp" };
        f.debug_struct("SmppStream")
            .field("transport", &transport)
            .finish()
    }
}

/// Connect over plain TCP.
///
/// The returned future resolving is the "connected" signal: the stream is
/// usable as soon as this returns.
pub async fn connect_plain(host: &str, port: u16) -> Result<SmppStream> {
    let stream = TcpStream::connect((host, port))
        .await
        .map_err(|source| TransportError::Connect {
            host: host.to_string(),
            port,
            source,
        })?;
    debug!(host, port, "plain transport connected");
    Ok(SmppStream::Plain(stream))
}

/// Connect over TLS.
///
/// The returned future resolving is the "securely connected" signal: the TLS
/// handshake has completed against `host` (used as SNI) before this returns.
pub async fn connect_tls(
    host: &str,
    port: u16,
    config: Arc<rustls::ClientConfig>,
) -> Result<SmppStream> {
    let server_name = ServerName::try_from(host.to_string())
        .map_err(|_| TransportError::InvalidServerName(host.to_string()))?;

    let tcp = TcpStream::connect((host, port))
        .await
        .map_err(|source| TransportError::Connect {
            host: host.to_string(),
            port,
            source,
        })?;

    let connector = TlsConnector::from(config);
    let tls = connector.connect(server_name, tcp).await?;
    debug!(host, port, "TLS transport connected");
    Ok(SmppStream::Tls(Box::new(TlsStream::Client(tls))))
}
