use std::net::SocketAddr;

/// Errors that can occur in SMPP transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to bind to the specified address.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Failed to connect to the specified endpoint.
    #[error("failed to connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        source: std::io::Error,
    },

    /// Failed to accept an incoming connection.
    #[error("failed to accept connection: {0}")]
    Accept(std::io::Error),

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TLS configuration or handshake failure.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// The host is not a valid TLS server name (SNI).
    #[error("invalid TLS server name: {0}")]
    InvalidServerName(String),

    /// The PEM input contained no usable certificate or key.
    #[error("invalid PEM material: {0}")]
    InvalidPem(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;
