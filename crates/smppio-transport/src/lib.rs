//! Plain-TCP and TLS transport abstraction for SMPP sessions.
//!
//! Provides a unified stream type over the two transports an SMPP endpoint
//! speaks:
//! - plain TCP (`smpp://`, default port 2775)
//! - TLS over TCP (`ssmpp://`, default port 3550)
//!
//! This is the lowest layer of smppio. Everything else builds on top of
//! the [`SmppStream`] type provided here.

pub mod binding;
pub mod error;
pub mod stream;
pub mod tls;

pub use binding::Binding;
pub use error::{Result, TransportError};
pub use stream::{connect_plain, connect_tls, SmppStream};
pub use tls::{client_config_from_ca_pem, TlsIdentity};

/// Canonical port for plain-transport SMPP connections.
pub const SMPP_PORT: u16 = 2775;

/// Canonical port for TLS-transport SMPP connections.
pub const SSMPP_PORT: u16 = 3550;
