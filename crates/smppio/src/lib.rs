//! SMPP session engine over TCP and TLS.
//!
//! smppio speaks the SMPP wire protocol at the session layer: length-prefixed
//! PDU framing, request/response correlation by sequence number, enquire_link
//! keepalive, and pause/resume flow control.
//!
//! # Crate Structure
//!
//! - [`transport`] — TCP and TLS connection establishment
//! - [`codec`] — PDU header framing (encode/decode)
//! - [`defs`] — Command and TLV descriptors with a runtime extension table
//! - [`session`] — Sessions, the connector, and the accepting server

/// Re-export transport types.
pub mod transport {
    pub use smppio_transport::*;
}

/// Re-export codec types.
pub mod codec {
    pub use smppio_codec::*;
}

/// Re-export command and TLV descriptor types.
pub mod defs {
    pub use smppio_defs::*;
}

/// Re-export session types.
pub mod session {
    pub use smppio_session::*;
}
