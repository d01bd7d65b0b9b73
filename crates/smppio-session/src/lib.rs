//! SMPP session engine.
//!
//! This is the stateful layer between the wire codec and the application:
//! one read task per connection turns the byte stream into ordered PDU
//! events, outbound requests are correlated with their responses by
//! sequence number, and a keepalive timer probes liveness. Sessions come
//! from two places — [`connect`] for client-initiated connections and
//! [`Server`] for accepted ones — and behave identically afterwards.

pub mod connector;
pub mod error;
pub mod event;
pub mod server;
pub mod session;

pub use connector::{connect, connect_with, ConnectConfig};
pub use error::{Result, SessionError};
pub use event::{SessionEvent, SessionEvents};
pub use server::{Server, ServerConfig};
pub use session::{Session, SessionConfig};
