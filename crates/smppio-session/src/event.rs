use smppio_codec::Pdu;
use tokio::sync::mpsc;

/// Observable session notifications, delivered in emission order on a
/// single-consumer channel handed out at session construction.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Plain transport established (client-initiated sessions only).
    Connected,
    /// TLS transport established (client-initiated sessions only).
    SecureConnected,
    /// A complete PDU was extracted. Always precedes the command-specific
    /// notification for the same PDU.
    Pdu(Pdu),
    /// Command-specific notification: the same PDU, with its dispatch name
    /// resolved through the descriptor registry. Not emitted for command
    /// identifiers the registry does not know.
    Command { name: String, pdu: Pdu },
    /// A PDU was written and flushed, carrying the sequence number actually
    /// transmitted.
    Sent(Pdu),
    /// The connection closed. Terminal: no further events follow.
    Closed,
    /// Transport or framing failure. A framing error permanently stops
    /// extraction; the application must close or destroy the session.
    Error(String),
}

/// Receiving side of a session's event stream.
pub type SessionEvents = mpsc::UnboundedReceiver<SessionEvent>;
