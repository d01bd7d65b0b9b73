/// Errors that can occur in session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Transport-level error. Not retried by the engine.
    #[error("transport error: {0}")]
    Transport(#[from] smppio_transport::TransportError),

    /// PDU encode/decode error. Fatal for the affected session's extraction.
    #[error("codec error: {0}")]
    Codec(#[from] smppio_codec::CodecError),

    /// The transport is not currently writable.
    #[error("session is not writable")]
    NotWritable,

    /// The session closed before the pending response arrived.
    #[error("session closed")]
    Closed,

    /// A request is already pending under this sequence number. Caller error:
    /// pre-set sequence numbers must not collide with in-flight requests.
    #[error("sequence number {0} already has a pending request")]
    SequenceInUse(u32),

    /// No descriptor registered under this command name.
    #[error("unknown command {0:?}")]
    UnknownCommand(String),

    /// The connection URL scheme is neither `smpp` nor `ssmpp`. Rejected
    /// before any network activity.
    #[error("unsupported URL scheme {0:?} (expected smpp or ssmpp)")]
    UnsupportedScheme(String),

    /// The connection URL could not be parsed or lacks a host.
    #[error("invalid connection URL: {0}")]
    InvalidUrl(String),

    /// An I/O error occurred on the session's connection.
    #[error("session I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
