/// Errors that can occur during PDU encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The announced command_length is below the header size or above the
    /// configured maximum. Fatal for the stream: framing is lost.
    #[error("invalid command_length {length} (min {min}, max {max})")]
    InvalidLength { length: u32, min: u32, max: u32 },

    /// The PDU body exceeds the configured maximum on encode.
    #[error("PDU too large ({size} bytes, max {max})")]
    PduTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, CodecError>;
