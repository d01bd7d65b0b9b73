use bytes::Bytes;

/// PDU header: command_length (4) + command_id (4) + command_status (4) +
/// sequence_number (4) = 16 bytes.
pub const HEADER_SIZE: usize = 16;

/// Bit 31 of command_id distinguishes responses from requests.
pub const RESPONSE_BIT: u32 = 0x8000_0000;

/// Highest valid sequence number. Allocation wraps back to 1 past this.
pub const MAX_SEQUENCE: u32 = 0x7FFF_FFFF;

/// One SMPP protocol data unit.
///
/// The body is opaque at this layer; mandatory parameters and TLVs are the
/// application's concern. A `sequence_number` of zero means "not yet
/// assigned" — the owning session allocates one when the PDU is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pdu {
    pub command_id: u32,
    pub command_status: u32,
    pub sequence_number: u32,
    pub body: Bytes,
}

impl Pdu {
    /// Create a request PDU with an unassigned sequence number.
    pub fn request(command_id: u32, body: impl Into<Bytes>) -> Self {
        Self {
            command_id,
            command_status: 0,
            sequence_number: 0,
            body: body.into(),
        }
    }

    /// Pre-set the sequence number (proxy relay: the upstream session's
    /// number is preserved instead of auto-allocated).
    pub fn with_sequence(mut self, sequence_number: u32) -> Self {
        self.sequence_number = sequence_number;
        self
    }

    /// Whether this PDU is classified as a response.
    pub fn is_response(&self) -> bool {
        self.command_id & RESPONSE_BIT != 0
    }

    /// Build the matching response PDU, carrying this request's sequence
    /// number, with a zero (success) status and an empty body.
    pub fn response(&self) -> Self {
        self.response_with_status(0)
    }

    /// Build the matching response PDU with an explicit command_status.
    pub fn response_with_status(&self, command_status: u32) -> Self {
        Self {
            command_id: self.command_id | RESPONSE_BIT,
            command_status,
            sequence_number: self.sequence_number,
            body: Bytes::new(),
        }
    }

    /// The total wire size of this PDU (header + body).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.body.len()
    }
}
