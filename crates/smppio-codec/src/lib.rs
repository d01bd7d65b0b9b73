//! SMPP PDU wire codec.
//!
//! Every PDU starts with a fixed 16-byte header, all fields big-endian:
//! - `command_length` (4B) — total PDU size including the header
//! - `command_id` (4B) — operation identifier; bit 31 marks a response
//! - `command_status` (4B) — error code, zero on requests
//! - `sequence_number` (4B) — request/response correlation identifier
//!
//! Decoding is two-phase so a session can suspend mid-frame: read the
//! announced length first, then consume the body only once it has fully
//! arrived. No partial reads, no buffer management in user code.

pub mod codec;
pub mod error;
pub mod pdu;

pub use codec::{encode_pdu, read_pdu, read_pdu_length, DEFAULT_MAX_PDU_SIZE};
pub use error::{CodecError, Result};
pub use pdu::{Pdu, HEADER_SIZE, MAX_SEQUENCE, RESPONSE_BIT};
