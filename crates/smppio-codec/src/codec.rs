use bytes::{Buf, BufMut, BytesMut};

use crate::error::{CodecError, Result};
use crate::pdu::{Pdu, HEADER_SIZE};

/// Default maximum PDU size: 64 KiB. SMPP bodies are small; anything larger
/// means a desynchronized or hostile stream.
pub const DEFAULT_MAX_PDU_SIZE: usize = 64 * 1024;

/// Read the command_length header field, consuming nothing.
///
/// Returns `Ok(None)` until at least four bytes are buffered. A length
/// outside `[HEADER_SIZE, max_pdu_size]` is a framing error: the stream can
/// no longer be trusted and extraction must stop.
pub fn read_pdu_length(src: &BytesMut, max_pdu_size: usize) -> Result<Option<u32>> {
    if src.len() < 4 {
        return Ok(None); // Need more data
    }

    let length = u32::from_be_bytes([src[0], src[1], src[2], src[3]]);
    if (length as usize) < HEADER_SIZE || length as usize > max_pdu_size {
        return Err(CodecError::InvalidLength {
            length,
            min: HEADER_SIZE as u32,
            max: max_pdu_size as u32,
        });
    }

    Ok(Some(length))
}

/// Consume exactly one PDU of the announced length from the buffer.
///
/// Returns `Ok(None)` while fewer than `announced_length` bytes are buffered;
/// the caller keeps the announced length and retries when more data arrives,
/// so the header is never re-parsed.
pub fn read_pdu(src: &mut BytesMut, announced_length: u32) -> Result<Option<Pdu>> {
    let total = announced_length as usize;
    debug_assert!(total >= HEADER_SIZE);

    if src.len() < total {
        return Ok(None); // Need more data
    }

    src.advance(4); // command_length already known
    let command_id = src.get_u32();
    let command_status = src.get_u32();
    let sequence_number = src.get_u32();
    let body = src.split_to(total - HEADER_SIZE).freeze();

    Ok(Some(Pdu {
        command_id,
        command_status,
        sequence_number,
        body,
    }))
}

/// Encode a PDU into the wire format, appending to `dst`.
pub fn encode_pdu(pdu: &Pdu, dst: &mut BytesMut, max_pdu_size: usize) -> Result<()> {
    let total = pdu.wire_size();
    if total > max_pdu_size {
        return Err(CodecError::PduTooLarge {
            size: total,
            max: max_pdu_size,
        });
    }

    dst.reserve(total);
    dst.put_u32(total as u32);
    dst.put_u32(pdu.command_id);
    dst.put_u32(pdu.command_status);
    dst.put_u32(pdu.sequence_number);
    dst.put_slice(&pdu.body);
    Ok(())
}
