//! Frame encoder and decoder.
//!
//! Decoding is strict about the two things that make a datagram a frame
//! (signature and declared length) and lenient about everything else:
//! unknown packet types decode fine and trailing bytes past the declared
//! payload are ignored. Deciding whether a packet type is acceptable is
//! the session engine's job, not the codec's.

use crate::{Frame, HEADER_LEN, MAX_PAYLOAD_LEN, PacketType, ProtocolError, SIGNATURE};

/// Returns `true` if `bytes` starts with the protocol signature.
///
/// The engine uses this to discard foreign datagrams without treating
/// them as decode failures.
pub fn has_signature(bytes: &[u8]) -> bool {
    bytes.starts_with(SIGNATURE)
}

/// Decodes one datagram into a [`Frame`].
///
/// # Errors
/// - [`ProtocolError::TooShort`] if the buffer can't hold a header
/// - [`ProtocolError::BadSignature`] if the `REWIND01` prefix is missing
/// - [`ProtocolError::Truncated`] if the header declares more payload
///   than the buffer holds
pub fn decode(bytes: &[u8]) -> Result<Frame, ProtocolError> {
    if bytes.len() < HEADER_LEN {
        return Err(ProtocolError::TooShort { len: bytes.len() });
    }
    if !has_signature(bytes) {
        return Err(ProtocolError::BadSignature);
    }

    let packet_type = PacketType::from_u16(u16::from_le_bytes([bytes[8], bytes[9]]));
    let flags = u16::from_le_bytes([bytes[10], bytes[11]]);
    let sequence = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);
    let declared = u16::from_le_bytes([bytes[16], bytes[17]]) as usize;

    let body = &bytes[HEADER_LEN..];
    if declared > body.len() {
        return Err(ProtocolError::Truncated {
            declared,
            available: body.len(),
        });
    }

    Ok(Frame {
        packet_type,
        flags,
        sequence,
        payload: body[..declared].to_vec(),
    })
}

/// Encodes a [`Frame`] into a datagram.
///
/// # Errors
/// Returns [`ProtocolError::PayloadTooLarge`] if the payload exceeds
/// [`MAX_PAYLOAD_LEN`].
pub fn encode(frame: &Frame) -> Result<Vec<u8>, ProtocolError> {
    let len = frame.payload.len();
    if len > MAX_PAYLOAD_LEN {
        return Err(ProtocolError::PayloadTooLarge {
            len,
            max: MAX_PAYLOAD_LEN,
        });
    }

    let mut out = Vec::with_capacity(HEADER_LEN + len);
    out.extend_from_slice(SIGNATURE);
    out.extend_from_slice(&frame.packet_type.to_u16().to_le_bytes());
    out.extend_from_slice(&frame.flags.to_le_bytes());
    out.extend_from_slice(&frame.sequence.to_le_bytes());
    // Bounded by MAX_PAYLOAD_LEN above, so this never truncates.
    out.extend_from_slice(&(len as u16).to_le_bytes());
    out.extend_from_slice(&frame.payload);
    Ok(out)
}
