//! Core protocol types for the Rewind wire format.
//!
//! Every message on the wire is a [`Frame`]: an 18-byte little-endian
//! header followed by a variable-length payload.
//!
//! ```text
//!  0        8      10      12          16      18
//!  +--------+-------+-------+-----------+-------+-----------------+
//!  | sign   | type  | flags | sequence  | len   | payload (len)   |
//!  | [u8;8] | u16   | u16   | u32       | u16   |                 |
//!  +--------+-------+-------+-----------+-------+-----------------+
//! ```
//!
//! The payload is opaque at this level. Its meaning depends on the
//! [`PacketType`]; the structured payloads the client needs
//! ([`VersionData`], [`SubscriptionData`], [`ConfigurationData`],
//! [`SuperHeader`]) live here too, each with its own byte layout.

use std::fmt;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Prefix carried by every Rewind datagram.
pub const SIGNATURE: &[u8; 8] = b"REWIND01";

/// Size of the fixed frame header in bytes.
pub const HEADER_LEN: usize = 18;

/// Size of the receive buffer for one datagram. Anything longer is
/// truncated by the socket read.
pub const MAX_DATAGRAM_LEN: usize = 128;

/// Largest payload that still fits in one receive buffer.
pub const MAX_PAYLOAD_LEN: usize = MAX_DATAGRAM_LEN - HEADER_LEN;

/// Seconds between client keepalives.
pub const KEEPALIVE_INTERVAL_SECS: u64 = 5;

/// Header flag bits.
pub mod flags {
    pub const NONE: u16 = 0;
    pub const REAL_TIME_1: u16 = 1 << 0;
}

/// Service identifier sent in [`VersionData`] by a plain listening client.
pub const SERVICE_SIMPLE_APPLICATION: u8 = 0x20;

/// [`ConfigurationData`] option: server sends super headers before calls.
pub const OPTION_SUPER_HEADER: u32 = 1 << 0;
/// [`ConfigurationData`] option: server sends linear (decoded) frames.
pub const OPTION_LINEAR_FRAME: u32 = 1 << 1;

// ---------------------------------------------------------------------------
// PacketType
// ---------------------------------------------------------------------------

/// The `type` field of the frame header.
///
/// Values are grouped by class in the high byte: `0x00xx` session control,
/// `0x01xx` system console, `0x09xx` application data. Anything the client
/// doesn't know about decodes as [`PacketType::Unknown`] so the raw value
/// can still be logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketType {
    KeepAlive,
    Close,
    Challenge,
    /// Client's answer to a [`Challenge`](Self::Challenge): the SHA-256
    /// digest of the challenge bytes followed by the password.
    ChallengeResponse,
    Report,
    /// Server acknowledgment of a session configuration.
    Configuration,
    /// Talkgroup subscription request (client) or acknowledgment (server).
    Subscription,
    DmrAudioFrame,
    SuperHeader,
    FailureCode,
    Unknown(u16),
}

impl PacketType {
    /// Every type the client understands, in wire-value order.
    pub const KNOWN: [PacketType; 10] = [
        PacketType::KeepAlive,
        PacketType::Close,
        PacketType::Challenge,
        PacketType::ChallengeResponse,
        PacketType::Report,
        PacketType::Configuration,
        PacketType::Subscription,
        PacketType::DmrAudioFrame,
        PacketType::SuperHeader,
        PacketType::FailureCode,
    ];

    /// Maps a raw header value to a packet type.
    pub fn from_u16(value: u16) -> Self {
        match value {
            0x0000 => Self::KeepAlive,
            0x0001 => Self::Close,
            0x0002 => Self::Challenge,
            0x0003 => Self::ChallengeResponse,
            0x0100 => Self::Report,
            0x0900 => Self::Configuration,
            0x0901 => Self::Subscription,
            0x0920 => Self::DmrAudioFrame,
            0x0928 => Self::SuperHeader,
            0x0929 => Self::FailureCode,
            other => Self::Unknown(other),
        }
    }

    /// The raw header value for this packet type.
    pub fn to_u16(self) -> u16 {
        match self {
            Self::KeepAlive => 0x0000,
            Self::Close => 0x0001,
            Self::Challenge => 0x0002,
            Self::ChallengeResponse => 0x0003,
            Self::Report => 0x0100,
            Self::Configuration => 0x0900,
            Self::Subscription => 0x0901,
            Self::DmrAudioFrame => 0x0920,
            Self::SuperHeader => 0x0928,
            Self::FailureCode => 0x0929,
            Self::Unknown(raw) => raw,
        }
    }

    /// `false` only for [`PacketType::Unknown`].
    pub fn is_known(self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<u16> for PacketType {
    fn from(value: u16) -> Self {
        Self::from_u16(value)
    }
}

impl From<PacketType> for u16 {
    fn from(value: PacketType) -> Self {
        value.to_u16()
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeepAlive => f.write_str("keepalive"),
            Self::Close => f.write_str("close"),
            Self::Challenge => f.write_str("challenge"),
            Self::ChallengeResponse => f.write_str("challenge-response"),
            Self::Report => f.write_str("report"),
            Self::Configuration => f.write_str("configuration"),
            Self::Subscription => f.write_str("subscription"),
            Self::DmrAudioFrame => f.write_str("dmr-audio-frame"),
            Self::SuperHeader => f.write_str("super-header"),
            Self::FailureCode => f.write_str("failure-code"),
            Self::Unknown(raw) => write!(f, "unknown(0x{raw:04x})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// One decoded protocol message.
///
/// A `Frame` only exists after the signature and the declared payload
/// length have both been checked, so holding one means the datagram was
/// well-formed. The payload is copied out of the receive buffer and holds
/// exactly `length` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub packet_type: PacketType,
    pub flags: u16,
    /// Sender's packet counter. The client ignores inbound values.
    pub sequence: u32,
    pub payload: Vec<u8>,
}

impl Frame {
    /// Creates a frame with no flags and sequence number 0.
    pub fn new(packet_type: PacketType, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            packet_type,
            flags: flags::NONE,
            sequence: 0,
            payload: payload.into(),
        }
    }

    /// Sets the sequence number.
    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = sequence;
        self
    }

    /// Sets the header flags.
    pub fn with_flags(mut self, flags: u16) -> Self {
        self.flags = flags;
        self
    }
}

// ---------------------------------------------------------------------------
// Session type
// ---------------------------------------------------------------------------

/// Kind of voice session a subscription or super header refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionType {
    PrivateVoice,
    GroupVoice,
    Other(u32),
}

impl SessionType {
    pub fn from_u32(value: u32) -> Self {
        match value {
            5 => Self::PrivateVoice,
            7 => Self::GroupVoice,
            other => Self::Other(other),
        }
    }

    pub fn to_u32(self) -> u32 {
        match self {
            Self::PrivateVoice => 5,
            Self::GroupVoice => 7,
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrivateVoice => f.write_str("private voice"),
            Self::GroupVoice => f.write_str("group voice"),
            Self::Other(raw) => write!(f, "session type {raw}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Payload of a client keepalive: who we are and what kind of client.
///
/// Layout: `number: u32 | service: u8 | description: [u8]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionData {
    /// Application ID assigned by the relay operator.
    pub number: u32,
    pub service: u8,
    /// Free-form client description, sent without a terminator.
    pub description: String,
}

impl VersionData {
    const MIN_LEN: usize = 5;

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::MIN_LEN + self.description.len());
        out.extend_from_slice(&self.number.to_le_bytes());
        out.push(self.service);
        out.extend_from_slice(self.description.as_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        check_len("version", bytes, Self::MIN_LEN)?;
        Ok(Self {
            number: u32_at(bytes, 0),
            service: bytes[4],
            description: String::from_utf8_lossy(&bytes[Self::MIN_LEN..]).into_owned(),
        })
    }
}

/// Payload of a subscription request or acknowledgment.
///
/// Layout: `session_type: u32 | number: u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionData {
    pub session_type: SessionType,
    /// Talkgroup (or subscriber) ID.
    pub number: u32,
}

impl SubscriptionData {
    pub const LEN: usize = 8;

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[..4].copy_from_slice(&self.session_type.to_u32().to_le_bytes());
        out[4..].copy_from_slice(&self.number.to_le_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        check_len("subscription", bytes, Self::LEN)?;
        Ok(Self {
            session_type: SessionType::from_u32(u32_at(bytes, 0)),
            number: u32_at(bytes, 4),
        })
    }
}

/// Payload of a configuration acknowledgment: the option bits in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigurationData {
    pub options: u32,
}

impl ConfigurationData {
    pub const LEN: usize = 4;

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        self.options.to_le_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        check_len("configuration", bytes, Self::LEN)?;
        Ok(Self {
            options: u32_at(bytes, 0),
        })
    }

    /// Whether the server announces calls with a [`SuperHeader`].
    pub fn super_headers(&self) -> bool {
        self.options & OPTION_SUPER_HEADER != 0
    }

    /// Whether audio frames arrive decoded (linear) rather than as AMBE.
    pub fn linear_frames(&self) -> bool {
        self.options & OPTION_LINEAR_FRAME != 0
    }
}

/// Call metadata the server sends ahead of a call's audio frames.
///
/// Layout: `session_type: u32 | source_id: u32 | destination_id: u32 |
/// source_call: [u8; 10] | destination_call: [u8; 10]`. Call signs are
/// NUL-padded ASCII.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperHeader {
    pub session_type: SessionType,
    pub source_id: u32,
    pub destination_id: u32,
    pub source_call: String,
    pub destination_call: String,
}

impl SuperHeader {
    pub const LEN: usize = 32;
    const CALL_LEN: usize = 10;

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[0..4].copy_from_slice(&self.session_type.to_u32().to_le_bytes());
        out[4..8].copy_from_slice(&self.source_id.to_le_bytes());
        out[8..12].copy_from_slice(&self.destination_id.to_le_bytes());
        write_call(&mut out[12..22], &self.source_call);
        write_call(&mut out[22..32], &self.destination_call);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        check_len("super header", bytes, Self::LEN)?;
        Ok(Self {
            session_type: SessionType::from_u32(u32_at(bytes, 0)),
            source_id: u32_at(bytes, 4),
            destination_id: u32_at(bytes, 8),
            source_call: read_call(&bytes[12..12 + Self::CALL_LEN]),
            destination_call: read_call(&bytes[22..22 + Self::CALL_LEN]),
        })
    }
}

/// Reads a failure code payload. Returns `None` when the payload is too
/// short to hold a `u32`.
pub fn failure_code(payload: &[u8]) -> Option<u32> {
    (payload.len() >= 4).then(|| u32_at(payload, 0))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn check_len(kind: &'static str, bytes: &[u8], expected: usize) -> Result<(), ProtocolError> {
    if bytes.len() < expected {
        return Err(ProtocolError::InvalidPayload {
            kind,
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

/// Caller must have checked `bytes.len() >= offset + 4`.
fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn read_call(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).trim().to_string()
}

fn write_call(field: &mut [u8], call: &str) {
    let bytes = call.as_bytes();
    let n = bytes.len().min(field.len());
    field[..n].copy_from_slice(&bytes[..n]);
}

#[cfg(test)]
mod tests {
    use super::*;

    // =====================================================================
    // PacketType
    // =====================================================================

    #[test]
    fn test_packet_type_wire_values() {
        assert_eq!(PacketType::KeepAlive.to_u16(), 0x0000);
        assert_eq!(PacketType::Challenge.to_u16(), 0x0002);
        assert_eq!(PacketType::ChallengeResponse.to_u16(), 0x0003);
        assert_eq!(PacketType::Configuration.to_u16(), 0x0900);
        assert_eq!(PacketType::DmrAudioFrame.to_u16(), 0x0920);
        assert_eq!(PacketType::FailureCode.to_u16(), 0x0929);
    }

    #[test]
    fn test_packet_type_known_values_map_back() {
        for ty in PacketType::KNOWN {
            assert_eq!(PacketType::from_u16(ty.to_u16()), ty);
            assert!(ty.is_known());
        }
    }

    #[test]
    fn test_packet_type_unknown_keeps_raw_value() {
        let ty = PacketType::from(0x0918);
        assert_eq!(ty, PacketType::Unknown(0x0918));
        assert!(!ty.is_known());
        assert_eq!(u16::from(ty), 0x0918);
        assert_eq!(ty.to_string(), "unknown(0x0918)");
    }

    // =====================================================================
    // Payloads
    // =====================================================================

    #[test]
    fn test_subscription_layout_is_little_endian() {
        let sub = SubscriptionData {
            session_type: SessionType::GroupVoice,
            number: 2161,
        };
        assert_eq!(sub.to_bytes(), [7, 0, 0, 0, 0x71, 0x08, 0, 0]);
        assert_eq!(SubscriptionData::from_bytes(&sub.to_bytes()).unwrap(), sub);
    }

    #[test]
    fn test_version_data_layout() {
        let vd = VersionData {
            number: 0x0102_0304,
            service: SERVICE_SIMPLE_APPLICATION,
            description: "rx".into(),
        };
        assert_eq!(vd.to_bytes(), vec![4, 3, 2, 1, 0x20, b'r', b'x']);
        assert_eq!(VersionData::from_bytes(&vd.to_bytes()).unwrap(), vd);
    }

    #[test]
    fn test_super_header_trims_call_padding() {
        let header = SuperHeader {
            session_type: SessionType::GroupVoice,
            source_id: 2_161_234,
            destination_id: 91,
            source_call: "HA2NON".into(),
            destination_call: String::new(),
        };
        let bytes = header.to_bytes();
        assert_eq!(&bytes[12..18], b"HA2NON");
        assert_eq!(bytes[18], 0);
        assert_eq!(SuperHeader::from_bytes(&bytes).unwrap(), header);
    }

    #[test]
    fn test_short_payloads_are_rejected() {
        assert_eq!(
            SubscriptionData::from_bytes(&[7, 0, 0]),
            Err(ProtocolError::InvalidPayload {
                kind: "subscription",
                expected: 8,
                actual: 3,
            })
        );
        assert!(SuperHeader::from_bytes(&[0u8; 31]).is_err());
        assert!(ConfigurationData::from_bytes(&[]).is_err());
        assert!(VersionData::from_bytes(&[1, 2, 3, 4]).is_err());
    }

    #[test]
    fn test_configuration_option_bits() {
        let cfg = ConfigurationData::from_bytes(&[0x01, 0, 0, 0]).unwrap();
        assert!(cfg.super_headers());
        assert!(!cfg.linear_frames());

        let both = ConfigurationData {
            options: OPTION_SUPER_HEADER | OPTION_LINEAR_FRAME,
        };
        assert!(both.super_headers() && both.linear_frames());
        assert!(!ConfigurationData { options: 0 }.super_headers());
    }

    #[test]
    fn test_failure_code() {
        assert_eq!(failure_code(&[0x2a, 0, 0, 0]), Some(42));
        assert_eq!(failure_code(&[0x2a, 0, 0, 0, 0xff]), Some(42));
        assert_eq!(failure_code(&[0x2a]), None);
    }
}
