//! Wire protocol for rewind-rx.
//!
//! This crate defines the binary format spoken between the client and a
//! Rewind relay server:
//!
//! - **Types** ([`Frame`], [`PacketType`], payload structs): the messages
//!   that travel on the wire and the constants that shape them.
//! - **Codec** ([`encode`], [`decode`], [`has_signature`]): how frames are
//!   converted to and from datagrams.
//! - **Errors** ([`ProtocolError`]): what can be wrong with a datagram.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw datagrams) and session
//! (handshake state). It has no I/O and no notion of time.
//!
//! ```text
//! Transport (datagram) → Protocol (Frame) → Session (state machine)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{decode, encode, has_signature};
pub use error::ProtocolError;
pub use types::{
    ConfigurationData, Frame, HEADER_LEN, KEEPALIVE_INTERVAL_SECS, MAX_DATAGRAM_LEN,
    MAX_PAYLOAD_LEN, OPTION_LINEAR_FRAME, OPTION_SUPER_HEADER, PacketType,
    SERVICE_SIMPLE_APPLICATION, SIGNATURE, SessionType, SubscriptionData, SuperHeader,
    VersionData, failure_code, flags,
};
