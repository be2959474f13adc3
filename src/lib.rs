//! Runtime-dialect implementation of the MAVLink data interchange format.
//!
//! # Dialects as values
//! Instead of generating one struct per message at build time, this crate is
//! parameterized by a [`Dialect`]: an immutable catalog of message
//! definitions (id, name, typed field list) and their CRC_EXTRA seeds, as
//! produced by any MAVLink XML generator. A [`DialectEngine`] composes the
//! catalog with a framer, a payload codec and a stream buffer, and exposes
//! the two halves of the codec:
//!
//! * receive: [`DialectEngine::parse_bytes`] turns raw link bytes into
//!   [`ParsedMessage`] values, tolerating partial and misaligned input;
//! * transmit: [`DialectEngine::serialize_message`] turns a name-keyed
//!   [`MavlinkMessage`] into a wire-format frame.
//!
//! Both MAVLink 1 (`0xFE`) and MAVLink 2 (`0xFD`) framings are supported,
//! including the v2 trailing-zero payload truncation with extension-field
//! semantics. CRC failures and unknown message ids are surfaced as data
//! (`crc_ok`, `UNKNOWN_<id>`), never as errors, so routing layers can apply
//! their own drop policy. Signatures are carried through opaquely.

#![deny(clippy::all)]
#![warn(clippy::use_self)]

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod codec;
pub mod crc;
pub mod definition;
pub mod dialect;
pub mod engine;
pub mod error;
pub mod frame;
pub mod stream;
pub mod types;

pub use crate::crc::{calculate_crc, validate_crc, validate_crc_with_table};
pub use crate::definition::{FieldDefinition, MessageDefinition};
pub use crate::dialect::Dialect;
pub use crate::engine::{DialectEngine, MavlinkMessage, ParsedMessage};
pub use crate::error::{DialectError, EncodeError, TypeParseError};
pub use crate::frame::Frame;
pub use crate::stream::StreamBuffer;
pub use crate::types::{MavType, Value};

/// Message framing marker for mavlink v1
pub const MAV_STX: u8 = 0xFE;

/// Message framing marker for mavlink v2
pub const MAV_STX_V2: u8 = 0xFD;

/// Largest possible frame: v2 header, 255 payload bytes, checksum, signature
pub const MAX_FRAME_SIZE: usize = 280;

/// Incompatibility flag bit indicating a trailing 13-byte signature
pub const MAVLINK_IFLAG_SIGNED: u8 = 0x01;

/// Versions of the Mavlink protocol that we support
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MavlinkVersion {
    V1,
    V2,
}
