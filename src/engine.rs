//! The dialect engine: catalog + stream buffer + framer + codec.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::SystemTime;

use log::{debug, trace};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::codec::{decode_payload, encode_payload};
use crate::definition::MessageDefinition;
use crate::dialect::Dialect;
use crate::error::EncodeError;
use crate::frame::{create_frame, parse_frame, Frame, SIGNATURE_SIZE};
use crate::stream::StreamBuffer;
use crate::types::Value;
use crate::MavlinkVersion;

/// A message to be serialized, addressed by name.
///
/// Payload fields the caller leaves out are encoded as their type defaults.
/// `protocol_version` overrides the framing; when absent, MAVLink 2 is used
/// exactly when the id does not fit a v1 frame.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MavlinkMessage {
    pub message_name: String,
    pub payload: BTreeMap<String, Value>,
    pub system_id: u8,
    pub component_id: u8,
    pub sequence: u8,
    pub protocol_version: Option<MavlinkVersion>,
}

impl MavlinkMessage {
    pub fn new(message_name: &str) -> Self {
        Self {
            message_name: message_name.to_string(),
            ..Self::default()
        }
    }
}

impl Default for MavlinkMessage {
    fn default() -> Self {
        Self {
            message_name: String::new(),
            payload: BTreeMap::new(),
            system_id: 1,
            component_id: 1,
            sequence: 0,
            protocol_version: None,
        }
    }
}

/// A decoded message plus its frame metadata.
///
/// `crc_ok = false` and `UNKNOWN_<id>` names are data, not errors: the
/// engine surfaces everything it could frame and leaves the drop policy to
/// the caller.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParsedMessage {
    pub message_id: u32,
    pub message_name: String,
    pub system_id: u8,
    pub component_id: u8,
    pub sequence: u8,
    pub protocol_version: MavlinkVersion,
    pub payload: BTreeMap<String, Value>,
    pub crc_ok: bool,
    /// Pass-through of the 13-byte v2 signature block, if present.
    pub signature: Option<[u8; SIGNATURE_SIZE]>,
    /// When this message was observed by the parser.
    pub timestamp: SystemTime,
    /// Name of the catalog that decoded this message.
    pub dialect: String,
}

impl ParsedMessage {
    /// True for synthetic `UNKNOWN_<id>` messages whose id is not in the
    /// catalog; their payload holds the raw bytes under `raw_payload`.
    pub fn is_unknown(&self) -> bool {
        self.payload.contains_key(RAW_PAYLOAD_FIELD)
    }
}

/// Payload key used for messages whose id the catalog does not know.
const RAW_PAYLOAD_FIELD: &str = "raw_payload";

/// The protocol engine for one byte stream.
///
/// Owns the stream buffer exclusively (one engine per producer); the
/// catalog is shared read-only. Every operation is synchronous and runs to
/// completion.
pub struct DialectEngine {
    dialect: Arc<Dialect>,
    buffer: StreamBuffer,
}

impl DialectEngine {
    pub fn new(dialect: Arc<Dialect>) -> Self {
        Self {
            dialect,
            buffer: StreamBuffer::new(),
        }
    }

    pub fn dialect(&self) -> &Arc<Dialect> {
        &self.dialect
    }

    /// Appends raw link bytes and drains every complete frame.
    ///
    /// Messages come back in stream order, CRC failures included. Any
    /// trailing partial frame stays buffered for the next call, so the
    /// input may be chopped arbitrarily — down to one byte at a time.
    pub fn parse_bytes(&mut self, bytes: &[u8]) -> Vec<ParsedMessage> {
        self.buffer.append(bytes);
        trace!("parse_bytes: {} new, {} buffered", bytes.len(), self.buffer.len());

        let mut messages = Vec::new();
        loop {
            let (frame, consumed) = parse_frame(self.buffer.contents(), self.dialect.crc_extras());
            if consumed > 0 {
                self.buffer.consume(consumed);
            }
            match frame {
                Some(frame) => messages.push(self.decode_frame(&frame)),
                None if consumed == 0 => break,
                None => {}
            }
        }
        messages
    }

    /// Decodes a single frame against the catalog.
    ///
    /// An id the catalog does not know yields a synthetic `UNKNOWN_<id>`
    /// message carrying the raw payload, with the frame's `crc_ok`
    /// preserved.
    pub fn decode_frame(&self, frame: &Frame) -> ParsedMessage {
        let (message_name, payload) = match self.dialect.message_by_id(frame.message_id) {
            Some(definition) => (
                definition.name.clone(),
                decode_payload(&frame.payload, definition),
            ),
            None => {
                debug!("no definition for message id {}", frame.message_id);
                (
                    format!("UNKNOWN_{}", frame.message_id),
                    BTreeMap::from([(
                        RAW_PAYLOAD_FIELD.to_string(),
                        Value::Bytes(frame.payload.clone()),
                    )]),
                )
            }
        };

        ParsedMessage {
            message_id: frame.message_id,
            message_name,
            system_id: frame.system_id,
            component_id: frame.component_id,
            sequence: frame.sequence,
            protocol_version: frame.protocol_version(),
            payload,
            crc_ok: frame.crc_ok,
            signature: frame.signature,
            timestamp: SystemTime::now(),
            dialect: self.dialect.name().to_string(),
        }
    }

    /// Serializes a named message into a complete wire frame.
    pub fn serialize_message(&self, message: &MavlinkMessage) -> Result<Vec<u8>, EncodeError> {
        let definition = self.definition_for(message)?;
        let crc_extra =
            self.dialect
                .crc_extra(definition.id)
                .ok_or(EncodeError::MissingCrcExtra {
                    id: definition.id,
                })?;

        let version = message
            .protocol_version
            .unwrap_or(if definition.id > 255 {
                MavlinkVersion::V2
            } else {
                MavlinkVersion::V1
            });

        let payload = encode_payload(&message.payload, definition, version)?;
        Ok(create_frame(
            definition.id,
            &payload,
            message.system_id,
            message.component_id,
            message.sequence,
            crc_extra,
            version,
        ))
    }

    /// Returns a copy of `message` with every omitted payload field filled
    /// in with its type default. Pure: the engine state is untouched.
    pub fn complete_message(&self, message: &MavlinkMessage) -> Result<MavlinkMessage, EncodeError> {
        let definition = self.definition_for(message)?;
        let mut completed = message.clone();
        for field in definition.wire_order() {
            if !completed.payload.contains_key(&field.name) {
                completed
                    .payload
                    .insert(field.name.clone(), field.mav_type.default_value());
            }
        }
        Ok(completed)
    }

    fn definition_for(&self, message: &MavlinkMessage) -> Result<&MessageDefinition, EncodeError> {
        self.dialect
            .message_by_name(&message.message_name)
            .ok_or_else(|| EncodeError::UnknownMessage {
                name: message.message_name.clone(),
            })
    }

    // Registry accessors, delegating to the shared catalog.

    pub fn definition_by_id(&self, id: u32) -> Option<&MessageDefinition> {
        self.dialect.message_by_id(id)
    }

    pub fn definition_by_name(&self, name: &str) -> Option<&MessageDefinition> {
        self.dialect.message_by_name(name)
    }

    pub fn supports_id(&self, id: u32) -> bool {
        self.dialect.supports_message_id(id)
    }

    pub fn supports_name(&self, name: &str) -> bool {
        self.dialect.supports_message_name(name)
    }

    /// Ids the engine can decode, ascending.
    pub fn supported_ids(&self) -> Vec<u32> {
        self.dialect.message_ids()
    }

    pub fn supported_names(&self) -> Vec<&str> {
        self.dialect.message_names()
    }

    /// Discards any buffered partial input, e.g. after a link reconnect.
    pub fn reset_buffer(&mut self) {
        self.buffer.reset();
    }
}
