//! The dialect catalog: an immutable message registry a [`DialectEngine`]
//! is constructed around.
//!
//! A catalog is a plain value. Generators produce one from XML; callers that
//! only speak a handful of messages can construct a smaller catalog with
//! just those definitions and the rest of the dialect never enters the
//! binary. There is no global registry and no registration side effects.
//!
//! [`DialectEngine`]: crate::engine::DialectEngine

use std::collections::{BTreeMap, HashMap};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::definition::MessageDefinition;
use crate::error::DialectError;

const MAX_MESSAGE_ID: u32 = (1 << 24) - 1;
const MAX_PAYLOAD_SIZE: usize = 255;

/// A named, immutable catalog of message definitions and CRC_EXTRA seeds.
///
/// Ids and names are each unique within a catalog, and the id and name maps
/// always agree on membership. The CRC_EXTRA table is allowed to be
/// incomplete — a broken generator is diagnosed at serialize time
/// ([`MissingCrcExtra`](crate::error::EncodeError::MissingCrcExtra)) and as
/// `crc_ok = false` on receive, not at construction.
///
/// `Dialect` is cheap to share: engines take it behind an
/// [`Arc`](std::sync::Arc) and it is `Send + Sync`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Dialect {
    name: String,
    messages: BTreeMap<u32, MessageDefinition>,
    ids_by_name: HashMap<String, u32>,
    crc_extras: BTreeMap<u32, u8>,
}

impl Dialect {
    /// Builds a catalog from generator output, validating its invariants:
    /// unique 24-bit ids, unique names, extension fields after all core
    /// fields, and payloads that fit the one-byte length field.
    pub fn new(
        name: &str,
        definitions: Vec<MessageDefinition>,
        crc_extras: BTreeMap<u32, u8>,
    ) -> Result<Self, DialectError> {
        let mut messages = BTreeMap::new();
        let mut ids_by_name = HashMap::new();

        for definition in definitions {
            if definition.id > MAX_MESSAGE_ID {
                return Err(DialectError::MessageIdOutOfRange { id: definition.id });
            }
            if definition.core_payload_size() == 0 {
                return Err(DialectError::EmptyMessage {
                    message: definition.name.clone(),
                });
            }
            if definition.payload_size() > MAX_PAYLOAD_SIZE {
                return Err(DialectError::OversizedPayload {
                    message: definition.name.clone(),
                    size: definition.payload_size(),
                });
            }
            let mut seen_extension = false;
            for field in &definition.fields {
                if field.extension {
                    seen_extension = true;
                } else if seen_extension {
                    return Err(DialectError::MisplacedExtension {
                        message: definition.name.clone(),
                        field: field.name.clone(),
                    });
                }
            }
            if ids_by_name
                .insert(definition.name.clone(), definition.id)
                .is_some()
            {
                return Err(DialectError::DuplicateMessageName {
                    name: definition.name,
                });
            }
            let id = definition.id;
            if messages.insert(id, definition).is_some() {
                return Err(DialectError::DuplicateMessageId { id });
            }
        }

        Ok(Self {
            name: name.to_string(),
            messages,
            ids_by_name,
            crc_extras,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message_by_id(&self, id: u32) -> Option<&MessageDefinition> {
        self.messages.get(&id)
    }

    pub fn message_by_name(&self, name: &str) -> Option<&MessageDefinition> {
        self.ids_by_name.get(name).and_then(|id| self.messages.get(id))
    }

    pub fn supports_message_id(&self, id: u32) -> bool {
        self.messages.contains_key(&id)
    }

    pub fn supports_message_name(&self, name: &str) -> bool {
        self.ids_by_name.contains_key(name)
    }

    /// Registered ids, ascending.
    pub fn message_ids(&self) -> Vec<u32> {
        self.messages.keys().copied().collect()
    }

    /// Registered names, in ascending id order.
    pub fn message_names(&self) -> Vec<&str> {
        self.messages.values().map(|d| d.name.as_str()).collect()
    }

    pub fn crc_extra(&self, id: u32) -> Option<u8> {
        self.crc_extras.get(&id).copied()
    }

    /// The full CRC_EXTRA table, as the framer consumes it.
    pub fn crc_extras(&self) -> &BTreeMap<u32, u8> {
        &self.crc_extras
    }
}
