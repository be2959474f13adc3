//! Message and field definitions: the units a dialect catalog is built from.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::TypeParseError;
use crate::types::MavType;

/// One field of a message definition.
///
/// Fields are declared in XML order; that order (not the wire order) is
/// what generators emit and what the stable wire-order sort starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldDefinition {
    pub name: String,
    pub mav_type: MavType,
    /// Extension fields were added after the message was frozen. They are
    /// only transmitted by MAVLink 2 peers and their trailing zero bytes
    /// are truncated on the wire.
    pub extension: bool,
}

impl FieldDefinition {
    /// Builds a field from a type string; inline array suffixes
    /// (`uint8_t[8]`) are allowed.
    pub fn new(name: &str, type_str: &str, extension: bool) -> Result<Self, TypeParseError> {
        Ok(Self {
            name: name.to_string(),
            mav_type: MavType::parse(type_str)?,
            extension,
        })
    }

    /// Builds an array field from a scalar base type and an explicit
    /// length. This is the generator form where the XML carries
    /// `array_length` separately; combining it with an inline `[N]`
    /// suffix (or a length below 2) is rejected.
    pub fn array(
        name: &str,
        base_type: &str,
        array_length: usize,
        extension: bool,
    ) -> Result<Self, TypeParseError> {
        let base = MavType::parse(base_type)?;
        if base.is_array() {
            return Err(TypeParseError::ScalarRequired {
                spec: base_type.to_string(),
            });
        }
        if array_length < 2 {
            return Err(TypeParseError::InvalidArrayLength {
                spec: format!("{base_type}[{array_length}]"),
            });
        }
        Ok(Self {
            name: name.to_string(),
            mav_type: MavType::Array(Box::new(base), array_length),
            extension,
        })
    }
}

/// A message definition: id, unique name, and fields in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MessageDefinition {
    pub id: u32,
    pub name: String,
    pub fields: Vec<FieldDefinition>,
}

impl MessageDefinition {
    pub fn new(id: u32, name: &str, fields: Vec<FieldDefinition>) -> Self {
        Self {
            id,
            name: name.to_string(),
            fields,
        }
    }

    /// Fields in the order they appear on the wire.
    ///
    /// Core fields sort by descending *element* size (a `uint8_t[20]`
    /// ranks as 1), stably, so equal-rank fields keep declaration order.
    /// Extension fields follow in declaration order, unsorted.
    pub fn wire_order(&self) -> Vec<&FieldDefinition> {
        let mut ordered: Vec<&FieldDefinition> =
            self.fields.iter().filter(|f| !f.extension).collect();
        ordered.sort_by(|a, b| b.mav_type.element_size().cmp(&a.mav_type.element_size()));
        ordered.extend(self.fields.iter().filter(|f| f.extension));
        ordered
    }

    /// Payload size with every field, extensions included, at full width.
    pub fn payload_size(&self) -> usize {
        self.fields.iter().map(|f| f.mav_type.size()).sum()
    }

    /// Payload size of the core fields only; the floor below which a v2
    /// payload is never truncated.
    pub fn core_payload_size(&self) -> usize {
        self.fields
            .iter()
            .filter(|f| !f.extension)
            .map(|f| f.mav_type.size())
            .sum()
    }

    pub fn has_extensions(&self) -> bool {
        self.fields.iter().any(|f| f.extension)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }
}
