use core::fmt::{Display, Formatter};
use std::error::Error;

/// Failures on the serialize path.
///
/// Receive-side conditions (CRC mismatch, unknown message id) are not
/// errors; they surface as data on [`ParsedMessage`](crate::ParsedMessage).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The requested message name is absent from the dialect catalog.
    UnknownMessage { name: String },
    /// A payload value cannot be encoded into its field's wire type.
    MalformedMessage { field: String, reason: String },
    /// The catalog has a definition for this id but no CRC_EXTRA seed.
    /// Indicates a broken dialect; correctly generated catalogs carry a
    /// seed for every message.
    MissingCrcExtra { id: u32 },
}

impl Display for EncodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownMessage { name } => {
                write!(f, "Unknown message with name {name:?}")
            }
            Self::MalformedMessage { field, reason } => {
                write!(f, "Malformed message: field {field:?}: {reason}")
            }
            Self::MissingCrcExtra { id } => {
                write!(f, "No CRC_EXTRA registered for message id {id}")
            }
        }
    }
}

impl Error for EncodeError {}

/// Failures when parsing a MAVLink type string such as `uint16_t` or
/// `char[16]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeParseError {
    UnknownType { spec: String },
    InvalidArrayLength { spec: String },
    NestedArrays { spec: String },
    /// An explicit array length was combined with a non-scalar base type,
    /// or with a type string that already carries an inline `[N]` suffix.
    ScalarRequired { spec: String },
}

impl Display for TypeParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownType { spec } => write!(f, "Unknown MAVLink type {spec:?}"),
            Self::InvalidArrayLength { spec } => {
                write!(f, "Invalid array length in type {spec:?}")
            }
            Self::NestedArrays { spec } => {
                write!(f, "Arrays of arrays are not supported: {spec:?}")
            }
            Self::ScalarRequired { spec } => {
                write!(f, "A scalar base type is required, got {spec:?}")
            }
        }
    }
}

impl Error for TypeParseError {}

/// Catalog construction invariant violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialectError {
    DuplicateMessageId { id: u32 },
    DuplicateMessageName { name: String },
    /// Message ids are 24-bit on the wire.
    MessageIdOutOfRange { id: u32 },
    /// Extension fields must follow every core field in declaration order.
    MisplacedExtension { message: String, field: String },
    /// A message without core fields cannot be framed (payloads are never
    /// truncated below one byte).
    EmptyMessage { message: String },
    /// Payloads are limited to 255 bytes by the length field.
    OversizedPayload { message: String, size: usize },
}

impl Display for DialectError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::DuplicateMessageId { id } => {
                write!(f, "Duplicate message id {id} in dialect")
            }
            Self::DuplicateMessageName { name } => {
                write!(f, "Duplicate message name {name:?} in dialect")
            }
            Self::MessageIdOutOfRange { id } => {
                write!(f, "Message id {id} does not fit in 24 bits")
            }
            Self::MisplacedExtension { message, field } => {
                write!(
                    f,
                    "Extension field {field:?} of {message} precedes a core field"
                )
            }
            Self::EmptyMessage { message } => {
                write!(f, "Message {message} has no core fields")
            }
            Self::OversizedPayload { message, size } => {
                write!(f, "Message {message} payload is {size} bytes, max is 255")
            }
        }
    }
}

impl Error for DialectError {}
