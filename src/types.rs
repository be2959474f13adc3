//! The MAVLink field type system and the dynamic values that flow through
//! the codec.

use regex::Regex;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::TypeParseError;

const RE_ARRAY_TYPE: &str = r"^(.+)\[(\d+)\]$";

/// A MAVLink primitive type, or an array of one.
///
/// Parsed from the type strings used in XML message definitions
/// (`uint8_t`, `float`, `char[16]`, ...). All multi-byte types are
/// little-endian on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MavType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float,
    Double,
    Char,
    /// Array of a scalar type. Nested arrays are rejected by [`parse`](Self::parse).
    Array(Box<MavType>, usize),
}

impl core::str::FromStr for MavType {
    type Err = TypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl MavType {
    /// Parses a type from its XML definition string.
    ///
    /// The legacy `uint8_t_mavlink_version` spelling is accepted as
    /// `uint8_t`; some generators still emit it for `HEARTBEAT.mavlink_version`.
    pub fn parse(s: &str) -> Result<Self, TypeParseError> {
        let s = s.trim();
        let re_array_type = Regex::new(RE_ARRAY_TYPE).unwrap();

        let mav_type = match s {
            "int8_t" => Self::Int8,
            "int16_t" => Self::Int16,
            "int32_t" => Self::Int32,
            "int64_t" => Self::Int64,
            "uint8_t" => Self::UInt8,
            "uint16_t" => Self::UInt16,
            "uint32_t" => Self::UInt32,
            "uint64_t" => Self::UInt64,
            "float" => Self::Float,
            "double" => Self::Double,
            "char" => Self::Char,
            "uint8_t_mavlink_version" => Self::UInt8,
            _ if re_array_type.is_match(s) => {
                let (_, [base_name, len]) = re_array_type
                    .captures(s)
                    .map(|c| c.extract())
                    .unwrap();

                if re_array_type.is_match(base_name) {
                    return Err(TypeParseError::NestedArrays { spec: s.to_string() });
                }
                let len = len
                    .parse::<usize>()
                    .ok()
                    .filter(|&n| n >= 1)
                    .ok_or_else(|| TypeParseError::InvalidArrayLength { spec: s.to_string() })?;

                Self::Array(Box::new(Self::parse(base_name)?), len)
            }
            _ => return Err(TypeParseError::UnknownType { spec: s.to_string() }),
        };

        Ok(mav_type)
    }

    /// The type string as it appears in an XML definition. Inverse of
    /// [`parse`](Self::parse) (modulo the legacy version spelling).
    pub fn definition_name(&self) -> String {
        match self {
            Self::Int8 => "int8_t".to_string(),
            Self::Int16 => "int16_t".to_string(),
            Self::Int32 => "int32_t".to_string(),
            Self::Int64 => "int64_t".to_string(),
            Self::UInt8 => "uint8_t".to_string(),
            Self::UInt16 => "uint16_t".to_string(),
            Self::UInt32 => "uint32_t".to_string(),
            Self::UInt64 => "uint64_t".to_string(),
            Self::Float => "float".to_string(),
            Self::Double => "double".to_string(),
            Self::Char => "char".to_string(),
            Self::Array(base, len) => format!("{}[{len}]", base.definition_name()),
        }
    }

    /// Total wire size in bytes; arrays multiply by their length.
    pub fn size(&self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 | Self::Char => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float => 4,
            Self::Int64 | Self::UInt64 | Self::Double => 8,
            Self::Array(base, len) => base.size() * len,
        }
    }

    /// Size of a single element. This, not [`size`](Self::size), is the
    /// rank used by the wire-order sort: a `uint8_t[20]` sorts as 1.
    pub fn element_size(&self) -> usize {
        self.base_type().size()
    }

    /// The scalar type itself, or an array's element type.
    pub fn base_type(&self) -> &Self {
        match self {
            Self::Array(base, _) => base,
            _ => self,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(..))
    }

    /// The value an absent field decodes to.
    ///
    /// Numerics default to zero and `char[N]` to the empty string. A
    /// non-char array defaults to an *empty* sequence, not a zero-filled
    /// one: arrays are presence-optional at the API surface even though
    /// they are zero-padded on the wire.
    pub fn default_value(&self) -> Value {
        match self {
            Self::Int8 => Value::Int8(0),
            Self::Int16 => Value::Int16(0),
            Self::Int32 => Value::Int32(0),
            Self::Int64 => Value::Int64(0),
            Self::UInt8 => Value::UInt8(0),
            Self::UInt16 => Value::UInt16(0),
            Self::UInt32 => Value::UInt32(0),
            Self::UInt64 => Value::UInt64(0),
            Self::Float => Value::Float(0.0),
            Self::Double => Value::Double(0.0),
            Self::Char => Value::Char(0),
            Self::Array(base, _) => match **base {
                Self::Char => Value::String(String::new()),
                _ => Value::Array(Vec::new()),
            },
        }
    }
}

/// A decoded payload value.
///
/// One variant per scalar [`MavType`]; 64-bit integers keep their native
/// width so no precision is lost. `char[N]` fields surface as [`String`],
/// other arrays as [`Array`](Self::Array), and the opaque payload of an
/// unregistered message as [`Bytes`](Self::Bytes).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float(f32),
    Double(f64),
    Char(u8),
    String(String),
    Array(Vec<Value>),
    Bytes(Vec<u8>),
}

impl Value {
    /// Widens any integer-like variant to `i128`; floats truncate toward
    /// zero. `None` for strings, arrays and raw bytes.
    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            Self::Int8(v) => Some(v.into()),
            Self::Int16(v) => Some(v.into()),
            Self::Int32(v) => Some(v.into()),
            Self::Int64(v) => Some(v.into()),
            Self::UInt8(v) => Some(v.into()),
            Self::UInt16(v) => Some(v.into()),
            Self::UInt32(v) => Some(v.into()),
            Self::UInt64(v) => Some(v.into()),
            Self::Char(v) => Some(v.into()),
            Self::Float(v) => Some(v as i128),
            Self::Double(v) => Some(v as i128),
            Self::String(_) | Self::Array(_) | Self::Bytes(_) => None,
        }
    }

    /// Widens any numeric variant to `f64`. `None` for strings, arrays and
    /// raw bytes.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Int8(v) => Some(v.into()),
            Self::Int16(v) => Some(v.into()),
            Self::Int32(v) => Some(v.into()),
            Self::Int64(v) => Some(v as f64),
            Self::UInt8(v) => Some(v.into()),
            Self::UInt16(v) => Some(v.into()),
            Self::UInt32(v) => Some(v.into()),
            Self::UInt64(v) => Some(v as f64),
            Self::Char(v) => Some(v.into()),
            Self::Float(v) => Some(v.into()),
            Self::Double(v) => Some(v),
            Self::String(_) | Self::Array(_) | Self::Bytes(_) => None,
        }
    }

    /// Variant name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Int8(_) => "int8",
            Self::Int16(_) => "int16",
            Self::Int32(_) => "int32",
            Self::Int64(_) => "int64",
            Self::UInt8(_) => "uint8",
            Self::UInt16(_) => "uint16",
            Self::UInt32(_) => "uint32",
            Self::UInt64(_) => "uint64",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Char(_) => "char",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Bytes(_) => "bytes",
        }
    }
}
