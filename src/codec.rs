//! Little-endian payload encoding and decoding against a message
//! definition.
//!
//! Both directions walk the definition's wire order. Encoding always lays
//! out every declared field at full width, then applies the MAVLink 2
//! trailing-zero truncation when the definition carries extension fields;
//! decoding tolerates any truncated tail by substituting type defaults, so
//! a round trip through a truncated frame is lossless up to defaults.

use std::collections::BTreeMap;

use byteorder::{ByteOrder, LittleEndian};

use crate::definition::{FieldDefinition, MessageDefinition};
use crate::error::EncodeError;
use crate::types::{MavType, Value};
use crate::MavlinkVersion;

/// Decodes a (possibly truncated) payload into a name → value map.
///
/// Every declared field gets a value: fields beyond the end of the buffer
/// decode to their type default, and a field the truncation cut mid-way is
/// decoded from a zero-extended copy of its remaining bytes.
pub fn decode_payload(payload: &[u8], definition: &MessageDefinition) -> BTreeMap<String, Value> {
    let mut values = BTreeMap::new();
    let mut offset = 0usize;

    for field in definition.wire_order() {
        let size = field.mav_type.size();
        let value = if offset >= payload.len() {
            field.mav_type.default_value()
        } else if offset + size <= payload.len() {
            decode_value(&field.mav_type, &payload[offset..offset + size])
        } else {
            let mut padded = vec![0u8; size];
            let available = payload.len() - offset;
            padded[..available].copy_from_slice(&payload[offset..]);
            decode_value(&field.mav_type, &padded)
        };
        values.insert(field.name.clone(), value);
        offset += size;
    }

    values
}

/// Encodes a name → value map into wire bytes.
///
/// Missing fields encode as their defaults (all zero bytes on the wire).
/// For [`MavlinkVersion::V2`] and a definition with extension fields, the
/// buffer is truncated to one past the last non-zero byte, never below the
/// core payload size; MAVLink 1 payloads always keep full width.
pub fn encode_payload(
    payload: &BTreeMap<String, Value>,
    definition: &MessageDefinition,
    version: MavlinkVersion,
) -> Result<Vec<u8>, EncodeError> {
    let mut buf = vec![0u8; definition.payload_size()];
    let mut offset = 0usize;

    for field in definition.wire_order() {
        let size = field.mav_type.size();
        if let Some(value) = payload.get(&field.name) {
            encode_value(field, value, &mut buf[offset..offset + size])?;
        }
        offset += size;
    }

    if version == MavlinkVersion::V2 && definition.has_extensions() {
        let core_size = definition.core_payload_size();
        let mut trimmed = buf.len();
        while trimmed > core_size && buf[trimmed - 1] == 0 {
            trimmed -= 1;
        }
        buf.truncate(trimmed);
    }

    Ok(buf)
}

fn decode_value(mav_type: &MavType, bytes: &[u8]) -> Value {
    match mav_type {
        MavType::Array(base, len) if **base == MavType::Char => decode_char_array(bytes, *len),
        MavType::Array(base, len) => {
            let element_size = base.size();
            let elements = (0..*len)
                .map(|i| decode_scalar(base, &bytes[i * element_size..(i + 1) * element_size]))
                .collect();
            Value::Array(elements)
        }
        scalar => decode_scalar(scalar, bytes),
    }
}

fn decode_scalar(mav_type: &MavType, bytes: &[u8]) -> Value {
    match mav_type {
        MavType::Int8 => Value::Int8(bytes[0] as i8),
        MavType::Int16 => Value::Int16(LittleEndian::read_i16(bytes)),
        MavType::Int32 => Value::Int32(LittleEndian::read_i32(bytes)),
        MavType::Int64 => Value::Int64(LittleEndian::read_i64(bytes)),
        MavType::UInt8 => Value::UInt8(bytes[0]),
        MavType::UInt16 => Value::UInt16(LittleEndian::read_u16(bytes)),
        MavType::UInt32 => Value::UInt32(LittleEndian::read_u32(bytes)),
        MavType::UInt64 => Value::UInt64(LittleEndian::read_u64(bytes)),
        MavType::Float => Value::Float(LittleEndian::read_f32(bytes)),
        MavType::Double => Value::Double(LittleEndian::read_f64(bytes)),
        MavType::Char => Value::Char(bytes[0]),
        MavType::Array(..) => unreachable!("arrays are decoded element-wise"),
    }
}

// A char[N] stops at the first NUL. Wire chars are raw one-byte values
// with no encoding attached, so each byte maps to one char losslessly.
fn decode_char_array(bytes: &[u8], len: usize) -> Value {
    let text = &bytes[..len];
    let end = text.iter().position(|&b| b == 0).unwrap_or(len);
    Value::String(text[..end].iter().map(|&b| b as char).collect())
}

fn encode_value(
    field: &FieldDefinition,
    value: &Value,
    out: &mut [u8],
) -> Result<(), EncodeError> {
    match &field.mav_type {
        MavType::Array(base, len) if **base == MavType::Char => {
            // One byte per character, mirroring the decode side; code
            // points above 0xFF truncate to their low byte.
            let text: Vec<u8> = match value {
                Value::String(s) => s.chars().map(|c| c as u8).collect(),
                Value::Bytes(b) => b.clone(),
                other => return Err(malformed(field, other, "expected a string")),
            };
            // NUL padding is already in place; overlong input truncates.
            let n = text.len().min(*len);
            out[..n].copy_from_slice(&text[..n]);
            Ok(())
        }
        MavType::Array(base, len) => {
            let element_size = base.size();
            match value {
                Value::Array(elements) => {
                    for (i, element) in elements.iter().take(*len).enumerate() {
                        encode_scalar(
                            field,
                            base,
                            element,
                            &mut out[i * element_size..(i + 1) * element_size],
                        )?;
                    }
                    Ok(())
                }
                Value::Bytes(bytes) if **base == MavType::UInt8 => {
                    let n = bytes.len().min(*len);
                    out[..n].copy_from_slice(&bytes[..n]);
                    Ok(())
                }
                other => Err(malformed(field, other, "expected an array")),
            }
        }
        scalar => encode_scalar(field, scalar, value, out),
    }
}

fn encode_scalar(
    field: &FieldDefinition,
    mav_type: &MavType,
    value: &Value,
    out: &mut [u8],
) -> Result<(), EncodeError> {
    match mav_type {
        MavType::Float => {
            let v = value
                .as_f64()
                .ok_or_else(|| malformed(field, value, "expected a number"))?;
            LittleEndian::write_f32(out, v as f32);
        }
        MavType::Double => {
            let v = value
                .as_f64()
                .ok_or_else(|| malformed(field, value, "expected a number"))?;
            LittleEndian::write_f64(out, v);
        }
        _ => {
            let v = value
                .as_i128()
                .ok_or_else(|| malformed(field, value, "expected an integer"))?;
            match mav_type {
                MavType::Int8 => out[0] = (v as i8) as u8,
                MavType::Int16 => LittleEndian::write_i16(out, v as i16),
                MavType::Int32 => LittleEndian::write_i32(out, v as i32),
                MavType::Int64 => LittleEndian::write_i64(out, v as i64),
                MavType::UInt8 | MavType::Char => out[0] = v as u8,
                MavType::UInt16 => LittleEndian::write_u16(out, v as u16),
                MavType::UInt32 => LittleEndian::write_u32(out, v as u32),
                MavType::UInt64 => LittleEndian::write_u64(out, v as u64),
                MavType::Float | MavType::Double | MavType::Array(..) => {
                    unreachable!("handled above")
                }
            }
        }
    }
    Ok(())
}

fn malformed(field: &FieldDefinition, value: &Value, expectation: &str) -> EncodeError {
    EncodeError::MalformedMessage {
        field: field.name.clone(),
        reason: format!(
            "{expectation} for {} field, got {}",
            field.mav_type.definition_name(),
            value.kind()
        ),
    }
}
