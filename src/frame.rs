//! Frame boundary location, header parsing and frame assembly.
//!
//! The framer is deliberately buffer-oriented: it is handed the current
//! contents of the stream buffer and reports how many bytes it consumed,
//! so partial frames cost nothing and noise is skipped in bulk.

use std::collections::BTreeMap;

use byteorder::{ByteOrder, LittleEndian};
use log::{debug, trace};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::crc::{calculate_crc, validate_crc_with_table};
use crate::{MavlinkVersion, MAVLINK_IFLAG_SIGNED, MAV_STX, MAV_STX_V2};

/// Header length including the magic byte.
pub const V1_HEADER_SIZE: usize = 6;
pub const V2_HEADER_SIZE: usize = 10;

/// Smallest parseable frame (empty payload, no signature).
pub const V1_MIN_FRAME_SIZE: usize = V1_HEADER_SIZE + 2;
pub const V2_MIN_FRAME_SIZE: usize = V2_HEADER_SIZE + 2;

pub const SIGNATURE_SIZE: usize = 13;
const CHECKSUM_SIZE: usize = 2;

/// One wire frame, v1 or v2, as extracted from a byte stream.
///
/// A frame is an ephemeral value: the framer produces it, the codec decodes
/// its payload against the catalog, and it is dropped. `crc_ok` is computed
/// at parse time; a failing checksum does not suppress the frame.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Frame {
    pub magic: u8,
    pub payload_length: u8,
    /// Zero on v1 frames; bit 0 signals a trailing signature on v2.
    pub incompat_flags: u8,
    pub compat_flags: u8,
    pub sequence: u8,
    pub system_id: u8,
    pub component_id: u8,
    pub message_id: u32,
    pub payload: Vec<u8>,
    pub checksum: u16,
    /// Carried through opaquely; never produced or validated here.
    pub signature: Option<[u8; SIGNATURE_SIZE]>,
    pub crc_ok: bool,
}

impl Frame {
    pub fn protocol_version(&self) -> MavlinkVersion {
        if self.magic == MAV_STX_V2 {
            MavlinkVersion::V2
        } else {
            MavlinkVersion::V1
        }
    }

    /// Wire length of this frame including magic, checksum and signature.
    pub fn frame_len(&self) -> usize {
        let header = match self.protocol_version() {
            MavlinkVersion::V1 => V1_HEADER_SIZE,
            MavlinkVersion::V2 => V2_HEADER_SIZE,
        };
        header
            + self.payload.len()
            + CHECKSUM_SIZE
            + self.signature.map_or(0, |_| SIGNATURE_SIZE)
    }
}

/// Locates and extracts the first frame in `bytes`.
///
/// Returns the frame (if one is complete) and the number of bytes consumed
/// from the start of `bytes`, junk prefix included. The contract with the
/// stream buffer:
///
/// * `(None, 0)` — nothing to do yet, wait for more data;
/// * `(None, n)` with `n > 0` — `n` bytes of noise were discarded (or the
///   whole buffer held no magic marker); call again;
/// * `(Some(frame), n)` — `n` covers the noise prefix and the entire frame.
///
/// A frame whose checksum fails (or whose id has no CRC_EXTRA in `crc_table`)
/// is still returned, tagged `crc_ok = false`, and fully consumed; downstream
/// layers choose the drop policy.
pub fn parse_frame(bytes: &[u8], crc_table: &BTreeMap<u32, u8>) -> (Option<Frame>, usize) {
    if bytes.len() < V1_MIN_FRAME_SIZE {
        return (None, 0);
    }

    let offset = match bytes
        .iter()
        .position(|&b| b == MAV_STX || b == MAV_STX_V2)
    {
        Some(offset) => offset,
        None => {
            trace!("no frame marker in {} bytes, discarding", bytes.len());
            return (None, bytes.len());
        }
    };

    let buf = &bytes[offset..];
    let is_v2 = buf[0] == MAV_STX_V2;
    let min_size = if is_v2 { V2_MIN_FRAME_SIZE } else { V1_MIN_FRAME_SIZE };
    if buf.len() < min_size {
        return (None, offset);
    }

    let payload_length = buf[1] as usize;
    let (incompat_flags, compat_flags, sequence, system_id, component_id, message_id, header_size) =
        if is_v2 {
            (
                buf[2],
                buf[3],
                buf[4],
                buf[5],
                buf[6],
                LittleEndian::read_u24(&buf[7..10]),
                V2_HEADER_SIZE,
            )
        } else {
            (0, 0, buf[2], buf[3], buf[4], u32::from(buf[5]), V1_HEADER_SIZE)
        };

    let checksum_start = header_size + payload_length;
    let mut frame_end = checksum_start + CHECKSUM_SIZE;
    if buf.len() < frame_end {
        return (None, offset);
    }

    let payload = buf[header_size..checksum_start].to_vec();
    let checksum = LittleEndian::read_u16(&buf[checksum_start..checksum_start + CHECKSUM_SIZE]);

    let signature = if is_v2 && incompat_flags & MAVLINK_IFLAG_SIGNED != 0 {
        if buf.len() < frame_end + SIGNATURE_SIZE {
            // Signature flagged but not fully buffered yet.
            return (None, offset);
        }
        let mut signature = [0u8; SIGNATURE_SIZE];
        signature.copy_from_slice(&buf[frame_end..frame_end + SIGNATURE_SIZE]);
        frame_end += SIGNATURE_SIZE;
        Some(signature)
    } else {
        None
    };

    let crc_ok = validate_crc_with_table(&buf[1..checksum_start], message_id, checksum, crc_table);
    if !crc_ok {
        debug!("checksum mismatch on message id {message_id}, emitting with crc_ok=false");
    }
    if offset > 0 {
        trace!("resynchronized after {offset} bytes of noise");
    }

    let frame = Frame {
        magic: buf[0],
        payload_length: payload_length as u8,
        incompat_flags,
        compat_flags,
        sequence,
        system_id,
        component_id,
        message_id,
        payload,
        checksum,
        signature,
        crc_ok,
    };

    (Some(frame), offset + frame_end)
}

/// Assembles a wire frame around an already encoded payload.
///
/// MAVLink 2 is forced when the id does not fit the one-byte v1 field.
/// Emitted frames always carry zeroed incompat/compat flags: signing is not
/// produced here, only passed through on receive.
pub fn create_frame(
    message_id: u32,
    payload: &[u8],
    system_id: u8,
    component_id: u8,
    sequence: u8,
    crc_extra: u8,
    version: MavlinkVersion,
) -> Vec<u8> {
    let version = if message_id > 255 {
        MavlinkVersion::V2
    } else {
        version
    };

    let mut buf = Vec::with_capacity(V2_HEADER_SIZE + payload.len() + CHECKSUM_SIZE);
    match version {
        MavlinkVersion::V1 => {
            buf.extend_from_slice(&[
                MAV_STX,
                payload.len() as u8,
                sequence,
                system_id,
                component_id,
                message_id as u8,
            ]);
        }
        MavlinkVersion::V2 => {
            let id = message_id.to_le_bytes();
            buf.extend_from_slice(&[
                MAV_STX_V2,
                payload.len() as u8,
                0, // incompat_flags
                0, // compat_flags
                sequence,
                system_id,
                component_id,
                id[0],
                id[1],
                id[2],
            ]);
        }
    }
    buf.extend_from_slice(payload);

    let crc = calculate_crc(&buf[1..], crc_extra);
    buf.extend_from_slice(&crc.to_le_bytes());
    trace!(
        "emitted frame for message id {message_id}: {} bytes, {} payload",
        buf.len(),
        payload.len()
    );
    buf
}
