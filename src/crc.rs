//! The X.25/MCRF4XX checksum used by MAVLink frames.
//!
//! The checksum covers every frame byte after the magic marker up to the end
//! of the payload, plus one virtual trailing byte: the message's CRC_EXTRA
//! seed. Two endpoints with mismatched message definitions therefore fail
//! each other's checksums instead of silently mis-decoding.

use std::collections::BTreeMap;

use crc_any::CRCu16;

/// Compute the checksum of `data` followed by the `crc_extra` seed byte.
pub fn calculate_crc(data: &[u8], crc_extra: u8) -> u16 {
    let mut crc_calculator = CRCu16::crc16mcrf4cc();
    crc_calculator.digest(data);

    crc_calculator.digest(&[crc_extra]);
    crc_calculator.get_crc()
}

/// Check `received` against the checksum of `data` seeded with `crc_extra`.
pub fn validate_crc(data: &[u8], crc_extra: u8, received: u16) -> bool {
    calculate_crc(data, crc_extra) == received
}

/// Check `received` using the CRC_EXTRA registered for `message_id`.
///
/// An id absent from the table validates as `false`: without the seed the
/// checksum cannot be reproduced, and the frame is surfaced to the caller
/// with `crc_ok = false` rather than dropped.
pub fn validate_crc_with_table(
    data: &[u8],
    message_id: u32,
    received: u16,
    table: &BTreeMap<u32, u8>,
) -> bool {
    match table.get(&message_id) {
        Some(&crc_extra) => validate_crc(data, crc_extra, received),
        None => false,
    }
}
