#![allow(unused)]

use std::collections::BTreeMap;
use std::sync::Arc;

use mavdialect::{
    Dialect, DialectEngine, FieldDefinition, MavlinkMessage, MavlinkVersion, MessageDefinition,
    Value,
};

fn field(name: &str, type_str: &str) -> FieldDefinition {
    FieldDefinition::new(name, type_str, false).unwrap()
}

fn extension(name: &str, type_str: &str) -> FieldDefinition {
    FieldDefinition::new(name, type_str, true).unwrap()
}

/// A slice of the common dialect: definitions in XML declaration order,
/// CRC_EXTRA seeds as published.
pub fn test_dialect() -> Arc<Dialect> {
    let heartbeat = MessageDefinition::new(
        0,
        "HEARTBEAT",
        vec![
            field("type", "uint8_t"),
            field("autopilot", "uint8_t"),
            field("base_mode", "uint8_t"),
            field("custom_mode", "uint32_t"),
            field("system_status", "uint8_t"),
            field("mavlink_version", "uint8_t_mavlink_version"),
        ],
    );

    let sys_status = MessageDefinition::new(
        1,
        "SYS_STATUS",
        vec![
            field("onboard_control_sensors_present", "uint32_t"),
            field("onboard_control_sensors_enabled", "uint32_t"),
            field("onboard_control_sensors_health", "uint32_t"),
            field("load", "uint16_t"),
            field("voltage_battery", "uint16_t"),
            field("current_battery", "int16_t"),
            field("battery_remaining", "int8_t"),
            field("drop_rate_comm", "uint16_t"),
            field("errors_comm", "uint16_t"),
            field("errors_count1", "uint16_t"),
            field("errors_count2", "uint16_t"),
            field("errors_count3", "uint16_t"),
            field("errors_count4", "uint16_t"),
            extension("onboard_control_sensors_present_extended", "uint32_t"),
            extension("onboard_control_sensors_enabled_extended", "uint32_t"),
            extension("onboard_control_sensors_health_extended", "uint32_t"),
        ],
    );

    let param_value = MessageDefinition::new(
        22,
        "PARAM_VALUE",
        vec![
            field("param_id", "char[16]"),
            field("param_value", "float"),
            field("param_type", "uint8_t"),
            field("param_count", "uint16_t"),
            field("param_index", "uint16_t"),
        ],
    );

    let statustext = MessageDefinition::new(
        253,
        "STATUSTEXT",
        vec![
            field("severity", "uint8_t"),
            field("text", "char[50]"),
            extension("id", "uint16_t"),
            extension("chunk_seq", "uint8_t"),
        ],
    );

    let protocol_version = MessageDefinition::new(
        300,
        "PROTOCOL_VERSION",
        vec![
            field("version", "uint16_t"),
            field("min_version", "uint16_t"),
            field("max_version", "uint16_t"),
            field("spec_version_hash", "uint8_t[8]"),
            field("library_version_hash", "uint8_t[8]"),
        ],
    );

    let crc_extras = BTreeMap::from([(0, 50), (1, 124), (22, 220), (253, 83), (300, 217)]);

    Arc::new(
        Dialect::new(
            "common_subset",
            vec![heartbeat, sys_status, param_value, statustext, protocol_version],
            crc_extras,
        )
        .unwrap(),
    )
}

pub fn engine() -> DialectEngine {
    DialectEngine::new(test_dialect())
}

/// Call at the top of tests that want `RUST_LOG` diagnostics from the
/// engine.
pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// The HEARTBEAT of scenario S1: explicit header fields, MAVLink 1.
pub fn heartbeat_message() -> MavlinkMessage {
    let mut message = MavlinkMessage::new("HEARTBEAT");
    message.payload = BTreeMap::from([
        ("type".to_string(), Value::UInt8(6)),
        ("autopilot".to_string(), Value::UInt8(8)),
        ("base_mode".to_string(), Value::UInt8(81)),
        ("custom_mode".to_string(), Value::UInt32(12345)),
        ("system_status".to_string(), Value::UInt8(4)),
        ("mavlink_version".to_string(), Value::UInt8(3)),
    ]);
    message.sequence = 42;
    message.protocol_version = Some(MavlinkVersion::V1);
    message
}

/// S1's expected frame, up to (not including) the checksum.
pub const HEARTBEAT_V1_PREFIX: [u8; 15] = [
    0xFE, 0x09, 0x2A, 0x01, 0x01, 0x00, // header
    0x39, 0x30, 0x00, 0x00, // custom_mode = 12345
    0x06, 0x08, 0x51, 0x04, 0x03, // remaining uint8 fields in declaration order
];
