//! BLE GATT identifiers for the SecureLockbox peripheral.
//!
//! One custom service with six characteristics. Callers address them through
//! [`AttributeId`] only; the raw UUIDs never cross a call boundary.

use uuid::Uuid;

/// Advertised device name the peripheral scans are matched against.
pub const DEVICE_NAME: &str = "SecureLockbox";

/// Lockbox service UUID: 00001234-0000-1000-8000-00805f9b34fb
pub const SERVICE_UUID: Uuid = Uuid::from_u128(0x00001234_0000_1000_8000_00805f9b34fb);

const USERNAME_UUID: Uuid = Uuid::from_u128(0x0000aa01_0000_1000_8000_00805f9b34fb);
const BLOCK_INFO_UUID: Uuid = Uuid::from_u128(0x0000bb02_0000_1000_8000_00805f9b34fb);
const LOCK_STATUS_UUID: Uuid = Uuid::from_u128(0x0000cc03_0000_1000_8000_00805f9b34fb);
const USER_STATUS_UUID: Uuid = Uuid::from_u128(0x0000dd04_0000_1000_8000_00805f9b34fb);
const PASSCODE_UUID: Uuid = Uuid::from_u128(0x0000ee05_0000_1000_8000_00805f9b34fb);
const VOC_SENSOR_UUID: Uuid = Uuid::from_u128(0x0000ff06_0000_1000_8000_00805f9b34fb);

/// The six characteristics exposed by the lockbox service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeId {
    /// Client identity, UTF-8, NUL-padded on the wire (read/write).
    Username,
    /// Reserved by the peripheral, not used by the client.
    BlockInfo,
    /// 1 byte: 0 = closed, non-zero = open (read-only).
    LockStatus,
    /// 4 bytes: state, failed attempts, system locked, tamper (read-only).
    UserStatus,
    /// 6 ASCII digits, UTF-8, NUL-padded on the wire (read/write).
    Passcode,
    /// 8 bytes little-endian: current u16, threshold u16, timestamp u32 (read-only).
    VocSensor,
}

impl AttributeId {
    /// All characteristics, in wire-identifier order.
    pub const ALL: [AttributeId; 6] = [
        AttributeId::Username,
        AttributeId::BlockInfo,
        AttributeId::LockStatus,
        AttributeId::UserStatus,
        AttributeId::Passcode,
        AttributeId::VocSensor,
    ];

    /// The fixed 128-bit characteristic UUID.
    pub fn uuid(self) -> Uuid {
        match self {
            AttributeId::Username => USERNAME_UUID,
            AttributeId::BlockInfo => BLOCK_INFO_UUID,
            AttributeId::LockStatus => LOCK_STATUS_UUID,
            AttributeId::UserStatus => USER_STATUS_UUID,
            AttributeId::Passcode => PASSCODE_UUID,
            AttributeId::VocSensor => VOC_SENSOR_UUID,
        }
    }
}

impl std::fmt::Display for AttributeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AttributeId::Username => "username",
            AttributeId::BlockInfo => "block-info",
            AttributeId::LockStatus => "lock-status",
            AttributeId::UserStatus => "user-status",
            AttributeId::Passcode => "passcode",
            AttributeId::VocSensor => "voc-sensor",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuids_are_distinct() {
        for (i, a) in AttributeId::ALL.iter().enumerate() {
            for b in &AttributeId::ALL[i + 1..] {
                assert_ne!(a.uuid(), b.uuid(), "{a} and {b} share a UUID");
            }
            assert_ne!(a.uuid(), SERVICE_UUID);
        }
    }
}
