//! Attribute codec: pure encode/decode per characteristic.
//!
//! Decoders check the minimum layout length up front and return
//! [`DecodeError::Truncated`] instead of slicing short payloads. Nothing here
//! touches the transport.

use crate::gatt::AttributeId;

pub const PASSCODE_LEN: usize = 6;

const LOCK_STATUS_LEN: usize = 1;
const USER_STATUS_LEN: usize = 4;
const VOC_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("{attribute} payload truncated: need at least {need} bytes, got {got}")]
    Truncated {
        attribute: AttributeId,
        need: usize,
        got: usize,
    },
    #[error("passcode must be exactly {PASSCODE_LEN} ASCII digits")]
    InvalidPasscodeFormat,
}

/// Authentication phase as reported by the peripheral. The client only
/// observes these; it never drives transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Ready,
    PresenceDetected,
    WaitingPasscode,
    Locked,
    Shutdown,
    /// Any state byte >= 5. Not an error: firmware may grow states.
    Unknown(u8),
}

impl From<u8> for AuthState {
    fn from(b: u8) -> Self {
        match b {
            0 => AuthState::Ready,
            1 => AuthState::PresenceDetected,
            2 => AuthState::WaitingPasscode,
            3 => AuthState::Locked,
            4 => AuthState::Shutdown,
            n => AuthState::Unknown(n),
        }
    }
}

impl std::fmt::Display for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthState::Ready => f.write_str("READY"),
            AuthState::PresenceDetected => f.write_str("PRESENCE_DETECTED"),
            AuthState::WaitingPasscode => f.write_str("WAITING_PASSCODE"),
            AuthState::Locked => f.write_str("LOCKED"),
            AuthState::Shutdown => f.write_str("SHUTDOWN"),
            AuthState::Unknown(n) => write!(f, "UNKNOWN({n})"),
        }
    }
}

/// User status characteristic payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserStatus {
    pub state: AuthState,
    pub failed_attempts: u8,
    pub system_locked: bool,
    pub tamper_detected: bool,
}

/// Lock status characteristic payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockStatus {
    Open,
    Closed,
}

impl std::fmt::Display for LockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockStatus::Open => f.write_str("open"),
            LockStatus::Closed => f.write_str("closed"),
        }
    }
}

/// VOC sensor characteristic payload. `timestamp` is device-relative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VocReading {
    pub current_voc: u16,
    pub threshold: u16,
    pub timestamp: u32,
}

/// UTF-8 bytes of the username, no padding added by the client.
pub fn encode_username(name: &str) -> Vec<u8> {
    name.as_bytes().to_vec()
}

/// UTF-8 decode (lossy) and strip trailing NUL padding.
pub fn decode_username(data: &[u8]) -> String {
    String::from_utf8_lossy(data)
        .trim_end_matches('\0')
        .to_string()
}

/// Byte 0 == 0 is closed, any non-zero value is open.
pub fn decode_lock_status(data: &[u8]) -> Result<LockStatus, DecodeError> {
    if data.is_empty() {
        return Err(DecodeError::Truncated {
            attribute: AttributeId::LockStatus,
            need: LOCK_STATUS_LEN,
            got: 0,
        });
    }
    Ok(if data[0] == 0 {
        LockStatus::Closed
    } else {
        LockStatus::Open
    })
}

/// Layout: `[state: u8, failed_attempts: u8, system_locked: u8, tamper_detected: u8]`.
pub fn decode_user_status(data: &[u8]) -> Result<UserStatus, DecodeError> {
    if data.len() < USER_STATUS_LEN {
        return Err(DecodeError::Truncated {
            attribute: AttributeId::UserStatus,
            need: USER_STATUS_LEN,
            got: data.len(),
        });
    }
    Ok(UserStatus {
        state: AuthState::from(data[0]),
        failed_attempts: data[1],
        system_locked: data[2] != 0,
        tamper_detected: data[3] != 0,
    })
}

/// Validates the 6-ASCII-digit invariant before producing any bytes.
pub fn encode_passcode(code: &str) -> Result<Vec<u8>, DecodeError> {
    if code.len() != PASSCODE_LEN || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::InvalidPasscodeFormat);
    }
    Ok(code.as_bytes().to_vec())
}

/// UTF-8 decode (lossy) and strip trailing NUL padding.
pub fn decode_passcode(data: &[u8]) -> String {
    String::from_utf8_lossy(data)
        .trim_end_matches('\0')
        .to_string()
}

/// Little-endian `u16, u16, u32`.
pub fn decode_voc(data: &[u8]) -> Result<VocReading, DecodeError> {
    if data.len() < VOC_LEN {
        return Err(DecodeError::Truncated {
            attribute: AttributeId::VocSensor,
            need: VOC_LEN,
            got: data.len(),
        });
    }
    Ok(VocReading {
        current_voc: u16::from_le_bytes([data[0], data[1]]),
        threshold: u16::from_le_bytes([data[2], data[3]]),
        timestamp: u32::from_le_bytes([data[4], data[5], data[6], data[7]]),
    })
}

/// Little-endian `u16, u16, u32`. The client never writes this attribute;
/// the encoder exists for symmetry and for stub peripherals in tests.
pub fn encode_voc(reading: &VocReading) -> [u8; VOC_LEN] {
    let mut buf = [0u8; VOC_LEN];
    buf[0..2].copy_from_slice(&reading.current_voc.to_le_bytes());
    buf[2..4].copy_from_slice(&reading.threshold.to_le_bytes());
    buf[4..8].copy_from_slice(&reading.timestamp.to_le_bytes());
    buf
}
