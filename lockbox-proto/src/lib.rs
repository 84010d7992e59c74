//! Wire protocol for the SecureLockbox peripheral.
//!
//! `gatt` holds the service/characteristic identifiers, `codec` the pure
//! encode/decode functions for each characteristic's byte layout. No I/O
//! happens in this crate.

pub mod codec;
pub mod gatt;

pub use codec::{
    AuthState, DecodeError, LockStatus, UserStatus, VocReading, decode_lock_status,
    decode_passcode, decode_user_status, decode_username, decode_voc, encode_passcode,
    encode_username, encode_voc,
};
pub use gatt::{AttributeId, DEVICE_NAME, SERVICE_UUID};
