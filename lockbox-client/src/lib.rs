//! Session and protocol client for the SecureLockbox peripheral.
//!
//! Layering, bottom up: [`transport`] is the narrow capability interface over
//! the radio (implemented for btleplug in [`ble`]), [`session`] owns one
//! connection and its lifecycle state, [`client`] composes the session with
//! the `lockbox-proto` codec into typed per-attribute operations.

pub mod ble;
pub mod client;
pub mod error;
pub mod session;
pub mod transport;

pub use ble::BleTransport;
pub use client::LockboxClient;
pub use error::ClientError;
pub use session::{Session, SessionState};
pub use transport::{Transport, TransportError};
