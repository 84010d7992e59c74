//! Error taxonomy for session and client operations.

use lockbox_proto::{AttributeId, DecodeError};

use crate::transport::TransportError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("peripheral not found after {attempts} scan attempts")]
    DeviceNotFound { attempts: u32 },
    #[error("connect failed")]
    ConnectFailed(#[source] TransportError),
    #[error("a connect attempt is already in progress")]
    AlreadyConnecting,
    #[error("session is already connected")]
    AlreadyConnected,
    #[error("not connected")]
    NotConnected,
    #[error("passcode must be exactly 6 ASCII digits")]
    InvalidPasscodeFormat,
    #[error("failed to decode {attribute}")]
    Decode {
        attribute: AttributeId,
        #[source]
        source: DecodeError,
    },
    #[error("i/o failure on {attribute}")]
    CharacteristicIo {
        attribute: AttributeId,
        #[source]
        source: TransportError,
    },
}

impl ClientError {
    pub(crate) fn decode(attribute: AttributeId, source: DecodeError) -> Self {
        ClientError::Decode { attribute, source }
    }

    pub(crate) fn io(attribute: AttributeId, source: TransportError) -> Self {
        ClientError::CharacteristicIo { attribute, source }
    }
}
