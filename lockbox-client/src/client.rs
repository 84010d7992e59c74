//! Typed protocol client over session + codec.
//!
//! Every operation fails fast with `NotConnected` when the session has no
//! connection and surfaces transport failures as `CharacteristicIo` carrying
//! the attribute id. Retry policy belongs to callers.

use lockbox_proto::{
    AttributeId, DecodeError, LockStatus, UserStatus, VocReading, codec,
};

use crate::error::ClientError;
use crate::session::Session;
use crate::transport::Transport;

pub struct LockboxClient<T: Transport> {
    session: Session<T>,
}

impl<T: Transport> LockboxClient<T> {
    pub fn new(session: Session<T>) -> Self {
        Self { session }
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    pub async fn discover(
        &self,
        target_name: &str,
        attempts: u32,
    ) -> Result<T::Peripheral, ClientError> {
        self.session.discover(target_name, attempts).await
    }

    pub async fn connect(&mut self, peripheral: &T::Peripheral) -> Result<(), ClientError> {
        self.session.connect(peripheral).await
    }

    pub async fn disconnect(&mut self) {
        self.session.disconnect().await;
    }

    pub async fn read_username(&self) -> Result<String, ClientError> {
        let data = self.session.read_attribute(AttributeId::Username).await?;
        Ok(codec::decode_username(&data))
    }

    pub async fn write_username(&self, name: &str) -> Result<(), ClientError> {
        self.session
            .write_attribute(AttributeId::Username, &codec::encode_username(name))
            .await
    }

    pub async fn read_lock_status(&self) -> Result<LockStatus, ClientError> {
        let data = self.session.read_attribute(AttributeId::LockStatus).await?;
        codec::decode_lock_status(&data)
            .map_err(|e| ClientError::decode(AttributeId::LockStatus, e))
    }

    pub async fn read_user_status(&self) -> Result<UserStatus, ClientError> {
        let data = self.session.read_attribute(AttributeId::UserStatus).await?;
        codec::decode_user_status(&data)
            .map_err(|e| ClientError::decode(AttributeId::UserStatus, e))
    }

    /// Reads back the passcode the peripheral generated for the current
    /// username.
    pub async fn read_passcode(&self) -> Result<String, ClientError> {
        let data = self.session.read_attribute(AttributeId::Passcode).await?;
        Ok(codec::decode_passcode(&data))
    }

    /// Validates the 6-digit invariant before any I/O; a malformed passcode
    /// never reaches the wire. Whether the lock opened is not reported here:
    /// the peripheral is authoritative, so callers re-read the lock status
    /// after giving it a moment to process the write.
    pub async fn write_passcode(&self, code: &str) -> Result<(), ClientError> {
        let data = codec::encode_passcode(code).map_err(|e| match e {
            DecodeError::InvalidPasscodeFormat => ClientError::InvalidPasscodeFormat,
            other => ClientError::decode(AttributeId::Passcode, other),
        })?;
        self.session
            .write_attribute(AttributeId::Passcode, &data)
            .await
    }

    pub async fn read_voc(&self) -> Result<VocReading, ClientError> {
        let data = self.session.read_attribute(AttributeId::VocSensor).await?;
        codec::decode_voc(&data).map_err(|e| ClientError::decode(AttributeId::VocSensor, e))
    }
}
