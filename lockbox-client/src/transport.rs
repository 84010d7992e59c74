//! Capability interface over the radio transport.
//!
//! The session and client are generic over this trait so they can run against
//! the btleplug backend in production and stub transports in tests.

use lockbox_proto::AttributeId;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("no bluetooth adapter available")]
    NoAdapter,
    #[error("peripheral does not expose the {0} characteristic")]
    MissingAttribute(AttributeId),
    #[error(transparent)]
    Ble(#[from] btleplug::Error),
    #[error("{0}")]
    Failed(String),
}

/// One scan window, one connection at a time. Each read/write is atomic at
/// this level; there are no cross-attribute transactions.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Handle to a discovered-but-not-connected peripheral.
    type Peripheral;
    /// Handle to an established connection.
    type Connection;

    /// Run one scan window and return the peripheral advertising
    /// `target_name`, or `None` if this window found nothing. Bounded retry
    /// across windows is the caller's decision.
    async fn scan(&self, target_name: &str) -> Result<Option<Self::Peripheral>, TransportError>;

    async fn connect(
        &self,
        peripheral: &Self::Peripheral,
    ) -> Result<Self::Connection, TransportError>;

    async fn read_attribute(
        &self,
        conn: &Self::Connection,
        id: AttributeId,
    ) -> Result<Vec<u8>, TransportError>;

    async fn write_attribute(
        &self,
        conn: &Self::Connection,
        id: AttributeId,
        data: &[u8],
    ) -> Result<(), TransportError>;

    /// Best-effort teardown; failures are not surfaced.
    async fn disconnect(&self, conn: Self::Connection);
}
